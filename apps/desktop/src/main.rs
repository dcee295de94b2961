use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use call_core::{
    load_settings,
    script::{format_rupees, AGENT_LINE_COUNT},
    view::{status_label, DISPLAYED_STATUSES},
    CallSessionController, CallSessionHandle, ScriptLocale, StatusCounts,
};
use clap::{Parser, Subcommand, ValueEnum};
use shared::{
    domain::{CallOutcome, OrderId},
    protocol::{ControllerSnapshot, LineKind, SessionCommand, SessionEvent},
};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "call-agent", about = "Simulated order confirmation calls")]
struct Cli {
    /// Settings file; defaults to ./call_agent.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print snapshots as JSON instead of text.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List orders with their status and the per-status counts.
    List,
    /// Run one simulated call to completion.
    Call {
        #[arg(long)]
        order: String,
        #[arg(long, value_enum, default_value_t = Decision::Confirm)]
        outcome: Decision,
        /// Answer after this many agent lines instead of waiting for the full script.
        #[arg(long)]
        answer_after_lines: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Decision {
    Confirm,
    Cancel,
}

impl From<Decision> for CallOutcome {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Confirm => CallOutcome::Confirmed,
            Decision::Cancel => CallOutcome::Cancelled,
        }
    }
}

fn render_orders(snapshot: &ControllerSnapshot, locale: ScriptLocale) -> Vec<String> {
    let mut out = Vec::new();
    for order in &snapshot.orders {
        out.push(format!(
            "{} | {} | {} | {} | {}",
            order.order_id,
            order.customer_name,
            order.phone_number,
            format_rupees(order.total_amount),
            status_label(order.status, locale)
        ));
        out.push(format!("    {}", order.items.join(", ")));
    }
    out.push(render_counts(&StatusCounts::from_orders(&snapshot.orders), locale));
    out
}

fn render_counts(counts: &StatusCounts, locale: ScriptLocale) -> String {
    DISPLAYED_STATUSES
        .iter()
        .map(|status| format!("{}: {}", status_label(*status, locale), counts.get(*status)))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Starts a call, answers it once `answer_after` agent lines are out, and
/// waits for teardown. Returns the transcript in reveal order.
async fn drive_call(
    controller: &Arc<CallSessionController>,
    order_id: &OrderId,
    outcome: CallOutcome,
    answer_after: usize,
) -> Result<Vec<String>> {
    let answer_after = answer_after.min(AGENT_LINE_COUNT);
    let mut events = BroadcastStream::new(controller.subscribe_events());
    controller
        .start_call(order_id)
        .await
        .with_context(|| format!("failed to start call for order {order_id}"))?;

    let mut transcript = Vec::new();
    let mut agent_lines = 0usize;
    let mut answered = false;
    if answer_after == 0 {
        answer(controller, outcome).await?;
        answered = true;
    }

    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!("event stream lagged: {err}");
                continue;
            }
        };
        match event {
            SessionEvent::ScriptLineRevealed { line, .. } => {
                transcript.push(line.text);
                if line.kind == LineKind::Agent {
                    agent_lines += 1;
                }
                if !answered && agent_lines >= answer_after {
                    answer(controller, outcome).await?;
                    answered = true;
                }
            }
            SessionEvent::CallEnded { order_id: ended, .. } if &ended == order_id => break,
            SessionEvent::Error(err) => bail!("call failed: {}", err.message),
            _ => {}
        }
    }

    Ok(transcript)
}

async fn answer(controller: &Arc<CallSessionController>, outcome: CallOutcome) -> Result<()> {
    controller.apply(SessionCommand::answer(outcome)).await?;
    Ok(())
}

fn print_snapshot(snapshot: &ControllerSnapshot, json: bool, locale: ScriptLocale) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        for line in render_orders(snapshot, locale) {
            println!("{line}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;
    let controller = CallSessionController::from_settings(&settings)?;
    let locale = controller.locale();

    match cli.command {
        Command::List => {
            print_snapshot(&controller.snapshot().await, cli.json, locale)?;
        }
        Command::Call {
            order,
            outcome,
            answer_after_lines,
        } => {
            let order_id = OrderId::new(order);
            let answer_after = answer_after_lines.unwrap_or(AGENT_LINE_COUNT);
            let transcript =
                drive_call(&controller, &order_id, outcome.into(), answer_after).await?;
            if !cli.json {
                for line in &transcript {
                    println!("{line}");
                }
                println!();
            }
            print_snapshot(&controller.snapshot().await, cli.json, locale)?;
        }
    }

    controller.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_core::{seed::sample_orders, script::CLOSING_LINE_COUNT, CallScript, SessionTiming};
    use shared::domain::OrderStatus;

    fn controller() -> Arc<CallSessionController> {
        CallSessionController::new(
            sample_orders(),
            CallScript::new(ScriptLocale::English),
            SessionTiming::default(),
        )
    }

    #[test]
    fn parses_call_subcommand() {
        let cli = Cli::try_parse_from([
            "call-agent",
            "--json",
            "call",
            "--order",
            "OD12345678",
            "--outcome",
            "cancel",
            "--answer-after-lines",
            "3",
        ])
        .expect("parse");
        assert!(cli.json);
        match cli.command {
            Command::Call {
                order,
                outcome,
                answer_after_lines,
            } => {
                assert_eq!(order, "OD12345678");
                assert_eq!(outcome, Decision::Cancel);
                assert_eq!(answer_after_lines, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_call_transcript_has_script_then_closing() {
        let controller = controller();
        let order_id = OrderId::new("OD12345678");

        let transcript = drive_call(
            &controller,
            &order_id,
            CallOutcome::Confirmed,
            AGENT_LINE_COUNT,
        )
        .await
        .expect("drive call");

        assert_eq!(transcript.len(), AGENT_LINE_COUNT + CLOSING_LINE_COUNT);
        assert!(transcript[1].contains("Rajesh Kumar"));
        let snapshot = controller.snapshot().await;
        assert!(!snapshot.session.call_active());
        assert_eq!(
            snapshot.order(&order_id).map(|o| o.status),
            Some(OrderStatus::Confirmed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn early_answer_cuts_the_script_short() {
        let controller = controller();
        let order_id = OrderId::new("OD12345679");

        let transcript = drive_call(&controller, &order_id, CallOutcome::Cancelled, 2)
            .await
            .expect("drive call");

        assert_eq!(transcript.len(), 2 + CLOSING_LINE_COUNT);
        let counts = controller.status_counts().await;
        assert_eq!(counts.cancelled, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_order_cannot_be_called() {
        let controller = controller();
        let err = drive_call(
            &controller,
            &OrderId::new("OD12345680"),
            CallOutcome::Confirmed,
            AGENT_LINE_COUNT,
        )
        .await
        .expect_err("settled order");
        assert!(err.to_string().contains("OD12345680"));
    }

    #[test]
    fn renders_counts_for_displayed_statuses() {
        let snapshot = ControllerSnapshot {
            orders: sample_orders(),
            session: Default::default(),
        };
        let lines = render_orders(&snapshot, ScriptLocale::English);
        assert_eq!(lines.len(), 7);
        assert!(lines[0].contains("₹15,999"));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("pending: 2  confirmed: 1  cancelled: 0  in call: 0")
        );
    }
}
