use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use call_core::{load_settings, ScriptLocale};
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::CallAgentApp;

#[derive(Parser, Debug)]
struct Args {
    /// Settings file; defaults to ./call_agent.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Script and label language (`hi` or `en`). egui's bundled fonts have no
    /// Devanagari glyphs, so the window defaults to English.
    #[arg(long, value_parser = parse_locale)]
    locale: Option<ScriptLocale>,
}

fn parse_locale(raw: &str) -> Result<ScriptLocale, String> {
    ScriptLocale::parse(raw).ok_or_else(|| format!("unknown locale {raw:?}; expected hi or en"))
}

/// An explicit `--locale` wins, then a configured one; otherwise English.
fn window_locale(flag: Option<ScriptLocale>, configured: Option<ScriptLocale>) -> ScriptLocale {
    flag.or(configured).unwrap_or(ScriptLocale::English)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    settings.locale = Some(window_locale(args.locale, settings.locale));

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Order Confirmation Agent")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Order Confirmation Agent",
        options,
        Box::new(|_cc| Ok(Box::new(CallAgentApp::bootstrap(cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run desktop window: {err}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_flag_accepts_short_and_long_names() {
        let args = Args::try_parse_from(["desktop_gui", "--locale", "hi"]).expect("parse");
        assert_eq!(args.locale, Some(ScriptLocale::Hindi));
        assert!(Args::try_parse_from(["desktop_gui", "--locale", "de"]).is_err());
    }

    #[test]
    fn configured_locale_is_kept_unless_the_flag_overrides_it() {
        assert_eq!(window_locale(None, None), ScriptLocale::English);
        assert_eq!(
            window_locale(None, Some(ScriptLocale::Hindi)),
            ScriptLocale::Hindi
        );
        assert_eq!(
            window_locale(Some(ScriptLocale::English), Some(ScriptLocale::Hindi)),
            ScriptLocale::English
        );
    }
}
