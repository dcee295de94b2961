//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use call_core::{CallSessionController, CallSessionHandle, Settings};
use crossbeam_channel::{Receiver, Sender};
use shared::protocol::{SessionCommand, SessionEvent};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let controller = match CallSessionController::from_settings(&settings) {
                Ok(controller) => controller,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err:#}"),
                    )));
                    tracing::error!("failed to load orders: {err:#}");
                    return;
                }
            };

            let forwarder = spawn_event_forwarder(Arc::clone(&controller), ui_tx.clone());
            let _ = ui_tx.try_send(UiEvent::Ready {
                locale: controller.locale(),
                snapshot: controller.snapshot().await,
            });

            while let Ok(cmd) = cmd_rx.recv() {
                if !handle_command(&controller, &ui_tx, cmd).await {
                    break;
                }
            }

            forwarder.abort();
            controller.shutdown().await;
            tracing::info!("backend worker stopped");
        });
    });
}

/// Returns `false` once the worker should stop.
async fn handle_command(
    controller: &Arc<CallSessionController>,
    ui_tx: &Sender<UiEvent>,
    cmd: BackendCommand,
) -> bool {
    let session_cmd = match cmd {
        BackendCommand::Session(session_cmd) => session_cmd,
        BackendCommand::Refresh => {
            let _ = ui_tx.try_send(UiEvent::Snapshot(controller.snapshot().await));
            return true;
        }
        BackendCommand::Shutdown => return false,
    };

    let (context, done) = match &session_cmd {
        SessionCommand::StartCall { order_id } => (
            UiErrorContext::StartCall,
            format!("Calling about order {order_id}"),
        ),
        SessionCommand::ConfirmOrder => (
            UiErrorContext::ConfirmOrder,
            "Order confirmed; call ending".to_string(),
        ),
        SessionCommand::CancelOrder => (
            UiErrorContext::CancelOrder,
            "Order cancelled; call ending".to_string(),
        ),
    };
    let event = match controller.apply(session_cmd).await {
        Ok(()) => UiEvent::Info(done),
        Err(err) => UiEvent::Error(UiError::from_session(context, &err)),
    };
    let _ = ui_tx.try_send(event);
    true
}

fn spawn_event_forwarder(
    controller: Arc<CallSessionController>,
    ui_tx: Sender<UiEvent>,
) -> tokio::task::JoinHandle<()> {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                // Command errors are reported by the command handler.
                Ok(SessionEvent::Error(_)) => continue,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("ui event forwarder lagged by {skipped} events");
                }
                Err(RecvError::Closed) => break,
            }
            if ui_tx
                .try_send(UiEvent::Snapshot(controller.snapshot().await))
                .is_err()
            {
                tracing::debug!("ui event queue unavailable; dropping snapshot");
            }
        }
    })
}
