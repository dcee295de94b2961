//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend; on failure the reason is written to `status`.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::protocol::SessionCommand;

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (tx, rx) = bounded::<BackendCommand>(1);
        let mut status = String::new();

        assert!(dispatch_backend_command(&tx, BackendCommand::Refresh, &mut status));
        assert!(status.is_empty());

        assert!(!dispatch_backend_command(
            &tx,
            BackendCommand::Session(SessionCommand::ConfirmOrder),
            &mut status
        ));
        assert!(status.contains("full"));

        drop(rx);
        assert!(!dispatch_backend_command(
            &tx,
            BackendCommand::Session(SessionCommand::CancelOrder),
            &mut status
        ));
        assert!(status.contains("disconnected"));
    }
}
