//! Backend commands queued from UI to backend worker.

use shared::protocol::SessionCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Session(SessionCommand),
    Refresh,
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Session(cmd) => cmd.name(),
            BackendCommand::Refresh => "refresh",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}

impl From<SessionCommand> for BackendCommand {
    fn from(value: SessionCommand) -> Self {
        BackendCommand::Session(value)
    }
}
