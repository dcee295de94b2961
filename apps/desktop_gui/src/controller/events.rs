//! UI/backend events and error modeling for the desktop GUI controller.

use call_core::ScriptLocale;
use shared::{
    error::{ApiError, ErrorCode, SessionError},
    protocol::ControllerSnapshot,
};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Ready {
        locale: ScriptLocale,
        snapshot: ControllerSnapshot,
    },
    Snapshot(ControllerSnapshot),
    Info(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    InvalidState,
    NotFound,
    Startup,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    StartCall,
    ConfirmOrder,
    CancelOrder,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_session(context: UiErrorContext, err: &SessionError) -> Self {
        Self::from_api(context, &ApiError::from(err))
    }

    pub fn from_api(context: UiErrorContext, err: &ApiError) -> Self {
        let category = match err.code {
            ErrorCode::InvalidStateTransition => UiErrorCategory::InvalidState,
            ErrorCode::NotFound => UiErrorCategory::NotFound,
        };
        Self {
            category,
            context,
            message: err.message.clone(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if context == UiErrorContext::BackendStartup
            || message_lower.contains("startup failure")
        {
            UiErrorCategory::Startup
        } else if message_lower.contains("disconnected") || message_lower.contains("queue") {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Whether the backend is gone and the window cannot recover without a restart.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category,
            UiErrorCategory::Startup | UiErrorCategory::Transport
        )
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::OrderId;

    #[test]
    fn session_errors_keep_their_code() {
        let err = UiError::from_session(
            UiErrorContext::StartCall,
            &SessionError::CallAlreadyActive {
                active_order: OrderId::new("OD1"),
            },
        );
        assert_eq!(err.category(), UiErrorCategory::InvalidState);
        assert_eq!(err.context(), UiErrorContext::StartCall);
        assert!(err.message().contains("OD1"));
        assert!(!err.is_fatal());

        let missing = UiError::from_session(
            UiErrorContext::StartCall,
            &SessionError::OrderNotFound {
                order_id: OrderId::new("OD404"),
            },
        );
        assert_eq!(missing.category(), UiErrorCategory::NotFound);
    }

    #[test]
    fn classifies_backend_disconnect_as_transport_error() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "Backend command processor disconnected; restart the app",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(err.is_fatal());
    }
}
