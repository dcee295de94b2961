pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(test)]
mod tests {
    use crate::{
        domain::{CallOutcome, OrderId, OrderStatus},
        error::{ApiError, ErrorCode, SessionError},
        protocol::{SessionCommand, SessionPhase, SessionSnapshot},
    };

    #[test]
    fn no_response_status_keeps_hyphenated_wire_name() {
        let encoded = serde_json::to_string(&OrderStatus::NoResponse).expect("encode");
        assert_eq!(encoded, "\"no-response\"");
        let decoded: OrderStatus = serde_json::from_str("\"calling\"").expect("decode");
        assert_eq!(decoded, OrderStatus::Calling);
    }

    #[test]
    fn start_call_command_uses_tagged_payload() {
        let cmd = SessionCommand::StartCall {
            order_id: OrderId::new("OD1"),
        };
        let value = serde_json::to_value(&cmd).expect("encode");
        assert_eq!(value["type"], "start_call");
        assert_eq!(value["payload"]["order_id"], "OD1");
        assert_eq!(cmd.name(), "start_call");
    }

    #[test]
    fn answer_commands_follow_the_outcome() {
        assert_eq!(
            SessionCommand::answer(CallOutcome::Confirmed),
            SessionCommand::ConfirmOrder
        );
        assert_eq!(
            SessionCommand::answer(CallOutcome::Cancelled),
            SessionCommand::CancelOrder
        );
    }

    #[test]
    fn only_missing_orders_map_to_not_found() {
        let missing = SessionError::OrderNotFound {
            order_id: OrderId::new("OD404"),
        };
        assert_eq!(missing.code(), ErrorCode::NotFound);
        assert_eq!(
            SessionError::NoActiveCall.code(),
            ErrorCode::InvalidStateTransition
        );

        let api: ApiError = SessionError::InvalidStateTransition {
            order_id: OrderId::new("OD1"),
            from: OrderStatus::Confirmed,
            attempted: OrderStatus::Calling,
        }
        .into();
        assert_eq!(api.code, ErrorCode::InvalidStateTransition);
        assert_eq!(api.message, "order OD1 is confirmed; cannot move to calling");
    }

    #[test]
    fn default_session_is_idle() {
        let session = SessionSnapshot::default();
        assert_eq!(session.phase, SessionPhase::Idle);
        assert!(!session.call_active());
        assert!(session.script_lines.is_empty());
    }
}
