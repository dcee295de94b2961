use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OrderId, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    InvalidStateTransition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: OrderId },
    #[error("order {order_id} is {from}; cannot move to {attempted}")]
    InvalidStateTransition {
        order_id: OrderId,
        from: OrderStatus,
        attempted: OrderStatus,
    },
    #[error("a call to order {active_order} is already active")]
    CallAlreadyActive { active_order: OrderId },
    #[error("no call is active")]
    NoActiveCall,
    #[error("call to order {order_id} is already ending")]
    CallEnding { order_id: OrderId },
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::OrderNotFound { .. } => ErrorCode::NotFound,
            SessionError::InvalidStateTransition { .. }
            | SessionError::CallAlreadyActive { .. }
            | SessionError::NoActiveCall
            | SessionError::CallEnding { .. } => ErrorCode::InvalidStateTransition,
        }
    }
}

impl From<&SessionError> for ApiError {
    fn from(value: &SessionError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        ApiError::from(&value)
    }
}
