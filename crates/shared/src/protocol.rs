use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{CallOutcome, Order, OrderId, OrderStatus},
    error::ApiError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionCommand {
    StartCall { order_id: OrderId },
    ConfirmOrder,
    CancelOrder,
}

impl SessionCommand {
    /// The terminal command that produces `outcome`.
    pub fn answer(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Confirmed => SessionCommand::ConfirmOrder,
            CallOutcome::Cancelled => SessionCommand::CancelOrder,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::StartCall { .. } => "start_call",
            SessionCommand::ConfirmOrder => "confirm_order",
            SessionCommand::CancelOrder => "cancel_order",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Agent,
    Closing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub kind: LineKind,
    pub text: String,
    pub revealed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", content = "outcome", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    InCall,
    Ending(CallOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub phase: SessionPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_order: Option<OrderId>,
    pub script_lines: Vec<ScriptLine>,
    /// Lines of the agent script not yet revealed.
    pub pending_lines: usize,
}

impl SessionSnapshot {
    pub fn call_active(&self) -> bool {
        self.phase != SessionPhase::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub orders: Vec<Order>,
    pub session: SessionSnapshot,
}

impl ControllerSnapshot {
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.order_id == order_id)
    }

    pub fn active_order(&self) -> Option<&Order> {
        self.session
            .active_order
            .as_ref()
            .and_then(|order_id| self.order(order_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    CallStarted {
        order_id: OrderId,
        generation: u64,
    },
    OrderStatusChanged {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    ScriptLineRevealed {
        order_id: OrderId,
        line: ScriptLine,
    },
    CallEnded {
        order_id: OrderId,
        outcome: CallOutcome,
    },
    Error(ApiError),
}
