//! Derived presentation state. Everything here is a pure function of the order list.

use serde::Serialize;
use shared::domain::{Order, OrderStatus};

use crate::script::ScriptLocale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Clock,
    Phone,
    Check,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Waiting,
    Active,
    Success,
    Failure,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub icon: StatusIcon,
    pub tone: StatusTone,
    pub animated: bool,
}

pub fn status_badge(status: OrderStatus) -> StatusBadge {
    let (icon, tone, animated) = match status {
        OrderStatus::Pending => (StatusIcon::Clock, StatusTone::Waiting, false),
        OrderStatus::Calling => (StatusIcon::Phone, StatusTone::Active, true),
        OrderStatus::Confirmed => (StatusIcon::Check, StatusTone::Success, false),
        OrderStatus::Cancelled => (StatusIcon::Cross, StatusTone::Failure, false),
        OrderStatus::NoResponse => (StatusIcon::Clock, StatusTone::Muted, false),
    };
    StatusBadge {
        icon,
        tone,
        animated,
    }
}

pub fn status_label(status: OrderStatus, locale: ScriptLocale) -> &'static str {
    match locale {
        ScriptLocale::English => match status {
            OrderStatus::Pending => "pending",
            OrderStatus::Calling => "in call",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::NoResponse => "no response",
        },
        ScriptLocale::Hindi => match status {
            OrderStatus::Pending => "पेंडिंग",
            OrderStatus::Calling => "कॉल में...",
            OrderStatus::Confirmed => "कन्फर्म",
            OrderStatus::Cancelled => "कैंसल",
            OrderStatus::NoResponse => "जवाब नहीं",
        },
    }
}

/// Statuses shown in the stats row, in display order.
pub const DISPLAYED_STATUSES: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Cancelled,
    OrderStatus::Calling,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub calling: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub no_response: usize,
}

impl StatusCounts {
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut counts, order| {
            *counts.slot_mut(order.status) += 1;
            counts
        })
    }

    pub fn get(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Calling => self.calling,
            OrderStatus::Confirmed => self.confirmed,
            OrderStatus::Cancelled => self.cancelled,
            OrderStatus::NoResponse => self.no_response,
        }
    }

    pub fn total(&self) -> usize {
        OrderStatus::ALL.iter().map(|status| self.get(*status)).sum()
    }

    fn slot_mut(&mut self, status: OrderStatus) -> &mut usize {
        match status {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Calling => &mut self.calling,
            OrderStatus::Confirmed => &mut self.confirmed,
            OrderStatus::Cancelled => &mut self.cancelled,
            OrderStatus::NoResponse => &mut self.no_response,
        }
    }
}
