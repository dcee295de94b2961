//! Folds backend events into the state the panels render from.

use call_core::{ScriptLocale, StatusCounts};
use shared::{
    domain::{Order, OrderStatus},
    protocol::ControllerSnapshot,
};

use crate::controller::events::{UiError, UiEvent};

#[derive(Debug, Clone)]
pub struct ViewModel {
    pub locale: ScriptLocale,
    pub snapshot: Option<ControllerSnapshot>,
    pub status: String,
    pub error: Option<UiError>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            locale: ScriptLocale::default(),
            snapshot: None,
            status: "Backend starting".to_string(),
            error: None,
        }
    }
}

impl ViewModel {
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Ready { locale, snapshot } => {
                self.locale = locale;
                self.snapshot = Some(snapshot);
                self.status = "Ready".to_string();
                self.error = None;
            }
            UiEvent::Snapshot(snapshot) => {
                let was_active = self.call_active();
                self.snapshot = Some(snapshot);
                if self.call_active() {
                    self.error = None;
                } else if was_active {
                    self.status = "Call ended".to_string();
                }
            }
            UiEvent::Info(message) => {
                self.status = message;
                self.error = None;
            }
            UiEvent::Error(err) => {
                self.status = err.message().to_string();
                self.error = Some(err);
            }
        }
    }

    pub fn orders(&self) -> &[Order] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.orders.as_slice())
            .unwrap_or(&[])
    }

    pub fn call_active(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.session.call_active())
    }

    pub fn active_order(&self) -> Option<&Order> {
        self.snapshot.as_ref().and_then(|s| s.active_order())
    }

    /// The call button is shown for pending orders and enabled only while idle.
    pub fn can_start_call(&self, order: &Order) -> bool {
        order.status == OrderStatus::Pending && !self.call_active()
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_orders(self.orders())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::UiErrorContext;
    use call_core::seed::sample_orders;
    use shared::{
        domain::OrderId,
        protocol::{SessionPhase, SessionSnapshot},
    };

    fn idle_snapshot() -> ControllerSnapshot {
        ControllerSnapshot {
            orders: sample_orders(),
            session: SessionSnapshot::default(),
        }
    }

    fn calling_snapshot() -> ControllerSnapshot {
        let mut snapshot = idle_snapshot();
        snapshot.orders[0].status = OrderStatus::Calling;
        snapshot.session = SessionSnapshot {
            generation: 1,
            phase: SessionPhase::InCall,
            active_order: Some(OrderId::new("OD12345678")),
            script_lines: Vec::new(),
            pending_lines: 7,
        };
        snapshot
    }

    #[test]
    fn call_buttons_are_disabled_while_a_call_is_active() {
        let mut model = ViewModel::default();
        model.apply(UiEvent::Ready {
            locale: ScriptLocale::English,
            snapshot: idle_snapshot(),
        });
        let second = model.orders()[1].clone();
        let settled = model.orders()[2].clone();
        assert!(model.can_start_call(&second));
        assert!(!model.can_start_call(&settled));

        model.apply(UiEvent::Snapshot(calling_snapshot()));
        assert!(model.call_active());
        assert!(!model.can_start_call(&second));
        assert_eq!(
            model.active_order().map(|o| o.customer_name.as_str()),
            Some("Rajesh Kumar")
        );
        assert_eq!(model.counts().calling, 1);
    }

    #[test]
    fn ending_a_call_updates_status_line() {
        let mut model = ViewModel::default();
        model.apply(UiEvent::Snapshot(calling_snapshot()));
        model.apply(UiEvent::Error(UiError::from_message(
            UiErrorContext::General,
            "something odd",
        )));
        assert!(model.error.is_some());

        let mut ended = idle_snapshot();
        ended.orders[0].status = OrderStatus::Confirmed;
        model.apply(UiEvent::Snapshot(ended));
        assert!(!model.call_active());
        assert_eq!(model.status, "Call ended");
        assert_eq!(model.counts().confirmed, 2);
    }
}
