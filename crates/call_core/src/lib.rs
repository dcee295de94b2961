use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{CallOutcome, Order, OrderId, OrderStatus},
    error::{ApiError, SessionError},
    protocol::{
        ControllerSnapshot, LineKind, ScriptLine, SessionCommand, SessionEvent, SessionPhase,
        SessionSnapshot,
    },
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

pub mod config;
pub mod script;
pub mod seed;
pub mod view;

pub use config::{load_settings, SessionTiming, Settings};
pub use script::{CallScript, ScriptLocale};
pub use view::StatusCounts;

const EVENT_CHANNEL_CAPACITY: usize = 256;
const MIN_LINE_INTERVAL: Duration = Duration::from_millis(1);

#[async_trait]
pub trait CallSessionHandle: Send + Sync {
    async fn start_call(&self, order_id: &OrderId) -> Result<(), SessionError>;
    async fn confirm_order(&self) -> Result<(), SessionError>;
    async fn cancel_order(&self) -> Result<(), SessionError>;
    async fn snapshot(&self) -> ControllerSnapshot;
    fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent>;

    async fn apply(&self, command: SessionCommand) -> Result<(), SessionError> {
        match command {
            SessionCommand::StartCall { order_id } => self.start_call(&order_id).await,
            SessionCommand::ConfirmOrder => self.confirm_order().await,
            SessionCommand::CancelOrder => self.cancel_order().await,
        }
    }
}

/// Owns the order list and the single simulated call.
///
/// Every timer spawned for a call captures the session generation it was
/// scheduled under and does nothing once the generation has moved on. The
/// handles are also kept so teardown and shutdown can abort them.
pub struct CallSessionController {
    script: CallScript,
    timing: SessionTiming,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<SessionEvent>,
}

struct ControllerState {
    orders: Vec<Order>,
    generation: u64,
    session: CallSession,
}

#[derive(Default)]
struct CallSession {
    phase: SessionPhase,
    active_order: Option<OrderId>,
    script_lines: Vec<ScriptLine>,
    unrevealed: VecDeque<String>,
    reveal_task: Option<JoinHandle<()>>,
    teardown_task: Option<JoinHandle<()>>,
}

impl CallSession {
    fn abort_timers(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
        if let Some(task) = self.teardown_task.take() {
            task.abort();
        }
    }
}

impl ControllerState {
    fn order_mut(&mut self, order_id: &OrderId) -> Option<&mut Order> {
        self.orders
            .iter_mut()
            .find(|order| &order.order_id == order_id)
    }

    fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            phase: self.session.phase,
            active_order: self.session.active_order.clone(),
            script_lines: self.session.script_lines.clone(),
            pending_lines: self.session.unrevealed.len(),
        }
    }
}

impl CallSessionController {
    pub fn new(orders: Vec<Order>, script: CallScript, timing: SessionTiming) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            script,
            timing,
            inner: Mutex::new(ControllerState {
                orders,
                generation: 0,
                session: CallSession::default(),
            }),
            events,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Arc<Self>> {
        let orders = settings.load_orders()?;
        Ok(Self::new(
            orders,
            CallScript::new(settings.locale()),
            settings.timing,
        ))
    }

    pub fn timing(&self) -> SessionTiming {
        self.timing
    }

    pub fn locale(&self) -> ScriptLocale {
        self.script.locale()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let guard = self.inner.lock().await;
        ControllerSnapshot {
            orders: guard.orders.clone(),
            session: guard.session_snapshot(),
        }
    }

    pub async fn status_counts(&self) -> StatusCounts {
        let guard = self.inner.lock().await;
        StatusCounts::from_orders(&guard.orders)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Moves a pending order into `calling` and starts revealing its script.
    pub async fn start_call(self: &Arc<Self>, order_id: &OrderId) -> Result<(), SessionError> {
        let generation = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;

            if let Some(active_order) = &state.session.active_order {
                return Err(self.reject(SessionError::CallAlreadyActive {
                    active_order: active_order.clone(),
                }));
            }

            let Some(order) = state.order_mut(order_id) else {
                return Err(self.reject(SessionError::OrderNotFound {
                    order_id: order_id.clone(),
                }));
            };
            if order.status != OrderStatus::Pending {
                let from = order.status;
                return Err(self.reject(SessionError::InvalidStateTransition {
                    order_id: order_id.clone(),
                    from,
                    attempted: OrderStatus::Calling,
                }));
            }

            order.status = OrderStatus::Calling;
            let agent_lines = self.script.agent_lines(order);

            state.generation += 1;
            let generation = state.generation;
            state.session.abort_timers();
            state.session = CallSession {
                phase: SessionPhase::InCall,
                active_order: Some(order_id.clone()),
                script_lines: Vec::new(),
                unrevealed: agent_lines.into(),
                reveal_task: None,
                teardown_task: None,
            };
            // Events go out while the lock is held so timer events cannot overtake them.
            let _ = self.events.send(SessionEvent::CallStarted {
                order_id: order_id.clone(),
                generation,
            });
            let _ = self.events.send(SessionEvent::OrderStatusChanged {
                order_id: order_id.clone(),
                from: OrderStatus::Pending,
                to: OrderStatus::Calling,
            });
            state.session.reveal_task = Some(self.spawn_reveal_task(generation));
            generation
        };

        info!("call: started order={order_id} generation={generation}");
        Ok(())
    }

    pub async fn confirm_order(self: &Arc<Self>) -> Result<(), SessionError> {
        self.finish_call(CallOutcome::Confirmed).await
    }

    pub async fn cancel_order(self: &Arc<Self>) -> Result<(), SessionError> {
        self.finish_call(CallOutcome::Cancelled).await
    }

    /// Aborts any in-flight reveal or teardown timer. Order state is left as is.
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        guard.session.abort_timers();
    }

    async fn finish_call(self: &Arc<Self>, outcome: CallOutcome) -> Result<(), SessionError> {
        let to = outcome.resulting_status();
        let order_id = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;

            let order_id = match (state.session.phase, &state.session.active_order) {
                (SessionPhase::InCall, Some(order_id)) => order_id.clone(),
                (SessionPhase::Ending(_), Some(order_id)) => {
                    return Err(self.reject(SessionError::CallEnding {
                        order_id: order_id.clone(),
                    }));
                }
                _ => return Err(self.reject(SessionError::NoActiveCall)),
            };

            let Some(order) = state.order_mut(&order_id) else {
                return Err(self.reject(SessionError::OrderNotFound { order_id }));
            };
            if order.status != OrderStatus::Calling {
                let from = order.status;
                return Err(self.reject(SessionError::InvalidStateTransition {
                    order_id,
                    from,
                    attempted: to,
                }));
            }
            order.status = to;

            let generation = state.generation;
            let session = &mut state.session;
            if let Some(task) = session.reveal_task.take() {
                task.abort();
            }
            session.unrevealed.clear();

            let now = Utc::now();
            let closing: Vec<ScriptLine> = self
                .script
                .closing_lines(outcome)
                .into_iter()
                .map(|text| ScriptLine {
                    kind: LineKind::Closing,
                    text,
                    revealed_at: now,
                })
                .collect();
            session.script_lines.extend(closing.iter().cloned());
            session.phase = SessionPhase::Ending(outcome);

            let _ = self.events.send(SessionEvent::OrderStatusChanged {
                order_id: order_id.clone(),
                from: OrderStatus::Calling,
                to,
            });
            for line in closing {
                let _ = self.events.send(SessionEvent::ScriptLineRevealed {
                    order_id: order_id.clone(),
                    line,
                });
            }
            session.teardown_task = Some(self.spawn_teardown_task(generation));
            order_id
        };

        info!("call: order={order_id} marked {to}");
        Ok(())
    }

    fn spawn_reveal_task(self: &Arc<Self>, generation: u64) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let period = self.timing.line_interval.max(MIN_LINE_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !controller.reveal_next_line(generation).await {
                    break;
                }
            }
        })
    }

    /// Returns whether more lines remain for this generation.
    async fn reveal_next_line(&self, generation: u64) -> bool {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        if state.generation != generation || state.session.phase != SessionPhase::InCall {
            debug!("call: dropping stale reveal tick generation={generation}");
            return false;
        }
        let Some(order_id) = state.session.active_order.clone() else {
            return false;
        };
        let Some(text) = state.session.unrevealed.pop_front() else {
            state.session.reveal_task = None;
            return false;
        };

        let line = ScriptLine {
            kind: LineKind::Agent,
            text,
            revealed_at: Utc::now(),
        };
        state.session.script_lines.push(line.clone());
        let more = !state.session.unrevealed.is_empty();
        if !more {
            state.session.reveal_task = None;
        }
        debug!("call: order={order_id} revealed line: {}", line.text);
        let _ = self
            .events
            .send(SessionEvent::ScriptLineRevealed { order_id, line });
        more
    }

    fn spawn_teardown_task(self: &Arc<Self>, generation: u64) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let delay = self.timing.teardown_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.teardown(generation).await;
        })
    }

    async fn teardown(&self, generation: u64) {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        let SessionPhase::Ending(outcome) = state.session.phase else {
            return;
        };
        if state.generation != generation {
            debug!("call: dropping stale teardown generation={generation}");
            return;
        }
        let Some(order_id) = state.session.active_order.take() else {
            return;
        };
        if let Some(task) = state.session.reveal_task.take() {
            task.abort();
        }
        // The teardown handle is this task; dropping it does not abort it.
        state.session = CallSession::default();
        info!("call: session for order={order_id} torn down");
        let _ = self
            .events
            .send(SessionEvent::CallEnded { order_id, outcome });
    }

    fn reject(&self, err: SessionError) -> SessionError {
        warn!("call: rejected command: {err}");
        let _ = self.events.send(SessionEvent::Error(ApiError::from(&err)));
        err
    }
}

#[async_trait]
impl CallSessionHandle for Arc<CallSessionController> {
    async fn start_call(&self, order_id: &OrderId) -> Result<(), SessionError> {
        CallSessionController::start_call(self, order_id).await
    }

    async fn confirm_order(&self) -> Result<(), SessionError> {
        CallSessionController::confirm_order(self).await
    }

    async fn cancel_order(&self) -> Result<(), SessionError> {
        CallSessionController::cancel_order(self).await
    }

    async fn snapshot(&self) -> ControllerSnapshot {
        CallSessionController::snapshot(self).await
    }

    fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        CallSessionController::subscribe_events(self)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
