//! Synchronous event dispatch.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, error, trace};

use super::{DomainEvent, EventKind, PassiveEffectSubscriber, VpRecalculationSubscriber};
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::error::{ErrorSeverity, GameError, RulesError};
use crate::state::GameState;

/// How a subscriber failure affects the command being executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubscriberCriticality {
    /// Failure aborts the command; the engine rolls back its state.
    Critical,
    /// Failure is logged as an error and dispatch continues.
    #[default]
    Important,
    /// Failure is logged at debug level and ignored.
    Optional,
}

/// Mutable view handed to subscribers while an event is delivered.
pub struct DispatchContext<'a> {
    pub state: &'a mut GameState,
    pub env: GameEnv<'a>,
    /// Follow-up events produced by the handler.
    pub emitted: Vec<DomainEvent>,
}

impl DispatchContext<'_> {
    pub fn emit(&mut self, event: DomainEvent) {
        self.emitted.push(event);
    }
}

/// Reacts to domain events inside the mutation window.
///
/// Subscribers are executed in priority order (lower values first).
pub trait EventSubscriber: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> SubscriberCriticality {
        SubscriberCriticality::Important
    }

    fn is_interested(&self, kind: EventKind) -> bool;

    fn handle(&self, event: &DomainEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RulesError>;
}

/// Errors surfaced while dispatching events.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DispatchError {
    #[error("subscriber '{subscriber}' failed on {event}: {error}")]
    Subscriber {
        subscriber: String,
        event: EventKind,
        error: RulesError,
    },

    #[error("event cascade too deep: {event} reached depth {depth}")]
    CascadeTooDeep { event: EventKind, depth: usize },
}

impl GameError for DispatchError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Subscriber { error, .. } => error.severity(),
            Self::CascadeTooDeep { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Subscriber { .. } => "DISPATCH_SUBSCRIBER_FAILED",
            Self::CascadeTooDeep { .. } => "DISPATCH_CASCADE_TOO_DEEP",
        }
    }
}

/// In-process publish/subscribe over [`DomainEvent`]s.
///
/// Delivery is breadth first: every subscriber sees an event before any
/// follow-up it caused is delivered. Follow-ups deeper than `max_cascade`
/// abort the dispatch.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
    max_cascade: usize,
}

impl EventBus {
    /// Creates a bus without subscribers.
    pub fn new(max_cascade: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            max_cascade,
        }
    }

    /// Creates a bus with the passive-effect and VP subscribers registered.
    pub fn with_defaults(max_cascade: usize) -> Self {
        let mut bus = Self::new(max_cascade);
        bus.register(Arc::new(PassiveEffectSubscriber));
        bus.register(Arc::new(VpRecalculationSubscriber));
        bus
    }

    pub fn register(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
        self.subscribers.sort_by_key(|s| s.priority());
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Subscriber names and priorities in execution order.
    pub fn subscribers(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.subscribers.iter().map(|s| (s.name(), s.priority()))
    }

    /// Delivers `events` and every follow-up they cause.
    ///
    /// Returns all delivered events in delivery order.
    pub fn dispatch(
        &self,
        state: &mut GameState,
        env: GameEnv<'_>,
        events: Vec<DomainEvent>,
    ) -> Result<Vec<DomainEvent>, DispatchError> {
        let mut queue: VecDeque<(DomainEvent, usize)> =
            events.into_iter().map(|event| (event, 0)).collect();
        let mut delivered = Vec::with_capacity(queue.len());

        while let Some((event, depth)) = queue.pop_front() {
            let kind = event.kind();
            trace!(target: "terra::events", event = %kind, depth, "delivering event");

            for subscriber in self.subscribers.iter().filter(|s| s.is_interested(kind)) {
                let mut ctx = DispatchContext {
                    state: &mut *state,
                    env,
                    emitted: Vec::new(),
                };
                let result = subscriber.handle(&event, &mut ctx);
                let emitted = ctx.emitted;

                if let Err(error) = result {
                    self.handle_failure(subscriber.as_ref(), kind, error)?;
                    continue;
                }
                if emitted.is_empty() {
                    continue;
                }
                if depth + 1 > self.max_cascade {
                    error!(
                        target: "terra::events",
                        subscriber = subscriber.name(),
                        event = %kind,
                        depth,
                        "event cascade exceeded limit"
                    );
                    return Err(DispatchError::CascadeTooDeep {
                        event: kind,
                        depth: depth + 1,
                    });
                }
                queue.extend(emitted.into_iter().map(|e| (e, depth + 1)));
            }

            delivered.push(event);
        }

        Ok(delivered)
    }

    fn handle_failure(
        &self,
        subscriber: &dyn EventSubscriber,
        event: EventKind,
        error: RulesError,
    ) -> Result<(), DispatchError> {
        match subscriber.criticality() {
            SubscriberCriticality::Critical => {
                error!(
                    target: "terra::events",
                    subscriber = subscriber.name(),
                    criticality = "critical",
                    event = %event,
                    error = %error,
                    "Critical subscriber failed, aborting command"
                );
                Err(DispatchError::Subscriber {
                    subscriber: subscriber.name().to_owned(),
                    event,
                    error,
                })
            }
            SubscriberCriticality::Important => {
                error!(
                    target: "terra::events",
                    subscriber = subscriber.name(),
                    criticality = "important",
                    event = %event,
                    error = %error,
                    "Subscriber failed, continuing"
                );
                Ok(())
            }
            SubscriberCriticality::Optional => {
                debug!(
                    target: "terra::events",
                    subscriber = subscriber.name(),
                    criticality = "optional",
                    event = %event,
                    error = %error,
                    "Optional subscriber failed"
                );
                Ok(())
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_defaults(GameConfig::DEFAULT_MAX_EVENT_CASCADE)
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers().collect::<Vec<_>>())
            .field("max_cascade", &self.max_cascade)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlayerId;
    use crate::testing::Fixture;

    /// Re-emits every turn change until the cascade limit is hit.
    struct Echo;

    impl EventSubscriber for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn is_interested(&self, kind: EventKind) -> bool {
            kind == EventKind::TurnChanged
        }

        fn handle(&self, event: &DomainEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RulesError> {
            ctx.emit(event.clone());
            Ok(())
        }
    }

    struct Failing(SubscriberCriticality);

    impl EventSubscriber for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn criticality(&self) -> SubscriberCriticality {
            self.0
        }

        fn is_interested(&self, _kind: EventKind) -> bool {
            true
        }

        fn handle(&self, _event: &DomainEvent, _ctx: &mut DispatchContext<'_>) -> Result<(), RulesError> {
            Err(RulesError::invalid_state("boom"))
        }
    }

    fn turn_changed() -> DomainEvent {
        DomainEvent::TurnChanged {
            player: PlayerId::new("p1"),
            actions_remaining: 2,
        }
    }

    #[test]
    fn cascade_limit_aborts_dispatch() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let mut bus = EventBus::new(3);
        bus.register(Arc::new(Echo));

        let (state, env) = fixture.split();
        let result = bus.dispatch(state, env, vec![turn_changed()]);
        assert!(matches!(
            result,
            Err(DispatchError::CascadeTooDeep { depth: 4, .. })
        ));
    }

    #[test]
    fn important_failures_do_not_abort() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let mut bus = EventBus::new(8);
        bus.register(Arc::new(Failing(SubscriberCriticality::Important)));

        let (state, env) = fixture.split();
        let delivered = bus.dispatch(state, env, vec![turn_changed()]).unwrap();
        assert_eq!(delivered, vec![turn_changed()]);
    }

    #[test]
    fn critical_failures_abort() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let mut bus = EventBus::new(8);
        bus.register(Arc::new(Failing(SubscriberCriticality::Critical)));

        let (state, env) = fixture.split();
        let result = bus.dispatch(state, env, vec![turn_changed()]);
        assert!(matches!(result, Err(DispatchError::Subscriber { .. })));
    }

    #[test]
    fn subscribers_run_in_priority_order() {
        let bus = EventBus::default();
        let names: Vec<_> = bus.subscribers().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["passive_effects", "vp_recalculation"]);
    }
}
