//! Process-wide publish/subscribe hub keyed by event name.
//!
//! Delivery is synchronous and ordered by registration. Handler failures are isolated: a failing
//! or panicking handler is reported to the bus's [`SubscriberErrorReporter`] and the remaining
//! handlers still run.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::{Rc, Weak},
};

use serde::Serialize;
use serde_json::Value;

use crate::error::SubscriberFailure;

/// Result returned by event handlers.
pub type HandlerResult = Result<(), String>;

/// Shared event handler. Identity (pointer equality) is what [`EventBus::off`] matches on.
pub type EventHandler = Rc<dyn Fn(&[Value]) -> HandlerResult>;

/// Sink for handler failures raised during [`EventBus::fire`].
pub trait SubscriberErrorReporter {
    /// Receives one failure report.
    fn report(&self, failure: &SubscriberFailure);
}

#[derive(Debug, Clone, Copy, Default)]
/// Default reporter that logs failures through `tracing`.
pub struct TracingErrorReporter;

impl SubscriberErrorReporter for TracingErrorReporter {
    fn report(&self, failure: &SubscriberFailure) {
        tracing::error!(
            event = %failure.event,
            subscription = failure.subscription,
            message = %failure.message,
            "event subscriber failed"
        );
    }
}

struct Subscriber {
    id: u64,
    handler: EventHandler,
    once: bool,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    topics: HashMap<String, Vec<Subscriber>>,
}

impl BusState {
    fn insert(&mut self, name: &str, handler: EventHandler, once: bool) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.topics
            .entry(name.to_string())
            .or_default()
            .push(Subscriber { id, handler, once });
        id
    }

    fn remove_where(&mut self, name: &str, matches: impl Fn(&Subscriber) -> bool) -> bool {
        let Some(subscribers) = self.topics.get_mut(name) else {
            return false;
        };
        let Some(index) = subscribers.iter().position(matches) else {
            return false;
        };
        subscribers.remove(index);
        if subscribers.is_empty() {
            self.topics.remove(name);
        }
        true
    }

    fn contains(&self, name: &str, id: u64) -> bool {
        self.topics
            .get(name)
            .is_some_and(|subscribers| subscribers.iter().any(|sub| sub.id == id))
    }
}

/// Token returned by [`EventBus::on`] and [`EventBus::once`].
///
/// Dropping the token keeps the subscription alive; call [`Self::unsubscribe`] to remove it.
#[derive(Debug, Clone)]
pub struct SubscriptionToken {
    bus: Weak<RefCell<BusState>>,
    event: String,
    id: u64,
}

impl SubscriptionToken {
    /// Event name this subscription listens to.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Bus-unique subscription identifier.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Removes the subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let removed = bus
            .borrow_mut()
            .remove_where(&self.event, |sub| sub.id == self.id);
        removed
    }
}

/// Publish/subscribe hub. Clones share the same subscriptions.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<BusState>>,
    reporter: Rc<dyn SubscriberErrorReporter>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_reporter(Rc::new(TracingErrorReporter))
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("topics", &state.topics.len())
            .field("next_id", &state.next_id)
            .finish()
    }
}

impl EventBus {
    /// Creates an empty bus that logs handler failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bus that hands handler failures to `reporter`.
    pub fn with_reporter(reporter: Rc<dyn SubscriberErrorReporter>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusState::default())),
            reporter,
        }
    }

    fn token(&self, name: &str, id: u64) -> SubscriptionToken {
        SubscriptionToken {
            bus: Rc::downgrade(&self.inner),
            event: name.to_string(),
            id,
        }
    }

    /// Subscribes `handler` to `name`.
    pub fn on(
        &self,
        name: &str,
        handler: impl Fn(&[Value]) -> HandlerResult + 'static,
    ) -> SubscriptionToken {
        self.on_handler(name, Rc::new(handler))
    }

    /// Subscribes a shared handler to `name`. Registering the same handler twice yields two
    /// independent subscriptions.
    pub fn on_handler(&self, name: &str, handler: EventHandler) -> SubscriptionToken {
        let id = self.inner.borrow_mut().insert(name, handler, false);
        self.token(name, id)
    }

    /// Subscribes `handler` to the next delivery of `name` only.
    pub fn once(
        &self,
        name: &str,
        handler: impl Fn(&[Value]) -> HandlerResult + 'static,
    ) -> SubscriptionToken {
        self.once_handler(name, Rc::new(handler))
    }

    /// Subscribes a shared handler to the next delivery of `name` only.
    pub fn once_handler(&self, name: &str, handler: EventHandler) -> SubscriptionToken {
        let id = self.inner.borrow_mut().insert(name, handler, true);
        self.token(name, id)
    }

    /// Removes the oldest subscription of `handler` to `name`. Returns `false` when none matched.
    pub fn off(&self, name: &str, handler: &EventHandler) -> bool {
        self.inner
            .borrow_mut()
            .remove_where(name, |sub| Rc::ptr_eq(&sub.handler, handler))
    }

    /// Number of live subscriptions for `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.inner.borrow().topics.get(name).map_or(0, Vec::len)
    }

    /// Delivers `args` to every current subscriber of `name`, in registration order.
    ///
    /// Subscriptions made while delivering are not invoked by this call; subscriptions removed
    /// before their turn are skipped. A `once` subscription is removed right before it runs, so
    /// it stays removed even when its handler fails. Never fails.
    pub fn fire(&self, name: &str, args: &[Value]) {
        let snapshot: Vec<(u64, EventHandler, bool)> = {
            let state = self.inner.borrow();
            let Some(subscribers) = state.topics.get(name) else {
                return;
            };
            subscribers
                .iter()
                .map(|sub| (sub.id, sub.handler.clone(), sub.once))
                .collect()
        };

        for (id, handler, once) in snapshot {
            {
                let mut state = self.inner.borrow_mut();
                if !state.contains(name, id) {
                    continue;
                }
                if once {
                    state.remove_where(name, |sub| sub.id == id);
                }
            }
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(args)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(message)) => message,
                Err(panic) => panic_message(panic.as_ref()),
            };
            self.reporter.report(&SubscriberFailure {
                event: name.to_string(),
                subscription: id,
                message,
            });
        }
    }

    /// Serializes `payload` and fires it as the single argument of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when `payload` cannot be serialized to JSON; nothing is fired then.
    pub fn fire_json<T: Serialize>(&self, name: &str, payload: &T) -> Result<(), String> {
        let value = serde_json::to_value(payload).map_err(|e| e.to_string())?;
        self.fire(name, &[value]);
        Ok(())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "subscriber panicked".to_string()
    }
}

thread_local! {
    static GLOBAL_EVENT_BUS: EventBus = EventBus::default();
}

/// Returns the process-wide event bus.
pub fn event_bus() -> EventBus {
    GLOBAL_EVENT_BUS.with(|bus| bus.clone())
}
