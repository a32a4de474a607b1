//! In-process host transport used by tests and by embedders that host objects in Rust.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use futures::channel::oneshot;
use serde_json::Value;

use super::{HostFuture, HostTransport, SignalRelay};

/// Method implementation registered on a [`MemoryHostTransport`] object.
pub type MemoryMethod = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

type ParkedReply = (Result<Value, String>, oneshot::Sender<Result<Value, String>>);

#[derive(Default)]
struct MemoryObject {
    methods: HashMap<String, MemoryMethod>,
    signals: HashMap<String, Vec<SignalRelay>>,
}

#[derive(Default)]
struct MemoryHostState {
    objects: HashMap<String, MemoryObject>,
    existence_queries: Vec<String>,
    calls: Vec<(String, String, Vec<Value>)>,
    deferred: bool,
    parked: Vec<ParkedReply>,
}

#[derive(Clone, Default)]
/// In-memory host exposing named objects, methods and signals.
///
/// Replies are delivered immediately unless [`Self::set_deferred`] parks them until
/// [`Self::release_deferred`], which models a host that answers on a later turn.
pub struct MemoryHostTransport {
    inner: Rc<RefCell<MemoryHostState>>,
}

impl MemoryHostTransport {
    /// Creates a host with no objects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exposes an object called `object`.
    pub fn add_object(&self, object: &str) {
        self.inner
            .borrow_mut()
            .objects
            .entry(object.to_string())
            .or_default();
    }

    /// Removes `object` together with its methods and signal relays.
    pub fn remove_object(&self, object: &str) {
        self.inner.borrow_mut().objects.remove(object);
    }

    /// Registers `method` on `object`, exposing the object if needed.
    pub fn add_method(
        &self,
        object: &str,
        method: &str,
        implementation: impl Fn(&[Value]) -> Result<Value, String> + 'static,
    ) {
        self.inner
            .borrow_mut()
            .objects
            .entry(object.to_string())
            .or_default()
            .methods
            .insert(method.to_string(), Rc::new(implementation));
    }

    /// Fires `signal` on `object`, calling every connected relay in connection order.
    ///
    /// Returns the number of relays called.
    pub fn emit_signal(&self, object: &str, signal: &str, args: &[Value]) -> usize {
        let relays = self
            .inner
            .borrow()
            .objects
            .get(object)
            .and_then(|entry| entry.signals.get(signal))
            .cloned()
            .unwrap_or_default();
        for relay in &relays {
            relay(args);
        }
        relays.len()
    }

    /// Number of relays connected to `signal` on `object`.
    pub fn relay_count(&self, object: &str, signal: &str) -> usize {
        self.inner
            .borrow()
            .objects
            .get(object)
            .and_then(|entry| entry.signals.get(signal))
            .map_or(0, Vec::len)
    }

    /// Object names passed to [`HostTransport::object_exists`], in query order.
    pub fn existence_queries(&self) -> Vec<String> {
        self.inner.borrow().existence_queries.clone()
    }

    /// Calls received so far as `(object, method, args)`.
    pub fn calls(&self) -> Vec<(String, String, Vec<Value>)> {
        self.inner.borrow().calls.clone()
    }

    /// Parks replies instead of delivering them immediately.
    pub fn set_deferred(&self, deferred: bool) {
        self.inner.borrow_mut().deferred = deferred;
    }

    /// Delivers every parked reply in call order. Returns the number delivered.
    pub fn release_deferred(&self) -> usize {
        let parked = std::mem::take(&mut self.inner.borrow_mut().parked);
        let released = parked.len();
        for (reply, sender) in parked {
            let _ = sender.send(reply);
        }
        released
    }

    fn execute(&self, object: &str, method: &str, args: &[Value]) -> Result<Value, String> {
        let implementation = {
            let state = self.inner.borrow();
            let entry = state
                .objects
                .get(object)
                .ok_or_else(|| format!("unknown object `{object}`"))?;
            entry
                .methods
                .get(method)
                .cloned()
                .ok_or_else(|| format!("unknown method `{object}.{method}`"))?
        };
        implementation(args)
    }
}

impl HostTransport for MemoryHostTransport {
    fn object_exists(&self, object: &str) -> bool {
        let mut state = self.inner.borrow_mut();
        state.existence_queries.push(object.to_string());
        state.objects.contains_key(object)
    }

    fn invoke(
        &self,
        object: &str,
        method: &str,
        args: Vec<Value>,
    ) -> HostFuture<Result<Value, String>> {
        let reply = self.execute(object, method, &args);
        let mut state = self.inner.borrow_mut();
        state
            .calls
            .push((object.to_string(), method.to_string(), args));
        if !state.deferred {
            return Box::pin(futures::future::ready(reply));
        }

        let (sender, receiver) = oneshot::channel();
        state.parked.push((reply, sender));
        Box::pin(async move {
            receiver
                .await
                .unwrap_or_else(|_| Err("host dropped the call".to_string()))
        })
    }

    fn connect_signal(&self, object: &str, signal: &str, relay: SignalRelay) -> Result<(), String> {
        let mut state = self.inner.borrow_mut();
        let entry = state
            .objects
            .get_mut(object)
            .ok_or_else(|| format!("unknown object `{object}`"))?;
        entry
            .signals
            .entry(signal.to_string())
            .or_default()
            .push(relay);
        Ok(())
    }
}
