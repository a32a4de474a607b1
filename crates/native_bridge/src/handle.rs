//! Local proxy for one named host-side object.

use std::{
    cell::{Cell, RefCell},
    fmt,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    connection::ConnectionTracker,
    error::BridgeError,
    event_bus::EventBus,
    transport::{HostTransport, SignalRelay},
};

/// Object-safe boxed future returned by [`RemoteObjectHandle::invoke`].
pub type InvokeFuture<T> = Pin<Box<dyn Future<Output = Result<T, BridgeError>>>>;

/// Identifier of one signal-to-event binding on a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

struct SignalBinding {
    id: BindingId,
    signal: String,
    event: String,
    active: Rc<Cell<bool>>,
    attached: bool,
}

struct HandleInner {
    name: String,
    present: Cell<bool>,
    bindings: RefCell<Vec<SignalBinding>>,
    next_binding: Cell<u64>,
    transport: Rc<dyn HostTransport>,
    tracker: ConnectionTracker,
    bus: EventBus,
}

/// Handle to a host object, shared by every caller that registered the same name.
#[derive(Clone)]
pub struct RemoteObjectHandle {
    inner: Rc<HandleInner>,
}

impl fmt::Debug for RemoteObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteObjectHandle")
            .field("name", &self.inner.name)
            .field("present", &self.inner.present.get())
            .field("bindings", &self.inner.bindings.borrow().len())
            .finish()
    }
}

impl RemoteObjectHandle {
    pub(crate) fn new(
        name: &str,
        present: bool,
        transport: Rc<dyn HostTransport>,
        tracker: ConnectionTracker,
        bus: EventBus,
    ) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                name: name.to_string(),
                present: Cell::new(present),
                bindings: RefCell::new(Vec::new()),
                next_binding: Cell::new(0),
                transport,
                tracker,
                bus,
            }),
        }
    }

    /// Symbolic name of the host object.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the host confirmed that the object exists.
    pub fn is_present(&self) -> bool {
        self.inner.present.get()
    }

    /// Returns whether both values refer to the same handle instance.
    pub fn same_handle(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Calls `method` on the host object.
    ///
    /// Absence of the host or the object is reported through the returned future, never
    /// synchronously.
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> InvokeFuture<Value> {
        if !self.inner.tracker.has_host() {
            return Box::pin(futures::future::ready(Err(BridgeError::HostAbsent)));
        }
        if !self.is_present() {
            return Box::pin(futures::future::ready(Err(BridgeError::ObjectNotPresent {
                object: self.inner.name.clone(),
            })));
        }

        let object = self.inner.name.clone();
        let method = method.to_string();
        let reply = self.inner.transport.invoke(&object, &method, args);
        Box::pin(async move {
            reply.await.map_err(|detail| BridgeError::Invocation {
                object,
                method,
                detail,
            })
        })
    }

    /// Calls `method` and deserializes the reply into `T`.
    pub fn invoke_as<T: DeserializeOwned + 'static>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> InvokeFuture<T> {
        let object = self.inner.name.clone();
        let method_name = method.to_string();
        let reply = self.invoke(method, args);
        Box::pin(async move {
            let value = reply.await?;
            serde_json::from_value(value).map_err(|e| BridgeError::Decode {
                object,
                method: method_name,
                detail: e.to_string(),
            })
        })
    }

    /// Relays every host emission of `signal` to [`EventBus::fire`] as `event`.
    ///
    /// The binding is recorded even when the object is not present; the host listener is attached
    /// once presence is confirmed (see [`Self::refresh_presence`]).
    pub fn bind_signal_to_event(&self, signal: &str, event: &str) -> BindingId {
        let id = BindingId(self.inner.next_binding.get());
        self.inner.next_binding.set(id.0 + 1);
        self.inner.bindings.borrow_mut().push(SignalBinding {
            id,
            signal: signal.to_string(),
            event: event.to_string(),
            active: Rc::new(Cell::new(true)),
            attached: false,
        });

        if self.is_present() {
            self.attach_pending_bindings();
        }
        id
    }

    /// Stops local delivery for a binding. Returns `false` for unknown ids.
    pub fn unbind(&self, id: BindingId) -> bool {
        let mut bindings = self.inner.bindings.borrow_mut();
        let Some(index) = bindings.iter().position(|binding| binding.id == id) else {
            return false;
        };
        let binding = bindings.remove(index);
        binding.active.set(false);
        true
    }

    /// Active bindings as `(signal, event)` pairs, in binding order.
    pub fn bindings(&self) -> Vec<(String, String)> {
        self.inner
            .bindings
            .borrow()
            .iter()
            .map(|binding| (binding.signal.clone(), binding.event.clone()))
            .collect()
    }

    /// Number of bindings whose host listener is attached.
    pub fn attached_count(&self) -> usize {
        self.inner
            .bindings
            .borrow()
            .iter()
            .filter(|binding| binding.attached)
            .count()
    }

    /// Re-queries the host for the object and attaches deferred bindings once it appears.
    ///
    /// Returns the presence flag after the refresh.
    pub fn refresh_presence(&self) -> bool {
        if self.is_present() {
            return true;
        }
        if !self.inner.tracker.is_connected() {
            return false;
        }
        if self.inner.transport.object_exists(&self.inner.name) {
            self.inner.present.set(true);
            self.attach_pending_bindings();
        }
        self.is_present()
    }

    fn attach_pending_bindings(&self) {
        let pending: Vec<(BindingId, String, SignalRelay)> = self
            .inner
            .bindings
            .borrow()
            .iter()
            .filter(|binding| !binding.attached)
            .map(|binding| (binding.id, binding.signal.clone(), self.relay_for(binding)))
            .collect();

        for (id, signal, relay) in pending {
            match self
                .inner
                .transport
                .connect_signal(&self.inner.name, &signal, relay)
            {
                Ok(()) => {
                    if let Some(binding) = self
                        .inner
                        .bindings
                        .borrow_mut()
                        .iter_mut()
                        .find(|binding| binding.id == id)
                    {
                        binding.attached = true;
                    }
                }
                Err(err) => tracing::warn!(
                    object = %self.inner.name,
                    signal = %signal,
                    error = %err,
                    "failed to attach signal relay"
                ),
            }
        }
    }

    fn relay_for(&self, binding: &SignalBinding) -> SignalRelay {
        let bus = self.inner.bus.clone();
        let event = binding.event.clone();
        let active = binding.active.clone();
        Rc::new(move |args: &[Value]| {
            if active.get() {
                bus.fire(&event, args);
            }
        })
    }
}
