//! Name-keyed registry of remote object handles.
//!
//! Requests made before the channel connects are parked as pending registrations (one per name)
//! and resolved in a single batch, in first-request order, when the tracker reports
//! [`ConnectionState::Connected`](crate::ConnectionState::Connected). Every name maps to exactly
//! one handle for the lifetime of the registry.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    future::Future,
    pin::Pin,
    rc::{Rc, Weak},
};

use futures::{
    channel::oneshot,
    future::{FutureExt, Shared},
};

use crate::{
    connection::ConnectionTracker, event_bus::EventBus, handle::RemoteObjectHandle,
    transport::HostTransport,
};

/// Object-safe boxed future returned by [`RemoteObjectRegistry::register`].
pub type RegistrationFuture = Pin<Box<dyn Future<Output = RemoteObjectHandle>>>;

type SharedHandle = Shared<oneshot::Receiver<RemoteObjectHandle>>;

struct PendingRegistration {
    name: String,
    sender: oneshot::Sender<RemoteObjectHandle>,
    shared: SharedHandle,
}

#[derive(Default)]
struct RegistryState {
    handles: HashMap<String, RemoteObjectHandle>,
    pending: Vec<PendingRegistration>,
}

struct RegistryInner {
    state: RefCell<RegistryState>,
    transport: Rc<dyn HostTransport>,
    tracker: ConnectionTracker,
    bus: EventBus,
}

impl RegistryInner {
    fn build(&self, name: &str, present: bool) -> RemoteObjectHandle {
        RemoteObjectHandle::new(
            name,
            present,
            self.transport.clone(),
            self.tracker.clone(),
            self.bus.clone(),
        )
    }

    /// Caches a handle for `name` unless one already exists, returning the cached one.
    fn cache(&self, name: &str, present: bool) -> RemoteObjectHandle {
        if let Some(handle) = self.state.borrow().handles.get(name) {
            return handle.clone();
        }
        let handle = self.build(name, present);
        self.state
            .borrow_mut()
            .handles
            .insert(name.to_string(), handle.clone());
        handle
    }

    fn resolve_pending(&self, host_available: bool) {
        let pending = std::mem::take(&mut self.state.borrow_mut().pending);
        if pending.is_empty() {
            return;
        }
        tracing::debug!(
            count = pending.len(),
            host_available,
            "resolving pending registrations"
        );

        for registration in pending {
            let present = host_available && self.transport.object_exists(&registration.name);
            let handle = self.cache(&registration.name, present);
            let _ = registration.sender.send(handle);
        }
    }
}

/// Registry of [`RemoteObjectHandle`]s keyed by host object name. Clones share the same cache.
#[derive(Clone)]
pub struct RemoteObjectRegistry {
    inner: Rc<RegistryInner>,
}

impl fmt::Debug for RemoteObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("RemoteObjectRegistry")
            .field("handles", &state.handles.len())
            .field("pending", &state.pending.len())
            .field("tracker", &self.inner.tracker)
            .finish()
    }
}

impl RemoteObjectRegistry {
    /// Creates a registry whose pending registrations resolve when `tracker` connects.
    pub fn new(
        transport: Rc<dyn HostTransport>,
        tracker: ConnectionTracker,
        bus: EventBus,
    ) -> Self {
        let inner = Rc::new(RegistryInner {
            state: RefCell::new(RegistryState::default()),
            transport,
            tracker: tracker.clone(),
            bus,
        });

        let on_connect: Weak<RegistryInner> = Rc::downgrade(&inner);
        tracker.on_connected(move || {
            if let Some(inner) = on_connect.upgrade() {
                inner.resolve_pending(true);
            }
        });
        let on_lost: Weak<RegistryInner> = Rc::downgrade(&inner);
        tracker.on_host_lost(move || {
            if let Some(inner) = on_lost.upgrade() {
                inner.resolve_pending(false);
            }
        });

        Self { inner }
    }

    /// Returns the handle for `name`.
    ///
    /// Resolves immediately when there is no host (presence false) or the channel is already
    /// connected; otherwise resolves when the channel connects. Concurrent requests for the same
    /// name share one pending resolution and one handle.
    pub fn register(&self, name: &str) -> RegistrationFuture {
        if let Some(handle) = self.cached(name) {
            return Box::pin(futures::future::ready(handle));
        }

        let tracker = &self.inner.tracker;
        if !tracker.has_host() {
            return Box::pin(futures::future::ready(self.inner.cache(name, false)));
        }
        if tracker.is_connected() {
            let present = self.inner.transport.object_exists(name);
            return Box::pin(futures::future::ready(self.inner.cache(name, present)));
        }

        let shared = {
            let mut state = self.inner.state.borrow_mut();
            let existing = state
                .pending
                .iter()
                .find(|pending| pending.name == name)
                .map(|pending| pending.shared.clone());
            match existing {
                Some(shared) => shared,
                None => {
                    let (sender, receiver) = oneshot::channel();
                    let shared = receiver.shared();
                    state.pending.push(PendingRegistration {
                        name: name.to_string(),
                        sender,
                        shared: shared.clone(),
                    });
                    tracing::debug!(object = name, "registration pending until connected");
                    shared
                }
            }
        };

        Box::pin(async move {
            match shared.await {
                Ok(handle) => handle,
                Err(_) => futures::future::pending().await,
            }
        })
    }

    /// Returns the cached handle for `name`, if it was already resolved.
    pub fn cached(&self, name: &str) -> Option<RemoteObjectHandle> {
        self.inner.state.borrow().handles.get(name).cloned()
    }

    /// Names waiting for the connection, in request order.
    pub fn pending_names(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .pending
            .iter()
            .map(|pending| pending.name.clone())
            .collect()
    }

    /// Number of resolved handles.
    pub fn len(&self) -> usize {
        self.inner.state.borrow().handles.len()
    }

    /// Returns whether no handle has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tracker gating this registry.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.inner.tracker
    }
}
