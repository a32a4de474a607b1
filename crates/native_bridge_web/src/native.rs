//! Shared plumbing for adapters backed by a host object.

use std::{cell::RefCell, rc::Rc};

use native_bridge::{
    client_event_name, CapabilityError, CapabilityFuture, CapabilityId, NativeBridge,
    RemoteObjectHandle,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Static description of the host object behind one capability.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HostObjectInfo {
    pub capability: CapabilityId,
    pub object: &'static str,
    pub domain: &'static str,
    pub signals: &'static [&'static str],
}

struct NativeObjectInner {
    info: HostObjectInfo,
    bridge: NativeBridge,
    handle: RefCell<Option<RemoteObjectHandle>>,
}

/// Lazily resolved host object whose signals are relayed onto the bridge's event bus.
#[derive(Clone)]
pub(crate) struct NativeObject {
    inner: Rc<NativeObjectInner>,
}

impl std::fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeObject")
            .field("object", &self.inner.info.object)
            .field("resolved", &self.inner.handle.borrow().is_some())
            .finish()
    }
}

impl NativeObject {
    pub fn new(bridge: NativeBridge, info: HostObjectInfo) -> Self {
        Self {
            inner: Rc::new(NativeObjectInner {
                info,
                bridge,
                handle: RefCell::new(None),
            }),
        }
    }

    pub fn capability(&self) -> CapabilityId {
        self.inner.info.capability
    }

    /// Resolved handle, if [`Self::resolve`] has completed.
    pub fn handle(&self) -> Option<RemoteObjectHandle> {
        self.inner.handle.borrow().clone()
    }

    /// Presence of the resolved handle, or host reachability before resolution.
    pub fn is_supported(&self) -> bool {
        match self.inner.handle.borrow().as_ref() {
            Some(handle) => handle.is_present() && self.inner.bridge.has_host(),
            None => self.inner.bridge.has_host(),
        }
    }

    /// Registers the object and binds its signals exactly once.
    pub async fn resolve(&self) -> RemoteObjectHandle {
        if let Some(handle) = self.handle() {
            return handle;
        }

        let handle = self.inner.bridge.register(self.inner.info.object).await;

        // A concurrent resolve may have finished first; its bindings already exist.
        if let Some(existing) = self.handle() {
            return existing;
        }
        let info = self.inner.info;
        for signal in info.signals {
            handle.bind_signal_to_event(signal, &client_event_name(info.domain, signal));
        }
        tracing::debug!(
            object = info.object,
            present = handle.is_present(),
            "capability object resolved"
        );
        *self.inner.handle.borrow_mut() = Some(handle.clone());
        handle
    }

    pub fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            let handle = self.resolve().await;
            if handle.is_present() {
                Ok(())
            } else {
                Err(CapabilityError::unavailable(self.capability()))
            }
        })
    }

    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, CapabilityError> {
        let handle = self.resolve().await;
        handle
            .invoke(method, args)
            .await
            .map_err(|err| CapabilityError::bridge(self.capability(), err))
    }

    pub async fn call_as<T: DeserializeOwned + 'static>(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<T, CapabilityError> {
        let handle = self.resolve().await;
        handle
            .invoke_as(method, args)
            .await
            .map_err(|err| CapabilityError::bridge(self.capability(), err))
    }
}
