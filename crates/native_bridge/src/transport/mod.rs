//! Host transport contract and the built-in transports.
//!
//! A transport is the opaque channel to the native host. The bridge only relies on three
//! behaviors: an existence query per object name, call/response invocation, and one-directional
//! signal relays from host to bridge.

mod memory;

use std::{future::Future, pin::Pin, rc::Rc};

use serde_json::Value;

pub use memory::{MemoryHostTransport, MemoryMethod};

/// Object-safe boxed future used by [`HostTransport::invoke`].
pub type HostFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Callback the host side calls every time a connected signal fires.
pub type SignalRelay = Rc<dyn Fn(&[Value])>;

/// Channel to the native host process.
pub trait HostTransport {
    /// Returns whether the host currently exposes an object called `object`.
    fn object_exists(&self, object: &str) -> bool;

    /// Calls `method` on `object`. Exactly one response (success or host error) per call.
    fn invoke(
        &self,
        object: &str,
        method: &str,
        args: Vec<Value>,
    ) -> HostFuture<Result<Value, String>>;

    /// Attaches `relay` to `signal` on `object`.
    ///
    /// # Errors
    ///
    /// Returns an error when the object or signal does not exist on the host.
    fn connect_signal(&self, object: &str, signal: &str, relay: SignalRelay) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Transport for environments without a native host.
pub struct NoopHostTransport;

impl HostTransport for NoopHostTransport {
    fn object_exists(&self, _object: &str) -> bool {
        false
    }

    fn invoke(
        &self,
        _object: &str,
        _method: &str,
        _args: Vec<Value>,
    ) -> HostFuture<Result<Value, String>> {
        Box::pin(async { Err("no native host".to_string()) })
    }

    fn connect_signal(
        &self,
        _object: &str,
        _signal: &str,
        _relay: SignalRelay,
    ) -> Result<(), String> {
        Err("no native host".to_string())
    }
}
