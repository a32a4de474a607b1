//! Capability service contracts implemented by native and fallback adapters.
//!
//! Each capability exposes the same trait surface regardless of which adapter backs it, so UI
//! code never branches on the host strategy.

pub mod chat;
pub mod social;
pub mod voice;

use std::{future::Future, pin::Pin};

use crate::host::{CapabilityError, CapabilityId};

/// Object-safe boxed future used by capability services.
pub type CapabilityFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Surface shared by every capability adapter.
pub trait CapabilityService {
    /// Capability category served by this adapter.
    fn capability(&self) -> CapabilityId;

    /// Prepares the adapter (resolves host objects, wires signal relays).
    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>>;

    /// Returns whether calls are expected to succeed. Never performs I/O.
    fn is_supported(&self) -> bool;
}

/// Builds the local event name a host signal is relayed to: `CLIENT_<DOMAIN>_<SIGNAL>`.
pub fn client_event_name(domain: &str, signal: &str) -> String {
    format!(
        "CLIENT_{}_{}",
        domain.to_ascii_uppercase(),
        signal.to_ascii_uppercase()
    )
}
