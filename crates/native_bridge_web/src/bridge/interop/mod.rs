//! Web-channel interop with the native host.
//!
//! Calls are routed to target-specific implementations behind one uniform API. Non-wasm builds
//! never see a host global, so everything above this module takes the fallback path there.

use native_bridge::SignalRelay;
use serde_json::Value;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

/// Returns whether the page exposes the global `name` (the host integration point).
pub fn host_global_present(name: &str) -> bool {
    imp::host_global_present(name)
}

/// Opens the web channel through the host global `name`; resolves once the host objects are
/// enumerable.
pub async fn open_channel(name: &str) -> Result<(), String> {
    imp::open_channel(name).await
}

/// Runs `task` on the page's event loop.
pub fn spawn(task: impl std::future::Future<Output = ()> + 'static) {
    imp::spawn(task)
}

pub fn object_exists(object: &str) -> bool {
    imp::object_exists(object)
}

pub async fn invoke(object: &str, method: &str, args: Vec<Value>) -> Result<Value, String> {
    imp::invoke(object, method, args).await
}

pub fn connect_signal(object: &str, signal: &str, relay: SignalRelay) -> Result<(), String> {
    imp::connect_signal(object, signal, relay)
}
