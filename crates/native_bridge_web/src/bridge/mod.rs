//! Host discovery and the web-channel transport.
//!
//! [`connect_web_bridge`] probes the page for the configured host global once. When it is found
//! the bridge is wired to a [`WebChannelTransport`] and the channel is opened in the background,
//! driving the connection tracker; otherwise a host-less bridge is returned.

mod interop;

use std::{future::Future, rc::Rc};

use native_bridge::{
    event_bus, install_bridge, installed_bridge, BridgeConfig, BridgeError, ConnectionTracker,
    EventBus, HostFuture, HostTransport, NativeBridge, SignalRelay,
};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
/// [`HostTransport`] over the page's web channel.
pub struct WebChannelTransport;

impl HostTransport for WebChannelTransport {
    fn object_exists(&self, object: &str) -> bool {
        interop::object_exists(object)
    }

    fn invoke(
        &self,
        object: &str,
        method: &str,
        args: Vec<Value>,
    ) -> HostFuture<Result<Value, String>> {
        let object = object.to_string();
        let method = method.to_string();
        Box::pin(async move { interop::invoke(&object, &method, args).await })
    }

    fn connect_signal(&self, object: &str, signal: &str, relay: SignalRelay) -> Result<(), String> {
        interop::connect_signal(object, signal, relay)
    }
}

/// Returns whether the page exposes the host global named in `config`.
pub fn host_detected(config: &BridgeConfig) -> bool {
    interop::host_global_present(&config.host_global)
}

/// Drives `tracker` through the channel handshake `open`.
///
/// Success marks the tracker connected; failure is treated as the host disappearing.
pub async fn drive_connection(
    tracker: ConnectionTracker,
    open: impl Future<Output = Result<(), String>>,
) {
    tracker.mark_connecting();
    match open.await {
        Ok(()) => tracker.mark_connected(),
        Err(err) => {
            tracing::warn!(error = %err, "web channel failed to open");
            tracker.mark_host_lost();
        }
    }
}

/// Builds the bridge for this page, opening the web channel when a host global is present.
pub fn connect_web_bridge(bus: EventBus, config: BridgeConfig) -> NativeBridge {
    if !host_detected(&config) {
        tracing::debug!(global = %config.host_global, "no native host global found");
        return NativeBridge::without_host(bus, config);
    }

    let tracker = ConnectionTracker::with_host();
    let global = config.host_global.clone();
    let bridge = NativeBridge::new(Rc::new(WebChannelTransport), tracker.clone(), bus, config);
    interop::spawn(async move {
        drive_connection(tracker, async move { interop::open_channel(&global).await }).await;
    });
    bridge
}

/// Connects the page bridge on the process-wide event bus and installs it for
/// [`native_bridge::bridge`].
///
/// # Errors
///
/// Returns [`BridgeError::AlreadyInstalled`] when a bridge was already installed or lazily
/// created.
pub fn install_web_bridge(config: BridgeConfig) -> Result<NativeBridge, BridgeError> {
    let bridge = connect_web_bridge(event_bus(), config);
    install_bridge(bridge.clone())?;
    Ok(bridge)
}

/// Returns the installed bridge, probing the page and installing one with the default
/// configuration on first use.
pub fn web_bridge() -> NativeBridge {
    if let Some(bridge) = installed_bridge() {
        return bridge;
    }
    let bridge = connect_web_bridge(event_bus(), BridgeConfig::default());
    match install_bridge(bridge.clone()) {
        Ok(()) => bridge,
        Err(err) => {
            tracing::debug!(error = %err, "keeping the bridge installed first");
            installed_bridge().unwrap_or(bridge)
        }
    }
}
