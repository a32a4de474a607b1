//! Per-session bridge bundle and its process-local instance.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    config::BridgeConfig,
    connection::ConnectionTracker,
    error::BridgeError,
    event_bus::{event_bus, EventBus},
    host::HostStrategy,
    registry::{RegistrationFuture, RemoteObjectRegistry},
    transport::{HostTransport, NoopHostTransport},
};

#[derive(Clone)]
/// Tracker, event bus, registry and transport wired together for one page session.
pub struct NativeBridge {
    transport: Rc<dyn HostTransport>,
    tracker: ConnectionTracker,
    bus: EventBus,
    registry: RemoteObjectRegistry,
    config: Rc<BridgeConfig>,
}

impl fmt::Debug for NativeBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBridge")
            .field("tracker", &self.tracker)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

impl NativeBridge {
    /// Wires a bridge around an existing transport and tracker.
    pub fn new(
        transport: Rc<dyn HostTransport>,
        tracker: ConnectionTracker,
        bus: EventBus,
        config: BridgeConfig,
    ) -> Self {
        let registry = RemoteObjectRegistry::new(transport.clone(), tracker.clone(), bus.clone());
        Self {
            transport,
            tracker,
            bus,
            registry,
            config: Rc::new(config),
        }
    }

    /// Builds a bridge for pages running without a native host.
    pub fn without_host(bus: EventBus, config: BridgeConfig) -> Self {
        Self::new(
            Rc::new(NoopHostTransport),
            ConnectionTracker::without_host(),
            bus,
            config,
        )
    }

    /// Connection tracker driven by the host integration glue.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Event bus that receives relayed host signals.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Remote object registry for this session.
    pub fn registry(&self) -> &RemoteObjectRegistry {
        &self.registry
    }

    /// Channel to the host.
    pub fn transport(&self) -> Rc<dyn HostTransport> {
        self.transport.clone()
    }

    /// Configuration the bridge was built with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns whether a native host is currently reachable.
    pub fn has_host(&self) -> bool {
        self.tracker.has_host()
    }

    /// Strategy adapters should use given the host posture at this instant.
    pub fn strategy(&self) -> HostStrategy {
        if self.has_host() {
            HostStrategy::NativeBridge
        } else {
            HostStrategy::Fallback
        }
    }

    /// Shorthand for [`RemoteObjectRegistry::register`].
    pub fn register(&self, name: &str) -> RegistrationFuture {
        self.registry.register(name)
    }
}

thread_local! {
    static GLOBAL_BRIDGE: RefCell<Option<NativeBridge>> = const { RefCell::new(None) };
}

/// Installs `bridge` as the process-local instance returned by [`bridge`].
///
/// # Errors
///
/// Returns [`BridgeError::AlreadyInstalled`] when an instance was already installed or lazily
/// created by an earlier [`bridge`] call.
pub fn install_bridge(bridge: NativeBridge) -> Result<(), BridgeError> {
    GLOBAL_BRIDGE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(BridgeError::AlreadyInstalled);
        }
        tracing::debug!(strategy = bridge.strategy().as_str(), "bridge installed");
        *slot = Some(bridge);
        Ok(())
    })
}

/// Returns the installed process-local bridge without creating one.
pub fn installed_bridge() -> Option<NativeBridge> {
    GLOBAL_BRIDGE.with(|slot| slot.borrow().clone())
}

/// Returns the process-local bridge, creating a host-less one on first use.
///
/// Page integrations should install a probed bridge before anything calls this.
pub fn bridge() -> NativeBridge {
    GLOBAL_BRIDGE.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| NativeBridge::without_host(event_bus(), BridgeConfig::default()))
            .clone()
    })
}
