//! Host strategy and capability models shared by the bridge and its adapters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BridgeError;

/// Strategy chosen once per session for capability adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostStrategy {
    /// Adapters talk to host objects through the remote object registry.
    NativeBridge,
    /// Adapters use browser-only implementations.
    Fallback,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics and runtime inspection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NativeBridge => "native-bridge",
            Self::Fallback => "fallback",
        }
    }
}

/// Capability categories served by adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityId {
    /// Voice chat and audio device access.
    Voice,
    /// Chat message transport and presence.
    Chat,
    /// Social UI surfaces (friends list, chat windows).
    Social,
}

impl CapabilityId {
    /// Every capability, in a stable order.
    pub const ALL: [Self; 3] = [Self::Voice, Self::Chat, Self::Social];

    /// Returns a stable capability identifier used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Chat => "chat",
            Self::Social => "social",
        }
    }
}

/// Host availability state for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Capability is available.
    Available,
    /// Capability is not supported on the active host.
    Unavailable,
}

impl CapabilityStatus {
    /// Returns whether the capability can be used immediately.
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Typed error describing capability-level rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The active adapter does not support the capability.
    #[error("capability unavailable: {capability}")]
    Unavailable {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
    },
    /// The native bridge reported a failure.
    #[error("capability {capability} failed: {source}")]
    Bridge {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
        /// Underlying bridge failure.
        #[source]
        source: BridgeError,
    },
}

impl CapabilityError {
    /// Builds an [`CapabilityError::Unavailable`] for `capability`.
    pub const fn unavailable(capability: CapabilityId) -> Self {
        Self::Unavailable {
            capability: capability.as_str(),
        }
    }

    /// Wraps a bridge failure. Absence modes become [`CapabilityError::Unavailable`].
    pub fn bridge(capability: CapabilityId, source: BridgeError) -> Self {
        if source.is_unavailable() {
            return Self::unavailable(capability);
        }
        Self::Bridge {
            capability: capability.as_str(),
            source,
        }
    }

    /// Returns a stable capability label for diagnostics.
    pub const fn capability(&self) -> &'static str {
        match self {
            Self::Unavailable { capability } | Self::Bridge { capability, .. } => capability,
        }
    }
}

/// Capability snapshot exposed to UI code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Voice chat availability.
    pub voice: CapabilityStatus,
    /// Chat transport availability.
    pub chat: CapabilityStatus,
    /// Social UI availability.
    pub social: CapabilityStatus,
}

impl HostCapabilities {
    /// Posture when no host is present.
    pub const fn fallback() -> Self {
        Self {
            voice: CapabilityStatus::Unavailable,
            chat: CapabilityStatus::Unavailable,
            social: CapabilityStatus::Available,
        }
    }

    /// Returns the status of one capability.
    pub const fn status(&self, capability: CapabilityId) -> CapabilityStatus {
        match capability {
            CapabilityId::Voice => self.voice,
            CapabilityId::Chat => self.chat,
            CapabilityId::Social => self.social,
        }
    }

    /// Replaces the status of one capability.
    pub fn set_status(&mut self, capability: CapabilityId, status: CapabilityStatus) {
        match capability {
            CapabilityId::Voice => self.voice = status,
            CapabilityId::Chat => self.chat = status,
            CapabilityId::Social => self.social = status,
        }
    }
}
