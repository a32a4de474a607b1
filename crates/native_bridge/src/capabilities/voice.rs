//! Voice chat capability contract.

use serde::{Deserialize, Serialize};

use super::{CapabilityFuture, CapabilityService};
use crate::host::{CapabilityError, CapabilityId};

/// Host object serving voice chat.
pub const VOICE_OBJECT: &str = "OriginVoice";

/// Event-name domain for relayed voice signals.
pub const VOICE_EVENT_DOMAIN: &str = "voice";

/// Host signals relayed onto the event bus by the native voice adapter.
pub const VOICE_SIGNALS: [&str; 5] = [
    "deviceAdded",
    "deviceRemoved",
    "voiceLevel",
    "voiceConnected",
    "voiceDisconnected",
];

/// Audio capture device reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDevice {
    /// Host device identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the host currently uses this device by default.
    #[serde(default)]
    pub is_default: bool,
}

/// Voice chat operations.
pub trait VoiceService: CapabilityService {
    /// Joins the voice channel identified by `channel_id`.
    fn join_channel<'a>(
        &'a self,
        channel_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>>;

    /// Leaves the current voice channel.
    fn leave_channel<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>>;

    /// Mutes or unmutes the local microphone.
    fn set_muted<'a>(&'a self, muted: bool) -> CapabilityFuture<'a, Result<(), CapabilityError>>;

    /// Lists audio capture devices.
    fn audio_input_devices<'a>(
        &'a self,
    ) -> CapabilityFuture<'a, Result<Vec<VoiceDevice>, CapabilityError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Voice service for environments that cannot capture audio.
pub struct NoopVoiceService;

impl CapabilityService for NoopVoiceService {
    fn capability(&self) -> CapabilityId {
        CapabilityId::Voice
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Ok(()) })
    }

    fn is_supported(&self) -> bool {
        false
    }
}

impl VoiceService for NoopVoiceService {
    fn join_channel<'a>(
        &'a self,
        _channel_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Err(CapabilityError::unavailable(CapabilityId::Voice)) })
    }

    fn leave_channel<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Err(CapabilityError::unavailable(CapabilityId::Voice)) })
    }

    fn set_muted<'a>(&'a self, _muted: bool) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Err(CapabilityError::unavailable(CapabilityId::Voice)) })
    }

    fn audio_input_devices<'a>(
        &'a self,
    ) -> CapabilityFuture<'a, Result<Vec<VoiceDevice>, CapabilityError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
