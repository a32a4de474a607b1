//! Voice capability adapter backed by the host's voice object.

use native_bridge::{
    CapabilityError, CapabilityFuture, CapabilityId, CapabilityService, NativeBridge, VoiceDevice,
    VoiceService, VOICE_EVENT_DOMAIN, VOICE_OBJECT, VOICE_SIGNALS,
};
use serde_json::json;

use crate::native::{HostObjectInfo, NativeObject};

const HOST_OBJECT: HostObjectInfo = HostObjectInfo {
    capability: CapabilityId::Voice,
    object: VOICE_OBJECT,
    domain: VOICE_EVENT_DOMAIN,
    signals: &VOICE_SIGNALS,
};

#[derive(Debug, Clone)]
/// Voice service calling `OriginVoice` on the native host.
///
/// Device and connection signals are relayed as `CLIENT_VOICE_*` events.
pub struct NativeVoiceService {
    object: NativeObject,
}

impl NativeVoiceService {
    /// Creates the adapter. The host object is resolved on first use.
    pub fn new(bridge: NativeBridge) -> Self {
        Self {
            object: NativeObject::new(bridge, HOST_OBJECT),
        }
    }
}

impl CapabilityService for NativeVoiceService {
    fn capability(&self) -> CapabilityId {
        self.object.capability()
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        self.object.init()
    }

    fn is_supported(&self) -> bool {
        self.object.is_supported()
    }
}

impl VoiceService for NativeVoiceService {
    fn join_channel<'a>(
        &'a self,
        channel_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.object
                .call("joinChannel", vec![json!(channel_id)])
                .await
                .map(|_| ())
        })
    }

    fn leave_channel<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.object
                .call("leaveChannel", Vec::new())
                .await
                .map(|_| ())
        })
    }

    fn set_muted<'a>(&'a self, muted: bool) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.object
                .call("setMuted", vec![json!(muted)])
                .await
                .map(|_| ())
        })
    }

    fn audio_input_devices<'a>(
        &'a self,
    ) -> CapabilityFuture<'a, Result<Vec<VoiceDevice>, CapabilityError>> {
        Box::pin(async move { self.object.call_as("audioInputDevices", Vec::new()).await })
    }
}
