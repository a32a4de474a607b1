//! Chat capability adapter backed by the host's chat object.

use native_bridge::{
    CapabilityError, CapabilityFuture, CapabilityId, CapabilityService, ChatPresence,
    ChatTransport, NativeBridge, CHAT_EVENT_DOMAIN, CHAT_OBJECT, CHAT_SIGNALS,
};
use serde_json::json;

use crate::native::{HostObjectInfo, NativeObject};

const HOST_OBJECT: HostObjectInfo = HostObjectInfo {
    capability: CapabilityId::Chat,
    object: CHAT_OBJECT,
    domain: CHAT_EVENT_DOMAIN,
    signals: &CHAT_SIGNALS,
};

#[derive(Debug, Clone)]
/// Chat transport calling `OriginChat` on the native host.
pub struct NativeChatTransport {
    object: NativeObject,
}

impl NativeChatTransport {
    /// Creates the adapter. The host object is resolved on first use.
    pub fn new(bridge: NativeBridge) -> Self {
        Self {
            object: NativeObject::new(bridge, HOST_OBJECT),
        }
    }
}

impl CapabilityService for NativeChatTransport {
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

impl ChatTransport for NativeChatTransport {
    fn send_message<'a>(
        &'a self,
        to: &'a str,
        body: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            if body.trim().is_empty() {
                return Ok(());
            }
            self.object
                .call("sendMessage", vec![json!(to), json!(body)])
                .await
                .map(|_| ())
        })
    }

    fn set_presence<'a>(
        &'a self,
        presence: ChatPresence,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.object
                .call("setPresence", vec![json!(presence)])
                .await
                .map(|_| ())
        })
    }
}
