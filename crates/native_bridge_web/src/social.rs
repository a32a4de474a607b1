//! Social UI adapters for hosted and standalone pages.

use native_bridge::{
    client_event_name, CapabilityError, CapabilityFuture, CapabilityId, CapabilityService,
    EventBus, NativeBridge, SocialUiService, FOCUS_FRIENDS_LIST_SIGNAL, SHOW_CHAT_WINDOW_SIGNAL,
    SOCIAL_EVENT_DOMAIN, SOCIAL_OBJECT, SOCIAL_SIGNALS,
};
use serde_json::{json, Value};

use crate::native::{HostObjectInfo, NativeObject};

const HOST_OBJECT: HostObjectInfo = HostObjectInfo {
    capability: CapabilityId::Social,
    object: SOCIAL_OBJECT,
    domain: SOCIAL_EVENT_DOMAIN,
    signals: &SOCIAL_SIGNALS,
};

#[derive(Debug, Clone)]
/// Social UI service calling `OriginSocialUIManager` on the native host.
///
/// The host answers by emitting `focusOnFriendsList` / `showChatWindowForFriend`, which arrive as
/// `CLIENT_SOCIAL_*` events.
pub struct NativeSocialUiService {
    object: NativeObject,
}

impl NativeSocialUiService {
    /// Creates the adapter. The host object is resolved on first use.
    pub fn new(bridge: NativeBridge) -> Self {
        Self {
            object: NativeObject::new(bridge, HOST_OBJECT),
        }
    }
}

impl CapabilityService for NativeSocialUiService {
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

impl SocialUiService for NativeSocialUiService {
    fn show_friends_list<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.object
                .call("showFriendsList", Vec::new())
                .await
                .map(|_| ())
        })
    }

    fn show_chat_window<'a>(
        &'a self,
        friend_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.object
                .call("showChatWindow", vec![json!(friend_id)])
                .await
                .map(|_| ())
        })
    }
}

#[derive(Debug, Clone)]
/// Standalone social UI that fires the same `CLIENT_SOCIAL_*` events the host would.
pub struct WebSocialUiService {
    bus: EventBus,
}

impl WebSocialUiService {
    /// Creates a service publishing on `bus`.
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    fn publish(&self, signal: &str, args: &[Value]) {
        self.bus
            .fire(&client_event_name(SOCIAL_EVENT_DOMAIN, signal), args);
    }
}

impl CapabilityService for WebSocialUiService {
    fn capability(&self) -> CapabilityId {
        CapabilityId::Social
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Ok(()) })
    }

    fn is_supported(&self) -> bool {
        true
    }
}

impl SocialUiService for WebSocialUiService {
    fn show_friends_list<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.publish(FOCUS_FRIENDS_LIST_SIGNAL, &[]);
            Ok(())
        })
    }

    fn show_chat_window<'a>(
        &'a self,
        friend_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async move {
            self.publish(SHOW_CHAT_WINDOW_SIGNAL, &[json!(friend_id)]);
            Ok(())
        })
    }
}
