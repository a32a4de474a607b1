use std::cell::RefCell;

use native_bridge::{
    CapabilityError, CapabilityFuture, CapabilityId, CapabilityService, CapabilityStatus,
    ChatPresence, ChatTransport, HostCapabilities, HostStrategy, NativeBridge, NoopChatTransport,
    NoopVoiceService, SocialUiService, VoiceDevice, VoiceService,
};

use crate::{
    web_bridge, NativeChatTransport, NativeSocialUiService, NativeVoiceService, WebSocialUiService,
};

/// Returns whether the `fallback-only` feature pins every capability to its fallback adapter.
pub const fn fallback_only() -> bool {
    cfg!(feature = "fallback-only")
}

/// Adapter enum that erases the concrete voice backend behind [`VoiceService`].
#[derive(Debug, Clone)]
pub enum VoiceAdapter {
    /// Host `OriginVoice` object.
    NativeBridge(NativeVoiceService),
    /// No audio capture available.
    Fallback(NoopVoiceService),
}

impl CapabilityService for VoiceAdapter {
    fn capability(&self) -> CapabilityId {
        CapabilityId::Voice
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.init(),
            Self::Fallback(service) => service.init(),
        }
    }

    fn is_supported(&self) -> bool {
        match self {
            Self::NativeBridge(service) => service.is_supported(),
            Self::Fallback(service) => service.is_supported(),
        }
    }
}

impl VoiceService for VoiceAdapter {
    fn join_channel<'a>(
        &'a self,
        channel_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.join_channel(channel_id),
            Self::Fallback(service) => service.join_channel(channel_id),
        }
    }

    fn leave_channel<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.leave_channel(),
            Self::Fallback(service) => service.leave_channel(),
        }
    }

    fn set_muted<'a>(&'a self, muted: bool) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.set_muted(muted),
            Self::Fallback(service) => service.set_muted(muted),
        }
    }

    fn audio_input_devices<'a>(
        &'a self,
    ) -> CapabilityFuture<'a, Result<Vec<VoiceDevice>, CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.audio_input_devices(),
            Self::Fallback(service) => service.audio_input_devices(),
        }
    }
}

/// Adapter enum that erases the concrete chat backend behind [`ChatTransport`].
#[derive(Debug, Clone)]
pub enum ChatAdapter {
    /// Host `OriginChat` object.
    NativeBridge(NativeChatTransport),
    /// No chat connection available.
    Fallback(NoopChatTransport),
}

impl CapabilityService for ChatAdapter {
    fn capability(&self) -> CapabilityId {
        CapabilityId::Chat
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(transport) => transport.init(),
            Self::Fallback(transport) => transport.init(),
        }
    }

    fn is_supported(&self) -> bool {
        match self {
            Self::NativeBridge(transport) => transport.is_supported(),
            Self::Fallback(transport) => transport.is_supported(),
        }
    }
}

impl ChatTransport for ChatAdapter {
    fn send_message<'a>(
        &'a self,
        to: &'a str,
        body: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(transport) => transport.send_message(to, body),
            Self::Fallback(transport) => transport.send_message(to, body),
        }
    }

    fn set_presence<'a>(
        &'a self,
        presence: ChatPresence,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(transport) => transport.set_presence(presence),
            Self::Fallback(transport) => transport.set_presence(presence),
        }
    }
}

/// Adapter enum that erases the concrete social UI backend behind [`SocialUiService`].
#[derive(Debug, Clone)]
pub enum SocialAdapter {
    /// Host `OriginSocialUIManager` object.
    NativeBridge(NativeSocialUiService),
    /// Page-local social UI publishing the same events.
    Fallback(WebSocialUiService),
}

impl CapabilityService for SocialAdapter {
    fn capability(&self) -> CapabilityId {
        CapabilityId::Social
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.init(),
            Self::Fallback(service) => service.init(),
        }
    }

    fn is_supported(&self) -> bool {
        match self {
            Self::NativeBridge(service) => service.is_supported(),
            Self::Fallback(service) => service.is_supported(),
        }
    }
}

impl SocialUiService for SocialAdapter {
    fn show_friends_list<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.show_friends_list(),
            Self::Fallback(service) => service.show_friends_list(),
        }
    }

    fn show_chat_window<'a>(
        &'a self,
        friend_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::NativeBridge(service) => service.show_chat_window(friend_id),
            Self::Fallback(service) => service.show_chat_window(friend_id),
        }
    }
}

/// Adapter for any capability, as returned by [`AdapterSelector::get_adapter`].
#[derive(Debug, Clone)]
pub enum CapabilityAdapter {
    /// Voice adapter.
    Voice(VoiceAdapter),
    /// Chat adapter.
    Chat(ChatAdapter),
    /// Social UI adapter.
    Social(SocialAdapter),
}

impl CapabilityAdapter {
    /// Strategy backing this adapter.
    pub fn strategy(&self) -> HostStrategy {
        let native = matches!(
            self,
            Self::Voice(VoiceAdapter::NativeBridge(_))
                | Self::Chat(ChatAdapter::NativeBridge(_))
                | Self::Social(SocialAdapter::NativeBridge(_))
        );
        if native {
            HostStrategy::NativeBridge
        } else {
            HostStrategy::Fallback
        }
    }
}

impl CapabilityService for CapabilityAdapter {
    fn capability(&self) -> CapabilityId {
        match self {
            Self::Voice(adapter) => adapter.capability(),
            Self::Chat(adapter) => adapter.capability(),
            Self::Social(adapter) => adapter.capability(),
        }
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        match self {
            Self::Voice(adapter) => adapter.init(),
            Self::Chat(adapter) => adapter.init(),
            Self::Social(adapter) => adapter.init(),
        }
    }

    fn is_supported(&self) -> bool {
        match self {
            Self::Voice(adapter) => adapter.is_supported(),
            Self::Chat(adapter) => adapter.is_supported(),
            Self::Social(adapter) => adapter.is_supported(),
        }
    }
}

/// Chooses native or fallback adapters once and hands out shared instances.
///
/// The host posture is sampled when the selector is built; later host loss does not swap
/// adapters (native adapters then report absence through their futures).
#[derive(Debug, Clone)]
pub struct AdapterSelector {
    strategy: HostStrategy,
    voice: VoiceAdapter,
    chat: ChatAdapter,
    social: SocialAdapter,
}

impl AdapterSelector {
    /// Detects the host strategy for `bridge` and builds one adapter per capability.
    pub fn new(bridge: NativeBridge) -> Self {
        let strategy = if fallback_only() {
            HostStrategy::Fallback
        } else {
            bridge.strategy()
        };
        let native = |capability: CapabilityId| {
            strategy == HostStrategy::NativeBridge && !bridge.config().forces_fallback(capability)
        };

        let voice = if native(CapabilityId::Voice) {
            VoiceAdapter::NativeBridge(NativeVoiceService::new(bridge.clone()))
        } else {
            VoiceAdapter::Fallback(NoopVoiceService)
        };
        let chat = if native(CapabilityId::Chat) {
            ChatAdapter::NativeBridge(NativeChatTransport::new(bridge.clone()))
        } else {
            ChatAdapter::Fallback(NoopChatTransport)
        };
        let social = if native(CapabilityId::Social) {
            SocialAdapter::NativeBridge(NativeSocialUiService::new(bridge.clone()))
        } else {
            SocialAdapter::Fallback(WebSocialUiService::new(bridge.bus().clone()))
        };

        tracing::debug!(strategy = strategy.as_str(), "capability adapters selected");
        Self {
            strategy,
            voice,
            chat,
            social,
        }
    }

    /// Session strategy: native only when a host was detected and the build is not
    /// `fallback-only`. Individual capabilities may still be forced to fallback by configuration.
    pub fn strategy(&self) -> HostStrategy {
        self.strategy
    }

    /// Strategy actually used for `capability` after configuration overrides.
    pub fn strategy_for(&self, capability: CapabilityId) -> HostStrategy {
        self.get_adapter(capability).strategy()
    }

    /// Returns the adapter serving `capability`.
    pub fn get_adapter(&self, capability: CapabilityId) -> CapabilityAdapter {
        match capability {
            CapabilityId::Voice => CapabilityAdapter::Voice(self.voice()),
            CapabilityId::Chat => CapabilityAdapter::Chat(self.chat()),
            CapabilityId::Social => CapabilityAdapter::Social(self.social()),
        }
    }

    /// Voice adapter.
    pub fn voice(&self) -> VoiceAdapter {
        self.voice.clone()
    }

    /// Chat adapter.
    pub fn chat(&self) -> ChatAdapter {
        self.chat.clone()
    }

    /// Social UI adapter.
    pub fn social(&self) -> SocialAdapter {
        self.social.clone()
    }

    /// Snapshot of which capabilities currently report support.
    pub fn capabilities(&self) -> HostCapabilities {
        let mut snapshot = HostCapabilities::fallback();
        for capability in CapabilityId::ALL {
            let status = if self.get_adapter(capability).is_supported() {
                CapabilityStatus::Available
            } else {
                CapabilityStatus::Unavailable
            };
            snapshot.set_status(capability, status);
        }
        snapshot
    }
}

thread_local! {
    static ADAPTER_SELECTOR: RefCell<Option<AdapterSelector>> = const { RefCell::new(None) };
}

/// Returns the process-local selector.
///
/// Built on first use against [`web_bridge`], so the page is probed for a host unless a bridge
/// was installed earlier.
pub fn adapter_selector() -> AdapterSelector {
    if let Some(selector) = ADAPTER_SELECTOR.with(|slot| slot.borrow().clone()) {
        return selector;
    }
    let selector = AdapterSelector::new(web_bridge());
    ADAPTER_SELECTOR.with(|slot| slot.borrow_mut().get_or_insert(selector).clone())
}

/// Builds the voice adapter for the process-local selector.
pub fn voice_service() -> VoiceAdapter {
    adapter_selector().voice()
}

/// Builds the chat adapter for the process-local selector.
pub fn chat_transport() -> ChatAdapter {
    adapter_selector().chat()
}

/// Builds the social UI adapter for the process-local selector.
pub fn social_ui_service() -> SocialAdapter {
    adapter_selector().social()
}

/// Capability snapshot for the process-local selector.
pub fn host_capabilities() -> HostCapabilities {
    adapter_selector().capabilities()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use native_bridge::{
        install_bridge, installed_bridge, BridgeConfig, ConnectionTracker, EventBus,
        MemoryHostTransport,
    };

    use super::*;

    fn hosted_bridge(config: BridgeConfig) -> NativeBridge {
        let host = MemoryHostTransport::new();
        NativeBridge::new(
            Rc::new(host),
            ConnectionTracker::with_host(),
            EventBus::new(),
            config,
        )
    }

    #[test]
    fn hostless_selector_uses_fallbacks() {
        let selector = AdapterSelector::new(NativeBridge::without_host(
            EventBus::new(),
            BridgeConfig::default(),
        ));

        assert_eq!(selector.strategy(), HostStrategy::Fallback);
        for capability in CapabilityId::ALL {
            assert_eq!(selector.strategy_for(capability), HostStrategy::Fallback);
            assert_eq!(selector.get_adapter(capability).capability(), capability);
        }
        assert_eq!(selector.capabilities(), HostCapabilities::fallback());
    }

    #[test]
    fn configuration_forces_individual_fallbacks() {
        let config = BridgeConfig::default().with_fallback(CapabilityId::Chat);
        let selector = AdapterSelector::new(hosted_bridge(config));

        let expected_native = if fallback_only() {
            HostStrategy::Fallback
        } else {
            HostStrategy::NativeBridge
        };
        assert_eq!(selector.strategy(), expected_native);
        assert_eq!(selector.strategy_for(CapabilityId::Voice), expected_native);
        assert_eq!(selector.strategy_for(CapabilityId::Chat), HostStrategy::Fallback);
        assert_eq!(selector.strategy_for(CapabilityId::Social), expected_native);
    }

    #[test]
    fn process_selector_is_built_once() {
        let first = adapter_selector();
        let second = adapter_selector();
        assert_eq!(first.strategy(), second.strategy());
        assert!(!voice_service().is_supported());
        assert!(social_ui_service().is_supported());
        assert!(!chat_transport().is_supported());
        assert_eq!(host_capabilities(), HostCapabilities::fallback());
    }

    #[test]
    fn process_selector_uses_a_bridge_installed_before_first_use() {
        install_bridge(hosted_bridge(BridgeConfig::default())).expect("install hosted bridge");

        let expected = if fallback_only() {
            HostStrategy::Fallback
        } else {
            HostStrategy::NativeBridge
        };
        assert_eq!(adapter_selector().strategy(), expected);
        assert_eq!(voice_service().is_supported(), !fallback_only());
    }

    #[test]
    fn process_selector_probes_the_page_and_installs_its_bridge() {
        assert!(installed_bridge().is_none());

        let selector = adapter_selector();
        assert_eq!(selector.strategy(), HostStrategy::Fallback);
        let installed = installed_bridge().expect("selector installs the probed bridge");
        assert!(!installed.has_host());
        assert_eq!(
            install_bridge(hosted_bridge(BridgeConfig::default())),
            Err(native_bridge::BridgeError::AlreadyInstalled)
        );
    }

    #[test]
    fn fallback_only_builds_report_a_fallback_session() {
        let selector = AdapterSelector::new(hosted_bridge(BridgeConfig::default()));
        if fallback_only() {
            assert_eq!(selector.strategy(), HostStrategy::Fallback);
            for capability in CapabilityId::ALL {
                assert_eq!(selector.strategy_for(capability), HostStrategy::Fallback);
            }
        } else {
            assert_eq!(selector.strategy(), HostStrategy::NativeBridge);
        }
    }
}
