use std::{cell::Cell, rc::Rc};

use futures::executor::block_on;
use native_bridge::{
    BridgeConfig, CapabilityError, CapabilityId, CapabilityService, ChatPresence, ChatTransport,
    EventBus, HostStrategy, NativeBridge, SocialUiService, VoiceService,
};
use native_bridge_web::{AdapterSelector, CapabilityAdapter, SocialAdapter};
use serde_json::Value;

fn hostless_selector(bus: &EventBus) -> AdapterSelector {
    AdapterSelector::new(NativeBridge::without_host(bus.clone(), BridgeConfig::default()))
}

#[test]
fn voice_is_unsupported_without_a_host() {
    let selector = hostless_selector(&EventBus::new());

    let voice = selector.get_adapter(CapabilityId::Voice);
    assert!(matches!(voice, CapabilityAdapter::Voice(_)));
    assert_eq!(voice.strategy(), HostStrategy::Fallback);
    assert!(!voice.is_supported());
    block_on(voice.init()).expect("fallback init never fails");

    assert_eq!(
        block_on(selector.voice().join_channel("lobby")),
        Err(CapabilityError::Unavailable {
            capability: "voice",
        })
    );
    assert_eq!(
        block_on(selector.voice().audio_input_devices()).expect("devices"),
        Vec::new()
    );
}

#[test]
fn chat_rejects_through_the_future_without_a_host() {
    let selector = hostless_selector(&EventBus::new());
    let chat = selector.chat();

    assert!(!chat.is_supported());
    assert_eq!(
        block_on(chat.send_message("friend-1", "hello")),
        Err(CapabilityError::Unavailable { capability: "chat" })
    );
    assert_eq!(
        block_on(chat.set_presence(ChatPresence::Online)),
        Err(CapabilityError::Unavailable { capability: "chat" })
    );
}

#[test]
fn fallback_social_ui_publishes_host_events_locally() {
    let bus = EventBus::new();
    let focused = Rc::new(Cell::new(0));
    let focused_handler = focused.clone();
    bus.on("CLIENT_SOCIAL_FOCUSONFRIENDSLIST", move |_: &[Value]| {
        focused_handler.set(focused_handler.get() + 1);
        Ok(())
    });

    let selector = hostless_selector(&bus);
    let social = selector.social();
    assert!(matches!(social, SocialAdapter::Fallback(_)));
    assert!(social.is_supported());

    block_on(social.show_friends_list()).expect("show friends");
    block_on(social.show_friends_list()).expect("show friends");
    assert_eq!(focused.get(), 2);
}

#[test]
fn every_fallback_adapter_reports_its_capability() {
    let selector = hostless_selector(&EventBus::new());
    for capability in CapabilityId::ALL {
        let adapter = selector.get_adapter(capability);
        assert_eq!(adapter.capability(), capability);
        assert_eq!(selector.strategy_for(capability), HostStrategy::Fallback);
    }
}
