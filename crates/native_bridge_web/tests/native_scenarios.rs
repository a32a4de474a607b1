#![cfg(not(feature = "fallback-only"))]

use std::{cell::RefCell, rc::Rc};

use futures::{
    executor::{block_on, LocalPool},
    task::LocalSpawnExt,
};
use native_bridge::{
    BridgeConfig, BridgeError, CapabilityError, CapabilityId, CapabilityService, ChatTransport,
    ConnectionTracker, EventBus, HostStrategy, MemoryHostTransport, NativeBridge,
    RemoteObjectHandle, SocialUiService, VoiceDevice, VoiceService, CHAT_OBJECT, SOCIAL_OBJECT,
    VOICE_OBJECT,
};
use native_bridge_web::{AdapterSelector, SocialAdapter};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

struct Fixture {
    host: MemoryHostTransport,
    tracker: ConnectionTracker,
    bus: EventBus,
    bridge: NativeBridge,
}

fn fixture() -> Fixture {
    let host = MemoryHostTransport::new();
    let tracker = ConnectionTracker::with_host();
    let bus = EventBus::new();
    let bridge = NativeBridge::new(
        Rc::new(host.clone()),
        tracker.clone(),
        bus.clone(),
        BridgeConfig::default(),
    );
    Fixture {
        host,
        tracker,
        bus,
        bridge,
    }
}

fn record(bus: &EventBus, event: &str, log: &Rc<RefCell<Vec<String>>>, tag: &str) {
    let log = log.clone();
    let tag = tag.to_string();
    bus.on(event, move |_: &[Value]| {
        log.borrow_mut().push(tag.clone());
        Ok(())
    });
}

#[test]
fn concurrent_registrations_share_one_handle_and_relay_to_every_subscriber() {
    let fx = fixture();
    fx.host.add_object(SOCIAL_OBJECT);
    let selector = AdapterSelector::new(fx.bridge.clone());
    assert_eq!(selector.strategy(), HostStrategy::NativeBridge);

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let resolved: Rc<RefCell<Vec<RemoteObjectHandle>>> = Rc::new(RefCell::new(Vec::new()));
    for _ in 0..2 {
        let registration = fx.bridge.register(SOCIAL_OBJECT);
        let resolved = resolved.clone();
        spawner
            .spawn_local(async move {
                let handle = registration.await;
                resolved.borrow_mut().push(handle);
            })
            .expect("spawn registration");
    }
    let social = selector.social();
    spawner
        .spawn_local(async move {
            social.init().await.expect("social init");
        })
        .expect("spawn init");

    pool.run_until_stalled();
    assert!(resolved.borrow().is_empty());
    assert_eq!(
        fx.bridge.registry().pending_names(),
        vec![SOCIAL_OBJECT.to_string()]
    );

    fx.tracker.mark_connected();
    pool.run_until_stalled();

    let handles = resolved.borrow();
    assert_eq!(handles.len(), 2);
    assert!(handles[0].same_handle(&handles[1]));
    assert!(handles[0].is_present());

    let log = Rc::new(RefCell::new(Vec::new()));
    record(&fx.bus, "CLIENT_SOCIAL_FOCUSONFRIENDSLIST", &log, "first");
    record(&fx.bus, "CLIENT_SOCIAL_FOCUSONFRIENDSLIST", &log, "second");

    let relayed = fx.host.emit_signal(SOCIAL_OBJECT, "focusOnFriendsList", &[]);
    assert_eq!(relayed, 1);
    assert_eq!(
        *log.borrow(),
        vec!["first".to_string(), "second".to_string()]
    );

    fx.host.emit_signal(SOCIAL_OBJECT, "focusOnFriendsList", &[]);
    assert_eq!(log.borrow().len(), 4);
}

#[test]
fn repeated_init_binds_host_signals_once() {
    let fx = fixture();
    fx.host.add_object(VOICE_OBJECT);
    let selector = AdapterSelector::new(fx.bridge.clone());

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    for _ in 0..2 {
        let voice = selector.voice();
        spawner
            .spawn_local(async move {
                voice.init().await.expect("voice init");
            })
            .expect("spawn init");
    }
    fx.tracker.mark_connected();
    pool.run_until_stalled();
    block_on(selector.voice().init()).expect("voice init");

    for signal in ["deviceAdded", "voiceLevel", "voiceDisconnected"] {
        assert_eq!(fx.host.relay_count(VOICE_OBJECT, signal), 1, "{signal}");
    }
}

#[test]
fn absent_object_fails_through_the_future() {
    let fx = fixture();
    fx.host.add_method(CHAT_OBJECT, "sendMessage", |_| {
        Err("recipient offline".to_string())
    });
    fx.tracker.mark_connected();
    let selector = AdapterSelector::new(fx.bridge.clone());

    let voice_handle = block_on(fx.bridge.register(VOICE_OBJECT));
    assert!(!voice_handle.is_present());
    let pending_call = voice_handle.invoke("joinChannel", vec![json!("lobby")]);
    assert_eq!(
        block_on(pending_call),
        Err(BridgeError::ObjectNotPresent {
            object: VOICE_OBJECT.to_string(),
        })
    );

    let voice = selector.voice();
    assert_eq!(
        block_on(voice.init()),
        Err(CapabilityError::unavailable(CapabilityId::Voice))
    );
    assert!(!voice.is_supported());
    assert_eq!(
        block_on(voice.join_channel("lobby")),
        Err(CapabilityError::unavailable(CapabilityId::Voice))
    );

    let chat = selector.chat();
    assert_eq!(
        block_on(chat.send_message("friend-1", "hello")),
        Err(CapabilityError::Bridge {
            capability: "chat",
            source: BridgeError::Invocation {
                object: CHAT_OBJECT.to_string(),
                method: "sendMessage".to_string(),
                detail: "recipient offline".to_string(),
            },
        })
    );
}

#[test]
fn native_voice_calls_host_methods() {
    let fx = fixture();
    let host = fx.host.clone();
    host.add_method(VOICE_OBJECT, "joinChannel", |_| Ok(Value::Null));
    host.add_method(VOICE_OBJECT, "audioInputDevices", |_| {
        Ok(json!([
            {"id": "mic-1", "name": "Headset", "isDefault": true},
            {"id": "mic-2", "name": "Webcam"}
        ]))
    });
    fx.tracker.mark_connected();
    let voice = AdapterSelector::new(fx.bridge.clone()).voice();

    block_on(voice.join_channel("lobby")).expect("join");
    let devices = block_on(voice.audio_input_devices()).expect("devices");

    assert!(voice.is_supported());
    assert_eq!(
        devices,
        vec![
            VoiceDevice {
                id: "mic-1".to_string(),
                name: "Headset".to_string(),
                is_default: true,
            },
            VoiceDevice {
                id: "mic-2".to_string(),
                name: "Webcam".to_string(),
                is_default: false,
            },
        ]
    );
    assert_eq!(
        fx.host.calls(),
        vec![
            (
                VOICE_OBJECT.to_string(),
                "joinChannel".to_string(),
                vec![json!("lobby")],
            ),
            (
                VOICE_OBJECT.to_string(),
                "audioInputDevices".to_string(),
                Vec::new(),
            ),
        ]
    );
}

#[test]
fn host_chat_signals_arrive_as_client_events() {
    let fx = fixture();
    fx.host.add_object(CHAT_OBJECT);
    fx.tracker.mark_connected();
    let chat = AdapterSelector::new(fx.bridge.clone()).chat();
    block_on(chat.init()).expect("chat init");

    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = received.clone();
    fx.bus.on("CLIENT_CHAT_MESSAGERECEIVED", move |args: &[Value]| {
        sink.borrow_mut().push(args.to_vec());
        Ok(())
    });

    fx.host.emit_signal(
        CHAT_OBJECT,
        "messageReceived",
        &[json!("friend-1"), json!("hi")],
    );
    assert_eq!(
        *received.borrow(),
        vec![vec![json!("friend-1"), json!("hi")]]
    );
}

#[test]
fn host_loss_before_connect_resolves_adapters_as_unavailable() {
    let fx = fixture();
    fx.host.add_object(SOCIAL_OBJECT);
    let selector = AdapterSelector::new(fx.bridge.clone());
    let social = selector.social();
    assert!(matches!(social, SocialAdapter::NativeBridge(_)));
    assert!(social.is_supported());

    let mut pool = LocalPool::new();
    let outcome = Rc::new(RefCell::new(None));
    let slot = outcome.clone();
    let pending_social = social.clone();
    pool.spawner()
        .spawn_local(async move {
            *slot.borrow_mut() = Some(pending_social.show_friends_list().await);
        })
        .expect("spawn call");
    pool.run_until_stalled();
    assert!(outcome.borrow().is_none());

    fx.tracker.mark_host_lost();
    pool.run_until_stalled();

    assert_eq!(
        outcome.borrow().clone(),
        Some(Err(CapabilityError::unavailable(CapabilityId::Social)))
    );
    assert!(!social.is_supported());
    assert!(fx.host.calls().is_empty());
}

#[test]
fn configured_fallback_overrides_a_present_host() {
    let host = MemoryHostTransport::new();
    host.add_object(SOCIAL_OBJECT);
    let tracker = ConnectionTracker::with_host();
    let bus = EventBus::new();
    let bridge = NativeBridge::new(
        Rc::new(host.clone()),
        tracker.clone(),
        bus.clone(),
        BridgeConfig::default().with_fallback(CapabilityId::Social),
    );
    tracker.mark_connected();

    let social = AdapterSelector::new(bridge).social();
    assert!(matches!(social, SocialAdapter::Fallback(_)));

    let log = Rc::new(RefCell::new(Vec::new()));
    record(&bus, "CLIENT_SOCIAL_SHOWCHATWINDOWFORFRIEND", &log, "local");
    block_on(social.show_chat_window("friend-9")).expect("chat window");

    assert_eq!(*log.borrow(), vec!["local".to_string()]);
    assert!(host.calls().is_empty());
}
