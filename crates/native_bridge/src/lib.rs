//! Bridge between an embedded web view and objects owned by a native host process.
//!
//! This crate holds the host-independent runtime: the connection tracker that gates
//! connection-dependent work, the process-wide event bus host signals are relayed onto, the
//! remote object registry and handles, and the capability contracts adapters implement. Probing
//! the page for a host and choosing adapters lives in `native_bridge_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod capabilities;
pub mod config;
pub mod connection;
pub mod error;
pub mod event_bus;
pub mod handle;
pub mod host;
pub mod registry;
pub mod session;
pub mod transport;

pub use capabilities::chat::{
    ChatPresence, ChatTransport, NoopChatTransport, CHAT_EVENT_DOMAIN, CHAT_OBJECT, CHAT_SIGNALS,
};
pub use capabilities::social::{
    SocialUiService, FOCUS_FRIENDS_LIST_SIGNAL, SHOW_CHAT_WINDOW_SIGNAL, SOCIAL_EVENT_DOMAIN,
    SOCIAL_OBJECT, SOCIAL_SIGNALS,
};
pub use capabilities::voice::{
    NoopVoiceService, VoiceDevice, VoiceService, VOICE_EVENT_DOMAIN, VOICE_OBJECT, VOICE_SIGNALS,
};
pub use capabilities::{client_event_name, CapabilityFuture, CapabilityService};
pub use config::{BridgeConfig, DEFAULT_HOST_GLOBAL};
pub use connection::{ConnectedFuture, ConnectionState, ConnectionTracker};
pub use error::{BridgeError, SubscriberFailure};
pub use event_bus::{
    event_bus, EventBus, EventHandler, HandlerResult, SubscriberErrorReporter, SubscriptionToken,
    TracingErrorReporter,
};
pub use handle::{BindingId, InvokeFuture, RemoteObjectHandle};
pub use host::{CapabilityError, CapabilityId, CapabilityStatus, HostCapabilities, HostStrategy};
pub use registry::{RegistrationFuture, RemoteObjectRegistry};
pub use session::{bridge, install_bridge, installed_bridge, NativeBridge};
pub use transport::{
    HostFuture, HostTransport, MemoryHostTransport, MemoryMethod, NoopHostTransport, SignalRelay,
};
