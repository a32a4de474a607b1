//! Page-side wiring for [`native_bridge`]: host discovery, the web-channel transport, and
//! native/fallback capability adapters.
//!
//! - `bridge` probes for the host global, opens the web channel and drives the connection
//!   tracker (`bridge::interop` holds the wasm/non-wasm glue).
//! - `adapters` picks one adapter per capability and exposes process-local factories.
//! - `voice`, `chat` and `social` hold the adapters backed by host objects, plus the page-local
//!   social UI.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Adapter selection and factories for runtime wiring.
pub mod adapters;
pub mod bridge;
pub mod chat;
mod native;
pub mod social;
pub mod voice;

pub use adapters::{
    adapter_selector, chat_transport, fallback_only, host_capabilities, social_ui_service,
    voice_service, AdapterSelector, CapabilityAdapter, ChatAdapter, SocialAdapter, VoiceAdapter,
};
pub use bridge::{
    connect_web_bridge, drive_connection, host_detected, install_web_bridge, web_bridge,
    WebChannelTransport,
};
pub use chat::NativeChatTransport;
pub use social::{NativeSocialUiService, WebSocialUiService};
pub use voice::NativeVoiceService;
