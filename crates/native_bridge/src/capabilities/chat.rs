//! Chat transport capability contract.

use serde::{Deserialize, Serialize};

use super::{CapabilityFuture, CapabilityService};
use crate::host::{CapabilityError, CapabilityId};

/// Host object serving the chat transport.
pub const CHAT_OBJECT: &str = "OriginChat";

/// Event-name domain for relayed chat signals.
pub const CHAT_EVENT_DOMAIN: &str = "chat";

/// Host signals relayed onto the event bus by the native chat adapter.
pub const CHAT_SIGNALS: [&str; 2] = ["messageReceived", "presenceChanged"];

/// Presence advertised to friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPresence {
    /// Available for chat.
    Online,
    /// Idle.
    Away,
    /// Do not disturb.
    Busy,
    /// Signed in but shown offline.
    Invisible,
}

/// Chat message transport operations.
pub trait ChatTransport: CapabilityService {
    /// Sends `body` to the user identified by `to`.
    fn send_message<'a>(
        &'a self,
        to: &'a str,
        body: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>>;

    /// Changes the local user's presence.
    fn set_presence<'a>(
        &'a self,
        presence: ChatPresence,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Chat transport for environments without a host-side chat connection.
pub struct NoopChatTransport;

impl CapabilityService for NoopChatTransport {
    fn capability(&self) -> CapabilityId {
        CapabilityId::Chat
    }

    fn init<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Ok(()) })
    }

    fn is_supported(&self) -> bool {
        false
    }
}

impl ChatTransport for NoopChatTransport {
    fn send_message<'a>(
        &'a self,
        _to: &'a str,
        _body: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Err(CapabilityError::unavailable(CapabilityId::Chat)) })
    }

    fn set_presence<'a>(
        &'a self,
        _presence: ChatPresence,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Err(CapabilityError::unavailable(CapabilityId::Chat)) })
    }
}
