//! Social UI capability contract.

use super::{CapabilityFuture, CapabilityService};
use crate::host::CapabilityError;

/// Host object managing the social UI.
pub const SOCIAL_OBJECT: &str = "OriginSocialUIManager";

/// Event-name domain for relayed social signals.
pub const SOCIAL_EVENT_DOMAIN: &str = "social";

/// Host signal asking the page to focus the friends list.
pub const FOCUS_FRIENDS_LIST_SIGNAL: &str = "focusOnFriendsList";

/// Host signal asking the page to open a chat window for a friend.
pub const SHOW_CHAT_WINDOW_SIGNAL: &str = "showChatWindowForFriend";

/// Host signals relayed onto the event bus by the native social adapter.
pub const SOCIAL_SIGNALS: [&str; 2] = [FOCUS_FRIENDS_LIST_SIGNAL, SHOW_CHAT_WINDOW_SIGNAL];

/// Social UI operations.
pub trait SocialUiService: CapabilityService {
    /// Brings the friends list into view.
    fn show_friends_list<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>>;

    /// Opens the chat window for `friend_id`.
    fn show_chat_window<'a>(
        &'a self,
        friend_id: &'a str,
    ) -> CapabilityFuture<'a, Result<(), CapabilityError>>;
}
