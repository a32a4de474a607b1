//! Error taxonomy shared by the registry, remote handles and capability adapters.

use thiserror::Error;

/// Failures surfaced through bridge futures.
///
/// Host absence and missing objects are expected modes rather than faults; they are reported as
/// values so callers can degrade without special-casing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// No native host is present, or the host went away during the session.
    #[error("no native host is available")]
    HostAbsent,
    /// The host is connected but does not expose the requested object.
    #[error("native object `{object}` is not present on the host")]
    ObjectNotPresent {
        /// Symbolic object name that was requested.
        object: String,
    },
    /// The host executed the call and reported an error.
    #[error("native call `{object}.{method}` failed: {detail}")]
    Invocation {
        /// Object the call was sent to.
        object: String,
        /// Method that was invoked.
        method: String,
        /// Host-provided error detail.
        detail: String,
    },
    /// The host answered, but the reply did not match the expected shape.
    #[error("native call `{object}.{method}` returned an unexpected payload: {detail}")]
    Decode {
        /// Object the call was sent to.
        object: String,
        /// Method that was invoked.
        method: String,
        /// Deserialization error detail.
        detail: String,
    },
    /// Bridge configuration could not be parsed.
    #[error("invalid bridge configuration: {0}")]
    Config(String),
    /// A process-wide bridge was already installed on this thread.
    #[error("a native bridge is already installed")]
    AlreadyInstalled,
}

impl BridgeError {
    /// Returns whether the error means "feature unavailable" rather than a failed call.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::HostAbsent | Self::ObjectNotPresent { .. })
    }
}

/// Report describing one event handler that failed during [`crate::EventBus::fire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    /// Event name being delivered.
    pub event: String,
    /// Identifier of the failing subscription.
    pub subscription: u64,
    /// Error returned by the handler, or the panic message.
    pub message: String,
}

impl std::fmt::Display for SubscriberFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "subscriber #{} for `{}` failed: {}",
            self.subscription, self.event, self.message
        )
    }
}
