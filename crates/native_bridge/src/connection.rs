//! Connection state tracking between the web view and the native host.
//!
//! The tracker is the single source of truth for whether a host exists and whether the channel
//! to it is usable. Only the host integration layer moves it forward; the registry and remote
//! handles observe it.

use std::{cell::RefCell, fmt, future::Future, pin::Pin, rc::Rc};

use futures::channel::oneshot;

/// Object-safe boxed future returned by [`ConnectionTracker::when_connected`].
pub type ConnectedFuture = Pin<Box<dyn Future<Output = ()>>>;

type Listener = Box<dyn FnOnce()>;

/// Observable channel state for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No host integration point exists in this environment. Terminal.
    NoHost,
    /// A host exists but the channel has not started connecting, or the host went away.
    NotConnected,
    /// The channel handshake is in progress.
    Connecting,
    /// The channel is established.
    Connected,
}

impl ConnectionState {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoHost => "no-host",
            Self::NotConnected => "not-connected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct TrackerState {
    state: ConnectionState,
    host_lost: bool,
    waiters: Vec<oneshot::Sender<()>>,
    connected_listeners: Vec<Listener>,
    lost_listeners: Vec<Listener>,
}

/// Shared handle to the connection state of one bridge session.
///
/// Clones observe and drive the same underlying state.
#[derive(Clone)]
pub struct ConnectionTracker {
    inner: Rc<RefCell<TrackerState>>,
}

impl fmt::Debug for ConnectionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("ConnectionTracker")
            .field("state", &state.state)
            .field("host_lost", &state.host_lost)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

impl ConnectionTracker {
    fn with_state(state: ConnectionState) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TrackerState {
                state,
                host_lost: false,
                waiters: Vec::new(),
                connected_listeners: Vec::new(),
                lost_listeners: Vec::new(),
            })),
        }
    }

    /// Creates a tracker for an environment that exposes a host integration point.
    pub fn with_host() -> Self {
        Self::with_state(ConnectionState::NotConnected)
    }

    /// Creates a tracker for an environment without any native host.
    pub fn without_host() -> Self {
        Self::with_state(ConnectionState::NoHost)
    }

    /// Returns the latest known state.
    pub fn current_state(&self) -> ConnectionState {
        self.inner.borrow().state
    }

    /// Returns whether a host is present and has not gone away.
    pub fn has_host(&self) -> bool {
        let state = self.inner.borrow();
        state.state != ConnectionState::NoHost && !state.host_lost
    }

    /// Returns whether a previously present host disappeared during this session.
    pub fn is_host_lost(&self) -> bool {
        self.inner.borrow().host_lost
    }

    /// Returns whether the channel is established.
    pub fn is_connected(&self) -> bool {
        self.current_state() == ConnectionState::Connected
    }

    /// Returns a future that completes once the channel reaches [`ConnectionState::Connected`].
    ///
    /// Completes immediately when already connected. Never completes when there is no host or
    /// the host goes away first; check [`Self::has_host`] before awaiting.
    pub fn when_connected(&self) -> ConnectedFuture {
        let receiver = {
            let mut state = self.inner.borrow_mut();
            if state.state == ConnectionState::Connected {
                return Box::pin(futures::future::ready(()));
            }
            let (sender, receiver) = oneshot::channel();
            if state.state != ConnectionState::NoHost && !state.host_lost {
                state.waiters.push(sender);
            }
            receiver
        };

        Box::pin(async move {
            if receiver.await.is_err() {
                futures::future::pending::<()>().await;
            }
        })
    }

    /// Runs `listener` synchronously when the channel connects, before future waiters wake.
    ///
    /// Runs immediately when already connected. Dropped without running if the host is absent
    /// or goes away first.
    pub fn on_connected(&self, listener: impl FnOnce() + 'static) {
        let run_now = {
            let mut state = self.inner.borrow_mut();
            match state.state {
                ConnectionState::Connected => true,
                ConnectionState::NoHost => return,
                _ if state.host_lost => return,
                _ => {
                    state.connected_listeners.push(Box::new(listener));
                    return;
                }
            }
        };
        if run_now {
            listener();
        }
    }

    /// Runs `listener` synchronously if the host goes away during the session.
    pub fn on_host_lost(&self, listener: impl FnOnce() + 'static) {
        let run_now = {
            let mut state = self.inner.borrow_mut();
            if state.host_lost {
                true
            } else if state.state == ConnectionState::NoHost {
                return;
            } else {
                state.lost_listeners.push(Box::new(listener));
                return;
            }
        };
        if run_now {
            listener();
        }
    }

    /// Marks the channel handshake as started.
    pub fn mark_connecting(&self) {
        let mut state = self.inner.borrow_mut();
        if state.host_lost || state.state != ConnectionState::NotConnected {
            tracing::warn!(
                state = %state.state,
                host_lost = state.host_lost,
                "ignoring connecting transition"
            );
            return;
        }
        state.state = ConnectionState::Connecting;
        tracing::debug!("native host channel connecting");
    }

    /// Marks the channel as established, flushing listeners and then waking waiters.
    pub fn mark_connected(&self) {
        let (listeners, waiters) = {
            let mut state = self.inner.borrow_mut();
            let can_connect = matches!(
                state.state,
                ConnectionState::NotConnected | ConnectionState::Connecting
            );
            if state.host_lost || !can_connect {
                tracing::warn!(
                    state = %state.state,
                    host_lost = state.host_lost,
                    "ignoring connected transition"
                );
                return;
            }
            state.state = ConnectionState::Connected;
            (
                std::mem::take(&mut state.connected_listeners),
                std::mem::take(&mut state.waiters),
            )
        };

        tracing::debug!(
            listeners = listeners.len(),
            waiters = waiters.len(),
            "native host channel connected"
        );
        for listener in listeners {
            listener();
        }
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    /// Tears the session down after the host disappeared.
    ///
    /// The state drops to [`ConnectionState::NotConnected`] and stays there; pending
    /// [`Self::when_connected`] futures never complete.
    pub fn mark_host_lost(&self) {
        let listeners = {
            let mut state = self.inner.borrow_mut();
            if state.host_lost || state.state == ConnectionState::NoHost {
                return;
            }
            state.host_lost = true;
            state.state = ConnectionState::NotConnected;
            state.waiters.clear();
            state.connected_listeners.clear();
            std::mem::take(&mut state.lost_listeners)
        };

        tracing::debug!(listeners = listeners.len(), "native host lost");
        for listener in listeners {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::{
        executor::{block_on, LocalPool},
        task::LocalSpawnExt,
    };

    use super::*;

    #[test]
    fn host_less_tracker_is_terminal() {
        let tracker = ConnectionTracker::without_host();
        assert_eq!(tracker.current_state(), ConnectionState::NoHost);
        assert!(!tracker.has_host());

        tracker.mark_connecting();
        tracker.mark_connected();
        assert_eq!(tracker.current_state(), ConnectionState::NoHost);
    }

    #[test]
    fn state_moves_forward_only() {
        let tracker = ConnectionTracker::with_host();
        assert_eq!(tracker.current_state(), ConnectionState::NotConnected);

        tracker.mark_connecting();
        assert_eq!(tracker.current_state(), ConnectionState::Connecting);

        tracker.mark_connected();
        assert_eq!(tracker.current_state(), ConnectionState::Connected);

        tracker.mark_connecting();
        assert_eq!(tracker.current_state(), ConnectionState::Connected);
    }

    #[test]
    fn when_connected_is_immediate_once_connected() {
        let tracker = ConnectionTracker::with_host();
        tracker.mark_connected();
        block_on(tracker.when_connected());
    }

    #[test]
    fn when_connected_completes_on_transition_only() {
        let tracker = ConnectionTracker::with_host();
        let done = Rc::new(Cell::new(0));
        let mut pool = LocalPool::new();

        for _ in 0..2 {
            let wait = tracker.when_connected();
            let done = done.clone();
            pool.spawner()
                .spawn_local(async move {
                    wait.await;
                    done.set(done.get() + 1);
                })
                .expect("spawn waiter");
        }

        tracker.mark_connecting();
        pool.run_until_stalled();
        assert_eq!(done.get(), 0);

        tracker.mark_connected();
        pool.run_until_stalled();
        assert_eq!(done.get(), 2);
    }

    #[test]
    fn when_connected_never_completes_without_host() {
        let tracker = ConnectionTracker::without_host();
        let done = Rc::new(Cell::new(false));
        let mut pool = LocalPool::new();
        let wait = tracker.when_connected();
        let flag = done.clone();
        pool.spawner()
            .spawn_local(async move {
                wait.await;
                flag.set(true);
            })
            .expect("spawn waiter");

        pool.run_until_stalled();
        assert!(!done.get());
    }

    #[test]
    fn listeners_run_before_waiters_wake() {
        let tracker = ConnectionTracker::with_host();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut pool = LocalPool::new();

        let wait = tracker.when_connected();
        let waiter_order = order.clone();
        pool.spawner()
            .spawn_local(async move {
                wait.await;
                waiter_order.borrow_mut().push("waiter");
            })
            .expect("spawn waiter");
        pool.run_until_stalled();

        let listener_order = order.clone();
        tracker.on_connected(move || listener_order.borrow_mut().push("listener"));

        tracker.mark_connected();
        pool.run_until_stalled();
        assert_eq!(*order.borrow(), vec!["listener", "waiter"]);
    }

    #[test]
    fn host_loss_drops_to_not_connected_and_stays() {
        let tracker = ConnectionTracker::with_host();
        let lost = Rc::new(Cell::new(false));
        let flag = lost.clone();
        tracker.on_host_lost(move || flag.set(true));

        tracker.mark_connected();
        tracker.mark_host_lost();
        assert!(lost.get());
        assert!(!tracker.has_host());
        assert!(tracker.is_host_lost());
        assert_eq!(tracker.current_state(), ConnectionState::NotConnected);

        tracker.mark_connected();
        assert_eq!(tracker.current_state(), ConnectionState::NotConnected);
    }

    #[test]
    fn when_connected_never_completes_after_host_loss() {
        let tracker = ConnectionTracker::with_host();
        let done = Rc::new(Cell::new(0));
        let mut pool = LocalPool::new();

        let taken_before = tracker.when_connected();
        tracker.mark_connecting();
        tracker.mark_host_lost();
        let taken_after = tracker.when_connected();

        for wait in [taken_before, taken_after] {
            let done = done.clone();
            pool.spawner()
                .spawn_local(async move {
                    wait.await;
                    done.set(done.get() + 1);
                })
                .expect("spawn waiter");
        }
        pool.run_until_stalled();
        assert_eq!(done.get(), 0);

        tracker.mark_connected();
        pool.run_until_stalled();
        assert_eq!(done.get(), 0);
        assert_eq!(tracker.current_state(), ConnectionState::NotConnected);
    }

    #[test]
    fn when_connected_after_loss_of_a_connected_host_never_completes() {
        let tracker = ConnectionTracker::with_host();
        tracker.mark_connected();
        tracker.mark_host_lost();

        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        let wait = tracker.when_connected();
        let mut pool = LocalPool::new();
        pool.spawner()
            .spawn_local(async move {
                wait.await;
                flag.set(true);
            })
            .expect("spawn waiter");

        pool.run_until_stalled();
        assert!(!done.get());
    }
}
