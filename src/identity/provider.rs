//! Identity Provider
//!
//! Reactive holder of the current identity snapshot. Observers get the latest
//! value only; intermediate values that nobody looked at are dropped, never replayed.

use tokio::sync::watch;
use tracing::debug;

use super::{Identity, Role};

/// Source of identity snapshots with change notification
pub trait IdentityProvider: Send + Sync {
    /// Current snapshot
    fn snapshot(&self) -> Identity;

    /// Receiver that wakes whenever a new snapshot is published
    fn subscribe(&self) -> watch::Receiver<Identity>;
}

/// Session-scoped identity store backed by a `watch` channel
pub struct SessionIdentity {
    tx: watch::Sender<Identity>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Identity::Unknown);
        Self { tx }
    }

    /// Publish a snapshot. Subscribers are woken even if the value is unchanged.
    pub fn set(&self, identity: Identity) {
        debug!(identity = %identity, "Publishing identity snapshot");
        self.tx.send_replace(identity);
    }

    /// Authentication finished with the given role
    pub fn resolve(&self, role: Role) {
        self.set(Identity::Resolved(role));
    }

    /// Back to the unauthenticated state
    pub fn sign_out(&self) {
        self.set(Identity::Unknown);
    }

    /// Number of views currently observing this session
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for SessionIdentity {
    fn snapshot(&self) -> Identity {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Identity> {
        self.tx.subscribe()
    }
}
