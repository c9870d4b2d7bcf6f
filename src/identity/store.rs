use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::role::Role;

/// Snapshot of the current identity: a bearer token and the role it was
/// issued with, or neither. The pair is stored as one value so no reader can
/// ever observe a credential without a role or a role without a credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    signed_in: Option<(String, Role)>,
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        self.signed_in.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.signed_in.as_ref().map(|(t, _)| t.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.signed_in.as_ref().map(|(_, r)| *r)
    }
}

struct StoreInner {
    identity: Identity,
    // Fencing counters for in-flight sign-ins: an attempt whose sequence
    // number is at or below `barrier` has been superseded and its late
    // resolution must be dropped.
    last_attempt: u64,
    barrier: u64,
}

/// The single writable source of truth for the current identity.
///
/// Construct one per process and hand out [`super::SessionAccessor`] clones;
/// there is intentionally no ambient global instance, so the guards and the
/// request layer can be exercised against their own store in tests.
pub struct SessionStore {
    inner: RwLock<StoreInner>,
}

/// Ticket for one in-flight sign-in. Obtained before the authentication
/// network call and redeemed when the response arrives; redemption fails if
/// a newer login or a logout superseded this attempt in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttempt {
    seq: u64,
}

impl SessionStore {
    pub fn new() -> Arc<SessionStore> {
        Arc::new(SessionStore {
            inner: RwLock::new(StoreInner {
                identity: Identity::default(),
                last_attempt: 0,
                barrier: 0,
            }),
        })
    }

    /// Replace the identity with a signed-in state. The credential was
    /// already validated by the backend call that produced it; this only
    /// records it. Every attempt still in flight becomes stale.
    pub fn login(&self, token: impl Into<String>, role: Role) {
        let token = token.into();
        debug_assert!(!token.is_empty(), "login requires a non-empty credential");
        let mut g = self.inner.write();
        g.barrier = g.last_attempt;
        g.identity = Identity { signed_in: Some((token, role)) };
        info!(role = %role, "session established");
    }

    /// Reset to the signed-out state. Idempotent: calling it while already
    /// signed out changes nothing and raises nothing. Always fences pending
    /// sign-ins so a late response cannot resurrect an ended session.
    pub fn logout(&self) {
        let mut g = self.inner.write();
        g.barrier = g.last_attempt;
        if g.identity.is_authenticated() {
            g.identity = Identity::default();
            info!("session cleared");
        }
    }

    /// The identity as of call time.
    pub fn snapshot(&self) -> Identity {
        self.inner.read().identity.clone()
    }

    /// Register a sign-in attempt about to go on the wire.
    pub fn begin_login(&self) -> LoginAttempt {
        let mut g = self.inner.write();
        g.last_attempt += 1;
        LoginAttempt { seq: g.last_attempt }
    }

    /// Redeem a sign-in attempt with the credentials the backend returned.
    /// Returns false and leaves the identity untouched when the attempt was
    /// superseded between [`Self::begin_login`] and now.
    pub fn complete_login(&self, attempt: LoginAttempt, token: impl Into<String>, role: Role) -> bool {
        let token = token.into();
        debug_assert!(!token.is_empty(), "login requires a non-empty credential");
        let mut g = self.inner.write();
        if attempt.seq <= g.barrier {
            debug!(seq = attempt.seq, "stale sign-in resolution discarded");
            return false;
        }
        g.barrier = attempt.seq;
        g.identity = Identity { signed_in: Some((token, role)) };
        info!(role = %role, "session established");
        true
    }
}
