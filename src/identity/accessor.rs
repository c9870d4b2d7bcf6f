use std::sync::Arc;

use super::role::Role;
use super::store::{Identity, LoginAttempt, SessionStore};

/// Read view over the session store plus forwarding for its two mutation
/// entry points. Holds no state of its own; every answer reflects the store
/// at the moment of the call. All code outside the store reads identity
/// through this layer, so the derivation rules live in exactly one place.
#[derive(Clone)]
pub struct SessionAccessor {
    store: Arc<SessionStore>,
}

impl SessionAccessor {
    pub fn new(store: Arc<SessionStore>) -> SessionAccessor {
        SessionAccessor { store }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.snapshot().is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.store.snapshot().token().map(str::to_string)
    }

    pub fn role(&self) -> Option<Role> {
        self.store.snapshot().role()
    }

    pub fn snapshot(&self) -> Identity {
        self.store.snapshot()
    }

    pub fn login(&self, token: impl Into<String>, role: Role) {
        self.store.login(token, role)
    }

    pub fn logout(&self) {
        self.store.logout()
    }

    pub fn begin_login(&self) -> LoginAttempt {
        self.store.begin_login()
    }

    pub fn complete_login(&self, attempt: LoginAttempt, token: impl Into<String>, role: Role) -> bool {
        self.store.complete_login(attempt, token, role)
    }
}
