use tracing::debug;

use super::role::Role;
use super::store::Identity;

/// Screen-level authorization checks. A guard never raises: each navigation
/// attempt is either granted or redirected to the login entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Any signed-in identity may pass.
    SignedIn,
    /// Only a signed-in identity carrying the ADMIN role may pass.
    AdminOnly,
}

/// Outcome of evaluating a guard for one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Grant,
    RedirectToLogin,
}

impl Guard {
    /// Evaluate against a single identity snapshot. Callers take the
    /// snapshot once per navigation attempt; the store replaces identity
    /// atomically, so the decision can never see a token without its role.
    pub fn evaluate(&self, identity: &Identity) -> Access {
        match self {
            Guard::SignedIn => {
                if identity.is_authenticated() {
                    Access::Grant
                } else {
                    debug!("navigation denied: not signed in");
                    Access::RedirectToLogin
                }
            }
            Guard::AdminOnly => match identity.role() {
                Some(Role::Admin) => Access::Grant,
                Some(Role::User) => {
                    // Wrong role and missing identity take the same redirect;
                    // only the log line tells them apart.
                    debug!("navigation denied: admin role required");
                    Access::RedirectToLogin
                }
                None => {
                    debug!("navigation denied: not signed in");
                    Access::RedirectToLogin
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionStore;

    #[test]
    fn signed_in_guard_gates_on_token_presence() {
        let store = SessionStore::new();
        assert_eq!(Guard::SignedIn.evaluate(&store.snapshot()), Access::RedirectToLogin);
        store.login("t", Role::User);
        assert_eq!(Guard::SignedIn.evaluate(&store.snapshot()), Access::Grant);
        store.logout();
        assert_eq!(Guard::SignedIn.evaluate(&store.snapshot()), Access::RedirectToLogin);
    }

    #[test]
    fn admin_guard_requires_token_and_admin_role() {
        let store = SessionStore::new();
        assert_eq!(Guard::AdminOnly.evaluate(&store.snapshot()), Access::RedirectToLogin);
        store.login("t", Role::User);
        assert_eq!(Guard::AdminOnly.evaluate(&store.snapshot()), Access::RedirectToLogin);
        store.login("t", Role::Admin);
        assert_eq!(Guard::AdminOnly.evaluate(&store.snapshot()), Access::Grant);
    }
}
