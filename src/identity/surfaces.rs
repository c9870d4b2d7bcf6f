use std::collections::BTreeSet;

use super::role::Role;
use super::store::Identity;

/// Navigable surface tags. The composer's output drives both which screens
/// resolve and which navigation entries the console offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Surface {
    Home,
    Login,
    Register,
    MyProjects,
    Sessions,
}

/// Pure mapping from the current identity to the set of active surfaces.
///
/// The tiers are computed independently and unioned: the unauthenticated
/// tier replaces everything, the generic authenticated tier contributes
/// home, and the role tier adds on top of it. Role surfaces are additive to
/// the generic authenticated surface, never a replacement for it.
pub fn surfaces_for(identity: &Identity) -> BTreeSet<Surface> {
    let mut active = BTreeSet::new();

    if !identity.is_authenticated() {
        active.insert(Surface::Login);
        active.insert(Surface::Register);
        return active;
    }

    active.insert(Surface::Home);

    // Exhaustive over the closed role enumeration; adding a role forces a
    // decision here at compile time.
    match identity.role() {
        Some(Role::User) => {
            active.insert(Surface::MyProjects);
        }
        Some(Role::Admin) => {
            active.insert(Surface::Sessions);
        }
        // Unreachable past the early return: token and role travel together.
        None => {}
    }

    active
}
