//! Client-side identity: who is signed in, with what role, and what that
//! allows. Keep the public surface thin and split implementation across
//! sub-modules.

mod role;
mod store;
mod accessor;
mod guard;
mod surfaces;

pub use role::{Role, UnknownRole};
pub use store::{Identity, LoginAttempt, SessionStore};
pub use accessor::SessionAccessor;
pub use guard::{Access, Guard};
pub use surfaces::{surfaces_for, Surface};
