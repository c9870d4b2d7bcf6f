use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed privilege classification issued by the platform backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

/// A wire role value outside the closed enumeration. The backend owns role
/// issuance; anything it sends that we do not recognize is a contract
/// violation and must not grant a role-specific surface.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    /// Parse the backend's role field. The backend upper-cases roles on the
    /// wire; accept any casing, reject everything outside the enumeration.
    pub fn from_wire(raw: &str) -> Result<Role, UnknownRole> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(UnknownRole(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
