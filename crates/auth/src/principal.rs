use faishion_core::Username;

use crate::{Permission, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API derives it
/// from token claims plus a role→permission policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: Username,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(username: Username, roles: Vec<Role>, permissions: Vec<Permission>) -> Self {
        Self {
            username,
            roles,
            permissions,
        }
    }

    /// True when `authorize` would grant `required`.
    pub fn can(&self, required: &Permission) -> bool {
        crate::authorize(self, required).is_ok()
    }
}
