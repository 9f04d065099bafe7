//! Account identities known to the shop.
//!
//! Customers and sellers live in separate account spaces that share the same
//! key shape (a username). They are modeled as two tagged variants so a single
//! resolver can serve both.

use serde::{Deserialize, Serialize};

use faishion_core::Username;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    /// Shopper account (asks questions).
    Customer,
    /// Merchant account (answers questions).
    Seller,
}

impl core::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Customer => f.write_str("customer"),
            Self::Seller => f.write_str("seller"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "username", rename_all = "lowercase")]
pub enum Identity {
    Customer(Username),
    Seller(Username),
}

impl Identity {
    pub fn new(kind: IdentityKind, username: Username) -> Self {
        match kind {
            IdentityKind::Customer => Self::Customer(username),
            IdentityKind::Seller => Self::Seller(username),
        }
    }

    pub fn kind(&self) -> IdentityKind {
        match self {
            Self::Customer(_) => IdentityKind::Customer,
            Self::Seller(_) => IdentityKind::Seller,
        }
    }

    pub fn username(&self) -> &Username {
        match self {
            Self::Customer(u) | Self::Seller(u) => u,
        }
    }

    pub fn into_username(self) -> Username {
        match self {
            Self::Customer(u) | Self::Seller(u) => u,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_kind_and_username() {
        let id = Identity::new(IdentityKind::Seller, Username::parse("shop").unwrap());
        assert_eq!(id.kind(), IdentityKind::Seller);
        assert_eq!(id.username().as_str(), "shop");
        assert_eq!(
            serde_json::to_value(&id).unwrap(),
            serde_json::json!({ "kind": "seller", "username": "shop" })
        );
    }
}
