//! API-side authorization helpers.
//!
//! Roles from the token are turned into permissions here, before any use case
//! runs; the service layer only sees a resolved `Principal`.

use faishion_auth::{AuthzError, Permission, Principal, Role, authorize};
use faishion_qna::Reader;

use crate::context::PrincipalContext;

/// Build the authorization principal for the request's caller.
pub fn principal_from_context(ctx: &PrincipalContext) -> Principal {
    Principal::new(
        ctx.username().clone(),
        ctx.roles().to_vec(),
        permissions_from_roles(ctx.roles()),
    )
}

/// Check a single permission in the current request context.
pub fn require_permission(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    authorize(principal, required)
}

/// Reader used when rendering board listings and details.
pub fn reader_for(principal: Option<&Principal>) -> Reader<'_> {
    match principal {
        None => Reader::anonymous(),
        Some(p) if p.can(&Permission::QNA_READ_SECRET) => Reader::staff(&p.username),
        Some(p) => Reader::member(&p.username),
    }
}

/// Static role→permission policy.
///
/// Convention: "admin" grants all permissions.
pub fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.contains(&Role::ADMIN) {
        return vec![Permission::WILDCARD];
    }

    let mut perms = Vec::new();
    if roles.contains(&Role::USER) {
        perms.push(Permission::QNA_ASK);
    }
    if roles.contains(&Role::SELLER) {
        perms.push(Permission::QNA_ANSWER);
        perms.push(Permission::QNA_READ_SECRET);
    }
    perms
}
