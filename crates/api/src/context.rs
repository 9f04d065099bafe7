use faishion_auth::Role;
use faishion_core::Username;

/// Principal context for a request (authenticated identity + roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    username: Username,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(username: Username, roles: Vec<Role>) -> Self {
        Self { username, roles }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

/// Who made the request. Present on every routed request; anonymous when no
/// bearer token was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext(Option<PrincipalContext>);

impl CallerContext {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(principal: PrincipalContext) -> Self {
        Self(Some(principal))
    }

    pub fn principal(&self) -> Option<&PrincipalContext> {
        self.0.as_ref()
    }
}
