/// The active user identity attached to outbound requests as headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl UserIdentity {
    /// Fixed identity substituted when no real identity is available.
    /// Dispatching must never block on a missing sign-in.
    pub fn demo() -> Self {
        Self {
            uid: "demo-user".to_string(),
            email: "demo@biochat.local".to_string(),
            display_name: "Demo User".to_string(),
            photo_url: None,
        }
    }
}

/// Source of the current identity. `None` means nobody is signed in and
/// the demo fallback applies.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<UserIdentity>;
}

/// Provider backed by a fixed, optionally absent identity.
pub struct StaticIdentityProvider {
    identity: Option<UserIdentity>,
}

impl StaticIdentityProvider {
    pub fn new(identity: Option<UserIdentity>) -> Self {
        Self { identity }
    }

    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> Option<UserIdentity> {
        self.identity.clone()
    }
}
