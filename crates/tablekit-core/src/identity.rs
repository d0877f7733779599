//! Identity of the user on whose behalf listing requests are made

use serde::{Deserialize, Serialize};

/// The signed-in user as seen by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub role: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }
}

/// Source of the current user identity
///
/// Implementations wrap whatever session mechanism the host uses.
pub trait IdentityProvider: Send + Sync {
    /// The current user, or `None` when nobody is signed in
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Identity provider returning a fixed identity
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<UserIdentity>);

impl StaticIdentity {
    pub fn new(user: UserIdentity) -> Self {
        Self(Some(user))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}
