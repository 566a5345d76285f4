use serde::Serialize;

/// What the current caller is allowed to do, as resolved by the identity provider.
///
/// Privilege is binary. A privileged capability always carries an identity, which
/// becomes the owner of anything it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capability {
    identity: Option<String>,
    is_privileged: bool,
}

impl Capability {
    /// Caller with no resolved identity.
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            is_privileged: false,
        }
    }

    /// Signed-in caller without the privileged role.
    pub fn member(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            is_privileged: false,
        }
    }

    /// Signed-in caller holding the privileged role.
    pub fn privileged(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            is_privileged: true,
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn is_privileged(&self) -> bool {
        self.is_privileged
    }
}
