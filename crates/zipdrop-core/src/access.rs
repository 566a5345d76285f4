//! Access policy
//!
//! Pure decisions about what a [`Capability`] may see or change. Privilege is binary;
//! the owner of a record plays no part in authorization.

use crate::error::AppError;
use crate::models::{Capability, MediaRecord, Visibility};

pub struct AccessPolicy;

impl AccessPolicy {
    /// Public records are visible to everyone, private ones only to privileged callers.
    pub fn can_see(capability: &Capability, record: &MediaRecord) -> bool {
        match record.visibility {
            Visibility::Public => true,
            Visibility::Private => capability.is_privileged(),
        }
    }

    /// Like [`can_see`](Self::can_see), but also hides records that are mid-removal
    /// from non-privileged callers.
    pub fn can_list(capability: &Capability, record: &MediaRecord) -> bool {
        Self::can_see(capability, record) && (capability.is_privileged() || !record.to_be_deleted)
    }

    pub fn can_mutate(capability: &Capability) -> bool {
        capability.is_privileged()
    }

    pub fn ensure_can_mutate(capability: &Capability) -> Result<(), AppError> {
        if Self::can_mutate(capability) {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "Privileged role required for this action".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(visibility: Visibility, to_be_deleted: bool) -> MediaRecord {
        let now = Utc::now();
        MediaRecord {
            id: 7,
            key: "k7".to_string(),
            name: "n".to_string(),
            size: 1,
            owner_id: "someone_else".to_string(),
            visibility,
            to_be_deleted,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_visible_to_everyone() {
        let public = record(Visibility::Public, false);
        assert!(AccessPolicy::can_see(&Capability::anonymous(), &public));
        assert!(AccessPolicy::can_see(&Capability::member("u"), &public));
        assert!(AccessPolicy::can_see(&Capability::privileged("a"), &public));
    }

    #[test]
    fn test_private_only_for_privileged() {
        let private = record(Visibility::Private, false);
        assert!(!AccessPolicy::can_see(&Capability::anonymous(), &private));
        assert!(!AccessPolicy::can_see(&Capability::member("u"), &private));
        assert!(AccessPolicy::can_see(&Capability::privileged("a"), &private));
    }

    #[test]
    fn test_owner_grants_nothing() {
        let mut private = record(Visibility::Private, false);
        private.owner_id = "u".to_string();
        assert!(!AccessPolicy::can_see(&Capability::member("u"), &private));
        assert!(!AccessPolicy::can_mutate(&Capability::member("u")));
    }

    #[test]
    fn test_marked_records_hidden_from_listing() {
        let marked = record(Visibility::Public, true);
        assert!(!AccessPolicy::can_list(&Capability::anonymous(), &marked));
        assert!(AccessPolicy::can_list(&Capability::privileged("a"), &marked));
    }

    #[test]
    fn test_ensure_can_mutate() {
        assert!(AccessPolicy::ensure_can_mutate(&Capability::privileged("a")).is_ok());
        let err = AccessPolicy::ensure_can_mutate(&Capability::anonymous()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
