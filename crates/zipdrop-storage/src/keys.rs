//! Key validation shared by all backends.

use crate::traits::{StorageError, StorageResult};
use zipdrop_core::models::is_safe_key;

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if !is_safe_key(key) {
        return Err(StorageError::InvalidKey(format!(
            "Storage key '{}' contains invalid characters",
            key
        )));
    }
    Ok(())
}

/// Location of the display-name sidecar for `key`.
pub fn name_sidecar_key(key: &str) -> String {
    format!("{}.name", key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("abc-123.zip").is_ok());
        assert!(validate_key("nested/abc.zip").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/abs").is_err());
    }

    #[test]
    fn test_sidecar_key() {
        assert_eq!(name_sidecar_key("k1"), "k1.name");
    }
}
