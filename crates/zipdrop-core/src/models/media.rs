use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Who may see a media record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_visibility", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl FromStr for Visibility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(anyhow::anyhow!("Invalid visibility: {}", s)),
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// One shared resource.
///
/// `id`, `key`, `owner_id` and `created_at` never change after insert. `created_at`
/// anchors the TTL clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MediaRecord {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub size: i64,
    pub owner_id: String,
    pub visibility: Visibility,
    /// Set by the removal path before the blob is deleted.
    pub to_be_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at + ttl
    }

    /// True once `now - created_at >= ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }
}

/// True when `key` stays inside the storage root: non-empty, no `..`, not absolute.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/')
}

fn validate_media_key(key: &str) -> Result<(), ValidationError> {
    if is_safe_key(key) {
        Ok(())
    } else {
        Err(ValidationError::new("unsafe_key")
            .with_message("Key must not contain '..' or start with '/'".into()))
    }
}

/// Request DTO for registering an uploaded blob
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct NewMedia {
    #[validate(
        length(
            min = 1,
            max = 256,
            message = "Key must be between 1 and 256 characters"
        ),
        custom(function = "validate_media_key")
    )]
    pub key: String,
    #[validate(length(
        min = 1,
        max = 256,
        message = "Name must be between 1 and 256 characters"
    ))]
    pub name: String,
    #[validate(range(min = 0, message = "Size must not be negative"))]
    pub size: i64,
}

/// Request DTO for editing the mutable fields of a record
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct MediaUpdate {
    #[validate(length(
        min = 1,
        max = 256,
        message = "Name must be between 1 and 256 characters"
    ))]
    pub name: String,
    #[validate(range(min = 0, message = "Size must not be negative"))]
    pub size: i64,
    pub visibility: Visibility,
}

/// Media as returned to API callers. The owner identity is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaResponse {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub size: i64,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When the sweeper becomes eligible to remove this record
    pub expires_at: DateTime<Utc>,
    /// Downloads since creation or the last edit
    pub downloads: i64,
}

impl MediaResponse {
    pub fn from_record(record: MediaRecord, ttl: Duration, downloads: i64) -> Self {
        let expires_at = record.expires_at(ttl);
        MediaResponse {
            id: record.id,
            key: record.key,
            name: record.name,
            size: record.size,
            visibility: record.visibility,
            created_at: record.created_at,
            updated_at: record.updated_at,
            expires_at,
            downloads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_created_at(created_at: DateTime<Utc>) -> MediaRecord {
        MediaRecord {
            id: 1,
            key: "k1".to_string(),
            name: "archive.zip".to_string(),
            size: 1024,
            owner_id: "user_1".to_string(),
            visibility: Visibility::Private,
            to_be_deleted: false,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_expiry_is_inclusive_at_ttl() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let record = record_created_at(created);
        let ttl = Duration::hours(24);

        assert!(!record.is_expired(created + Duration::hours(23), ttl));
        assert!(record.is_expired(created + Duration::hours(24), ttl));
        assert!(record.is_expired(created + Duration::hours(25), ttl));
        assert_eq!(record.expires_at(ttl), created + ttl);
    }

    #[test]
    fn test_visibility_parse_and_default() {
        assert_eq!(Visibility::default(), Visibility::Private);
        assert_eq!("PUBLIC".parse::<Visibility>().unwrap(), Visibility::Public);
        assert!("hidden".parse::<Visibility>().is_err());
        assert_eq!(Visibility::Private.to_string(), "private");
    }

    #[test]
    fn test_new_media_rejects_negative_size() {
        let input = NewMedia {
            key: "k1".to_string(),
            name: "file.zip".to_string(),
            size: -1,
        };
        assert!(input.validate().is_err());

        let ok = NewMedia { size: 0, ..input };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_new_media_rejects_keys_outside_storage_root() {
        for key in ["../evil", "a/../b", "/abs"] {
            let input = NewMedia {
                key: key.to_string(),
                name: "file.zip".to_string(),
                size: 1,
            };
            assert!(input.validate().is_err(), "{} should be rejected", key);
        }

        let nested = NewMedia {
            key: "nested/k1".to_string(),
            name: "file.zip".to_string(),
            size: 1,
        };
        assert!(nested.validate().is_ok());
    }

    #[test]
    fn test_response_omits_owner() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let response =
            MediaResponse::from_record(record_created_at(created), Duration::hours(24), 3);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["downloads"], 3);
        assert_eq!(json["visibility"], "private");
    }
}
