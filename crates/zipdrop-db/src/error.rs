use zipdrop_core::AppError;

/// Failure reported by a metadata or counter store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Validation(msg),
            other => AppError::upstream("data store", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipdrop_core::ErrorKind;

    #[test]
    fn test_store_errors_map_to_app_errors() {
        let err: AppError = StoreError::Unavailable("connection refused".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);

        let err: AppError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);

        let err: AppError = StoreError::Conflict("duplicate key".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }
}
