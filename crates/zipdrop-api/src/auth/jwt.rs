use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use zipdrop_core::{AppError, Capability};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: String,
    /// Expiration timestamp
    pub exp: i64,
}

/// HS256 token verification, mapping claims onto a [`Capability`].
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_role: String,
}

impl JwtService {
    pub fn new(secret: &str, admin_role: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            admin_role: admin_role.to_string(),
        }
    }

    /// Issue a token for `sub` holding `role`, valid for `ttl`.
    pub fn issue(&self, sub: &str, role: &str, ttl: Duration) -> Result<String, AppError> {
        let claims = JwtClaims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Validation(format!("Failed to issue token: {}", e)))
    }

    /// Validate `token` and resolve the caller's capability.
    pub fn resolve(&self, token: &str) -> Result<Capability, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
            },
        )?;

        let claims = token_data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("Token has no subject".to_string()));
        }
        if claims.role == self.admin_role {
            Ok(Capability::privileged(claims.sub))
        } else {
            Ok(Capability::member(claims.sub))
        }
    }
}
