use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{User, UserRole};

/// Caller identity recovered from a session token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject (user ID)
    sub: String,
    /// Account role
    role: String,
    /// Issued at (Unix timestamp)
    iat: i64,
    /// Expiration time (Unix timestamp)
    exp: i64,
}

/// Credential hashing and HS256 session tokens
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a session token for the account
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate a token and recover the caller's identity
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;

        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Authentication("invalid token subject".to_string()))?;
        let role = match data.claims.role.as_str() {
            "admin" => UserRole::Admin,
            "citizen" => UserRole::Citizen,
            other => {
                return Err(AppError::Authentication(format!(
                    "unknown role in token: {other}"
                )))
            }
        };

        Ok(AuthenticatedUser { id, role })
    }

    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("stored password hash is invalid: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: UserRole) -> User {
        User::new(
            "Riya".to_string(),
            "riya@example.com".to_string(),
            "hash".to_string(),
            role,
        )
    }

    #[test]
    fn test_token_roundtrip() {
        let sessions = SessionService::new("test-secret", 24);
        let user = sample_user(UserRole::Admin);

        let token = sessions.issue(&user).unwrap();
        let identity = sessions.verify(&token).unwrap();
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.role, UserRole::Admin);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let sessions = SessionService::new("test-secret", 24);
        let other = SessionService::new("other-secret", 24);
        let token = sessions.issue(&sample_user(UserRole::Citizen)).unwrap();

        assert!(other.verify(&token).is_err());
        assert!(sessions.verify("not-a-token").is_err());
    }

    #[test]
    fn test_password_hash_verify() {
        let hash = SessionService::hash_password("hunter2hunter2").unwrap();
        assert!(SessionService::verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!SessionService::verify_password("wrong-password", &hash).unwrap());
    }
}
