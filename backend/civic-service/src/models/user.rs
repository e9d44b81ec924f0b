use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role attached to every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Citizen,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Citizen => "citizen",
            UserRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// Registered account. Accounts are never hard-deleted; every account owns
/// exactly one points balance in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub pincode: Option<String>,
    pub landmark: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            phone: None,
            pincode: None,
            landmark: None,
            role,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_checks() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Citizen.is_admin());
        assert_eq!(UserRole::Citizen.as_str(), "citizen");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            "Riya".to_string(),
            "riya@example.com".to_string(),
            "argon2-hash".to_string(),
            UserRole::Citizen,
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
    }
}
