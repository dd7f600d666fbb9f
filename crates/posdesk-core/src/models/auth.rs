use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Roles the API hands out. The set is closed; anything else is rejected
/// when a login response is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Owner,
    Admin,
    Cashier,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "OWNER",
            UserRole::Admin => "ADMIN",
            UserRole::Cashier => "CASHIER",
        }
    }

    /// Admin screens are open to admins and owners.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Owner)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(UserRole::Owner),
            "ADMIN" => Ok(UserRole::Admin),
            "CASHIER" => Ok(UserRole::Cashier),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub email: String,
    pub role: UserRole,
}

/// Token, username and role returned by both login and register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtAuthResponse {
    pub token: String,
    pub username: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_is_admin() {
        assert!(UserRole::Owner.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Cashier.is_admin());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(" OWNER ".parse::<UserRole>(), Ok(UserRole::Owner));
        assert!("MANAGER".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"token":"eyJhbGciOi","username":"mya","role":"CASHIER"}"#;
        let resp: JwtAuthResponse = serde_json::from_str(json).expect("valid auth json");
        assert_eq!(resp.role, UserRole::Cashier);
        assert_eq!(resp.username, "mya");
    }

    #[test]
    fn test_auth_response_rejects_unknown_role() {
        let json = r#"{"token":"t","username":"u","role":"SUPERUSER"}"#;
        assert!(serde_json::from_str::<JwtAuthResponse>(json).is_err());
    }
}
