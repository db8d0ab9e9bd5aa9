//! User types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_commerce::ids::UserId;
use storefront_store::{keys, StoreError, StoredRecord};

/// User role for routing after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Regular shopper. Any unrecognised role string lands here.
    #[default]
    Customer,
    /// Marketplace seller.
    Seller,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "user",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "seller" => Ok(Role::Seller),
            "user" | "customer" => Ok(Role::Customer),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logged-in user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "userId", alias = "_id", alias = "id")]
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl StoredRecord for UserRecord {
    const KEY: &'static str = keys::USER;
    const VERSION: u32 = 1;

    fn migrate(from: u32, data: Value) -> Result<Value, StoreError> {
        match from {
            0 => Ok(data),
            _ => Err(StoreError::UnsupportedVersion {
                key: Self::KEY,
                found: from,
                expected: Self::VERSION,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_is_customer() {
        let user: UserRecord =
            serde_json::from_str(r#"{"userId":"u1","username":"bob","role":"moderator"}"#).unwrap();
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_user_record_accepts_mongo_id() {
        let user: UserRecord =
            serde_json::from_str(r#"{"_id":"65ab","username":"ann","role":"seller","email":"a@b.co"}"#)
                .unwrap();
        assert_eq!(user.user_id.as_str(), "65ab");
        assert_eq!(user.role, Role::Seller);
        assert_eq!(
            serde_json::to_value(&user).unwrap()["role"],
            serde_json::json!("seller")
        );
    }
}
