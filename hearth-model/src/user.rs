use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::ids::UserId;

/// A registered account.
///
/// The password hash is deliberately not part of this record; it lives in
/// the credentials store and never crosses the API boundary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Username/password pair, the body of both register and login requests.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both fields must be present and non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}
