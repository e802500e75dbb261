use async_trait::async_trait;
use hearth_model::{Property, PropertyId, PropertyPatch, User, UserId};

use crate::error::Result;

/// Listing query filter: empty matches everything, otherwise a
/// case-insensitive substring match over the address field.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub address_contains: Option<String>,
}

impl PropertyFilter {
    pub fn address_contains(text: impl Into<String>) -> Self {
        Self {
            address_contains: Some(text.into()),
        }
    }
}

/// User records and their credentials.
///
/// Username uniqueness is enforced here, at the store layer.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Persist a new user together with their password hash. Fails with
    /// `Conflict` when the username is already taken.
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// The stored hash for a user, `None` when the user has no
    /// credentials row.
    async fn password_hash(&self, user_id: UserId) -> Result<Option<String>>;
}

/// Property records. Ownership checks are the service layer's
/// responsibility; these operations trust their caller.
#[async_trait]
pub trait PropertiesRepository: Send + Sync {
    async fn insert(&self, property: &Property) -> Result<()>;

    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>>;

    /// Materialized result set in insertion order.
    async fn find_all(&self, filter: &PropertyFilter) -> Result<Vec<Property>>;

    /// Exact-match filter on the owner field.
    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Property>>;

    /// Full-document replace. Returns the updated record, `None` when the
    /// id does not exist.
    async fn update_by_id(&self, id: PropertyId, patch: &PropertyPatch)
    -> Result<Option<Property>>;

    /// Returns `false` when the id does not exist.
    async fn delete_by_id(&self, id: PropertyId) -> Result<bool>;
}
