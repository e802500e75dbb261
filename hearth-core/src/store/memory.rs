use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use hearth_model::{Property, PropertyId, PropertyPatch, User, UserId};

use crate::error::{CoreError, Result};
use crate::store::ports::{PropertiesRepository, PropertyFilter, UsersRepository};

#[derive(Debug)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-memory store implementing the same ports as [`super::PostgresDatabase`].
///
/// Backs the test suites and demo runs without a running Postgres; the
/// observable semantics match, including duplicate-username conflicts and
/// insertion-order listing.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    users: RwLock<Vec<StoredUser>>,
    properties: RwLock<Vec<Property>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepository for MemoryDatabase {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user.username == user.username) {
            return Err(CoreError::Conflict("Username already taken".to_string()));
        }
        users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user.id == id).map(|u| u.user.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.user.username == username)
            .map(|u| u.user.clone()))
    }

    async fn password_hash(&self, user_id: UserId) -> Result<Option<String>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.password_hash.clone()))
    }
}

#[async_trait]
impl PropertiesRepository for MemoryDatabase {
    async fn insert(&self, property: &Property) -> Result<()> {
        self.properties.write().await.push(property.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>> {
        let properties = self.properties.read().await;
        Ok(properties.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let properties = self.properties.read().await;
        match filter.address_contains.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                let needle = text.trim().to_lowercase();
                Ok(properties
                    .iter()
                    .filter(|p| p.address.to_lowercase().contains(&needle))
                    .cloned()
                    .collect())
            }
            _ => Ok(properties.clone()),
        }
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Property>> {
        let properties = self.properties.read().await;
        Ok(properties
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    async fn update_by_id(
        &self,
        id: PropertyId,
        patch: &PropertyPatch,
    ) -> Result<Option<Property>> {
        let mut properties = self.properties.write().await;
        let Some(property) = properties.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        property.apply_patch(patch, Utc::now());
        Ok(Some(property.clone()))
    }

    async fn delete_by_id(&self, id: PropertyId) -> Result<bool> {
        let mut properties = self.properties.write().await;
        let before = properties.len();
        properties.retain(|p| p.id != id);
        Ok(properties.len() < before)
    }
}
