use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;

use hearth_model::{Property, PropertyId, PropertyPatch, User, UserId};

use crate::error::{CoreError, Result};
use crate::store::ports::{PropertiesRepository, PropertyFilter, UsersRepository};

/// PostgreSQL-backed store for users and properties.
///
/// Credentials live in their own table so a `users` row can be fetched
/// and serialized without ever touching the hash.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn new(connection_string: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL database");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(connection_string)
            .await
            .map_err(|e| CoreError::Upstream(format!("failed to connect to PostgreSQL: {e}")))?;

        info!("Successfully connected to PostgreSQL");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema when it does not exist yet. `CREATE TABLE IF NOT
    /// EXISTS` keeps repeated startups idempotent.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to create users table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_credentials (
                user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to create user_credentials table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS properties (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                address TEXT NOT NULL,
                description TEXT,
                price_per_night DOUBLE PRECISION NOT NULL,
                image_url TEXT NOT NULL,
                owner_id UUID NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to create properties table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_properties_owner ON properties (owner_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to create owner index: {e}")))?;

        info!("Database migrations complete");
        Ok(())
    }
}

fn row_to_user(row: &PgRow) -> Result<User> {
    Ok(User {
        id: UserId(
            row.try_get("id")
                .map_err(|e| CoreError::Internal(format!("failed to read user row: {e}")))?,
        ),
        username: row
            .try_get("username")
            .map_err(|e| CoreError::Internal(format!("failed to read user row: {e}")))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| CoreError::Internal(format!("failed to read user row: {e}")))?,
    })
}

fn row_to_property(row: &PgRow) -> Result<Property> {
    let read = |e: sqlx::Error| CoreError::Internal(format!("failed to read property row: {e}"));
    Ok(Property {
        id: PropertyId(row.try_get("id").map_err(read)?),
        title: row.try_get("title").map_err(read)?,
        address: row.try_get("address").map_err(read)?,
        description: row.try_get("description").map_err(read)?,
        price_per_night: row.try_get("price_per_night").map_err(read)?,
        image_url: row.try_get("image_url").map_err(read)?,
        owner: UserId(row.try_get("owner_id").map_err(read)?),
        created_at: row.try_get("created_at").map_err(read)?,
        updated_at: row.try_get("updated_at").map_err(read)?,
    })
}

/// Escape `%`, `_` and `\` so user text matches literally inside an
/// ILIKE pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UsersRepository for PostgresDatabase {
    async fn insert_user(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CoreError::Internal(format!("failed to start transaction: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.username)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some("users_username_key") {
                    return CoreError::Conflict("Username already taken".to_string());
                }
            }
            CoreError::Internal(format!("failed to create user: {e}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_credentials (user_id, password_hash)
            VALUES ($1, $2)
            "#,
        )
        .bind(user.id.0)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to store password: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| CoreError::Internal(format!("failed to commit transaction: {e}")))?;

        info!("Created user: {} ({})", user.username, user.id);
        Ok(())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, created_at FROM users WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to get user by id: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, created_at FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to get user by username: {e}")))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn password_hash(&self, user_id: UserId) -> Result<Option<String>> {
        let hash =
            sqlx::query_scalar::<_, String>(
                "SELECT password_hash FROM user_credentials WHERE user_id = $1",
            )
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to get password hash: {e}")))?;

        Ok(hash)
    }
}

#[async_trait]
impl PropertiesRepository for PostgresDatabase {
    async fn insert(&self, property: &Property) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO properties (
                id, title, address, description, price_per_night,
                image_url, owner_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(property.id.0)
        .bind(&property.title)
        .bind(&property.address)
        .bind(&property.description)
        .bind(property.price_per_night)
        .bind(&property.image_url)
        .bind(property.owner.0)
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to create property: {e}")))?;

        Ok(())
    }

    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, address, description, price_per_night,
                   image_url, owner_id, created_at, updated_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to get property: {e}")))?;

        row.as_ref().map(row_to_property).transpose()
    }

    async fn find_all(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let rows = match filter.address_contains.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                let pattern = format!("%{}%", escape_like(text.trim()));
                sqlx::query(
                    r#"
                    SELECT id, title, address, description, price_per_night,
                           image_url, owner_id, created_at, updated_at
                    FROM properties
                    WHERE address ILIKE $1
                    ORDER BY created_at
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            _ => {
                sqlx::query(
                    r#"
                    SELECT id, title, address, description, price_per_night,
                           image_url, owner_id, created_at, updated_at
                    FROM properties
                    ORDER BY created_at
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| CoreError::Internal(format!("failed to list properties: {e}")))?;

        rows.iter().map(row_to_property).collect()
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Property>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, address, description, price_per_night,
                   image_url, owner_id, created_at, updated_at
            FROM properties
            WHERE owner_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to list owned properties: {e}")))?;

        rows.iter().map(row_to_property).collect()
    }

    async fn update_by_id(
        &self,
        id: PropertyId,
        patch: &PropertyPatch,
    ) -> Result<Option<Property>> {
        let row = sqlx::query(
            r#"
            UPDATE properties
            SET title = $2, address = $3, description = $4,
                price_per_night = $5, image_url = $6, owner_id = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING id, title, address, description, price_per_night,
                      image_url, owner_id, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(&patch.title)
        .bind(&patch.address)
        .bind(&patch.description)
        .bind(patch.price_per_night)
        .bind(&patch.image_url)
        .bind(patch.owner.0)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CoreError::Internal(format!("failed to update property: {e}")))?;

        row.as_ref().map(row_to_property).transpose()
    }

    async fn delete_by_id(&self, id: PropertyId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to delete property: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
