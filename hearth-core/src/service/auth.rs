use std::fmt;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use tracing::info;

use hearth_model::{Credentials, User, UserId};

use crate::error::{CoreError, Result};
use crate::store::UsersRepository;

/// Registration and login. The only place passwords are hashed or
/// verified; plaintext never reaches the store.
pub struct AuthService {
    users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepository>) -> Self {
        Self { users }
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<User> {
        credentials
            .validate()
            .map_err(|e| CoreError::InvalidInput(e.to_string()))?;

        let username = credentials.username.trim().to_lowercase();
        if self.users.find_user_by_username(&username).await?.is_some() {
            return Err(CoreError::Conflict("Username already taken".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(credentials.password.as_bytes(), &salt)
            .map_err(|_| CoreError::Internal("failed to hash password".to_string()))?
            .to_string();

        let user = User {
            id: UserId::new(),
            username,
            created_at: Utc::now(),
        };
        self.users.insert_user(&user, &password_hash).await?;

        info!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// "No such user" and "wrong password" are indistinguishable to the
    /// caller; both surface the same `InvalidCredentials`.
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let username = credentials.username.trim().to_lowercase();
        let user = self
            .users
            .find_user_by_username(&username)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        let password_hash = self
            .users
            .password_hash(user.id)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|_| CoreError::Internal("stored password hash is invalid".to_string()))?;

        Argon2::default()
            .verify_password(credentials.password.as_bytes(), &parsed_hash)
            .map_err(|_| CoreError::InvalidCredentials)?;

        Ok(user)
    }
}
