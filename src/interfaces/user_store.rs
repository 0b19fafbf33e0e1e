//! Credential store interface.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result type for credential store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during credential store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("User not found: id={0}")]
    NotFound(i64),

    #[error("Corrupt user row: {0}")]
    CorruptRow(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// A stored user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    /// Hex SHA-256 of the password.
    pub password_hash: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub phone_no: String,
    pub r_address: String,
    pub gender: String,
    pub age: i64,
    pub dob: NaiveDate,
}

/// Fields for a registration insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub profile: UserProfile,
}

/// Fields for a profile update. The password is not editable here.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub username: String,
    pub profile: UserProfile,
}

/// Persistent user accounts.
///
/// Username uniqueness is enforced by the backing store; a collision on
/// insert or update surfaces as [`StoreError::UsernameTaken`].
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Create tables and indexes if they don't exist.
    async fn init_schema(&self) -> Result<()>;

    /// Find the user whose username and password hash both match.
    async fn find_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>>;

    /// Insert a new user, returning its id.
    async fn insert_user(&self, user: &NewUser) -> Result<i64>;

    /// Overwrite username and profile fields of an existing user.
    async fn update_user(&self, id: i64, update: &ProfileUpdate) -> Result<()>;
}
