use async_trait::async_trait;

use pantry_core::{NewUser, User, UserId, UserPatch};

use crate::error::StoreError;

/// Trait for account persistence backends.
///
/// Emails are unique across the store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Register a user. Fails with [`StoreError::Conflict`] if the email is
    /// already taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Apply a partial update. Returns `None` if the id is unknown and
    /// [`StoreError::Conflict`] if the new email belongs to another user.
    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<Option<User>, StoreError>;
}
