use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use pantry_core::{NewUser, User, UserId, UserPatch};
use pantry_store::{StoreError, UserStore};

/// In-memory user store backed by [`DashMap`], with a unique email index.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<UserId, User>,
    by_email: DashMap<String, UserId>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(email: &str) -> StoreError {
        StoreError::Conflict(format!("email already registered: {email}"))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let user = User::from_new(user, UserId::new_v4(), Utc::now());
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(Self::email_taken(&user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.by_email.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.get(id).await
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<Option<User>, StoreError> {
        // The user's entry stays locked until the index swap is done. Nothing
        // holds an email index guard while waiting on `users`.
        let Some(mut entry) = self.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(email) = patch.email.as_ref().filter(|email| **email != entry.email) {
            match self.by_email.entry(email.clone()) {
                Entry::Occupied(_) => return Err(Self::email_taken(email)),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.by_email.remove(&entry.email);
        }

        patch.apply(entry.value_mut());
        Ok(Some(entry.value().clone()))
    }
}
