pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;

use std::sync::Arc;

use tracing::info;

use pantry_core::{NewUser, User, UserId, UserPatch};
use pantry_service::ServiceError;
use pantry_store::{StoreError, UserStore};

use crate::error::ServerError;

use self::identity::CallerIdentity;
use self::jwt::JwtManager;
use self::password::{hash_password, verify_password};

/// Account registration, sign-in and token validation, built once at startup.
pub struct AuthProvider {
    jwt_manager: JwtManager,
    users: Arc<dyn UserStore>,
    enforce: bool,
}

/// A successful sign-in.
pub struct Session {
    pub token: String,
    pub expires_in: u64,
    pub user_id: UserId,
}

impl AuthProvider {
    pub fn new(jwt_manager: JwtManager, users: Arc<dyn UserStore>, enforce: bool) -> Self {
        Self {
            jwt_manager,
            users,
            enforce,
        }
    }

    /// Whether protected routes require a bearer token.
    pub fn enforced(&self) -> bool {
        self.enforce
    }

    /// Register a new account. A taken email is a client error.
    pub async fn signup(
        &self,
        fullname: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ServerError> {
        if password.is_empty() {
            return Err(ServerError::BadRequest("password must not be empty".into()));
        }
        let hash = hash_blocking(password.to_owned()).await?;
        let new_user = NewUser::new(fullname, email, hash).map_err(ServiceError::from)?;
        let user = self.users.insert(new_user).await.map_err(user_store_error)?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a token.
    ///
    /// An unknown email is `NotFound`, a wrong password `BadRequest`.
    pub async fn signin(&self, email: &str, password: &str) -> Result<Session, ServerError> {
        let email = pantry_core::normalize_email(email).map_err(ServiceError::from)?;
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(ServiceError::from)?
            .ok_or_else(|| ServerError::NotFound("user not found, please sign up".into()))?;

        if !verify_blocking(user.password_hash.clone(), password.to_owned()).await? {
            return Err(ServerError::BadRequest("invalid email or password".into()));
        }

        let (token, expires_in) = self
            .jwt_manager
            .issue_token(user.id, &user.email)
            .map_err(ServerError::Config)?;
        info!(user_id = %user.id, "user signed in");
        Ok(Session {
            token,
            expires_in,
            user_id: user.id,
        })
    }

    /// Change any of name, email and password. The password is re-hashed.
    pub async fn update_user(
        &self,
        id: UserId,
        fullname: Option<String>,
        email: Option<String>,
        password: Option<&str>,
    ) -> Result<User, ServerError> {
        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(plain) => Some(hash_blocking(plain.to_owned()).await?),
            None => None,
        };
        let mut patch = UserPatch {
            fullname,
            email,
            password_hash,
        };
        patch.validate().map_err(ServiceError::from)?;

        let user = self
            .users
            .update(id, &patch)
            .await
            .map_err(user_store_error)?
            .ok_or_else(|| ServerError::NotFound("user not found".into()))?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Validate a bearer token.
    pub fn validate_jwt(&self, token: &str) -> Result<CallerIdentity, String> {
        self.jwt_manager.validate_token(token)
    }
}

// argon2 is CPU-bound; keep it off the async workers.
async fn hash_blocking(plain: String) -> Result<String, ServerError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| ServerError::Config(format!("password hashing task failed: {e}")))?
        .map_err(ServerError::Config)
}

async fn verify_blocking(hash: String, candidate: String) -> Result<bool, ServerError> {
    tokio::task::spawn_blocking(move || verify_password(&hash, &candidate))
        .await
        .map_err(|e| ServerError::Config(format!("password check task failed: {e}")))
}

fn user_store_error(err: StoreError) -> ServerError {
    match err {
        StoreError::Conflict(_) => {
            ServerError::BadRequest("user already exists, please sign in".into())
        }
        other => ServiceError::from(other).into(),
    }
}

#[cfg(test)]
mod tests {
    use pantry_store_memory::MemoryUserStore;

    use super::*;

    fn provider() -> AuthProvider {
        AuthProvider::new(
            JwtManager::new("test-secret", 3600),
            Arc::new(MemoryUserStore::new()),
            true,
        )
    }

    #[tokio::test]
    async fn signup_then_signin() {
        let auth = provider();
        let user = auth.signup("Ada", "Ada@Example.com", "pw").await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "pw");

        let session = auth.signin("ada@example.com", "pw").await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.expires_in, 3600);
        let identity = auth.validate_jwt(&session.token).unwrap();
        assert_eq!(identity.user_id, Some(user.id));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_signups_hash_off_the_workers() {
        let auth = Arc::new(provider());
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let auth = Arc::clone(&auth);
                tokio::spawn(async move {
                    auth.signup("User", &format!("user{i}@example.com"), "pw").await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        for i in 0..8 {
            assert!(auth.signin(&format!("user{i}@example.com"), "pw").await.is_ok());
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_hash_verifies() {
        let hash = hash_blocking("pw".to_owned()).await.unwrap();
        assert!(verify_blocking(hash.clone(), "pw".to_owned()).await.unwrap());
        assert!(!verify_blocking(hash, "nope".to_owned()).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_signup_is_bad_request() {
        let auth = provider();
        auth.signup("Ada", "ada@example.com", "pw").await.unwrap();
        let err = auth.signup("Ada", "ada@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn signin_failures() {
        let auth = provider();
        auth.signup("Ada", "ada@example.com", "pw").await.unwrap();

        assert!(matches!(
            auth.signin("nobody@example.com", "pw").await,
            Err(ServerError::NotFound(_))
        ));
        assert!(matches!(
            auth.signin("ada@example.com", "wrong").await,
            Err(ServerError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn update_rehashes_password() {
        let auth = provider();
        let user = auth.signup("Ada", "ada@example.com", "old").await.unwrap();

        let updated = auth
            .update_user(user.id, Some("Ada L".into()), None, Some("new"))
            .await
            .unwrap();
        assert_eq!(updated.fullname, "Ada L");
        assert!(auth.signin("ada@example.com", "new").await.is_ok());
        assert!(auth.signin("ada@example.com", "old").await.is_err());
    }

    #[tokio::test]
    async fn update_unknown_or_empty() {
        let auth = provider();
        assert!(matches!(
            auth.update_user(UserId::new_v4(), Some("X".into()), None, None).await,
            Err(ServerError::NotFound(_))
        ));
        let user = auth.signup("Ada", "ada@example.com", "pw").await.unwrap();
        assert!(matches!(
            auth.update_user(user.id, None, None, None).await,
            Err(ServerError::Service(ServiceError::Validation(_)))
        ));
    }
}
