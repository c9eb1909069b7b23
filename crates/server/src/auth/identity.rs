use pantry_core::UserId;

use crate::error::ServerError;

/// Caller identity extracted from authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Authenticated user, or `None` when protection is off.
    pub user_id: Option<UserId>,
}

impl CallerIdentity {
    /// An identity with access to every user's data (used when auth is not
    /// enforced).
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user(user_id: UserId) -> Self {
        Self { user_id: Some(user_id) }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Allow the call only if the caller is `owner` or anonymous.
    pub fn authorize(&self, owner: &UserId) -> Result<(), ServerError> {
        match self.user_id {
            Some(id) if id != *owner => Err(ServerError::Forbidden(
                "cannot access another user's data".to_owned(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_may_access_anyone() {
        assert!(CallerIdentity::anonymous().authorize(&UserId::new_v4()).is_ok());
    }

    #[test]
    fn user_may_access_only_self() {
        let me = UserId::new_v4();
        let caller = CallerIdentity::user(me);
        assert!(caller.authorize(&me).is_ok());
        assert!(matches!(
            caller.authorize(&UserId::new_v4()),
            Err(ServerError::Forbidden(_))
        ));
    }
}
