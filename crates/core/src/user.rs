use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::UserId;

/// A registered account. Items refer to users only by [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[cfg_attr(feature = "openapi", schema(example = "Ada Lovelace"))]
    pub fullname: String,
    #[cfg_attr(feature = "openapi", schema(example = "ada@example.com"))]
    pub email: String,
    /// PHC-formatted password hash. Never leaves the process.
    #[serde(skip_serializing, default)]
    #[cfg_attr(feature = "openapi", schema(ignore))]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_new(new: NewUser, id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            fullname: new.fullname,
            email: new.email,
            password_hash: new.password_hash,
            created_at,
        }
    }
}

/// Validated input for registering a user. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(
        fullname: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let fullname = fullname.into();
        let email = normalize_email(&email.into())?;
        let password_hash = password_hash.into();
        if fullname.trim().is_empty() {
            return Err(ValidationError::BlankField("fullname"));
        }
        if password_hash.is_empty() {
            return Err(ValidationError::BlankField("password"));
        }
        Ok(Self {
            fullname,
            email,
            password_hash,
        })
    }
}

/// Partial account update. The password, when present, is already hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.fullname.is_none() && self.email.is_none() && self.password_hash.is_none() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(fullname) = &self.fullname
            && fullname.trim().is_empty()
        {
            return Err(ValidationError::BlankField("fullname"));
        }
        if let Some(email) = &self.email {
            self.email = Some(normalize_email(email)?);
        }
        Ok(())
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(fullname) = &self.fullname {
            fullname.clone_into(&mut user.fullname);
        }
        if let Some(email) = &self.email {
            email.clone_into(&mut user.email);
        }
        if let Some(hash) = &self.password_hash {
            hash.clone_into(&mut user.password_hash);
        }
    }
}

/// Trim and lowercase an address, rejecting anything without a local part
/// and a domain.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::BlankField("email"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ValidationError::Invalid {
            field: "email",
            reason: "expected an address like name@example.com".into(),
        }),
    }
}
