use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use pantry_core::UserId;

use super::identity::CallerIdentity;

/// JWT claims embedded in issued tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    /// Unique token ID.
    pub jti: String,
    /// Email at the time of sign-in.
    pub email: String,
    /// Expiry (seconds since epoch).
    pub exp: usize,
}

/// Issues and validates HMAC-signed session tokens.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Issue a token for `user`. Returns the token and its lifetime in seconds.
    pub fn issue_token(&self, user: UserId, email: &str) -> Result<(String, u64), String> {
        #[allow(clippy::cast_possible_truncation)]
        let exp = (jsonwebtoken::get_current_timestamp() + self.expiry_seconds) as usize;

        let claims = Claims {
            sub: user.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            email: email.to_owned(),
            exp,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| format!("JWT encoding failed: {e}"))?;
        Ok((token, self.expiry_seconds))
    }

    /// Check signature and expiry and recover the caller.
    pub fn validate_token(&self, token: &str) -> Result<CallerIdentity, String> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| format!("invalid token: {e}"))?;

        let user_id = token_data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|e| format!("invalid subject in token: {e}"))?;
        Ok(CallerIdentity::user(user_id))
    }
}
