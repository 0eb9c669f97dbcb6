/// Session tokens
///
/// Every sign-in hands out a pair of HS256 tokens carrying the user ID as
/// `sub`: an access token sent with each board request, and a refresh token
/// that is only good for minting a new access token. The `kind` claim keeps
/// the two apart.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{TokenKeys, TokenKind};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let keys = TokenKeys::new("a-secret-of-at-least-thirty-two-bytes");
/// let user_id = Uuid::new_v4();
///
/// let pair = keys.issue_pair(user_id)?;
/// let claims = keys.verify(&pair.access_token, TokenKind::Access)?;
/// assert_eq!(claims.sub, user_id);
///
/// let renewed = keys.refresh(&pair.refresh_token)?;
/// assert!(keys.verify(&renewed, TokenKind::Access).is_ok());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `iss` claim written into and required on every token
pub const ISSUER: &str = "taskboard";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Token has expired")]
    Expired,

    #[error("Expected {expected:?} token, got {found:?}")]
    WrongKind { expected: TokenKind, found: TokenKind },

    #[error("Invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// How long a freshly issued token of this kind stays valid
    pub fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::hours(24),
            TokenKind::Refresh => Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

impl Claims {
    pub fn new(user_id: Uuid, kind: TokenKind, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            kind,
        }
    }
}

/// Tokens handed out at sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signing and verification keys derived from the server secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signs a token of `kind` for a user
    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String, TokenError> {
        self.sign(&Claims::new(user_id, kind, kind.lifetime()))
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    /// Checks signature, issuer and expiry, then requires `expected` kind
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?
            .claims;

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                found: claims.kind,
            });
        }

        Ok(claims)
    }

    /// Trades a refresh token for a new access token
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;
        self.issue(claims.sub, TokenKind::Access)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_issue_and_verify() {
        let keys = TokenKeys::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id, TokenKind::Access).unwrap();
        let claims = keys.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, Duration::hours(24).num_seconds());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = TokenKeys::new(SECRET)
            .issue(Uuid::new_v4(), TokenKind::Access)
            .unwrap();

        let err = TokenKeys::new("some-other-secret-of-enough-length")
            .verify(&token, TokenKind::Access)
            .unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_expired_token() {
        let keys = TokenKeys::new(SECRET);
        let claims = Claims::new(Uuid::new_v4(), TokenKind::Access, Duration::hours(-1));
        let token = keys.sign(&claims).unwrap();

        assert!(matches!(
            keys.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let keys = TokenKeys::new(SECRET);
        let user_id = Uuid::new_v4();
        let pair = keys.issue_pair(user_id).unwrap();

        assert!(matches!(
            keys.verify(&pair.refresh_token, TokenKind::Access),
            Err(TokenError::WrongKind {
                expected: TokenKind::Access,
                found: TokenKind::Refresh
            })
        ));
        assert!(keys.refresh(&pair.access_token).is_err());

        let renewed = keys.refresh(&pair.refresh_token).unwrap();
        assert_eq!(keys.verify(&renewed, TokenKind::Access).unwrap().sub, user_id);
    }
}
