//! Bearer tokens: HS256 JWTs whose subject is the account ID.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use grocery_core::{Account, AccountId};

use super::AuthError;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID, as a decimal string.
    pub sub: String,
    /// Display name at issue time. Informational only.
    pub name: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// A token handed out at login.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// The result of a successful signature and expiry check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub account_id: AccountId,
}

/// Issues and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenAuthenticator {
    /// Create an authenticator from a signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl,
        }
    }

    /// Issue a token for `account`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn issue(&self, account: &Account) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: account.id.to_string(),
            name: account.name.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        };

        Ok(IssuedToken {
            access_token: self.sign(&claims)?,
            token_type: "Bearer",
            expires_in: self.ttl.as_secs(),
        })
    }

    /// Sign arbitrary claims with this authenticator's key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssue` if signing fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(AuthError::TokenIssue)
    }

    /// Verify a presented credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` for a malformed, expired, or badly
    /// signed token, and for a subject that is not an account ID.
    pub fn verify(&self, credential: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<Claims>(credential, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::Unauthenticated
        })?;

        let account_id = data
            .claims
            .sub
            .parse::<AccountId>()
            .map_err(|_| AuthError::Unauthenticated)?;

        Ok(VerifiedToken { account_id })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocery_core::{DisplayName, Email};

    use super::*;

    fn authenticator() -> TokenAuthenticator {
        TokenAuthenticator::new(
            &SecretString::from("k3Y9#vQ2$wE7!rT5^yU1&iO8*pA4@sD6"),
            DEFAULT_TOKEN_TTL,
        )
    }

    fn account(id: i64) -> Account {
        Account {
            id: AccountId::new(id),
            name: DisplayName::parse("alice").unwrap(),
            email: Email::parse("alice@example.com").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let auth = authenticator();
        let token = auth.issue(&account(42)).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 86_400);

        let verified = auth.verify(&token.access_token).unwrap();
        assert_eq!(verified.account_id, AccountId::new(42));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = authenticator();
        let now = Utc::now().timestamp();
        let token = auth
            .sign(&Claims {
                sub: "42".to_string(),
                name: "alice".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(auth.verify(&token), Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let other = TokenAuthenticator::new(
            &SecretString::from("Zx8!cV3@bN6#mQ1$wE4%rT7^yU0&iO2*"),
            DEFAULT_TOKEN_TTL,
        );
        let token = other.issue(&account(1)).unwrap();

        assert!(matches!(
            authenticator().verify(&token.access_token),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn test_garbage_and_non_numeric_subject_are_rejected() {
        let auth = authenticator();
        assert!(matches!(auth.verify(""), Err(AuthError::Unauthenticated)));
        assert!(matches!(
            auth.verify("not.a.jwt"),
            Err(AuthError::Unauthenticated)
        ));

        let now = Utc::now().timestamp();
        let token = auth
            .sign(&Claims {
                sub: "alice".to_string(),
                name: "alice".to_string(),
                iat: now,
                exp: now + 60,
            })
            .unwrap();
        assert!(matches!(auth.verify(&token), Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", authenticator());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("k3Y9"));
    }
}
