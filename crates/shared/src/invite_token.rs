//! Signed invite tokens.
//!
//! An invite token is the capability that lets its holder claim a government
//! invite: a JWT carrying the invite id, the target city, the invited role
//! and the initiator. Tokens are stateless; the invite row in the database is
//! what makes acceptance single-use.
//!
//! Verification checks signature and shape only. Expiry is deliberately not
//! enforced here: the stored invite row's `expires_at` is authoritative and
//! is re-checked when the invite is answered.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for invite token operations.
#[derive(Debug, Error)]
pub enum InviteTokenError {
    #[error("Failed to encode invite token: {0}")]
    Encoding(String),

    #[error("Invalid invite token")]
    Invalid,

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

/// Claims embedded in an invite token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteClaims {
    /// Invite row id
    pub invite_id: Uuid,
    /// City the invite grants a role in
    pub city_id: Uuid,
    /// Invited role, as its canonical lowercase name
    pub role: String,
    /// Grant holder who issued the invite; absent for system-issued invites
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator_id: Option<Uuid>,
    /// Expiration time (Unix timestamp), mirrors the invite row's expires_at
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl InviteClaims {
    /// Expiration instant carried by the token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.exp, 0)
    }
}

/// Signer/verifier for invite tokens.
///
/// Supports RS256 with a PEM key pair (production) and HS256 with a shared
/// secret (small deployments, tests).
#[derive(Clone)]
pub struct InviteTokenConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl std::fmt::Debug for InviteTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteTokenConfig")
            .field("algorithm", &self.algorithm)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl InviteTokenConfig {
    /// Creates a config from an RSA key pair in PEM format (RS256).
    pub fn from_rsa_pem(
        private_key_pem: &str,
        public_key_pem: &str,
    ) -> Result<Self, InviteTokenError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| InviteTokenError::InvalidKey(format!("Invalid private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| InviteTokenError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
        })
    }

    /// Creates a config from a shared HMAC secret (HS256).
    pub fn from_hmac_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
        }
    }

    /// Signs a token for the given invite.
    ///
    /// `expires_at` must be the invite row's expiration so that the token and
    /// the row always agree.
    pub fn sign(
        &self,
        invite_id: Uuid,
        city_id: Uuid,
        role: &str,
        initiator_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, InviteTokenError> {
        let claims = InviteClaims {
            invite_id,
            city_id,
            role: role.to_string(),
            initiator_id,
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| InviteTokenError::Encoding(e.to_string()))
    }

    /// Verifies a token's signature and shape and returns its claims.
    ///
    /// Does not reject expired tokens; callers compare against the stored
    /// invite row, which is the authoritative expiry.
    pub fn verify(&self, token: &str) -> Result<InviteClaims, InviteTokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<InviteClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| InviteTokenError::Invalid)?;

        Ok(data.claims)
    }
}

/// Expiration instant for a newly issued invite.
pub fn invite_expiration(ttl: Duration) -> DateTime<Utc> {
    Utc::now() + ttl
}
