//! Session tokens
//!
//! A token is `base64url(claims JSON) "." base64url(signature)`, where the
//! signature is Ed25519 over the encoded claims. Decoding fails closed: any
//! token that is malformed, altered or signed by another key yields `None`.

use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{Result, cache::LocalCache, constants::SESSION_KEY_CACHE_KEY};

/// What a session token asserts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: String,
    /// Milliseconds since Unix epoch
    pub issued_at: u64,
    /// Random hex string making every token unique
    pub nonce: String,
}

impl SessionClaims {
    /// Claims for `user_id` issued at `issued_at`, with a fresh nonce.
    pub fn new(user_id: impl Into<String>, issued_at: u64) -> Self {
        Self {
            user_id: user_id.into(),
            issued_at,
            nonce: hex::encode(rand::random::<[u8; 16]>()),
        }
    }
}

/// Turns claims into opaque tokens and back.
pub trait TokenCodec: Send + Sync + std::fmt::Debug {
    fn encode(&self, claims: &SessionClaims) -> Result<String>;

    /// The claims carried by `token`, or `None` if it is not a valid token.
    fn decode(&self, token: &str) -> Option<SessionClaims>;
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid signing key: {reason}")]
    InvalidKey { reason: String },
}

impl From<TokenError> for crate::Error {
    fn from(err: TokenError) -> Self {
        crate::Error::Token(err)
    }
}

/// [`TokenCodec`] that signs claims with an Ed25519 key.
#[derive(Clone)]
pub struct SignedTokenCodec {
    signing_key: SigningKey,
}

impl std::fmt::Debug for SignedTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedTokenCodec")
            .field("verifying_key", &hex::encode(self.verifying_key().to_bytes()))
            .finish()
    }
}

impl SignedTokenCodec {
    /// Codec with a fresh random key. Tokens do not outlive the process.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Codec from a hex-encoded 32-byte secret.
    pub fn from_secret_hex(secret: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(secret.trim()).map_err(|e| {
            TokenError::InvalidKey {
                reason: e.to_string(),
            }
        })?);
        let bytes: [u8; 32] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| TokenError::InvalidKey {
                    reason: format!("expected 32 bytes, got {}", bytes.len()),
                })?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&bytes),
        })
    }

    /// The secret as hex, for persisting.
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// Reuse the key stored in `cache`, or generate and store one.
    ///
    /// Lets tokens stay valid across runs of a command-line client.
    pub fn load_or_generate(cache: &dyn LocalCache) -> Result<Self> {
        if let Some(secret) = cache.get(SESSION_KEY_CACHE_KEY)? {
            let secret = Zeroizing::new(secret);
            debug!("Loaded session signing key from cache");
            return Self::from_secret_hex(&secret);
        }
        let codec = Self::generate();
        cache.set(SESSION_KEY_CACHE_KEY, &codec.secret_hex())?;
        info!("Generated new session signing key");
        Ok(codec)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl TokenCodec for SignedTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String> {
        let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(claims)?);
        let signature = self.signing_key.sign(payload.as_bytes());
        Ok(format!(
            "{payload}.{}",
            Base64UrlUnpadded::encode_string(&signature.to_bytes())
        ))
    }

    fn decode(&self, token: &str) -> Option<SessionClaims> {
        let (payload, signature) = token.split_once('.')?;
        let signature = Base64UrlUnpadded::decode_vec(signature).ok()?;
        let signature = Signature::from_slice(&signature).ok()?;
        self.verifying_key()
            .verify(payload.as_bytes(), &signature)
            .ok()?;
        let claims = Base64UrlUnpadded::decode_vec(payload).ok()?;
        serde_json::from_slice(&claims).ok()
    }
}
