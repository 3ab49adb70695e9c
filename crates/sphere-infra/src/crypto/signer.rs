//! Ledger request signer.
//!
//! Holds the account's secp256k1 key, derives the account address the way
//! EVM ledgers do (last 20 bytes of the Keccak-256 of the uncompressed public
//! key), and signs JSON-RPC calls so the gateway can attribute them.
//!
//! The key is only ever read from a [`SecretString`] and is never logged.

use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use secrecy::{ExposeSecret, SecretString};
use sha3::{Digest, Keccak256};

use sphere_types::error::ConfigError;

/// Signs ledger calls on behalf of one account.
///
/// Does not implement `Debug`; the secret key must not reach logs.
pub struct LedgerSigner {
    secp: Secp256k1<All>,
    secret: SecretKey,
    address: String,
}

impl LedgerSigner {
    /// Parse a hex private key, with or without a `0x` prefix.
    pub fn from_hex(key: &SecretString) -> Result<Self, ConfigError> {
        let raw = normalize_key(key.expose_secret())?;
        let bytes = hex::decode(raw)
            .map_err(|e| ConfigError::InvalidSigningKey(format!("not hex: {e}")))?;
        let secret = SecretKey::from_slice(&bytes)
            .map_err(|e| ConfigError::InvalidSigningKey(e.to_string()))?;

        let secp = Secp256k1::new();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let address = address_of(&public);

        Ok(Self {
            secp,
            secret,
            address,
        })
    }

    /// Lowercase, `0x`-prefixed account address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Recoverable signature (`r‖s‖v`, `v = 27 + recid`) over
    /// `keccak256(method ":" params_json)`, hex with `0x` prefix.
    pub fn sign_call(&self, method: &str, params_json: &str) -> String {
        let message = Message::from_digest(call_digest(method, params_json));
        let signature = self.secp.sign_ecdsa_recoverable(&message, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&compact);
        bytes.push(27 + recovery_id.to_i32() as u8);
        format!("0x{}", hex::encode(bytes))
    }
}

/// Strip whitespace and an optional `0x`/`0X` prefix, and check the length.
fn normalize_key(key: &str) -> Result<&str, ConfigError> {
    let trimmed = key.trim();
    let raw = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if raw.len() != 64 {
        return Err(ConfigError::InvalidSigningKey(format!(
            "expected 32 bytes (64 hex chars), got {} chars",
            raw.len()
        )));
    }
    Ok(raw)
}

fn address_of(public: &PublicKey) -> String {
    let uncompressed = public.serialize_uncompressed();
    let hash = Keccak256::digest(&uncompressed[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

fn call_digest(method: &str, params_json: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(method.as_bytes());
    hasher.update(b":");
    hasher.update(params_json.as_bytes());
    hasher.finalize().into()
}
