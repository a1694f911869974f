// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Mandate Payload Encryption
//!
//! AES-256-GCM helpers shared by the onboarding pages and the gateway client.
//!
//! ## Formats
//!
//! | Item | Encoding |
//! |------|----------|
//! | Key | standard Base64 of 32 random bytes |
//! | Envelope | standard Base64 of `nonce (12) || ciphertext || tag (16)` |
//! | URL token | URL-safe Base64 of the envelope's UTF-8 text |
//!
//! A fresh nonce is drawn from the system CSPRNG for every call to
//! [`encrypt`], so the same plaintext never produces the same envelope twice.

use base64ct::{Base64, Base64Url, Encoding};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

/// Length in bytes of an AES-256 key.
pub const KEY_LEN: usize = 32;

/// Errors raised while handling keys and envelopes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption key is not valid Base64: {0}")]
    InvalidKeyEncoding(String),

    #[error("encryption key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("encrypted payload is not valid Base64: {0}")]
    InvalidEnvelope(String),

    #[error("encrypted payload is too short ({0} bytes)")]
    TruncatedEnvelope(usize),

    #[error("decryption failed: wrong key or tampered payload")]
    Authentication,

    #[error("decrypted payload is not UTF-8")]
    InvalidUtf8,

    #[error("system random generator failed")]
    Rng,

    #[error("encryption failed")]
    Seal,
}

/// Generate a random AES-256 key, Base64 encoded.
pub fn generate_key() -> Result<String, CryptoError> {
    let mut key = [0u8; KEY_LEN];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| CryptoError::Rng)?;
    Ok(Base64::encode_string(&key))
}

/// Check that `key_b64` decodes to a usable AES-256 key.
pub fn validate_key(key_b64: &str) -> Result<(), CryptoError> {
    load_key(key_b64).map(|_| ())
}

/// Encrypt `plaintext` under the Base64 key and return the Base64 envelope.
pub fn encrypt(key_b64: &str, plaintext: &str) -> Result<String, CryptoError> {
    let key = load_key(key_b64)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| CryptoError::Rng)?;

    let mut in_out = plaintext.as_bytes().to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| CryptoError::Seal)?;

    let mut envelope = Vec::with_capacity(NONCE_LEN + in_out.len());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&in_out);
    Ok(Base64::encode_string(&envelope))
}

/// Decrypt a Base64 envelope produced by [`encrypt`].
pub fn decrypt(key_b64: &str, envelope_b64: &str) -> Result<String, CryptoError> {
    let key = load_key(key_b64)?;

    let envelope = Base64::decode_vec(envelope_b64.trim())
        .map_err(|e| CryptoError::InvalidEnvelope(e.to_string()))?;
    if envelope.len() < NONCE_LEN + AES_256_GCM.tag_len() {
        return Err(CryptoError::TruncatedEnvelope(envelope.len()));
    }

    let (nonce_bytes, sealed) = envelope.split_at(NONCE_LEN);
    let nonce =
        Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CryptoError::Authentication)?;

    let mut in_out = sealed.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::Authentication)?;

    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::InvalidUtf8)
}

/// URL-safe Base64 of `text`, for placing an envelope in a URL path.
pub fn url_encode(text: &str) -> String {
    Base64Url::encode_string(text.as_bytes())
}

/// Reverse of [`url_encode`].
pub fn url_decode(token: &str) -> Result<String, CryptoError> {
    let bytes = Base64Url::decode_vec(token.trim())
        .map_err(|e| CryptoError::InvalidEnvelope(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| CryptoError::InvalidUtf8)
}

fn load_key(key_b64: &str) -> Result<LessSafeKey, CryptoError> {
    let bytes = Base64::decode_vec(key_b64.trim())
        .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;
    if bytes.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyLength(bytes.len()));
    }
    let unbound =
        UnboundKey::new(&AES_256_GCM, &bytes).map_err(|_| CryptoError::InvalidKeyLength(bytes.len()))?;
    Ok(LessSafeKey::new(unbound))
}
