//! # Encryption Module
//!
//! AES-256-GCM sealing and opening of message bodies.
//!
//! ## Payload Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ENCRYPTED PAYLOAD LAYOUT                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   0               12                                  len - 16    len   │
//! │   ├───────────────┼──────────────────────────────────────┼──────────┤   │
//! │   │  nonce (12)   │        ciphertext (= plaintext len)  │ tag (16) │   │
//! │   └───────────────┴──────────────────────────────────────┴──────────┘   │
//! │                                                                         │
//! │   No associated data. The tag is appended by the cipher, exactly as    │
//! │   WebCrypto's AES-GCM emits it, so payloads written by the browser     │
//! │   front end open here unchanged.                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce as AesNonce,
};
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce (number used once) for AES-GCM encryption
///
/// **Never reuse a nonce with the same key.** Every encryption draws a
/// fresh random nonce from the [`CryptoProvider`](super::CryptoProvider).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, which must be exactly 12 bytes
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; NONCE_SIZE] = slice
            .try_into()
            .map_err(|_| Error::MalformedPayload(format!("nonce must be {NONCE_SIZE} bytes")))?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM key
///
/// Zeroized when dropped. `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Encrypt with AES-256-GCM, returning `ciphertext || tag`
pub fn encrypt(key: &SymmetricKey, nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));

    cipher
        .encrypt(AesNonce::from_slice(&nonce.0), plaintext)
        .map_err(|e| Error::PlatformCryptoUnavailable(format!("AES-GCM encryption failed: {e}")))
}

/// Decrypt `ciphertext || tag` with AES-256-GCM
///
/// ## Errors
///
/// Returns `DecryptionFailed` for a wrong key, a wrong nonce or any
/// modification of the ciphertext or tag. The cases are not distinguished.
pub fn decrypt(key: &SymmetricKey, nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));

    cipher
        .decrypt(AesNonce::from_slice(&nonce.0), ciphertext)
        .map_err(|_| Error::DecryptionFailed)
}

// ============================================================================
// TESTS
// ============================================================================
