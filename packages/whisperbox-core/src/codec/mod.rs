//! # Address-Derived Symmetric Codec
//!
//! Encrypts message bodies under a key derived from the recipient's
//! address and encodes them for storage in the messenger contract.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SEND (encrypt)                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  recipient address ──► derive_key ──► key                              │
//! │  provider ──────────────────────────► nonce (12 random bytes)          │
//! │  AES-256-GCM(key, nonce, utf8(text)) ──► ciphertext || tag             │
//! │  base64(nonce || ciphertext || tag) ──► contract `encryptedContent`    │
//! │                                                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                          READ (decrypt)                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Payload::{Text, Bytes} ──► normalize (raw / 0x-hex / base64)          │
//! │  len >= 13 ? ──no──► MalformedPayload                                  │
//! │  split nonce | ciphertext || tag                                       │
//! │  own address ──► derive_key ──► AES-256-GCM open                       │
//! │      fail ──► DecryptionFailed      ok ──► UTF-8 ──► text              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Logging
//!
//! Only lengths and encodings are logged. Plaintext, keys and addresses
//! never reach the log.

mod payload;
mod preview;

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::crypto::{
    derive_key, CryptoProvider, Nonce, SystemCryptoProvider, MIN_PAYLOAD_SIZE, NONCE_SIZE,
};
use crate::error::{Error, Result};

pub use payload::{Encoding, Payload, HEX_PREFIX};
pub use preview::{format_preview, format_preview_with_limit, ELLIPSIS, PREVIEW_LIMIT};

/// Encrypts and decrypts message bodies keyed by address
///
/// Stateless apart from its provider; cloning shares the provider.
#[derive(Clone)]
pub struct AddressCodec {
    provider: Arc<dyn CryptoProvider>,
}

impl AddressCodec {
    /// Create a codec with an explicit provider
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self { provider }
    }

    /// Create a codec backed by the operating system
    pub fn system() -> Self {
        Self::new(Arc::new(SystemCryptoProvider))
    }

    /// Encrypt `plaintext` for `address`, returning raw payload bytes
    pub fn encrypt_to_bytes(&self, address: &str, plaintext: &str) -> Result<Vec<u8>> {
        let key = derive_key(address);
        let nonce = self.provider.random_nonce()?;
        let sealed = self.provider.seal(&key, &nonce, plaintext.as_bytes())?;

        let mut payload = Vec::with_capacity(NONCE_SIZE + sealed.len());
        payload.extend_from_slice(nonce.as_bytes());
        payload.extend_from_slice(&sealed);

        tracing::debug!(
            plaintext_len = plaintext.len(),
            payload_len = payload.len(),
            "Encrypted message body"
        );
        Ok(payload)
    }

    /// Encrypt `plaintext` for `address`, returning base64 text
    ///
    /// This is the form written to the contract.
    pub fn encrypt(&self, address: &str, plaintext: &str) -> Result<String> {
        let payload = self.encrypt_to_bytes(address, plaintext)?;
        Ok(BASE64.encode(payload))
    }

    /// Decrypt a payload addressed to `address`
    ///
    /// ## Errors
    ///
    /// - `MalformedPayload`: undecodable text, fewer than 13 bytes, or a
    ///   plaintext that is not UTF-8
    /// - `DecryptionFailed`: wrong address, corruption or tampering
    pub fn decrypt(&self, address: &str, payload: impl Into<Payload>) -> Result<String> {
        let (bytes, encoding) = payload.into().into_bytes()?;

        if bytes.len() < MIN_PAYLOAD_SIZE {
            return Err(Error::MalformedPayload(
                "payload too short to contain nonce and tag".into(),
            ));
        }

        let (nonce_bytes, sealed) = bytes.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes)?;
        let key = derive_key(address);

        let plaintext = self.provider.open(&key, &nonce, sealed).map_err(|_| {
            tracing::debug!(?encoding, payload_len = bytes.len(), "Message body did not authenticate");
            Error::DecryptionFailed
        })?;

        tracing::debug!(?encoding, payload_len = bytes.len(), "Decrypted message body");

        String::from_utf8(plaintext)
            .map_err(|_| Error::MalformedPayload("decrypted bytes are not valid UTF-8".into()))
    }
}

impl Default for AddressCodec {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for AddressCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressCodec").finish_non_exhaustive()
    }
}

/// Encrypt with the system provider
pub fn encrypt(address: &str, plaintext: &str) -> Result<String> {
    AddressCodec::system().encrypt(address, plaintext)
}

/// Decrypt with the system provider
pub fn decrypt(address: &str, payload: impl Into<Payload>) -> Result<String> {
    AddressCodec::system().decrypt(address, payload)
}

// ============================================================================
// TESTS
// ============================================================================
