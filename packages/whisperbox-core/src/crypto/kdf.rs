//! # Key Derivation
//!
//! Derives the message-body key from the recipient's address.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ADDRESS → MESSAGE KEY                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  "0xAbCdEf…0001"                                                       │
//! │        │  lowercase                                                    │
//! │        ▼                                                               │
//! │  "0xabcdef…0001"                                                       │
//! │        │  UTF-8 bytes                                                  │
//! │        ▼                                                               │
//! │  SHA-256  ──────────►  32 bytes imported as the raw AES-256-GCM key    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no salt and no secret input. Anyone who knows the recipient
//! address can derive the key; the scheme only keeps message text out of
//! plain sight on a public ledger. Changing any step would make every
//! previously stored message unreadable, so the derivation is fixed.

use sha2::{Digest, Sha256};

use super::encryption::SymmetricKey;

/// Derive the AES-256-GCM key for messages addressed to `address`
///
/// Case-insensitive and infallible for any text.
pub fn derive_key(address: &str) -> SymmetricKey {
    let normalized = address.to_lowercase();
    let digest: [u8; 32] = Sha256::digest(normalized.as_bytes()).into();
    SymmetricKey::from_bytes(digest)
}
