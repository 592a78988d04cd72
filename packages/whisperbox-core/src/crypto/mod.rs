//! # Cryptography Module
//!
//! Primitives behind the message-body codec.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC BUILDING BLOCKS                        │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  kdf        recipient address ──SHA-256──► 256-bit key                 │
//! │  provider   random nonces + AEAD, injected into the codec              │
//! │  encryption AES-256-GCM, 96-bit nonce, 128-bit tag, no AAD             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Why |
//! |-----------|---------|-----|
//! | SHA-256 | Key derivation | Matches WebCrypto `digest('SHA-256')` output used on-chain |
//! | AES-256-GCM | Body encryption | Matches WebCrypto `AES-GCM` with a raw-imported key |
//!
//! The derived key is not secret (it depends only on a public address).
//! See [`kdf`] for what that implies.

mod encryption;
pub mod kdf;
mod provider;

pub use encryption::{decrypt, encrypt, Nonce, SymmetricKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use kdf::derive_key;
pub use provider::{CryptoProvider, SeededCryptoProvider, SystemCryptoProvider};

/// Smallest decodable payload: a full nonce plus at least one byte
pub const MIN_PAYLOAD_SIZE: usize = NONCE_SIZE + 1;
