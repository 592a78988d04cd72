//! # WhisperBox Core
//!
//! Messaging core for an on-chain messenger: message bodies are sealed
//! with a key derived from the recipient's address, and the sender's
//! address is stored FHE-encrypted so only the sender and recipient can
//! reveal it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       WHISPERBOX CORE MODULES                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                          Messenger                               │  │
//! │  │  send / inbox / read / reveal_sender / preview                   │  │
//! │  └──────┬───────────────────────┬──────────────────────────┬────────┘  │
//! │         │                       │                          │           │
//! │         ▼                       ▼                          ▼           │
//! │  ┌─────────────┐   ┌──────────────────────────┐   ┌────────────────┐  │
//! │  │   Codec     │   │ Wallet / Contract /      │   │    Config      │  │
//! │  │             │   │ Relayer traits           │   │                │  │
//! │  │ - encrypt   │   │                          │   │ - contract     │  │
//! │  │ - decrypt   │   │ LocalWallet, LocalChain  │   │ - chain id     │  │
//! │  │ - preview   │   │ for development          │   │ - preview      │  │
//! │  └──────┬──────┘   └──────────────────────────┘   └────────────────┘  │
//! │         │                                                              │
//! │         ▼                                                              │
//! │  ┌─────────────┐                                                       │
//! │  │   Crypto    │                                                       │
//! │  │             │                                                       │
//! │  │ - SHA-256   │                                                       │
//! │  │ - AES-GCM   │                                                       │
//! │  │ - Provider  │                                                       │
//! │  └─────────────┘                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`address`] - 20-byte account addresses
//! - [`crypto`] - Key derivation, AES-256-GCM, randomness providers
//! - [`codec`] - Address-keyed message codec and previews
//! - [`config`] - Messenger configuration
//! - [`messenger`] - Messenger service and its collaborators
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Message bodies: AES-256-GCM, key = SHA-256(lowercase recipient)        │
//! │  ─────────────────────────────────────────────────────────────          │
//! │  Anyone who knows the recipient address can open a body. This hides   │
//! │  content from casual chain observers only.                            │
//! │                                                                         │
//! │  Sender identity: FHE-encrypted address handle                         │
//! │  ──────────────────────────────────────────────                         │
//! │  The relayer decrypts it only for the sender or the recipient, and    │
//! │  only against a signed authorization.                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Plaintext, derived keys and revealed senders are never logged.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod address;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod messenger;
/// Timestamp helpers.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use address::Address;
pub use codec::{decrypt, encrypt, format_preview, AddressCodec, Payload};
pub use config::MessengerConfig;
pub use crypto::{derive_key, CryptoProvider, SystemCryptoProvider};
pub use error::{Error, Result};
pub use messenger::{FheRelayer, InboxEntry, LocalChain, LocalWallet, Messenger, MessengerContract, Wallet};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of WhisperBox Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_top_level_round_trip() {
        let sealed = encrypt("0xAbCdEf0000000000000000000000000000000001", "hello").unwrap();
        let opened = decrypt("0xabcdef0000000000000000000000000000000001", sealed.as_str()).unwrap();
        assert_eq!(opened, "hello");
    }
}
