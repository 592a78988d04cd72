//! # Error Handling
//!
//! Error types for WhisperBox Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Codec Errors                                                      │
//! │  │   ├── PlatformCryptoUnavailable - RNG or cipher unusable            │
//! │  │   ├── MalformedPayload          - Bad encoding, length or UTF-8     │
//! │  │   └── DecryptionFailed          - Authentication failed (generic)   │
//! │  │                                                                      │
//! │  ├── Address Errors                                                    │
//! │  │   └── InvalidAddress            - Not 0x + 40 hex digits            │
//! │  │                                                                      │
//! │  ├── Wallet Errors                                                     │
//! │  │   ├── NoActiveAccount           - No connected account              │
//! │  │   └── SigningFailed             - Wallet refused to sign            │
//! │  │                                                                      │
//! │  ├── Chain Errors                                                      │
//! │  │   ├── ContractCallFailed        - Contract read/write failed        │
//! │  │   ├── InvalidInputProof         - Encrypted input proof rejected    │
//! │  │   └── MessageIndexOutOfRange    - getMessageAt past the end         │
//! │  │                                                                      │
//! │  ├── Relayer Errors                                                    │
//! │  │   ├── RelayerUnavailable        - Relayer unreachable               │
//! │  │   ├── UnknownHandle             - Handle never minted               │
//! │  │   └── DecryptionNotAuthorized   - User lacks access to handle       │
//! │  │                                                                      │
//! │  └── Config / Internal                                                 │
//! │      ├── InvalidConfig                                                 │
//! │      ├── Serialization                                                 │
//! │      └── Io                                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `DecryptionFailed` deliberately carries no detail: a wrong address, a
//! corrupted payload and a tampered payload must be indistinguishable.

use thiserror::Error;

/// Result type alias for WhisperBox Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for WhisperBox Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Codec Errors (100-199)
    // ========================================================================

    /// The secure random source or the AEAD cipher could not be used
    #[error("Cryptographic primitives unavailable: {0}")]
    PlatformCryptoUnavailable(String),

    /// The payload is structurally invalid
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Authentication of the payload failed
    #[error("Decryption failed")]
    DecryptionFailed,

    // ========================================================================
    // Address Errors (200-299)
    // ========================================================================

    /// Address text is not a valid 20-byte hex address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // ========================================================================
    // Wallet Errors (300-399)
    // ========================================================================

    /// No wallet account is connected
    #[error("No active wallet account. Connect a wallet first.")]
    NoActiveAccount,

    /// The wallet could not sign
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    // ========================================================================
    // Chain Errors (400-499)
    // ========================================================================

    /// A contract call failed
    #[error("Contract call failed: {0}")]
    ContractCallFailed(String),

    /// The encrypted input proof does not match its handle
    #[error("Encrypted input proof rejected")]
    InvalidInputProof,

    /// Requested message index does not exist
    #[error("Message index {index} out of range (count {count})")]
    MessageIndexOutOfRange {
        /// Requested index
        index: u64,
        /// Number of messages stored for the owner
        count: u64,
    },

    // ========================================================================
    // Relayer Errors (500-599)
    // ========================================================================

    /// The relayer could not be reached
    #[error("Relayer unavailable: {0}")]
    RelayerUnavailable(String),

    /// The handle is unknown to the relayer
    #[error("Unknown encrypted handle: {0}")]
    UnknownHandle(String),

    /// The user is not allowed to decrypt the handle
    #[error("Decryption not authorized: {0}")]
    DecryptionNotAuthorized(String),

    // ========================================================================
    // Config Errors (600-699)
    // ========================================================================

    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Numeric error code, grouped by category:
    /// - 100-199: Codec
    /// - 200-299: Address
    /// - 300-399: Wallet
    /// - 400-499: Chain
    /// - 500-599: Relayer
    /// - 600-699: Config
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Codec (100-199)
            Error::PlatformCryptoUnavailable(_) => 100,
            Error::MalformedPayload(_) => 101,
            Error::DecryptionFailed => 102,

            // Address (200-299)
            Error::InvalidAddress(_) => 200,

            // Wallet (300-399)
            Error::NoActiveAccount => 300,
            Error::SigningFailed(_) => 301,

            // Chain (400-499)
            Error::ContractCallFailed(_) => 400,
            Error::InvalidInputProof => 401,
            Error::MessageIndexOutOfRange { .. } => 402,

            // Relayer (500-599)
            Error::RelayerUnavailable(_) => 500,
            Error::UnknownHandle(_) => 501,
            Error::DecryptionNotAuthorized(_) => 502,

            // Config (600-699)
            Error::InvalidConfig(_) => 600,

            // Internal (900-999)
            Error::Serialization(_) => 900,
            Error::Io(_) => 901,
        }
    }

    /// Check if this error is transient
    ///
    /// Only collaborator I/O failures qualify. Codec errors never do: the
    /// same input fails the same way every time.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ContractCallFailed(_) | Error::RelayerUnavailable(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
