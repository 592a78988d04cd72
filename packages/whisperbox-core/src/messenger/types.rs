//! Messenger data types: contract records, relayer handles, receipts.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::address::Address;
use crate::error::{Error, Result};

/// Size of an encrypted-input handle in bytes
pub const HANDLE_SIZE: usize = 32;

/// Opaque reference to an FHE-encrypted value held by the relayer
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle([u8; HANDLE_SIZE]);

impl Handle {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; HANDLE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; HANDLE_SIZE] {
        &self.0
    }

    /// Parse `0x` + 64 hex digits
    pub fn parse(text: &str) -> Result<Self> {
        let digits = text
            .trim()
            .strip_prefix("0x")
            .ok_or_else(|| Error::UnknownHandle(format!("missing 0x prefix: {text}")))?;
        let bytes = hex::decode(digits)
            .map_err(|e| Error::UnknownHandle(format!("invalid hex: {e}")))?;
        let bytes: [u8; HANDLE_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::UnknownHandle(format!("handle must be {HANDLE_SIZE} bytes")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({self})")
    }
}

impl Serialize for Handle {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Handle::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Result of the relayer's encrypted-input construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    /// Handle passed to the contract in place of the value
    pub handle: Handle,
    /// Proof that binds the handle to the contract and the submitting user
    pub input_proof: Vec<u8>,
}

/// One message as stored by the contract (`getMessageAt`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Transaction sender
    pub from: Address,
    /// Block timestamp, Unix seconds
    pub timestamp: i64,
    /// Codec payload, as submitted
    pub encrypted_content: String,
    /// FHE-encrypted sender address
    pub encrypted_sender: Handle,
}

/// A stored message together with its position in the owner's inbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxEntry {
    /// Zero-based index for `getMessageAt`
    pub index: u64,
    /// The stored message
    pub message: StoredMessage,
}

/// Outcome of a `sendMessage` transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash, `0x`-hex
    pub tx_hash: String,
    /// Inbox the message landed in
    pub recipient: Address,
    /// Index of the message in that inbox
    pub index: u64,
}

/// A wallet signature plus the public key that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSignature {
    /// Signer public key
    pub public_key: Vec<u8>,
    /// Signature bytes
    pub signature: Vec<u8>,
}

/// Signed permission for the relayer to decrypt on a user's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptAuthorization {
    /// User requesting decryption
    pub user: Address,
    /// Contract whose handles may be decrypted
    pub contract: Address,
    /// Chain of the contract
    pub chain_id: u64,
    /// User's signature over [`DecryptAuthorization::message`]
    pub signature: WalletSignature,
}

impl DecryptAuthorization {
    /// Canonical text the user signs
    pub fn message(user: &Address, contract: &Address, chain_id: u64) -> String {
        format!(
            "WhisperBox user decryption\nContract: {contract}\nUser: {user}\nChain ID: {chain_id}"
        )
    }

    /// The text this authorization claims to have signed
    pub fn signed_message(&self) -> String {
        Self::message(&self.user, &self.contract, self.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display_and_parse() {
        let handle = Handle::from_bytes([0x11; HANDLE_SIZE]);
        let text = handle.to_string();

        assert_eq!(text.len(), 2 + HANDLE_SIZE * 2);
        assert_eq!(Handle::parse(&text).unwrap(), handle);
        assert!(Handle::parse("0x1234").is_err());
        assert!(Handle::parse(&text[2..]).is_err());
    }

    #[test]
    fn test_stored_message_json() {
        let message = StoredMessage {
            from: Address::from_bytes([1u8; 20]),
            timestamp: 1_760_000_000,
            encrypted_content: "AAEC".into(),
            encrypted_sender: Handle::from_bytes([2u8; HANDLE_SIZE]),
        };

        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"from\":\"0x0101010101010101010101010101010101010101\""));

        let restored: StoredMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, message);
    }

    #[test]
    fn test_authorization_message_is_lowercase() {
        let user: Address = "0xAbCdEf0000000000000000000000000000000001".parse().unwrap();
        let message = DecryptAuthorization::message(&user, &Address::ZERO, 1);
        assert!(message.contains("User: 0xabcdef0000000000000000000000000000000001"));
        assert!(message.ends_with("Chain ID: 1"));
    }
}
