//! # Wallets
//!
//! The [`Wallet`] trait is the account the messenger acts as. Production
//! wallets (browser extension, hardware, remote signer) live outside this
//! crate. [`LocalWallet`] is a development wallet backed by an Ed25519 key.
//!
//! ## Local Address Derivation
//!
//! ```text
//! Ed25519 secret (32 bytes)
//!       │
//!       ▼
//! Verifying key (32 bytes) ──SHA-256──► last 20 bytes ──► Address
//! ```

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::types::WalletSignature;
use crate::address::{Address, ADDRESS_SIZE};
use crate::error::{Error, Result};

/// A connected account able to sign
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The account address
    fn address(&self) -> Address;

    /// Sign an arbitrary message
    async fn sign(&self, message: &[u8]) -> Result<WalletSignature>;
}

/// Ed25519 development wallet
pub struct LocalWallet {
    // ed25519_dalek::SigningKey zeroizes itself on drop
    secret: SigningKey,
    address: Address,
}

impl LocalWallet {
    /// Generate a new random wallet
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create from a 32-byte secret
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    /// Create from a hex secret, with or without `0x`
    pub fn from_secret_hex(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|e| Error::SigningFailed(format!("invalid wallet secret: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::SigningFailed("wallet secret must be 32 bytes".into()))?;
        Ok(Self::from_secret_bytes(&bytes))
    }

    /// Get the secret as hex (for the wallet file)
    ///
    /// ## Security Warning
    ///
    /// Only use this for secure storage. Never log or transmit it.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret.to_bytes())
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.secret.verifying_key().to_bytes()
    }

    fn from_signing_key(secret: SigningKey) -> Self {
        let address = address_for_public_key(&secret.verifying_key().to_bytes());
        Self { secret, address }
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, message: &[u8]) -> Result<WalletSignature> {
        let signature = self.secret.sign(message);
        Ok(WalletSignature {
            public_key: self.public_bytes().to_vec(),
            signature: signature.to_bytes().to_vec(),
        })
    }
}

/// Address of a local wallet public key
pub fn address_for_public_key(public_key: &[u8; 32]) -> Address {
    let digest = Sha256::digest(public_key);
    let mut bytes = [0u8; ADDRESS_SIZE];
    bytes.copy_from_slice(&digest[digest.len() - ADDRESS_SIZE..]);
    Address::from_bytes(bytes)
}

/// Verify a local wallet signature and return the signer's address
pub fn recover_signer(message: &[u8], signature: &WalletSignature) -> Result<Address> {
    let public_key: [u8; 32] = signature
        .public_key
        .as_slice()
        .try_into()
        .map_err(|_| Error::SigningFailed("public key must be 32 bytes".into()))?;
    let verifying_key = VerifyingKey::from_bytes(&public_key)
        .map_err(|e| Error::SigningFailed(format!("invalid public key: {e}")))?;
    let sig = Signature::from_slice(&signature.signature)
        .map_err(|e| Error::SigningFailed(format!("invalid signature: {e}")))?;

    verifying_key
        .verify(message, &sig)
        .map_err(|_| Error::SigningFailed("signature does not verify".into()))?;

    Ok(address_for_public_key(&public_key))
}
