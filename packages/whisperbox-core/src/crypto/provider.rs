//! # Crypto Provider
//!
//! The codec never reaches for a global RNG or cipher. It is handed a
//! [`CryptoProvider`] that supplies randomness and the AEAD primitive, so
//! tests can swap in a seeded source and get reproducible payloads.
//!
//! | Provider | Randomness | Use |
//! |----------|------------|-----|
//! | [`SystemCryptoProvider`] | `rand::rngs::OsRng` | production |
//! | [`SeededCryptoProvider`] | `StdRng` from a fixed seed | tests, fixtures |

use parking_lot::Mutex;
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

use super::encryption::{self, Nonce, SymmetricKey, NONCE_SIZE};
use crate::error::{Error, Result};

/// Randomness and AEAD capability used by the codec
pub trait CryptoProvider: Send + Sync {
    /// Fill `dest` with cryptographically secure random bytes
    fn fill_random(&self, dest: &mut [u8]) -> Result<()>;

    /// AES-256-GCM encrypt, returning `ciphertext || tag`
    fn seal(&self, key: &SymmetricKey, nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
        encryption::encrypt(key, nonce, plaintext)
    }

    /// AES-256-GCM decrypt `ciphertext || tag`
    fn open(&self, key: &SymmetricKey, nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
        encryption::decrypt(key, nonce, ciphertext)
    }

    /// Draw a fresh random nonce
    fn random_nonce(&self) -> Result<Nonce> {
        let mut bytes = [0u8; NONCE_SIZE];
        self.fill_random(&mut bytes)?;
        Ok(Nonce::from_bytes(bytes))
    }
}

/// Operating-system randomness with the pure-Rust AES-GCM implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCryptoProvider;

impl CryptoProvider for SystemCryptoProvider {
    fn fill_random(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| Error::PlatformCryptoUnavailable(format!("secure random source: {e}")))
    }
}

/// Deterministic provider seeded from a `u64`
///
/// Two providers built from the same seed produce the same nonce sequence.
/// **Not** for production: nonces repeat across instances with equal seeds.
#[derive(Debug)]
pub struct SeededCryptoProvider {
    rng: Mutex<StdRng>,
}

impl SeededCryptoProvider {
    /// Create a provider from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CryptoProvider for SeededCryptoProvider {
    fn fill_random(&self, dest: &mut [u8]) -> Result<()> {
        self.rng.lock().fill_bytes(dest);
        Ok(())
    }
}
