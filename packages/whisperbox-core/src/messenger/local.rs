//! # Local Development Chain
//!
//! An in-process stand-in for the messenger contract *and* the FHE relayer,
//! in the spirit of the mock relayer the contract's own test-suite runs
//! against. State can be saved to a JSON file so that separate CLI
//! invocations see the same inboxes. Saves go through a temporary file in
//! the same directory that is renamed over the target.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          LOCAL CHAIN                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  encrypt_address(contract, user, value)                                │
//! │     handle = 32 random bytes, record value                             │
//! │     proof  = SHA-256(tag || handle || contract || user)                │
//! │                                                                         │
//! │  send_message(signer, to, content, handle, proof)                      │
//! │     proof must match (handle, this contract, signer)                   │
//! │     handle not yet consumed                                            │
//! │     inbox[to].push({ from: signer, timestamp: now, ... })              │
//! │     ACL(handle) += { signer, to }                                      │
//! │                                                                         │
//! │  user_decrypt_address(handle, contract, authorization)                 │
//! │     signature valid, signer == user, contract + chain match,           │
//! │     user ∈ ACL(handle)  ──►  value                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::types::{
    DecryptAuthorization, EncryptedInput, Handle, StoredMessage, TxReceipt, HANDLE_SIZE,
};
use super::wallet::{recover_signer, Wallet};
use super::{FheRelayer, MessengerContract};
use crate::address::Address;
use crate::config::MessengerConfig;
use crate::error::{Error, Result};
use crate::time::now_timestamp;

const INPUT_PROOF_TAG: &[u8] = b"whisperbox-input-proof-v1";
const TX_HASH_TAG: &[u8] = b"whisperbox-tx-v1";

/// Relayer-side record of an encrypted address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleRecord {
    /// The plaintext address behind the handle
    pub value: Address,
    /// Contract the input was created for
    pub contract: Address,
    /// User who created the input
    pub user: Address,
    /// Accounts allowed to decrypt
    pub allowed: BTreeSet<Address>,
    /// Set once a message has carried this handle
    #[serde(default)]
    pub consumed: bool,
}

/// Persistent state of the local chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    /// Messages per recipient
    pub inboxes: BTreeMap<Address, Vec<StoredMessage>>,
    /// Encrypted values known to the relayer
    pub handles: BTreeMap<Handle, HandleRecord>,
}

/// On-disk form of a [`LocalChain`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalChainSnapshot {
    /// Messenger contract address
    pub contract: Address,
    /// Chain id
    pub chain_id: u64,
    /// Inboxes and handles
    pub state: ChainState,
}

/// In-memory messenger contract plus mock FHE relayer
#[derive(Debug)]
pub struct LocalChain {
    contract: Address,
    chain_id: u64,
    state: RwLock<ChainState>,
}

impl LocalChain {
    /// Create an empty chain hosting `contract`
    pub fn new(contract: Address, chain_id: u64) -> Self {
        Self {
            contract,
            chain_id,
            state: RwLock::new(ChainState::default()),
        }
    }

    /// Create an empty chain from a messenger config
    pub fn from_config(config: &MessengerConfig) -> Self {
        Self::new(config.contract_address, config.chain_id)
    }

    /// The hosted contract address
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    /// The chain id
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Copy out the current state
    pub fn snapshot(&self) -> LocalChainSnapshot {
        LocalChainSnapshot {
            contract: self.contract,
            chain_id: self.chain_id,
            state: self.state.read().clone(),
        }
    }

    /// Rebuild a chain from a snapshot
    pub fn restore(snapshot: LocalChainSnapshot) -> Self {
        Self {
            contract: snapshot.contract,
            chain_id: snapshot.chain_id,
            state: RwLock::new(snapshot.state),
        }
    }

    /// Write the state to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot())?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| Error::Io(e.error.to_string()))?;

        tracing::debug!(path = %path.display(), "Saved local chain");
        Ok(())
    }

    /// Read a chain from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: LocalChainSnapshot = serde_json::from_str(&json)?;
        Ok(Self::restore(snapshot))
    }

    /// Load the chain at `path` if it exists, else start an empty one
    ///
    /// An existing file must host the configured contract on the
    /// configured chain.
    pub fn open(path: impl AsRef<Path>, config: &MessengerConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), contract = %config.contract_address, "Starting new local chain");
            return Ok(Self::from_config(config));
        }

        let chain = Self::load(path)?;
        if chain.contract != config.contract_address || chain.chain_id != config.chain_id {
            return Err(Error::InvalidConfig(format!(
                "state file hosts {} on chain {}, config expects {} on chain {}",
                chain.contract, chain.chain_id, config.contract_address, config.chain_id
            )));
        }
        Ok(chain)
    }

    fn input_proof(handle: &Handle, contract: &Address, user: &Address) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(INPUT_PROOF_TAG);
        hasher.update(handle.as_bytes());
        hasher.update(contract.as_bytes());
        hasher.update(user.as_bytes());
        hasher.finalize().to_vec()
    }

    fn tx_hash(from: &Address, to: &Address, index: u64, message: &StoredMessage) -> String {
        let mut hasher = Sha256::new();
        hasher.update(TX_HASH_TAG);
        hasher.update(from.as_bytes());
        hasher.update(to.as_bytes());
        hasher.update(index.to_be_bytes());
        hasher.update(message.timestamp.to_be_bytes());
        hasher.update(message.encrypted_content.as_bytes());
        hasher.update(message.encrypted_sender.as_bytes());
        format!("0x{}", hex::encode(hasher.finalize()))
    }
}

#[async_trait]
impl MessengerContract for LocalChain {
    async fn send_message(
        &self,
        signer: &dyn Wallet,
        to: &Address,
        encrypted_content: &str,
        encrypted_sender: &Handle,
        input_proof: &[u8],
    ) -> Result<TxReceipt> {
        let from = signer.address();
        let mut state = self.state.write();

        let record = state
            .handles
            .get_mut(encrypted_sender)
            .ok_or(Error::InvalidInputProof)?;

        let expected = Self::input_proof(encrypted_sender, &self.contract, &from);
        if record.contract != self.contract || record.user != from || expected != input_proof {
            return Err(Error::InvalidInputProof);
        }
        if record.consumed {
            tracing::warn!(%from, handle = %encrypted_sender, "Encrypted input replayed");
            return Err(Error::InvalidInputProof);
        }

        record.consumed = true;
        record.allowed.insert(from);
        record.allowed.insert(*to);

        let message = StoredMessage {
            from,
            timestamp: now_timestamp(),
            encrypted_content: encrypted_content.to_owned(),
            encrypted_sender: *encrypted_sender,
        };

        let inbox = state.inboxes.entry(*to).or_default();
        let index = inbox.len() as u64;
        let tx_hash = Self::tx_hash(&from, to, index, &message);
        inbox.push(message);

        tracing::info!(%from, %to, index, tx = tx_hash.as_str(), "Message stored");

        Ok(TxReceipt {
            tx_hash,
            recipient: *to,
            index,
        })
    }

    async fn message_count(&self, owner: &Address) -> Result<u64> {
        let state = self.state.read();
        Ok(state.inboxes.get(owner).map_or(0, |inbox| inbox.len() as u64))
    }

    async fn message_at(&self, owner: &Address, index: u64) -> Result<StoredMessage> {
        let state = self.state.read();
        let inbox = state.inboxes.get(owner).map(Vec::as_slice).unwrap_or_default();

        usize::try_from(index)
            .ok()
            .and_then(|i| inbox.get(i))
            .cloned()
            .ok_or(Error::MessageIndexOutOfRange {
                index,
                count: inbox.len() as u64,
            })
    }
}

#[async_trait]
impl FheRelayer for LocalChain {
    async fn encrypt_address(
        &self,
        contract: &Address,
        user: &Address,
        value: &Address,
    ) -> Result<EncryptedInput> {
        let mut bytes = [0u8; HANDLE_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::RelayerUnavailable(format!("handle generation failed: {e}")))?;
        let handle = Handle::from_bytes(bytes);

        self.state.write().handles.insert(
            handle,
            HandleRecord {
                value: *value,
                contract: *contract,
                user: *user,
                allowed: BTreeSet::new(),
                consumed: false,
            },
        );

        tracing::debug!(%handle, %contract, %user, "Encrypted input created");

        Ok(EncryptedInput {
            handle,
            input_proof: Self::input_proof(&handle, contract, user),
        })
    }

    async fn user_decrypt_address(
        &self,
        handle: &Handle,
        contract: &Address,
        authorization: &DecryptAuthorization,
    ) -> Result<Address> {
        if authorization.contract != *contract || *contract != self.contract {
            return Err(Error::DecryptionNotAuthorized(format!(
                "authorization is not for contract {}",
                self.contract
            )));
        }
        if authorization.chain_id != self.chain_id {
            return Err(Error::DecryptionNotAuthorized(format!(
                "authorization is for chain {}, expected {}",
                authorization.chain_id, self.chain_id
            )));
        }

        let signer = recover_signer(
            authorization.signed_message().as_bytes(),
            &authorization.signature,
        )
        .map_err(|e| Error::DecryptionNotAuthorized(e.to_string()))?;
        if signer != authorization.user {
            tracing::warn!(user = %authorization.user, %signer, "Authorization signed by another account");
            return Err(Error::DecryptionNotAuthorized(
                "authorization was not signed by the requesting user".into(),
            ));
        }

        let state = self.state.read();
        let record = state
            .handles
            .get(handle)
            .ok_or_else(|| Error::UnknownHandle(handle.to_string()))?;

        if !record.allowed.contains(&authorization.user) {
            tracing::warn!(user = %authorization.user, %handle, "User not on handle ACL");
            return Err(Error::DecryptionNotAuthorized(format!(
                "{} may not decrypt {}",
                authorization.user, handle
            )));
        }

        Ok(record.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::wallet::LocalWallet;

    fn contract() -> Address {
        "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap()
    }

    async fn authorization(wallet: &LocalWallet, chain: &LocalChain) -> DecryptAuthorization {
        let user = wallet.address();
        let message = DecryptAuthorization::message(&user, &chain.contract, chain.chain_id);
        DecryptAuthorization {
            user,
            contract: chain.contract,
            chain_id: chain.chain_id,
            signature: wallet.sign(message.as_bytes()).await.unwrap(),
        }
    }

    #[tokio::test]
    async fn test_store_and_read_message() {
        let chain = LocalChain::new(contract(), 31_337);
        let sender = LocalWallet::generate();
        let recipient = LocalWallet::generate();

        let input = chain
            .encrypt_address(&contract(), &sender.address(), &sender.address())
            .await
            .unwrap();
        let receipt = chain
            .send_message(&sender, &recipient.address(), "hello-encrypted", &input.handle, &input.input_proof)
            .await
            .unwrap();

        assert_eq!(receipt.index, 0);
        assert!(receipt.tx_hash.starts_with("0x"));
        assert_eq!(chain.message_count(&recipient.address()).await.unwrap(), 1);
        assert_eq!(chain.message_count(&sender.address()).await.unwrap(), 0);

        let stored = chain.message_at(&recipient.address(), 0).await.unwrap();
        assert_eq!(stored.from, sender.address());
        assert_eq!(stored.encrypted_content, "hello-encrypted");
        assert!(stored.timestamp > 0);
        assert_eq!(stored.encrypted_sender, input.handle);
    }

    #[tokio::test]
    async fn test_index_out_of_range() {
        let chain = LocalChain::new(contract(), 31_337);
        let owner = LocalWallet::generate().address();

        let result = chain.message_at(&owner, 0).await;
        assert!(matches!(
            result,
            Err(Error::MessageIndexOutOfRange { index: 0, count: 0 })
        ));
    }

    #[tokio::test]
    async fn test_proof_bound_to_submitter() {
        let chain = LocalChain::new(contract(), 31_337);
        let alice = LocalWallet::generate();
        let mallory = LocalWallet::generate();

        let input = chain
            .encrypt_address(&contract(), &alice.address(), &alice.address())
            .await
            .unwrap();

        let result = chain
            .send_message(&mallory, &alice.address(), "x", &input.handle, &input.input_proof)
            .await;
        assert!(matches!(result, Err(Error::InvalidInputProof)));
    }

    #[tokio::test]
    async fn test_proof_bound_to_contract() {
        let chain = LocalChain::new(contract(), 31_337);
        let alice = LocalWallet::generate();

        let input = chain
            .encrypt_address(&Address::ZERO, &alice.address(), &alice.address())
            .await
            .unwrap();

        let result = chain
            .send_message(&alice, &alice.address(), "x", &input.handle, &input.input_proof)
            .await;
        assert!(matches!(result, Err(Error::InvalidInputProof)));
    }

    #[tokio::test]
    async fn test_input_cannot_be_replayed() {
        let chain = LocalChain::new(contract(), 31_337);
        let sender = LocalWallet::generate();
        let bob = LocalWallet::generate();
        let carol = LocalWallet::generate();

        let input = chain
            .encrypt_address(&contract(), &sender.address(), &sender.address())
            .await
            .unwrap();
        chain
            .send_message(&sender, &bob.address(), "first", &input.handle, &input.input_proof)
            .await
            .unwrap();

        let replay = chain
            .send_message(&sender, &carol.address(), "second", &input.handle, &input.input_proof)
            .await;
        assert!(matches!(replay, Err(Error::InvalidInputProof)));
        assert_eq!(chain.message_count(&carol.address()).await.unwrap(), 0);

        let denied = chain
            .user_decrypt_address(&input.handle, &contract(), &authorization(&carol, &chain).await)
            .await;
        assert!(matches!(denied, Err(Error::DecryptionNotAuthorized(_))));

        let record = chain.snapshot().state.handles[&input.handle].clone();
        assert!(record.consumed);
        assert_eq!(record.allowed.len(), 2);
    }

    #[tokio::test]
    async fn test_user_decrypt_acl() {
        let chain = LocalChain::new(contract(), 31_337);
        let sender = LocalWallet::generate();
        let recipient = LocalWallet::generate();
        let outsider = LocalWallet::generate();

        let input = chain
            .encrypt_address(&contract(), &sender.address(), &sender.address())
            .await
            .unwrap();

        // Not yet granted: the input has not been consumed by the contract.
        let early = chain
            .user_decrypt_address(&input.handle, &contract(), &authorization(&sender, &chain).await)
            .await;
        assert!(matches!(early, Err(Error::DecryptionNotAuthorized(_))));

        chain
            .send_message(&sender, &recipient.address(), "c", &input.handle, &input.input_proof)
            .await
            .unwrap();

        for wallet in [&sender, &recipient] {
            let revealed = chain
                .user_decrypt_address(&input.handle, &contract(), &authorization(wallet, &chain).await)
                .await
                .unwrap();
            assert_eq!(revealed, sender.address());
        }

        let denied = chain
            .user_decrypt_address(&input.handle, &contract(), &authorization(&outsider, &chain).await)
            .await;
        assert!(matches!(denied, Err(Error::DecryptionNotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_forged_authorization_rejected() {
        let chain = LocalChain::new(contract(), 31_337);
        let victim = LocalWallet::generate();
        let forger = LocalWallet::generate();

        let mut forged = authorization(&forger, &chain).await;
        forged.user = victim.address();

        let handle = Handle::from_bytes([0u8; HANDLE_SIZE]);
        let result = chain.user_decrypt_address(&handle, &contract(), &forged).await;
        assert!(matches!(result, Err(Error::DecryptionNotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_unknown_handle() {
        let chain = LocalChain::new(contract(), 31_337);
        let wallet = LocalWallet::generate();

        let handle = Handle::from_bytes([9u8; HANDLE_SIZE]);
        let result = chain
            .user_decrypt_address(&handle, &contract(), &authorization(&wallet, &chain).await)
            .await;
        assert!(matches!(result, Err(Error::UnknownHandle(_))));
    }

    #[tokio::test]
    async fn test_wrong_chain_rejected() {
        let chain = LocalChain::new(contract(), 31_337);
        let wallet = LocalWallet::generate();

        let mut auth = authorization(&wallet, &chain).await;
        auth.chain_id = 1;

        let handle = Handle::from_bytes([9u8; HANDLE_SIZE]);
        let result = chain.user_decrypt_address(&handle, &contract(), &auth).await;
        assert!(matches!(result, Err(Error::DecryptionNotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");

        let chain = LocalChain::new(contract(), 31_337);
        let sender = LocalWallet::generate();
        let input = chain
            .encrypt_address(&contract(), &sender.address(), &sender.address())
            .await
            .unwrap();
        chain
            .send_message(&sender, &sender.address(), "note to self", &input.handle, &input.input_proof)
            .await
            .unwrap();
        chain.save(&path).unwrap();

        let restored = LocalChain::load(&path).unwrap();
        assert_eq!(restored.snapshot(), chain.snapshot());
        assert_eq!(restored.message_count(&sender.address()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");

        let chain = LocalChain::new(contract(), 31_337);
        chain.save(&path).unwrap();

        let sender = LocalWallet::generate();
        let input = chain
            .encrypt_address(&contract(), &sender.address(), &sender.address())
            .await
            .unwrap();
        chain
            .send_message(&sender, &sender.address(), "again", &input.handle, &input.input_proof)
            .await
            .unwrap();
        chain.save(&path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, [std::ffi::OsString::from("chain.json")]);
        assert_eq!(LocalChain::load(&path).unwrap().snapshot(), chain.snapshot());
    }

    #[test]
    fn test_load_accepts_records_without_consumed_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        let handle = Handle::from_bytes([3u8; HANDLE_SIZE]);
        let json = format!(
            r#"{{"contract":"{c}","chain_id":31337,"state":{{"inboxes":{{}},"handles":{{"{handle}":{{"value":"{c}","contract":"{c}","user":"{c}","allowed":[]}}}}}}}}"#,
            c = contract(),
        );
        std::fs::write(&path, json).unwrap();

        let chain = LocalChain::load(&path).unwrap();
        assert!(!chain.snapshot().state.handles[&handle].consumed);
    }

    #[test]
    fn test_open_rejects_mismatched_contract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");

        LocalChain::new(contract(), 31_337).save(&path).unwrap();

        let config = MessengerConfig {
            contract_address: Address::ZERO,
            chain_id: 31_337,
            ..MessengerConfig::default()
        };
        assert!(matches!(
            LocalChain::open(&path, &config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let chain = LocalChain::open(dir.path().join("new.json"), &MessengerConfig::default()).unwrap();
        assert_eq!(chain.snapshot().state, ChainState::default());
    }
}
