//! # Messenger
//!
//! Orchestrates sending and reading messages through three collaborators:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         MESSENGER SERVICE                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   ┌──────────┐     ┌───────────────────┐     ┌──────────────────┐      │
//! │   │  Wallet  │     │ MessengerContract │     │    FheRelayer    │      │
//! │   │          │     │                   │     │                  │      │
//! │   │ address  │     │ sendMessage       │     │ encrypt_address  │      │
//! │   │ sign     │     │ getMessageCount   │     │ user_decrypt_    │      │
//! │   │          │     │ getMessageAt      │     │   address        │      │
//! │   └────┬─────┘     └─────────┬─────────┘     └────────┬─────────┘      │
//! │        └─────────────────────┼────────────────────────┘                │
//! │                              ▼                                          │
//! │                        ┌───────────┐      ┌──────────────┐              │
//! │                        │ Messenger │─────►│ AddressCodec │              │
//! │                        └───────────┘      └──────────────┘              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Send
//!
//! 1. The codec encrypts the text under the **recipient's** address.
//! 2. The relayer encrypts the sender's own address → `(handle, proof)`.
//! 3. `sendMessage(to, encryptedContent, handle, proof)`.
//!
//! ## Read
//!
//! Message bodies open with the connected account's own address. The
//! sender is revealed only through the relayer, after the wallet signs a
//! [`DecryptAuthorization`].
//!
//! Nothing in this module logs message text or revealed senders.

mod local;
mod types;
mod wallet;

use std::sync::Arc;

use async_trait::async_trait;

use crate::address::Address;
use crate::codec::{format_preview_with_limit, AddressCodec, Payload};
use crate::config::MessengerConfig;
use crate::error::Result;

pub use local::{ChainState, HandleRecord, LocalChain, LocalChainSnapshot};
pub use types::{
    DecryptAuthorization, EncryptedInput, Handle, InboxEntry, StoredMessage, TxReceipt,
    WalletSignature, HANDLE_SIZE,
};
pub use wallet::{address_for_public_key, recover_signer, LocalWallet, Wallet};

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// The on-chain messenger contract
#[async_trait]
pub trait MessengerContract: Send + Sync {
    /// `sendMessage(to, encryptedContent, encryptedAddressHandle, proof)`,
    /// signed by `signer`
    async fn send_message(
        &self,
        signer: &dyn Wallet,
        to: &Address,
        encrypted_content: &str,
        encrypted_sender: &Handle,
        input_proof: &[u8],
    ) -> Result<TxReceipt>;

    /// `getMessageCount(owner)`
    async fn message_count(&self, owner: &Address) -> Result<u64>;

    /// `getMessageAt(owner, index)`
    async fn message_at(&self, owner: &Address, index: u64) -> Result<StoredMessage>;
}

/// The FHE relayer
#[async_trait]
pub trait FheRelayer: Send + Sync {
    /// Encrypt `value` as an input for `contract`, submitted by `user`
    async fn encrypt_address(
        &self,
        contract: &Address,
        user: &Address,
        value: &Address,
    ) -> Result<EncryptedInput>;

    /// Decrypt an address handle on behalf of an authorized user
    async fn user_decrypt_address(
        &self,
        handle: &Handle,
        contract: &Address,
        authorization: &DecryptAuthorization,
    ) -> Result<Address>;
}

// ============================================================================
// SERVICE
// ============================================================================

/// Send, list and decrypt messages for the connected wallet
pub struct Messenger {
    wallet: Arc<dyn Wallet>,
    contract: Arc<dyn MessengerContract>,
    relayer: Arc<dyn FheRelayer>,
    codec: AddressCodec,
    config: MessengerConfig,
}

impl Messenger {
    /// Create a messenger using the system codec
    pub fn new(
        wallet: Arc<dyn Wallet>,
        contract: Arc<dyn MessengerContract>,
        relayer: Arc<dyn FheRelayer>,
        config: MessengerConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            wallet,
            contract,
            relayer,
            codec: AddressCodec::system(),
            config,
        })
    }

    /// Replace the codec (e.g. with a seeded provider)
    pub fn with_codec(mut self, codec: AddressCodec) -> Self {
        self.codec = codec;
        self
    }

    /// The connected account
    pub fn account(&self) -> Address {
        self.wallet.address()
    }

    /// The active configuration
    pub fn config(&self) -> &MessengerConfig {
        &self.config
    }

    /// Encrypt `text` for `to` and submit it
    pub async fn send(&self, to: &Address, text: &str) -> Result<TxReceipt> {
        let sender = self.wallet.address();
        let contract = self.config.contract_address;

        let encrypted_content = self.codec.encrypt(&to.to_string(), text)?;
        let input = self
            .relayer
            .encrypt_address(&contract, &sender, &sender)
            .await?;

        let receipt = self
            .contract
            .send_message(
                self.wallet.as_ref(),
                to,
                &encrypted_content,
                &input.handle,
                &input.input_proof,
            )
            .await?;

        tracing::info!(
            %to,
            content_len = encrypted_content.len(),
            tx = receipt.tx_hash.as_str(),
            "Message sent"
        );
        Ok(receipt)
    }

    /// Messages addressed to the connected account
    pub async fn inbox(&self) -> Result<Vec<InboxEntry>> {
        self.inbox_for(&self.wallet.address()).await
    }

    /// Messages addressed to `owner`, in index order
    pub async fn inbox_for(&self, owner: &Address) -> Result<Vec<InboxEntry>> {
        let count = self.contract.message_count(owner).await?;

        let mut entries = Vec::with_capacity(usize::try_from(count).unwrap_or_default());
        for index in 0..count {
            let message = self.contract.message_at(owner, index).await?;
            entries.push(InboxEntry { index, message });
        }

        tracing::info!(%owner, count, "Loaded inbox");
        Ok(entries)
    }

    /// One message addressed to the connected account
    pub async fn entry(&self, index: u64) -> Result<InboxEntry> {
        let message = self
            .contract
            .message_at(&self.wallet.address(), index)
            .await?;
        Ok(InboxEntry { index, message })
    }

    /// Decrypt a message body with the connected account's address
    pub fn read(&self, entry: &InboxEntry) -> Result<String> {
        self.codec.decrypt(
            &self.wallet.address().to_string(),
            entry.message.encrypted_content.as_str(),
        )
    }

    /// Reveal the FHE-encrypted sender of a message
    pub async fn reveal_sender(&self, entry: &InboxEntry) -> Result<Address> {
        let user = self.wallet.address();
        let contract = self.config.contract_address;
        let chain_id = self.config.chain_id;

        let message = DecryptAuthorization::message(&user, &contract, chain_id);
        let signature = self.wallet.sign(message.as_bytes()).await?;
        let authorization = DecryptAuthorization {
            user,
            contract,
            chain_id,
            signature,
        };

        tracing::debug!(index = entry.index, handle = %entry.message.encrypted_sender, "Requesting sender decryption");

        self.relayer
            .user_decrypt_address(&entry.message.encrypted_sender, &contract, &authorization)
            .await
    }

    /// Bounded preview of the stored payload
    pub fn preview(&self, entry: &InboxEntry) -> String {
        let payload = Payload::from(entry.message.encrypted_content.as_str());
        format_preview_with_limit(&payload, self.config.preview_limit)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SeededCryptoProvider;
    use crate::error::Error;

    struct Party {
        wallet: Arc<LocalWallet>,
        messenger: Messenger,
    }

    fn config() -> MessengerConfig {
        MessengerConfig {
            contract_address: "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap(),
            chain_id: 31_337,
            preview_limit: 16,
        }
    }

    fn party(chain: &Arc<LocalChain>) -> Party {
        let wallet = Arc::new(LocalWallet::generate());
        let messenger = Messenger::new(wallet.clone(), chain.clone(), chain.clone(), config()).unwrap();
        Party { wallet, messenger }
    }

    #[tokio::test]
    async fn test_send_list_read_reveal() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let alice = party(&chain);
        let bob = party(&chain);

        let receipt = alice
            .messenger
            .send(&bob.wallet.address(), "hello")
            .await
            .unwrap();
        assert_eq!(receipt.recipient, bob.wallet.address());
        assert_eq!(receipt.index, 0);

        let inbox = bob.messenger.inbox().await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message.from, alice.wallet.address());
        assert_ne!(inbox[0].message.encrypted_content, "hello");

        assert_eq!(bob.messenger.read(&inbox[0]).unwrap(), "hello");
        assert_eq!(
            bob.messenger.reveal_sender(&inbox[0]).await.unwrap(),
            alice.wallet.address()
        );
        assert_eq!(
            alice.messenger.reveal_sender(&inbox[0]).await.unwrap(),
            alice.wallet.address()
        );
    }

    #[tokio::test]
    async fn test_inbox_order_and_entry() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let alice = party(&chain);
        let bob = party(&chain);

        for text in ["first", "second", "third"] {
            alice.messenger.send(&bob.wallet.address(), text).await.unwrap();
        }

        let inbox = bob.messenger.inbox().await.unwrap();
        let texts: Vec<String> = inbox.iter().map(|e| bob.messenger.read(e).unwrap()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(inbox.iter().map(|e| e.index).collect::<Vec<_>>(), [0, 1, 2]);

        let second = bob.messenger.entry(1).await.unwrap();
        assert_eq!(second, inbox[1]);
        assert!(matches!(
            bob.messenger.entry(3).await,
            Err(Error::MessageIndexOutOfRange { index: 3, count: 3 })
        ));
    }

    #[tokio::test]
    async fn test_outsider_cannot_read_or_reveal() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let alice = party(&chain);
        let bob = party(&chain);
        let carol = party(&chain);

        alice.messenger.send(&bob.wallet.address(), "for bob").await.unwrap();

        let bobs_inbox = carol.messenger.inbox_for(&bob.wallet.address()).await.unwrap();
        assert_eq!(bobs_inbox.len(), 1);

        assert!(matches!(
            carol.messenger.read(&bobs_inbox[0]),
            Err(Error::DecryptionFailed)
        ));
        assert!(matches!(
            carol.messenger.reveal_sender(&bobs_inbox[0]).await,
            Err(Error::DecryptionNotAuthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_anyone_with_recipient_address_can_read_body() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let alice = party(&chain);
        let bob = party(&chain);

        alice.messenger.send(&bob.wallet.address(), "not secret").await.unwrap();
        let entry = bob.messenger.entry(0).await.unwrap();

        let opened = AddressCodec::system()
            .decrypt(&bob.wallet.address().to_string(), entry.message.encrypted_content.as_str())
            .unwrap();
        assert_eq!(opened, "not secret");
    }

    #[tokio::test]
    async fn test_seeded_codec_and_preview() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let alice = party(&chain);
        let bob = party(&chain);

        let seeded = AddressCodec::new(Arc::new(SeededCryptoProvider::new(1)));
        let alice_messenger = alice.messenger.with_codec(seeded);

        alice_messenger
            .send(&bob.wallet.address(), "a message long enough to be cut")
            .await
            .unwrap();
        let entry = bob.messenger.entry(0).await.unwrap();

        let preview = bob.messenger.preview(&entry);
        assert_eq!(preview.chars().count(), 15);
        assert!(preview.ends_with("..."));
        assert!(entry.message.encrypted_content.starts_with(&preview[..12]));
    }

    struct NoRandomness;

    impl crate::crypto::CryptoProvider for NoRandomness {
        fn fill_random(&self, _dest: &mut [u8]) -> Result<()> {
            Err(Error::PlatformCryptoUnavailable("no entropy".into()))
        }
    }

    #[tokio::test]
    async fn test_codec_failure_creates_no_handle() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let alice = party(&chain);
        let bob = party(&chain);

        let broken = alice
            .messenger
            .with_codec(AddressCodec::new(Arc::new(NoRandomness)));
        let result = broken.send(&bob.wallet.address(), "never sealed").await;

        assert!(matches!(result, Err(Error::PlatformCryptoUnavailable(_))));
        assert!(chain.snapshot().state.handles.is_empty());
        assert!(bob.messenger.inbox().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_inbox() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let alice = party(&chain);
        assert!(alice.messenger.inbox().await.unwrap().is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let chain = Arc::new(LocalChain::from_config(&config()));
        let wallet = Arc::new(LocalWallet::generate());
        let bad = MessengerConfig {
            preview_limit: 1,
            ..config()
        };

        let result = Messenger::new(wallet, chain.clone(), chain, bad);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
