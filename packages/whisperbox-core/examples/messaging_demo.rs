//! # Messaging Demo
//!
//! Sends a message between two wallets on an in-process chain, then reads
//! the body and reveals the sender.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example messaging_demo
//! ```

use std::sync::Arc;

use whisperbox_core::{LocalChain, LocalWallet, Messenger, MessengerConfig, Wallet};

#[tokio::main]
async fn main() {
    println!("=== WhisperBox Core: Messaging Demo ===\n");

    let config = MessengerConfig {
        contract_address: "0x5fbdb2315678afecb367f032d93f642f64180aa3"
            .parse()
            .expect("Invalid contract address"),
        chain_id: 31_337,
        ..MessengerConfig::default()
    };
    let chain = Arc::new(LocalChain::from_config(&config));

    // Step 1: Wallets
    println!("Step 1: Creating wallets for Alice, Bob and Carol...");
    let alice_wallet = Arc::new(LocalWallet::generate());
    let bob_wallet = Arc::new(LocalWallet::generate());
    let carol_wallet = Arc::new(LocalWallet::generate());

    let alice = Messenger::new(alice_wallet.clone(), chain.clone(), chain.clone(), config.clone())
        .expect("Invalid config");
    let bob = Messenger::new(bob_wallet.clone(), chain.clone(), chain.clone(), config.clone())
        .expect("Invalid config");
    let carol = Messenger::new(carol_wallet, chain.clone(), chain.clone(), config)
        .expect("Invalid config");

    println!("  Alice: {}", alice.account());
    println!("  Bob:   {}", bob.account());
    println!("  Carol: {}", carol.account());
    println!();

    // Step 2: Send
    println!("Step 2: Alice sends Bob a message...");
    println!();
    println!("  ┌─────────────────────────────────────────────────────────────┐");
    println!("  │                      SEND FLOW                              │");
    println!("  ├─────────────────────────────────────────────────────────────┤");
    println!("  │                                                             │");
    println!("  │   Alice ──encrypt own address──► Relayer ──► handle, proof │");
    println!("  │     │                                                       │");
    println!("  │     ├──encrypt text under Bob's address──► payload         │");
    println!("  │     │                                                       │");
    println!("  │     └──sendMessage(Bob, payload, handle, proof)──► Chain   │");
    println!("  │                                                             │");
    println!("  └─────────────────────────────────────────────────────────────┘");
    println!();

    let receipt = alice
        .send(&bob_wallet.address(), "Lunch on Friday?")
        .await
        .expect("Send failed");
    println!("  tx: {}", receipt.tx_hash);
    println!();

    // Step 3: Inbox
    println!("Step 3: Bob lists his inbox...");
    let inbox = bob.inbox().await.expect("Inbox failed");
    for entry in &inbox {
        println!("  [{}] from {}  {}", entry.index, entry.message.from, bob.preview(entry));
    }
    println!();

    // Step 4: Read and reveal
    let entry = &inbox[0];
    println!("Step 4: Bob reads the message and reveals the sender...");
    println!("  Body:   {}", bob.read(entry).expect("Read failed"));
    let sender = bob.reveal_sender(entry).await.expect("Reveal failed");
    println!("  Sender: {sender} (is Alice: {})", sender == alice_wallet.address());
    println!();

    // Step 5: Outsider
    println!("Step 5: Carol tries the same...");
    match carol.read(entry) {
        Ok(_) => println!("  Body: unexpectedly readable"),
        Err(e) => println!("  Body:   {e}"),
    }
    match carol.reveal_sender(entry).await {
        Ok(_) => println!("  Sender: unexpectedly revealed"),
        Err(e) => println!("  Sender: {e}"),
    }
    println!();

    println!("=== Demo Complete ===");
}
