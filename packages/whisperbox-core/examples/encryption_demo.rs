//! # Encryption Demo
//!
//! Demonstrates the address-keyed message codec.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example encryption_demo
//! ```

use whisperbox_core::codec::{format_preview, AddressCodec, Payload};
use whisperbox_core::crypto::derive_key;
use whisperbox_core::Error;

fn main() {
    println!("=== WhisperBox Core: Address Codec Demo ===\n");

    let recipient = "0xAbCdEf0000000000000000000000000000000001";
    let stranger = "0x0000000000000000000000000000000000000002";

    // Step 1: Derive the key
    println!("Step 1: Deriving the key from the recipient address...");
    println!();
    println!("  ┌─────────────────────────────────────────────────────────────┐");
    println!("  │                     KEY DERIVATION                          │");
    println!("  ├─────────────────────────────────────────────────────────────┤");
    println!("  │                                                             │");
    println!("  │   \"0xAbCd...0001\" ──lowercase──► \"0xabcd...0001\"            │");
    println!("  │                                        │                    │");
    println!("  │                                     SHA-256                 │");
    println!("  │                                        │                    │");
    println!("  │                                        ▼                    │");
    println!("  │                              AES-256-GCM key (32 bytes)     │");
    println!("  │                                                             │");
    println!("  └─────────────────────────────────────────────────────────────┘");
    println!();

    let upper = derive_key(recipient);
    let lower = derive_key(&recipient.to_lowercase());
    println!("  Same key for either case: {}", upper == lower);
    println!();

    // Step 2: Encrypt
    println!("Step 2: Encrypting a message...");
    let codec = AddressCodec::system();
    let message = "Meet at the usual place at noon.";

    let first = codec.encrypt(recipient, message).expect("Encryption failed");
    let second = codec.encrypt(recipient, message).expect("Encryption failed");

    println!("  Payload (base64): {first}");
    println!("  Fresh nonce each time: {}", first != second);
    println!();

    // Step 3: Decrypt in either encoding
    println!("Step 3: Decrypting...");
    let from_base64 = codec
        .decrypt(recipient, first.as_str())
        .expect("Decryption failed");
    println!("  From base64: {from_base64}");

    let bytes = codec
        .encrypt_to_bytes(recipient, message)
        .expect("Encryption failed");
    let hex_payload = format!("0x{}", hex::encode(&bytes));
    let from_hex = codec
        .decrypt(recipient, hex_payload.as_str())
        .expect("Decryption failed");
    println!("  From hex:    {from_hex}");
    println!();

    // Step 4: Wrong address
    println!("Step 4: Decrypting with the wrong address...");
    match codec.decrypt(stranger, first.as_str()) {
        Err(Error::DecryptionFailed) => println!("  Rejected: authentication tag mismatch"),
        other => println!("  Unexpected result: {other:?}"),
    }
    println!();

    // Step 5: Preview
    println!("Step 5: Inbox preview...");
    println!("  {}", format_preview(&Payload::from(hex_payload)));
    println!();

    println!("=== Demo Complete ===");
}
