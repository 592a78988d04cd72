//! WhisperBox CLI
//!
//! Developer task runner against an in-process local chain:
//!
//! 1. **Codec**: encrypt, decrypt and preview payloads for an address.
//!
//! 2. **Messaging**: send to an address, list an inbox, read bodies and
//!    reveal FHE-encrypted senders.
//!
//! Chain state is kept in a JSON file between runs and rewritten after
//! every send.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use whisperbox_core::Address;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "whisperbox", version, about = "WhisperBox encrypted messenger")]
struct Args {
    /// Messenger config file (JSON)
    #[arg(long, default_value = "whisperbox.json", env = "WHISPERBOX_CONFIG")]
    config: PathBuf,

    /// Local chain state file
    #[arg(long, default_value = "whisperbox-chain.json", env = "WHISPERBOX_STATE")]
    state: PathBuf,

    /// Wallet secret file
    #[arg(long, default_value = "whisperbox-wallet.key", env = "WHISPERBOX_WALLET")]
    wallet: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the messenger contract address and chain id
    Address,

    /// Manage the local wallet
    #[command(subcommand)]
    Wallet(WalletCommand),

    /// Encrypt and send a message
    Send {
        /// Recipient address
        #[arg(long)]
        to: Address,
        /// Message text
        #[arg(long)]
        text: String,
    },

    /// List inbox entries with previews
    List {
        /// Inbox owner (defaults to the wallet's address)
        #[arg(long)]
        user: Option<Address>,
    },

    /// Decrypt a message body from the wallet's inbox
    Read {
        /// Inbox index
        #[arg(long)]
        index: u64,
    },

    /// Reveal the sender of a message in the wallet's inbox
    DecryptAddr {
        /// Inbox index
        #[arg(long)]
        index: u64,
    },

    /// Encrypt text for an address without sending it
    Encrypt {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Message text
        #[arg(long)]
        text: String,
        /// Print `0x`-hex instead of base64
        #[arg(long)]
        hex: bool,
    },

    /// Decrypt a hex or base64 payload with an address
    Decrypt {
        /// Address the payload was encrypted for
        #[arg(long)]
        address: String,
        /// `0x`-hex or base64 payload
        #[arg(long)]
        payload: String,
    },

    /// Show a bounded preview of a payload
    Preview {
        /// Payload text
        #[arg(long)]
        payload: String,
    },
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Create a new wallet secret file
    New {
        /// Overwrite an existing wallet file
        #[arg(long)]
        force: bool,
    },

    /// Print the wallet address
    Show,
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whisperbox=info,whisperbox_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut stdout = std::io::stdout();
    commands::run(args, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let args = Args::try_parse_from([
            "whisperbox",
            "send",
            "--to",
            "0xAbCdEf0000000000000000000000000000000001",
            "--text",
            "hi",
        ])
        .unwrap();

        match args.command {
            Command::Send { to, text } => {
                assert_eq!(to.to_string(), "0xabcdef0000000000000000000000000000000001");
                assert_eq!(text, "hi");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_recipient() {
        for bad in ["0x1234", "abcdef0000000000000000000000000000000001", "0xZZ"] {
            let result =
                Args::try_parse_from(["whisperbox", "send", "--to", bad, "--text", "hi"]);
            assert!(result.is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_list_user_is_optional() {
        let args = Args::try_parse_from(["whisperbox", "list"]).unwrap();
        assert!(matches!(args.command, Command::List { user: None }));

        let args = Args::try_parse_from([
            "whisperbox",
            "--state",
            "other.json",
            "list",
            "--user",
            "0x0000000000000000000000000000000000000002",
        ])
        .unwrap();
        assert_eq!(args.state, PathBuf::from("other.json"));
        assert!(matches!(args.command, Command::List { user: Some(_) }));
    }

    #[test]
    fn test_wallet_subcommands() {
        let args = Args::try_parse_from(["whisperbox", "wallet", "new", "--force"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Wallet(WalletCommand::New { force: true })
        ));
        assert!(Args::try_parse_from(["whisperbox", "wallet"]).is_err());
    }
}
