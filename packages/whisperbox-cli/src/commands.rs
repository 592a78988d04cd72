//! Subcommand handlers.
//!
//! Results go to the writer passed to [`run`]; diagnostics go to tracing.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use whisperbox_core::codec::{format_preview_with_limit, AddressCodec, Payload};
use whisperbox_core::{LocalChain, LocalWallet, Messenger, MessengerConfig, Wallet};

use crate::{Args, Command, WalletCommand};

pub async fn run(args: Args, out: &mut impl Write) -> Result<()> {
    let Args {
        config: config_path,
        state,
        wallet: wallet_path,
        command,
    } = args;

    let config = MessengerConfig::load_or_default(&config_path)
        .wrap_err_with(|| format!("loading config {}", config_path.display()))?;
    tracing::debug!(
        path = %config_path.display(),
        contract = %config.contract_address,
        chain_id = config.chain_id,
        "Config ready"
    );

    match command {
        Command::Address => {
            writeln!(out, "contract: {}", config.contract_address)?;
            writeln!(out, "chain id: {}", config.chain_id)?;
        }

        Command::Wallet(WalletCommand::New { force }) => {
            if wallet_path.exists() && !force {
                bail!(
                    "wallet file {} already exists (use --force to replace it)",
                    wallet_path.display()
                );
            }
            let wallet = LocalWallet::generate();
            std::fs::write(&wallet_path, wallet.secret_hex())
                .wrap_err_with(|| format!("writing wallet {}", wallet_path.display()))?;
            tracing::info!(path = %wallet_path.display(), address = %wallet.address(), "Wallet created");
            writeln!(out, "{}", wallet.address())?;
        }

        Command::Wallet(WalletCommand::Show) => {
            let wallet = load_wallet(&wallet_path)?;
            writeln!(out, "{}", wallet.address())?;
        }

        Command::Send { to, text } => {
            let (chain, messenger) = connect(&state, &wallet_path, config)?;
            let receipt = messenger.send(&to, &text).await?;
            chain
                .save(&state)
                .wrap_err_with(|| format!("saving chain state {}", state.display()))?;
            tracing::info!(path = %state.display(), tx = receipt.tx_hash.as_str(), "Chain state saved");
            writeln!(out, "tx: {}", receipt.tx_hash)?;
            writeln!(out, "index: {}", receipt.index)?;
        }

        Command::List { user } => {
            let (_, messenger) = connect(&state, &wallet_path, config)?;
            let owner = user.unwrap_or_else(|| messenger.account());
            let inbox = messenger.inbox_for(&owner).await?;

            if inbox.is_empty() {
                writeln!(out, "No messages for {owner}")?;
            }
            for entry in &inbox {
                writeln!(
                    out,
                    "[{}] from {} at {}  {}",
                    entry.index,
                    entry.message.from,
                    whisperbox_core::time::format_timestamp(entry.message.timestamp),
                    messenger.preview(entry)
                )?;
            }
        }

        Command::Read { index } => {
            let (_, messenger) = connect(&state, &wallet_path, config)?;
            let entry = messenger.entry(index).await?;
            writeln!(out, "{}", messenger.read(&entry)?)?;
        }

        Command::DecryptAddr { index } => {
            let (_, messenger) = connect(&state, &wallet_path, config)?;
            let entry = messenger.entry(index).await?;
            writeln!(out, "{}", messenger.reveal_sender(&entry).await?)?;
        }

        Command::Encrypt { to, text, hex } => {
            let codec = AddressCodec::system();
            if hex {
                let bytes = codec.encrypt_to_bytes(&to, &text)?;
                writeln!(out, "0x{}", ::hex::encode(bytes))?;
            } else {
                writeln!(out, "{}", codec.encrypt(&to, &text)?)?;
            }
        }

        Command::Decrypt { address, payload } => {
            writeln!(out, "{}", whisperbox_core::decrypt(&address, payload)?)?;
        }

        Command::Preview { payload } => {
            writeln!(
                out,
                "{}",
                format_preview_with_limit(&Payload::from(payload), config.preview_limit)
            )?;
        }
    }

    Ok(())
}

fn load_wallet(path: &Path) -> Result<LocalWallet> {
    let secret = std::fs::read_to_string(path).wrap_err_with(|| {
        format!(
            "reading wallet {} (create one with `whisperbox wallet new`)",
            path.display()
        )
    })?;
    Ok(LocalWallet::from_secret_hex(&secret)?)
}

fn connect(
    state: &Path,
    wallet: &Path,
    config: MessengerConfig,
) -> Result<(Arc<LocalChain>, Messenger)> {
    let wallet = Arc::new(load_wallet(wallet)?);
    let chain = Arc::new(
        LocalChain::open(state, &config)
            .wrap_err_with(|| format!("opening chain state {}", state.display()))?,
    );
    let messenger = Messenger::new(wallet, chain.clone(), chain.clone(), config)?;
    Ok((chain, messenger))
}
