use alloy::primitives::{Address, Bytes, U256};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};

use tx_express::blockchain::address::{parse_address, to_new_address, NEW_ADDRESS_PREFIX};
use tx_express::blockchain::keystore::{
    password_from_env, NEW_PASSWORD_ENV_VAR, PASSWORD_ENV_VAR,
};
use tx_express::blockchain::transaction::{
    build_transfer, encode_unsigned_legacy, signing_hash, TRANSFER_GAS_LIMIT,
};
use tx_express::blockchain::units::{format_with_unit, parse_amount, Unit};
use tx_express::blockchain::wallet::PRIVATE_KEY_ENV_VAR;
use tx_express::blockchain::{Keystore, Wallet};
use tx_express::client::ExpressClient;
use tx_express::profile::ClientProfile;
use tx_express::relay::WaitLevel;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "express-cli")]
#[command(about = "Command line client for the transaction relay", long_about = None)]
struct Cli {
    /// Relay JSON-RPC endpoint
    #[arg(short, long, default_value = "http://127.0.0.1:8888")]
    url: String,

    /// JSON-RPC method namespace
    #[arg(short, long, default_value = "newton")]
    namespace: String,

    /// Keystore directory
    #[arg(long, default_value = "wallet")]
    wallet_path: PathBuf,

    /// Profile written by `info --update`
    #[arg(long, default_value = "express-cli.toml")]
    profile: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show nonce, balance and network parameters for an address
    Info {
        address: Address,
        /// Save the result into the profile
        #[arg(long)]
        update: bool,
    },
    /// Relay an already signed transaction (hex)
    SendRaw {
        tx: Bytes,
        /// 0 = return at once, 1 = after broadcast, 2 = after confirmation
        #[arg(short, long, default_value_t = 0)]
        wait: u64,
    },
    /// Sign a transfer and relay it
    ///
    /// The key is unlocked from the keystore with --from, otherwise read from
    /// EXPRESS_CLI_PRIVATE_KEY.
    Pay {
        /// Hex or NEW address
        to: String,
        amount: String,
        /// NEW or ISAAC
        #[arg(long, default_value = "NEW")]
        unit: Unit,
        #[arg(short, long, default_value_t = 0)]
        wait: u64,
        /// Keystore account to pay from
        #[arg(long)]
        from: Option<Address>,
        /// Defaults to the profile's gas limit
        #[arg(long)]
        gas_limit: Option<u64>,
    },
    /// Manage keystore accounts
    #[command(subcommand)]
    Account(AccountCommands),
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Create accounts protected by EXPRESS_CLI_PASSWORD
    New {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// List keystore accounts
    List,
    /// Encrypt EXPRESS_CLI_PRIVATE_KEY into the keystore
    Import,
    /// Print the private key of an account
    Export { address: Address },
    /// Re-encrypt an account under EXPRESS_CLI_NEW_PASSWORD
    Update { address: Address },
    /// Show balances, of every keystore account when none are given
    Balance {
        addresses: Vec<Address>,
        /// NEW or ISAAC, chosen by magnitude when omitted
        #[arg(long)]
        unit: Option<Unit>,
    },
    /// Convert between hex and NEW addresses
    Convert {
        addresses: Vec<String>,
        /// Defaults to the relay's network id
        #[arg(long)]
        chain_id: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = ExpressClient::new(&cli.url, &cli.namespace);

    match cli.command {
        Commands::Info { address, update } => {
            let info = client.get_base_info(address).await?;
            let out = json!({
                "address": address,
                "newAddress": to_new_address(info.network_id, address),
                "balance": format_with_unit(info.balance, Some(Unit::New)),
                "nonceLatest": info.nonce_latest.to::<u64>(),
                "noncePending": info.nonce_pending.to::<u64>(),
                "gasPrice": format_with_unit(info.gas_price, Some(Unit::Isaac)),
                "networkID": info.network_id,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);

            if update {
                let mut profile = ClientProfile::load(&cli.profile)?;
                profile.record(&cli.url, address, &info);
                profile.save(&cli.profile)?;
                eprintln!("Profile saved to {}", cli.profile.display());
            }
        }
        Commands::SendRaw { tx, wait } => {
            let hash = client.send_raw_transaction(tx, WaitLevel::from(wait)).await?;
            println!("{hash}");
        }
        Commands::Pay {
            to,
            amount,
            unit,
            wait,
            from,
            gas_limit,
        } => {
            let wallet = match from {
                Some(address) => Keystore::open(&cli.wallet_path)?
                    .unlock(address, &password_from_env(PASSWORD_ENV_VAR)?)?,
                None => Wallet::from_env()?,
            };
            let gas_limit = match gas_limit {
                Some(limit) => limit,
                None => ClientProfile::load(&cli.profile)?
                    .gas_limit
                    .unwrap_or(TRANSFER_GAS_LIMIT),
            };
            let value = parse_amount(&amount, unit)?;
            let info = client.get_base_info(wallet.address()).await?;
            let to = parse_address(info.network_id, &to)?;
            let gas_price = u128::try_from(info.gas_price)
                .map_err(|_| format!("gas price {} out of range", info.gas_price))?;

            let tx = build_transfer(
                info.network_id,
                info.nonce_pending.to::<u64>(),
                to,
                value,
                gas_limit,
                gas_price,
            );
            let signature = wallet.sign_detached(&signing_hash(&tx))?;

            eprintln!(
                "Paying {} from {} to {}",
                format_with_unit(value, Some(unit)),
                wallet.address(),
                to
            );
            let hash = client
                .send_transaction(
                    wallet.address(),
                    Bytes::from(encode_unsigned_legacy(&tx)),
                    Bytes::copy_from_slice(&signature),
                    WaitLevel::from(wait),
                )
                .await?;
            println!("{hash}");
        }
        Commands::Account(command) => account(&cli.wallet_path, &client, command).await?,
    }

    Ok(())
}

async fn account(
    wallet_path: &Path,
    client: &ExpressClient,
    command: AccountCommands,
) -> CliResult<()> {
    let keystore = Keystore::open(wallet_path)?;

    match command {
        AccountCommands::New { count } => {
            let password = password_from_env(PASSWORD_ENV_VAR)?;
            for _ in 0..count {
                println!("{}", keystore.create(&password)?);
            }
        }
        AccountCommands::List => {
            for address in keystore.accounts()? {
                println!("{address}");
            }
        }
        AccountCommands::Import => {
            let key = std::env::var(PRIVATE_KEY_ENV_VAR)
                .map_err(|_| format!("environment variable {PRIVATE_KEY_ENV_VAR} not set"))?;
            let password = password_from_env(PASSWORD_ENV_VAR)?;
            println!("{}", keystore.import(&key, &password)?);
        }
        AccountCommands::Export { address } => {
            let password = password_from_env(PASSWORD_ENV_VAR)?;
            println!("{}", keystore.export(address, &password)?);
        }
        AccountCommands::Update { address } => {
            let old = password_from_env(PASSWORD_ENV_VAR)?;
            let new = password_from_env(NEW_PASSWORD_ENV_VAR)?;
            keystore.update(address, &old, &new)?;
            eprintln!("Password updated for {address}");
        }
        AccountCommands::Balance { addresses, unit } => {
            let addresses = if addresses.is_empty() {
                keystore.accounts()?
            } else {
                addresses
            };
            let mut total = U256::ZERO;
            for address in &addresses {
                let info = client.get_base_info(*address).await?;
                total = total.saturating_add(info.balance);
                println!("{address}\t{}", format_with_unit(info.balance, unit));
            }
            if addresses.len() > 1 {
                println!("Total\t{}", format_with_unit(total, unit));
            }
        }
        AccountCommands::Convert {
            addresses,
            chain_id,
        } => {
            let chain_id = match chain_id {
                Some(id) => id,
                None => client.get_base_info(Address::ZERO).await?.network_id,
            };
            for input in &addresses {
                match parse_address(chain_id, input) {
                    Ok(address) if input.starts_with(NEW_ADDRESS_PREFIX) => {
                        println!("{input}\t{address}");
                    }
                    Ok(address) => println!("{input}\t{}", to_new_address(chain_id, address)),
                    Err(e) => eprintln!("{input}\t{e}"),
                }
            }
        }
    }

    Ok(())
}
