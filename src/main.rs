//! Stellar testnet bootstrap CLI.
//!
//! ```text
//!   keygen ──────────────▶ fresh identity (not persisted)
//!   bootstrap ───────────▶ credential file? ──no──▶ generate → faucet → write file
//!                                 │yes
//!                                 ▼
//!                              load seed ──▶ balances
//!   fund / balance ──────▶ faucet / ledger query
//!   pay / create-account ▶ load seed → query → build → sign → submit
//! ```
//!
//! Exit codes: 0 success, 2 configuration, 3 credentials, 4 funding,
//! 5 account not found, 6 network, 7 rejected, 8 invalid input.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use stellar_bootstrap::blockchain::{
    self, AccountId, Balance, Faucet, FriendbotClient, HorizonClient, Identity, LedgerApi,
    SubmissionResult, TxBuilder, WalletResult,
};
use stellar_bootstrap::config::{self, AppConfig};
use stellar_bootstrap::observability::logging;

const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "stellar-bootstrap")]
#[command(about = "Create, fund and use Stellar testnet accounts", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh keypair without persisting or funding it
    Keygen {
        /// Also print the secret seed
        #[arg(long)]
        show_secret: bool,
    },
    /// Load the stored identity, or create and fund a new one
    Bootstrap {
        /// Credential file (defaults to credentials.path from config)
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
    /// Request faucet funding for an address
    Fund { address: String },
    /// Show balances of an address
    Balance { address: String },
    /// Send a native payment from the stored identity
    Pay {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
    /// Create and fund a new account from the stored identity
    CreateAccount {
        #[arg(long)]
        destination: String,
        #[arg(long)]
        starting_balance: String,
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    logging::init(&config.observability.log_level);

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> WalletResult<()> {
    let timeout = Duration::from_secs(config.http.timeout_secs);

    match command {
        Commands::Keygen { show_secret } => {
            let identity = Identity::generate()?;
            println!("Address: {}", identity.address());
            if show_secret {
                println!("Seed:    {}", identity.secret_seed());
            }
        }
        Commands::Bootstrap { credentials } => {
            let faucet = FriendbotClient::new(&config.network.friendbot_url, timeout)?;
            let ledger = HorizonClient::new(&config.network.horizon_url, timeout)?;

            let path = credentials_path(credentials, config);
            let identity = blockchain::load_or_create_identity(&path, &faucet).await?;
            println!("Address: {}", identity.address());
            print_balances(&ledger.balances(&identity.address()).await?);
        }
        Commands::Fund { address } => {
            AccountId::parse(&address)?;
            let faucet = FriendbotClient::new(&config.network.friendbot_url, timeout)?;
            faucet.request_funding(&address).await?;
            println!("Funded {}", address);
        }
        Commands::Balance { address } => {
            let ledger = HorizonClient::new(&config.network.horizon_url, timeout)?;
            print_balances(&ledger.balances(&address).await?);
        }
        Commands::Pay {
            to,
            amount,
            credentials,
        } => {
            let source = blockchain::load_identity(&credentials_path(credentials, config))?;
            let result = tx_builder(config, timeout)?
                .submit_payment(&source, &to, &amount)
                .await?;
            print_submission(&result);
        }
        Commands::CreateAccount {
            destination,
            starting_balance,
            credentials,
        } => {
            let funder = blockchain::load_identity(&credentials_path(credentials, config))?;
            let result = tx_builder(config, timeout)?
                .create_funded_account(&funder, &destination, &starting_balance)
                .await?;
            print_submission(&result);
        }
    }

    Ok(())
}

fn credentials_path(flag: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    flag.unwrap_or_else(|| Path::new(&config.credentials.path).to_path_buf())
}

fn tx_builder(config: &AppConfig, timeout: Duration) -> WalletResult<TxBuilder> {
    let ledger = HorizonClient::new(&config.network.horizon_url, timeout)?;
    Ok(TxBuilder::new(
        Arc::new(ledger),
        config.transaction.clone(),
        &config.network.passphrase,
    ))
}

fn print_balances(balances: &[Balance]) {
    for balance in balances {
        println!(
            "{} {} {}",
            balance.amount,
            balance.asset_type,
            balance.asset_code.as_deref().unwrap_or("")
        );
    }
}

fn print_submission(result: &SubmissionResult) {
    println!("Hash:   {}", result.hash);
    println!("Ledger: {}", result.ledger);
}
