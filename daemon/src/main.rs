//! PulseWallet daemon: runs the signing authority, manages the local wallet
//! session, shows the dashboard and claims.

use anyhow::{bail, Context};
use clap::Parser;
use pulse_authority::{AuthorityClient, PerTransaction, SigningAuthority};
use pulse_chain::{ChainReader, ExplorerClient, LocalChain};
use pulse_codec::{claim_digest, WireClaimRequest};
use pulse_crypto::{generate_keypair, keypair_from_hex, sign_digest};
use pulse_query::ResilientReader;
use pulse_rpc::{load_authority_key, AuthorityConfig, AuthorityServer};
use pulse_types::{Account, U256};
use pulse_utils::{init_tracing, LogFormat, SystemClock};
use pulse_verifier::VerifierParams;
use pulse_wallet_core::{
    ClaimOrchestrator, DashboardSnapshot, FileSessionStore, HttpAuthorityClient, KdfParams,
    SessionStore, WalletConfig,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pulse-daemon", about = "PulseWallet claim authority and wallet")]
struct Cli {
    /// Log format: "human" or "json".
    #[arg(long, env = "PULSE_LOG_FORMAT", global = true)]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PULSE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Path to a TOML configuration file: an authority config for
    /// `authority`, a wallet config for everything else. CLI flags and env
    /// vars override file values.
    #[arg(long, env = "PULSE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Signing authority service.
    Authority {
        #[command(subcommand)]
        action: AuthorityAction,
    },
    /// Manage the locally stored wallets.
    Wallet {
        #[command(flatten)]
        wallet: WalletArgs,
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Show balances, transaction count, eligibility and claim status.
    Status {
        #[command(flatten)]
        wallet: WalletArgs,
        /// Account to inspect; defaults to the selected wallet.
        address: Option<String>,
    },
    /// Request an authorization for the selected wallet, countersign it and
    /// print the claim transaction arguments.
    Claim {
        #[command(flatten)]
        wallet: WalletArgs,
        #[arg(long, env = "PULSE_WALLET_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        referrer: Option<String>,
    },
    /// Run a complete claim against an in-process authority and verifier.
    Demo {
        /// Historical transactions credited to the demo account.
        #[arg(long, default_value_t = 5)]
        transactions: u64,
        #[arg(long)]
        referrer: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum AuthorityAction {
    /// Serve the sign-claim endpoint.
    Run {
        /// Address to listen on, e.g. 127.0.0.1:3001.
        #[arg(long, env = "PULSE_LISTEN_ADDR")]
        listen: Option<String>,
        #[arg(long, env = "PULSE_EXPLORER_URL")]
        explorer_url: Option<String>,
        #[arg(long, env = "PULSE_EXPLORER_API_KEY", hide_env_values = true)]
        explorer_api_key: Option<String>,
        /// Hex private key of the authority.
        #[arg(long, env = "PULSE_AUTHORITY_KEY", hide_env_values = true)]
        authority_key: Option<String>,
        #[arg(long, env = "PULSE_AUTHORITY_KEY_FILE")]
        key_file: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct WalletArgs {
    /// Session file; overrides the configured path.
    #[arg(long, env = "PULSE_SESSION")]
    session: Option<PathBuf>,
    #[arg(long, env = "PULSE_AUTHORITY_URL")]
    authority_url: Option<String>,
    #[arg(long, env = "PULSE_EXPLORER_URL")]
    explorer_url: Option<String>,
    #[arg(long, env = "PULSE_EXPLORER_API_KEY", hide_env_values = true)]
    explorer_api_key: Option<String>,
}

#[derive(clap::Subcommand)]
enum WalletAction {
    /// Import a private key, encrypt it under a password and select it.
    Import {
        #[arg(long, env = "PULSE_IMPORT_KEY", hide_env_values = true)]
        private_key: String,
        #[arg(long, env = "PULSE_WALLET_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        label: Option<String>,
    },
    /// Make a stored wallet the selected one.
    Select { address: String },
    /// Delete a stored wallet.
    Remove { address: String },
    /// List stored wallets.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());

    match cli.command {
        Command::Authority { action } => {
            let mut config = match &config_path {
                Some(path) => AuthorityConfig::from_toml_file(path)?,
                None => AuthorityConfig::default(),
            };
            setup_logging(
                cli.log_format.as_deref().unwrap_or(&config.log_format),
                cli.log_level.as_deref().unwrap_or(&config.log_level),
            )?;
            match action {
                AuthorityAction::Run {
                    listen,
                    explorer_url,
                    explorer_api_key,
                    authority_key,
                    key_file,
                } => {
                    config.listen_addr = listen.unwrap_or(config.listen_addr);
                    config.explorer_url = explorer_url.or(config.explorer_url);
                    config.explorer_api_key = explorer_api_key.or(config.explorer_api_key);
                    config.key_file = key_file.or(config.key_file);
                    run_authority(config, authority_key).await?;
                }
            }
        }
        command => {
            setup_logging(
                cli.log_format.as_deref().unwrap_or("human"),
                cli.log_level.as_deref().unwrap_or("warn"),
            )?;
            let config = match &config_path {
                Some(path) => WalletConfig::from_toml_file(path)?,
                None => WalletConfig::default(),
            };
            run_wallet_command(command, config).await?;
        }
    }

    Ok(())
}

fn setup_logging(format: &str, level: &str) -> anyhow::Result<()> {
    let format: LogFormat = format.parse().map_err(anyhow::Error::msg)?;
    init_tracing(format, level).map_err(anyhow::Error::msg)
}

async fn run_authority(config: AuthorityConfig, authority_key: Option<String>) -> anyhow::Result<()> {
    let keys = load_authority_key(authority_key.as_deref(), config.key_file.as_deref())?;
    let server = AuthorityServer::from_config(&config, keys)?;
    tracing::info!(
        listen = %config.listen_addr,
        policy = ?config.policy,
        explorer = config.explorer_url.as_deref().unwrap_or("in-process"),
        "starting signing authority"
    );

    tokio::select! {
        result = server.start() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, stopping authority");
        }
    }
    Ok(())
}

impl WalletArgs {
    fn apply(&self, config: &mut WalletConfig) {
        if let Some(path) = &self.session {
            config.session_path = path.clone();
        }
        if let Some(url) = &self.authority_url {
            config.authority_url = url.clone();
        }
        if let Some(url) = &self.explorer_url {
            config.explorer_url = url.clone();
        }
        if let Some(key) = &self.explorer_api_key {
            config.explorer_api_key = Some(key.clone());
        }
    }
}

fn parse_account(s: &str) -> anyhow::Result<Account> {
    s.parse::<Account>()
        .with_context(|| format!("invalid address {s:?}"))
}

async fn run_wallet_command(command: Command, mut config: WalletConfig) -> anyhow::Result<()> {
    match command {
        Command::Wallet { wallet, action } => {
            wallet.apply(&mut config);
            let store = FileSessionStore::new(&config.session_path);
            let mut session = store.load_checked()?;
            match action {
                WalletAction::Import {
                    private_key,
                    password,
                    label,
                } => {
                    let keys = keypair_from_hex(&private_key).context("invalid private key")?;
                    let account = session.import(&keys, &password, label, KdfParams::default())?;
                    store.save(&session)?;
                    println!("imported and selected {account}");
                }
                WalletAction::Select { address } => {
                    session.select(&parse_account(&address)?)?;
                    store.save(&session)?;
                    println!("selected {address}");
                }
                WalletAction::Remove { address } => {
                    session.remove(&parse_account(&address)?)?;
                    store.save(&session)?;
                    match session.selected {
                        Some(selected) => println!("removed {address}; selected {selected}"),
                        None => println!("removed {address}; no wallets left"),
                    }
                }
                WalletAction::List => {
                    for wallet in &session.wallets {
                        let marker = if session.selected == Some(wallet.account) { "*" } else { " " };
                        println!(
                            "{marker} {} {}",
                            wallet.account,
                            wallet.label.as_deref().unwrap_or("")
                        );
                    }
                }
            }
        }
        Command::Status { wallet, address } => {
            wallet.apply(&mut config);
            let account = match address {
                Some(address) => parse_account(&address)?,
                None => {
                    let session = FileSessionStore::new(&config.session_path).load_checked()?;
                    match session.selected {
                        Some(account) => account,
                        None => bail!("no wallet selected and no address given"),
                    }
                }
            };
            let reader = ResilientReader::new(explorer(&config)?, config.retry.clone());
            let snapshot =
                DashboardSnapshot::collect(&reader, &account, config.units_per_transaction).await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            if !snapshot.may_claim() {
                println!("claim not available for {account}");
            }
        }
        Command::Claim {
            wallet,
            password,
            referrer,
        } => {
            wallet.apply(&mut config);
            let session = FileSessionStore::new(&config.session_path).load_checked()?;
            let keys = session.unlock_selected(&password)?;
            let referrer = referrer.as_deref().map(parse_account).transpose()?;

            let client = HttpAuthorityClient::with_timeout(&config.authority_url, config.request_timeout())?;
            let auth = client.request_authorization(&keys.account, referrer).await?;
            let claimant_sig = sign_digest(&claim_digest(&auth.request), &keys.private)?;
            let output = json!({
                "request": WireClaimRequest::from(&auth.request),
                "messageHash": claim_digest(&auth.request).to_string(),
                "authoritySig": auth.authority_sig.to_string(),
                "claimantSig": claimant_sig.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Demo {
            transactions,
            referrer,
        } => {
            let referrer = referrer.as_deref().map(parse_account).transpose()?;
            run_demo(&config, transactions, referrer).await?;
        }
        Command::Authority { .. } => bail!("authority commands do not use the wallet configuration"),
    }
    Ok(())
}

fn explorer(config: &WalletConfig) -> anyhow::Result<Arc<dyn ChainReader>> {
    let mut client = ExplorerClient::with_timeout(
        config.explorer_url.clone(),
        config.contract,
        config.request_timeout(),
    )?;
    if let Some(key) = &config.explorer_api_key {
        client = client.with_api_key(key.clone());
    }
    Ok(Arc::new(client))
}

async fn run_demo(
    config: &WalletConfig,
    transactions: u64,
    referrer: Option<Account>,
) -> anyhow::Result<()> {
    let authority_keys = generate_keypair();
    let claimant = generate_keypair();
    let units = if config.units_per_transaction.is_zero() {
        U256::one()
    } else {
        config.units_per_transaction
    };
    let chain = Arc::new(LocalChain::new(VerifierParams::new(
        authority_keys.account,
        units,
    )));
    chain.record_transactions(claimant.account, transactions);

    let authority = SigningAuthority::new(
        authority_keys,
        ResilientReader::new(chain.clone(), config.retry.clone()),
        Box::new(PerTransaction::new(units)),
        Arc::new(SystemClock),
    );
    let orchestrator = ClaimOrchestrator::new(
        ResilientReader::new(chain.clone(), config.retry.clone()),
        Arc::new(authority),
        chain.clone(),
        units,
    )
    .with_submit_timeout(config.submit_timeout());

    let report = orchestrator.run(&claimant, referrer).await;
    let phases: Vec<String> = report.transitions.iter().map(|p| p.to_string()).collect();
    println!("account:     {}", report.account);
    println!("transitions: {}", phases.join(" -> "));
    match &report.outcome {
        Ok(confirmation) => {
            println!("confirmed:   {} units", confirmation.amount);
            println!(
                "balance:     {}",
                chain.verifier().balance_of(&claimant.account)
            );
        }
        Err(e) => println!("rejected:    {} ({})", e, e.reason()),
    }

    let again = orchestrator.claim(&claimant, referrer).await;
    if let Err(e) = again {
        println!("second claim: {} ({})", e, e.reason());
    }
    Ok(())
}
