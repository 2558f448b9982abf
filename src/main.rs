use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;

use entiendo_vault::chain::{
    BalancePoller, BalanceRefresh, ChainReader, ContractAddresses, EthReader, EthWallet,
    WalletConnector,
};
use entiendo_vault::configure::{load_config, AppConfig};
use entiendo_vault::datastore::DatastoreClient;
use entiendo_vault::flow::TransferFlowController;
use entiendo_vault::logger::setup_logger;
use entiendo_vault::units;

#[derive(Parser)]
#[command(name = "entiendo-vault", about = "Vault client: transfers, statistics, datastore reads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print vault totals and, when a wallet is configured, user statistics
    Stats,
    /// Print the wallet's token balance once
    Balance,
    /// Poll the token balance until interrupted
    Watch,
    /// Approve and deposit into the vault
    Deposit {
        #[arg(long)]
        amount: String,
    },
    /// Withdraw from the vault
    Withdraw {
        #[arg(long)]
        amount: String,
    },
    /// Mint test tokens to the wallet
    Mint {
        #[arg(long)]
        amount: String,
    },
    /// List vault strategies by allocation
    Strategies,
    /// List educational lessons in curriculum order
    Lessons,
    /// Show the most recent impact events
    Feed {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List governance proposals open for voting
    Proposals,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = load_config().context("failed to load config")?;
    setup_logger(&config).map_err(|e| anyhow::anyhow!("logger init failed: {}", e))?;

    let cli = Cli::parse();
    match cli.command {
        Command::Stats => stats(&config).await,
        Command::Balance => balance(&config).await,
        Command::Watch => watch(&config).await,
        Command::Deposit { amount } => transfer(&config, true, &amount).await,
        Command::Withdraw { amount } => transfer(&config, false, &amount).await,
        Command::Mint { amount } => mint(&config, &amount).await,
        Command::Strategies => strategies(&config).await,
        Command::Lessons => lessons(&config).await,
        Command::Feed { limit } => feed(&config, limit).await,
        Command::Proposals => proposals(&config).await,
    }
}

fn datastore(config: &AppConfig) -> DatastoreClient {
    DatastoreClient::new(&config.supabase_url, &config.supabase_anon_key)
}

async fn stats(config: &AppConfig) -> Result<()> {
    let reader = EthReader::connect(config)?;
    let totals = reader.vault_totals().await?;

    println!("Vault totals");
    println!("  Total assets:   {}", units::format_amount(totals.total_assets));
    println!("  Total yield:    {}", units::format_amount(totals.total_yield));
    println!("  Total donated:  {}", units::format_amount(totals.total_donated));
    println!("  Estimated APY:  {}%", totals.apy_percent());

    if config.wallet_key.is_some() {
        let wallet = EthWallet::connect(config)?;
        if let Some(account) = wallet.account() {
            let stats = reader.user_stats(account).await?;
            println!("Account {:?}", account);
            println!("  Deposited:       {}", stats.deposited_display());
            println!("  Current value:   {}", stats.current_value_display());
            println!("  Yield share:     {}", units::format_amount(stats.yield_contribution));
            println!("  Education level: {}", stats.education_level);
            println!("  Days active:     {}", stats.days_active);
            println!("  Shares owned:    {}", units::format_amount(stats.shares_owned));
        }
    }

    Ok(())
}

async fn balance(config: &AppConfig) -> Result<()> {
    let reader = EthReader::connect(config)?;
    let wallet = EthWallet::connect(config)?;
    let account = wallet
        .account()
        .context("no wallet account (set APP_WALLET_KEY)")?;

    let balance = reader.token_balance(account).await?;
    println!("{}", units::format_amount(balance));
    Ok(())
}

async fn watch(config: &AppConfig) -> Result<()> {
    let reader: Arc<dyn ChainReader> = Arc::new(EthReader::connect(config)?);
    let wallet = EthWallet::connect(config)?;
    let account = wallet
        .account()
        .context("no wallet account (set APP_WALLET_KEY)")?;

    let poller = BalancePoller::spawn(
        reader,
        account,
        Duration::from_millis(config.balance_poll_ms),
    );
    let mut updates = poller.subscribe();

    println!("Watching balance of {:?} (Ctrl-C to stop)", account);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{}", units::format_amount(*updates.borrow()));
            }
            _ = tokio::signal::ctrl_c() => {
                poller.stop();
                break;
            }
        }
    }
    Ok(())
}

async fn transfer(config: &AppConfig, deposit: bool, amount: &str) -> Result<()> {
    let addresses = ContractAddresses::parse(&config.usdc_address, &config.vault_address)
        .map_err(anyhow::Error::msg)?;

    let wallet: Arc<dyn WalletConnector> = Arc::new(EthWallet::connect(config)?);
    let reader: Arc<dyn ChainReader> = Arc::new(EthReader::connect(config)?);
    let account = wallet.account().context("no wallet account")?;

    let poller = Arc::new(BalancePoller::spawn(
        reader.clone(),
        account,
        Duration::from_millis(config.balance_poll_ms),
    ));
    let refresh: Arc<dyn BalanceRefresh> = poller.clone();

    let controller = TransferFlowController::new(wallet, reader, refresh, addresses.vault);

    let result = if deposit {
        controller.deposit(amount).await
    } else {
        controller.withdraw(amount).await
    };

    match result {
        Ok(handle) => {
            println!("Confirmed: {}", handle);
            // Let the refresh-triggered poll land before exiting
            tokio::time::sleep(Duration::from_millis(500)).await;
            println!("Balance: {}", units::format_amount(poller.latest()));
            Ok(())
        }
        Err(e) => {
            println!("Failed [{}]: {}", e.error_code(), e);
            std::process::exit(1);
        }
    }
}

async fn mint(config: &AppConfig, amount: &str) -> Result<()> {
    let wallet = EthWallet::connect(config)?;
    let account = wallet.account().context("no wallet account")?;
    let amount = units::parse_amount(amount).map_err(anyhow::Error::msg)?;

    let handle = wallet
        .mint(account, amount)
        .await
        .map_err(|e| anyhow::anyhow!("mint failed: {}", e))?;
    let outcome = wallet
        .await_receipt(handle)
        .await
        .map_err(|e| anyhow::anyhow!("mint receipt failed: {}", e))?;

    if outcome.success {
        println!("Minted {} to {:?} ({})", units::format_amount(amount), account, handle.short());
    } else {
        println!("Mint reverted ({})", handle);
    }
    Ok(())
}

async fn strategies(config: &AppConfig) -> Result<()> {
    let store = datastore(config);
    for strategy in store.strategies().await? {
        println!(
            "{:<24} {:>6.2}%  APY {:>5.2}%  {}",
            strategy.name, strategy.allocation_percentage, strategy.current_apy, strategy.description
        );
    }
    Ok(())
}

async fn lessons(config: &AppConfig) -> Result<()> {
    let store = datastore(config);
    for lesson in store.lessons().await? {
        println!(
            "{:>3}. {:<32} [{}]  {}",
            lesson.order_index, lesson.title, lesson.difficulty_level, lesson.description
        );
    }
    Ok(())
}

async fn feed(config: &AppConfig, limit: usize) -> Result<()> {
    let store = datastore(config);
    for entry in store.impact_events(limit).await? {
        let project = entry
            .project
            .map(|p| p.name)
            .unwrap_or_else(|| entry.event.project_id.clone());
        println!(
            "{}  {:>10.2} -> {}  ({})",
            entry.event.created_at.format("%Y-%m-%d %H:%M"),
            entry.event.amount,
            project,
            entry.event.transaction_hash
        );
    }
    Ok(())
}

async fn proposals(config: &AppConfig) -> Result<()> {
    let store = datastore(config);
    for proposal in store.active_proposals().await? {
        println!(
            "{}  for {} / against {}  ends {}",
            proposal.title,
            proposal.votes_for,
            proposal.votes_against,
            proposal.ends_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
