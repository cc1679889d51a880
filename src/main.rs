//! IBKR Dashboard admin CLI
//!
//! Operator tasks against the dashboard's flat-file stores.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ibkr_dashboard::auth::MIN_PASSWORD_LEN;
use ibkr_dashboard::services::DEFAULT_HISTORY_DAYS;
use ibkr_dashboard::{BalanceHistory, Config, TokenService, UserStore};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "ibkr-dashboard")]
#[command(about = "Admin tools for the IBKR dashboard backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered users
    Users,

    /// Register a user
    AddUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Issue a bearer token for an existing user
    Token {
        #[arg(long)]
        email: String,
    },

    /// Show a user's balance history
    History {
        #[arg(long)]
        user_id: String,

        /// Window in days
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;

    match cli.command {
        Commands::Users => list_users(&config).await,
        Commands::AddUser { name, email, password } => add_user(&config, &name, &email, &password).await,
        Commands::Token { email } => issue_token(&config, &email).await,
        Commands::History { user_id, days } => show_history(&config, &user_id, days).await,
    }
}

async fn list_users(config: &Config) -> Result<()> {
    let store = UserStore::new(config.users_file.clone());
    let users = store.list().await?;

    println!("\n{}", "=".repeat(70));
    println!("  USERS ({})", config.users_file.display());
    println!("{}\n", "=".repeat(70));

    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    println!("{:<38} {:<28} {}", "ID", "EMAIL", "NAME");
    println!("{}", "-".repeat(70));
    for user in users {
        println!("{:<38} {:<28} {}", user.id, user.email, user.name);
    }
    println!();

    Ok(())
}

async fn add_user(config: &Config, name: &str, email: &str, password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }

    let store = UserStore::new(config.users_file.clone());
    let user = store
        .create(name, email, password)
        .await
        .with_context(|| format!("Failed to create user {}", email))?;

    println!("Created user {} ({})", user.email, user.id);
    Ok(())
}

async fn issue_token(config: &Config, email: &str) -> Result<()> {
    let store = UserStore::new(config.users_file.clone());
    let user = store
        .find_by_email(email)
        .await?
        .with_context(|| format!("No user with email {}", email))?;

    let token = TokenService::new(&config.jwt_secret).issue(&user)?;
    println!("{}", token);
    Ok(())
}

async fn show_history(config: &Config, user_id: &str, days: i64) -> Result<()> {
    let history = BalanceHistory::new(config.balance_history_file.clone());
    let entries = history.history(user_id, days.max(1)).await?;

    println!("\n{}", "=".repeat(70));
    println!("  BALANCE HISTORY - {} | last {} days", user_id, days);
    println!("{}\n", "=".repeat(70));

    if entries.is_empty() {
        println!("No snapshots recorded.");
        return Ok(());
    }

    println!(
        "{:<22} {:>14} {:>14} {:>14} {:>12}",
        "TIMESTAMP", "TOTAL", "NET LIQ", "CASH", "DAILY P&L"
    );
    println!("{}", "-".repeat(80));
    for entry in &entries {
        println!(
            "{:<22} {:>14} {:>14} {:>14} {:>12}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.total_balance.round_dp(2).to_string(),
            entry.net_liquidation.round_dp(2).to_string(),
            entry.cash_balance.round_dp(2).to_string(),
            entry.daily_profit.round_dp(2).to_string(),
        );
    }
    println!("\n{} snapshots", entries.len());

    Ok(())
}
