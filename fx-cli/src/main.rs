//! FX CLI
//!
//! Command-line driver for the exchange-rate cache: conversions, cache
//! maintenance, the background refresh job and saved favorites.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_client::{DEFAULT_API_URL, ExchangeRateClient, FixedConnectivity, NetworkProbe};
use fx_hex::{Converter, FavoritesService, PolicyConfig, RatePolicy, RateRefresher};
use fx_repo::build_repo;
use fx_types::{
    Connectivity, ConversionState, CurrencyCode, FavoriteConversion, FavoriteId, JobStatus,
    RefreshNotice, RefreshNotifier, SystemClock,
};

use config::Settings;

/// Exit status asking the scheduler to try again later (sysexits EX_TEMPFAIL).
const EXIT_RETRY: u8 = 75;

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "Offline-first currency converter", long_about = None)]
struct Cli {
    /// SQLite database holding the rate cache and favorites
    #[arg(long, env = "FX_DATABASE_URL", default_value = "sqlite://fx-cache.db")]
    database_url: String,

    /// Exchange-rate API key
    #[arg(long, env = "FX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the exchange-rate API
    #[arg(long, env = "FX_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        from: String,
        to: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Save the result as a favorite
        #[arg(long)]
        save: bool,
    },
    /// Show all rates for a base currency (cache first, then remote)
    Rates { base: String },
    /// Show one cached rate without touching the network
    Rate { base: String, target: String },
    /// Refresh the configured base currencies from the remote source
    Refresh,
    /// Delete cached rates older than the freshness window
    Prune,
    /// Delete every cached rate
    ResetCache,
    /// Saved conversions
    Favorites {
        #[command(subcommand)]
        action: FavoriteCommands,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// List favorites, newest first
    List,
    /// Delete a favorite
    Delete {
        /// Favorite ID (UUID)
        id: String,
    },
}

/// Connectivity as configured: probed, or forced offline.
enum Network {
    Probe(NetworkProbe),
    Fixed(FixedConnectivity),
}

#[async_trait]
impl Connectivity for Network {
    async fn is_online(&self) -> bool {
        match self {
            Network::Probe(probe) => probe.is_online().await,
            Network::Fixed(fixed) => fixed.is_online().await,
        }
    }
}

/// Reports refresh results through the log.
struct LogNotifier;

impl RefreshNotifier for LogNotifier {
    fn notify(&self, notice: &RefreshNotice) {
        match notice.status {
            JobStatus::Failure => warn!(title = %notice.title, "{}", notice.message),
            _ => info!(title = %notice.title, "{}", notice.message),
        }
    }
}

fn parse_code(s: &str) -> Result<CurrencyCode> {
    CurrencyCode::parse(s).ok_or_else(|| anyhow::anyhow!("Invalid currency code: {}", s))
}

fn parse_favorite_id(s: &str) -> Result<FavoriteId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid favorite ID: {}", s))
}

fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn print_favorite(favorite: &FavoriteConversion) {
    println!(
        "{}  {:.2} {} = {:.2} {}  ({})",
        favorite.id,
        favorite.amount,
        favorite.from,
        favorite.result,
        favorite.to,
        format_millis(favorite.created_at)
    );
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,fx_hex=info,fx_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let repo = build_repo(&cli.database_url)
        .await
        .with_context(|| format!("Failed to open {}", cli.database_url))?;

    let api_key = cli.api_key.clone().unwrap_or_default();
    if api_key.is_empty() && matches!(cli.command, Commands::Refresh) {
        anyhow::bail!("FX_API_KEY is required for refresh");
    }
    let client = Arc::new(
        ExchangeRateClient::new(api_key)
            .with_base_url(&cli.api_url)
            .with_timeout(settings.http_timeout)?,
    );

    let policy = RatePolicy::spawn(
        repo.clone(),
        client.clone(),
        SystemClock,
        PolicyConfig {
            freshness: settings.freshness,
        },
    );

    match cli.command {
        Commands::Convert {
            from,
            to,
            amount,
            save,
        } => {
            let network = if settings.offline {
                Network::Fixed(FixedConnectivity(false))
            } else {
                let probe = client
                    .connectivity_probe(settings.http_timeout)
                    .with_context(|| format!("Cannot probe {}", cli.api_url))?;
                Network::Probe(probe)
            };
            let converter = Converter::new(policy, network);

            match converter.submit(&from, &to, &amount).await {
                ConversionState::Success(conversion) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&conversion)?);
                    } else {
                        println!("{}", conversion);
                    }
                    if save {
                        let favorites = FavoritesService::new(repo, SystemClock);
                        let saved = favorites.save(&conversion).await?;
                        println!("✓ Saved favorite {}", saved.id);
                    }
                }
                other => {
                    eprintln!("✗ {}", other);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Rates { base } => {
            let base = parse_code(&base)?;
            let snapshot = policy.resolve_rates(base).outcome().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!(
                    "Rates for {} ({}, fetched {})",
                    snapshot.base,
                    snapshot.origin,
                    format_millis(snapshot.fetched_at)
                );
                for (target, rate) in snapshot.rates.iter() {
                    println!("  {}  {:.6}", target, rate);
                }
            }
        }

        Commands::Rate { base, target } => {
            let base = parse_code(&base)?;
            let target = parse_code(&target)?;
            match policy.get_cached_rate(&base, &target).await {
                Some(rate) => println!("1 {} = {:.6} {}", base, rate, target),
                None => {
                    eprintln!("✗ No fresh cached rate for {}/{}", base, target);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Refresh => {
            let refresher = RateRefresher::new(policy, client, LogNotifier)
                .with_bases(settings.refresh_bases);
            let code = match refresher.run().await {
                JobStatus::Success => ExitCode::SUCCESS,
                JobStatus::Retry => ExitCode::from(EXIT_RETRY),
                JobStatus::Failure => ExitCode::FAILURE,
            };
            return Ok(code);
        }

        Commands::Prune => {
            let removed = policy.prune_expired().await?;
            println!("✓ Pruned {} expired rates", removed);
        }

        Commands::ResetCache => {
            let removed = policy.clear_cache().await?;
            println!("✓ Cleared {} cached rates", removed);
        }

        Commands::Favorites { action } => {
            let favorites = FavoritesService::new(repo, SystemClock);
            match action {
                FavoriteCommands::List => {
                    let list = favorites.list().await?;
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&list)?);
                    } else if list.is_empty() {
                        println!("No favorites saved");
                    } else {
                        list.iter().for_each(print_favorite);
                    }
                }
                FavoriteCommands::Delete { id } => {
                    let id = parse_favorite_id(&id)?;
                    if favorites.delete_by_id(id).await? {
                        println!("✓ Deleted favorite {}", id);
                    } else {
                        eprintln!("✗ Favorite {} not found", id);
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
