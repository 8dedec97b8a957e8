mod about;
mod api;
mod config;
mod exchange_rates;
mod logging;
mod models;
mod rate_source;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::api::{RatesClient, RatesClientTrait};
use crate::config::Config;
use crate::models::{RateTable, SourceKind};

#[derive(Parser)]
#[command(name = "usdconvert", version, about = "Convert US dollars into other currencies")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where exchange rates come from (overrides the config file)
    #[arg(long, global = true, value_enum)]
    source: Option<SourceKind>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive converter (default)
    Tui,
    /// Convert an amount of USD and print the result
    Convert {
        /// Amount in USD
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Target currency code, e.g. EUR
        currency: String,
    },
    /// List the available exchange rates
    Rates,
    /// Fetch fresh rates and overwrite the rate cache
    Refresh,
    /// Export the exchange rates to a CSV file
    Export {
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Write the effective configuration to the config file
    InitConfig,
    /// Show version and license information
    About,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let mut config = config::load_config(&cli.config)?;
    config.apply_env()?;
    if let Some(source) = cli.source {
        config.source = source;
    }
    tracing::debug!(?config, "Configuration loaded");

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let table = load_table(&config).await?;
            tui::start_tui(table)?;
        }
        Commands::Convert { amount, currency } => {
            let table = load_table(&config).await?;
            match models::convert(Some(amount), Some(currency.as_str()), &table) {
                Ok(result) => println!("{}", result),
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Rates => {
            let table = load_table(&config).await?;
            exchange_rates::print_rates(&table, &mut std::io::stdout().lock())?;
        }
        Commands::Refresh => {
            let client = WithSpinner::new(rates_client(&config)?);
            let table = rate_source::refresh_cache(&config.cache_path, &client).await?;
            println!(
                "✅ {} exchange rates written to {}",
                table.len(),
                config.cache_path.display()
            );
        }
        Commands::Export { output_dir } => {
            let table = load_table(&config).await?;
            let path = exchange_rates::export_rates_csv(&table, &output_dir)?;
            println!("📁 CSV file created: {}", path.display());
        }
        Commands::InitConfig => {
            config::save_config(&cli.config, &config)?;
            println!("Configuration written to {}", cli.config.display());
        }
        Commands::About => {
            for line in about::about_lines() {
                println!("{}", line);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn rates_client(config: &Config) -> Result<RatesClient> {
    RatesClient::new(
        config.api_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Shows a spinner for exactly as long as a rate fetch is in flight.
struct WithSpinner<C> {
    inner: C,
}

impl<C> WithSpinner<C> {
    fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<C: RatesClientTrait + Sync> RatesClientTrait for WithSpinner<C> {
    async fn get_latest_rates(&self) -> Result<HashMap<String, f64>> {
        let spinner = spinner("Fetching current exchange rates...");
        let result = self.inner.get_latest_rates().await;
        spinner.finish_and_clear();
        result
    }
}

async fn load_table(config: &Config) -> Result<RateTable> {
    let client = WithSpinner::new(rates_client(config)?);
    let table = rate_source::load_rates(config.source, &config.cache_path, &client).await?;

    if table.is_empty() {
        tracing::warn!(source = %table.source, "No usable exchange rates");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RatesClientTrait for CountingClient {
        async fn get_latest_rates(&self) -> Result<HashMap<String, f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HashMap::from([("EUR".to_string(), 0.92)]))
        }
    }

    #[tokio::test]
    async fn test_spinner_client_follows_real_fetches() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rates.json");
        let client = WithSpinner::new(CountingClient {
            calls: AtomicUsize::new(0),
        });

        // Missing cache: the wrapped client is the one doing the fetch
        let table = rate_source::load_rates(SourceKind::Cached, &path, &client).await?;
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(table.codes(), vec!["EUR"]);

        // Cache present: no fetch, so no spinner either
        rate_source::load_rates(SourceKind::Cached, &path, &client).await?;
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 1);

        // Cache removed between checks still fetches through the wrapper
        fs::remove_file(&path)?;
        rate_source::load_rates(SourceKind::Cached, &path, &client).await?;
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 2);
        Ok(())
    }
}
