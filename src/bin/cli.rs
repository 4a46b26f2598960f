//! CLI binary for the company checker.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use company_checker::{build_search, report, CheckerConfig, CheckerSearch};
use company_search::{has_cross_reference, MatchRecord};
use tracing_subscriber::EnvFilter;

/// Check a company against the delisted, TML and good-standing lists.
#[derive(Parser)]
#[command(name = "company-checker", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search every list for a company name.
    Search {
        /// Company name, or part of it.
        query: String,

        /// Ignore any cached result and query the lists again.
        #[arg(long)]
        refresh: bool,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Clear the whole cache, then search again from the database.
    Refresh {
        query: String,

        #[arg(long)]
        json: bool,
    },

    /// Inspect or maintain the result cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show how many result sets are cached.
    Stats,
    /// Remove every cached result.
    Clear,
    /// Remove the cached result for one query.
    Invalidate { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("warning: ignoring unreadable .env file: {err}");
        }
    }

    if let Command::Init { force } = cli.command {
        let path = cli
            .config
            .unwrap_or_else(CheckerConfig::default_config_path);
        return write_default_config(path, force);
    }

    let mut config = CheckerConfig::load(cli.config.as_deref())?;
    config.apply_env();

    // RUST_LOG wins over the configured filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli, config).await {
        tracing::error!(error = %err, "command failed");
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli, config: CheckerConfig) -> anyhow::Result<()> {
    let search = build_search(&config)?;
    match cli.command {
        Command::Search {
            query,
            refresh,
            json,
        } => {
            let results = search.search(&query, refresh).await?;
            print_results(&query, &results, json)
        }
        Command::Refresh { query, json } => {
            let results = search.refresh(&query).await?;
            print_results(&query, &results, json)
        }
        Command::Cache { action } => run_cache(&search, action).await,
        // Handled before the configuration is loaded.
        Command::Init { .. } => Ok(()),
    }
}

async fn run_cache(search: &CheckerSearch, action: CacheAction) -> anyhow::Result<()> {
    match action {
        CacheAction::Stats => {
            let stats = search.cache_stats().await;
            println!("durable entries: {}", stats.durable_entries);
            println!("memory entries:  {}", stats.memory_entries);
        }
        CacheAction::Clear => {
            search.clear_cache().await;
            println!("cache cleared");
        }
        CacheAction::Invalidate { query } => {
            search.invalidate(&query).await;
            println!("cached result for \"{query}\" removed");
        }
    }
    Ok(())
}

fn print_results(query: &str, results: &[MatchRecord], json: bool) -> anyhow::Result<()> {
    if json {
        let body = serde_json::json!({
            "query": query,
            "hasCrossReference": has_cross_reference(results),
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", report::render(query, results));
    }
    Ok(())
}

fn write_default_config(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    CheckerConfig::default().save_to_file(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}
