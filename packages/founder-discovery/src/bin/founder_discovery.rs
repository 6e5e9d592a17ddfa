//! Operator CLI for founder discovery.
//!
//! Prints results as JSON on stdout; logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use founder_discovery::{
    Config, DiscoveryCriteria, DiscoveryService, EnrichmentPatch, ErrorKind, FounderFilter,
    FundingStage, InvocationOptions, PerplexityEngine, RecordStore,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "founder-discovery")]
#[command(about = "Discover and enrich startup founders")]
struct Cli {
    /// Abort the engine call after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find founders matching the given criteria
    Discover {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        /// pre-seed, seed, series-a, or growth
        #[arg(long)]
        stage: Option<FundingStage>,
        /// Repeatable, e.g. --diversity women --diversity "First Nations"
        #[arg(long = "diversity")]
        diversity: Vec<String>,
        /// Research each founder found and print the enriched results
        #[arg(long)]
        enrich: bool,
    },

    /// Research a single founder
    Enrich {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },

    /// List stored founders
    Founders {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

#[cfg(feature = "postgres")]
async fn record_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    use founder_discovery::stores::PostgresRecordStore;
    use secrecy::ExposeSecret;

    match &config.database_url {
        Some(url) => {
            let store = PostgresRecordStore::connect(url.expose_secret())
                .await
                .context("Failed to connect to database")?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(founder_discovery::MemoryRecordStore::new())),
    }
}

#[cfg(not(feature = "postgres"))]
async fn record_store(_config: &Config) -> Result<Arc<dyn RecordStore>> {
    Ok(Arc::new(founder_discovery::MemoryRecordStore::new()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "founder_discovery=info,perplexity_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let service = DiscoveryService::new(
        Arc::new(PerplexityEngine::from_config(&config)),
        record_store(&config).await?,
    )
    .with_config(&config);

    // Ctrl-C cancels the in-flight engine call instead of killing the process mid-request
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let mut options = InvocationOptions::new().with_cancel(cancel);
    if let Some(secs) = cli.timeout_secs {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    match cli.command {
        Commands::Discover {
            location,
            industry,
            stage,
            diversity,
            enrich,
        } => {
            let mut criteria = DiscoveryCriteria::new().with_diversity(diversity);
            if let Some(location) = location {
                criteria = criteria.with_location(location);
            }
            if let Some(industry) = industry {
                criteria = criteria.with_industry(industry);
            }
            if let Some(stage) = stage {
                criteria = criteria.with_stage(stage);
            }

            let records = service
                .discover_with(&criteria, options.clone())
                .await
                .context("Discovery failed")?;
            if !enrich {
                return print_json(&records);
            }

            let mut patches = Vec::with_capacity(records.len());
            for record in &records {
                match service.enrich_discovered(record, options.clone()).await {
                    Ok(patch) => patches.push(patch),
                    Err(e) if e.kind() == ErrorKind::Validation => {
                        warn!(name = %record.name, error = %e, "Skipping founder");
                    }
                    Err(e) => return Err(e).context("Enrichment failed"),
                }
            }
            print_json(&patches)
        }
        Commands::Enrich {
            first_name,
            last_name,
        } => {
            let partial = EnrichmentPatch::for_name(first_name, last_name);
            let patch = service
                .enrich_with(&partial, options)
                .await
                .context("Enrichment failed")?;
            print_json(&patch)
        }
        Commands::Founders {
            city,
            industry,
            tags,
        } => {
            let mut filter = FounderFilter::new().tags_in(tags);
            if let Some(city) = city {
                filter = filter.city_like(city);
            }
            if let Some(industry) = industry {
                filter = filter.industry(industry);
            }

            let founders = service
                .find_founders(&filter)
                .await
                .context("Failed to load founders")?;
            print_json(&founders)
        }
    }
}
