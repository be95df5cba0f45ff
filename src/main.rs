use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use validator::Validate;

use inventory_watcher::config::AppConfig;
use inventory_watcher::plugins::PrometheusSink;
use inventory_watcher::scraper::ChromeSession;
use inventory_watcher::{InventoryScheduler, Prober, ProductSpec, ResultPipeline, TextExtractor};

#[derive(Parser)]
#[command(name = "inventory-watcher", version, about = "Polls store inventory and exports it as Prometheus metrics")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Address to expose metrics on, overriding the configuration
    #[arg(long, global = true)]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll every configured product until interrupted (default)
    Run,
    /// Probe one product page once and print the result
    Check {
        /// Product URL to check
        #[arg(long)]
        url: String,
        /// Product name
        #[arg(long, default_value = "Test Product")]
        name: String,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("inventory_watcher=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    if let Some(addr) = cli.metrics_addr {
        config.metrics.listen_addr = addr;
        config.validate()?;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Check { url, name, json } => check(config, ProductSpec::new(name, url), json).await,
    }
}

async fn launch_prober(config: &AppConfig) -> Result<Prober<ChromeSession>> {
    let mut session =
        ChromeSession::launch(&config.scraper).context("Failed to create inventory checker")?;
    session.select_store(&config.store).await?;

    Ok(Prober::new(
        session,
        TextExtractor::new(&config.extractor.depleted_markers),
        config.scraper.inventory_selector.clone(),
    ))
}

async fn run(config: AppConfig) -> Result<()> {
    info!("Starting inventory watcher...");

    let sink = if config.metrics.enabled {
        PrometheusSink::install(&config.metrics)?
    } else {
        PrometheusSink::new(config.metrics.prefix.as_deref())
    };

    let scheduler = InventoryScheduler::new(
        launch_prober(&config).await?,
        config.store_identity(),
        config.products.clone(),
        config.scheduler.interval(),
    )?;

    let (tx, rx) = mpsc::channel(config.scheduler.queue_capacity);
    let pipeline = tokio::spawn(async move {
        let pipeline = ResultPipeline::new(sink);
        pipeline.run(rx).await
    });

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_shutdown(shutdown.clone()));

    let result = scheduler.run(tx, shutdown).await;

    // The scheduler dropped its sender; let the pipeline drain what is queued.
    let stats = pipeline.await?;
    info!(processed = stats.processed, "Shutting down...");

    result?;
    Ok(())
}

async fn check(config: AppConfig, product: ProductSpec, json: bool) -> Result<()> {
    product.validate()?;
    let store = config.store_identity();
    let mut prober = launch_prober(&config).await?;

    if !json {
        println!("Checking inventory for {} at store {}...", product.name, store);
    }

    let outcome = prober.probe(&store, &product).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("\nResults:");
        println!("-----------------------------------");
        println!("Product: {}", outcome.product_name);
        println!("Store ID: {}", outcome.store);
        match &outcome.result {
            Ok(count) => {
                println!("Raw Text: {}", outcome.raw_text);
                println!("Parsed Count: {}", count);
            }
            Err(e) => println!("Error: {}", e),
        }
        println!("Checked At: {}", outcome.started_at.to_rfc3339());
    }

    if let Some(e) = outcome.error() {
        bail!("Inventory check failed: {}", e);
    }
    Ok(())
}

async fn wait_for_shutdown(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
