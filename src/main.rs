//! Water Quality Prediction API
//!
//! Serves decision-tree and KNN potability predictions over HTTP.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use water_quality_api::{
    config::Config,
    handler::PredictionService,
    model::PredictionEngine,
    server,
    telemetry::{TelemetryFetcher, TelemetrySource},
    types::{ErrorBody, PredictionResponse},
};

#[derive(Parser)]
#[command(name = "water-quality-api")]
#[command(about = "Water quality prediction API with live TDS telemetry")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Fetch the current TDS reading once
    Telemetry,
    /// Run a prediction for a JSON payload file
    Classify {
        /// Path to a JSON object with the sensor readings
        payload: PathBuf,
    },
    /// Load both model artifacts and report which are usable
    CheckModels,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Telemetry => show_telemetry(config).await,
        Commands::Classify { payload } => classify_file(config, &payload).await,
        Commands::CheckModels => check_models(config),
    }
}

fn build_service(config: &Config) -> anyhow::Result<PredictionService> {
    let engine = Arc::new(PredictionEngine::load(&config.models));
    let fetcher = TelemetryFetcher::new(&config.telemetry)?;
    tracing::info!("Telemetry endpoint: {}", fetcher.endpoint());

    Ok(PredictionService::new(engine, Arc::new(fetcher)))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Water Quality Prediction API");

    let service = Arc::new(build_service(&config)?);
    if !service.engine().is_ready() {
        tracing::warn!("Serving without models; /predict will answer 500 until restarted");
    }

    server::start_server(service, &config.server.bind_addr()).await?;
    Ok(())
}

async fn show_telemetry(config: Config) -> anyhow::Result<()> {
    let fetcher = TelemetryFetcher::new(&config.telemetry)?;

    match fetcher.fetch().await {
        Ok(reading) => {
            println!("\n💧 TDS reading: {}", reading.value);
            if let Some(at) = reading.created_at {
                println!("Recorded at: {}", at.to_rfc3339());
            }
            if let Some(id) = reading.entry_id {
                println!("Entry: {}", id);
            }
        }
        Err(e) => {
            println!("\n⚠️  Telemetry unavailable: {}", e);
            println!("Predictions would use Solids = 0");
        }
    }

    Ok(())
}

async fn classify_file(config: Config, path: &Path) -> anyhow::Result<()> {
    let body = std::fs::read(path)?;
    let service = build_service(&config)?;

    let output = match service.handle(&body).await {
        Ok(result) => serde_json::to_string_pretty(&PredictionResponse::from(&result))?,
        Err(e) => {
            let status = e.status_code();
            let body = ErrorBody {
                error: e.to_string(),
            };
            format!("{} {}", status, serde_json::to_string_pretty(&body)?)
        }
    };
    println!("{}", output);

    Ok(())
}

fn check_models(config: Config) -> anyhow::Result<()> {
    let engine = PredictionEngine::load(&config.models);
    let status = engine.status();
    let mark = |ok: bool| if ok { "✅" } else { "❌" };

    println!("\n🧪 Models in {}\n", config.models.resolved_dir().display());
    println!(
        "{} Decision tree ({})",
        mark(status.decision_tree),
        config.models.decision_tree_file
    );
    println!("{} KNN ({})", mark(status.knn), config.models.knn_file);

    if !status.all_loaded() {
        anyhow::bail!("models not loaded");
    }
    Ok(())
}
