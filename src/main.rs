use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use thumbprint_api::{ApiConfig, RestApi};
use thumbprint_similarity::{BlendWeights, Matcher};
use thumbprint_storage::{RegistryConfig, StorageManager};

/// Fingerprint collection, recognition and ranking server
#[derive(Parser, Debug)]
#[command(name = "thumbprint")]
#[command(about = "A browser fingerprint simulator", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 5173)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Results returned by a guess when the request has no topK
    #[arg(long, default_value_t = 10)]
    top_k: usize,

    /// Seconds between background registry saves (0 disables them)
    #[arg(long, default_value_t = 300)]
    save_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting thumbprint v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);
    info!("HTTP API port: {}", args.http_port);

    let save_interval = (args.save_interval_secs > 0)
        .then(|| Duration::from_secs(args.save_interval_secs));
    let storage = Arc::new(StorageManager::new(RegistryConfig {
        data_dir: args.data_dir.clone(),
        save_interval,
    })?);
    info!("Registry initialized with {} fingerprints", storage.registry().len());

    let matcher = Matcher::try_new(BlendWeights::default())?;
    let api_config = ApiConfig {
        default_top_k: args.top_k,
        ..ApiConfig::default()
    };

    let storage_http = storage.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(storage_http, matcher, api_config, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/api", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    storage.shutdown()?;
    Ok(())
}
