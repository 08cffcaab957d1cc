use clap::{Parser, Subcommand};
use skinmatch_api::{AppState, RestApi, ServerConfig};
use skinmatch_core::{SkinType, UserProfile};
use skinmatch_similarity::{RecommendOptions, Recommender};
use skinmatch_storage::CatalogStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Content-based skincare product recommendations
#[derive(Parser, Debug)]
#[command(name = "skinmatch")]
#[command(about = "Recommend similar skincare products", long_about = None)]
struct Args {
    /// Path to the JSON product catalog
    #[arg(long, env = "SKINMATCH_CATALOG", default_value = "./data/products.json")]
    catalog: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "SKINMATCH_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API
    Serve {
        #[arg(long, env = "SKINMATCH_HTTP_PORT", default_value_t = 8080)]
        http_port: u16,

        /// Similarity cache entries, 0 disables the cache
        #[arg(long, env = "SKINMATCH_CACHE_CAPACITY", default_value_t = 32)]
        cache_capacity: usize,

        #[arg(long, env = "SKINMATCH_REQUEST_TIMEOUT_MS", default_value_t = 5000)]
        request_timeout_ms: u64,

        /// Recommendations returned when a request omits `count`
        #[arg(long, env = "SKINMATCH_DEFAULT_COUNT", default_value_t = 5)]
        default_count: usize,
    },

    /// Print recommendations for one product as JSON
    Recommend {
        product_id: String,

        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Keep only products whose highlights mention this keyword
        #[arg(long)]
        keyword: Option<String>,

        /// Keep only products suited to this skin type
        #[arg(long)]
        skin_type: Option<SkinType>,

        /// Drop products whose ingredients mention this allergen (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Serve {
            http_port,
            cache_capacity,
            request_timeout_ms,
            default_count,
        } => {
            let config = ServerConfig {
                http_port,
                cache_capacity,
                request_timeout: Duration::from_millis(request_timeout_ms),
                default_count,
            };
            serve(args.catalog, config).await
        }
        Command::Recommend {
            product_id,
            count,
            keyword,
            skin_type,
            allergies,
        } => {
            let store = CatalogStore::open(&args.catalog)?;
            let options = RecommendOptions {
                filter_by_skin_type: skin_type.is_some(),
                filter_by_allergies: !allergies.is_empty(),
                keyword,
            };
            let profile = UserProfile::new(skin_type, allergies);
            let ids = Recommender::new().recommend(&store.snapshot(), &product_id, count, &options, &profile)?;
            println!("{}", serde_json::to_string_pretty(&ids)?);
            Ok(())
        }
    }
}

async fn serve(catalog: PathBuf, config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    info!("Starting SkinMatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", catalog);

    let store = Arc::new(CatalogStore::open(&catalog)?);
    let catalog_info = store.info();
    info!(
        version = catalog_info.version,
        products = catalog_info.products,
        "Catalog loaded"
    );

    let http_port = config.http_port;
    let state = Arc::new(AppState::new(store, config));
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", http_port);

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
    Ok(())
}
