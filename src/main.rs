use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astromap::client::ApiClient;
use astromap::config::Config;
use astromap::discovery::DiscoveryStepper;
use astromap::ingest;
use astromap::llm::OpenAiAdapter;
use astromap::models::AppState;
use astromap::vector_store::{ChromaClient, VectorStore};
use astromap::create_router;

#[derive(Parser)]
#[command(name = "astromap", version, about = "Semantic exploration service for space events")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve,
    /// Walk a discovery path for a keyword, one location at a time
    Tour {
        keyword: String,
        /// Base URL of a running astromap server
        #[arg(long, default_value = "http://localhost:3001")]
        server: String,
        /// Seconds between auto-play steps
        #[arg(long, default_value_t = 5)]
        period: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "astromap=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Tour {
            keyword,
            server,
            period,
        } => tour(&keyword, &server, Duration::from_secs(period)).await,
    }
}

async fn serve() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    let openai = Arc::new(OpenAiAdapter::new(&config.openai));
    let store = Arc::new(ChromaClient::new(&config.chroma));

    // Create shared state
    let state = AppState {
        embedder: openai.clone(),
        completions: openai,
        store: store.clone(),
    };

    // Ingest the dataset only when the collection did not exist yet
    let created = store.ensure_collection().await?;
    if created {
        let dataset_path = PathBuf::from(&config.dataset.path);
        let batch_size = config.dataset.batch_size;
        let embedder = state.embedder.clone();
        let ingest_store = state.store.clone();
        tokio::spawn(async move {
            match ingest::load_dataset(&dataset_path) {
                Ok(events) => {
                    match ingest::ingest(
                        ingest_store.as_ref(),
                        embedder.as_ref(),
                        &events,
                        batch_size,
                    )
                    .await
                    {
                        Ok(()) => info!("database initialization complete"),
                        Err(e) => error!("dataset ingestion failed: {e}"),
                    }
                }
                Err(e) => error!("failed to load dataset: {e}"),
            }
        });
    } else {
        info!(
            "collection {} already exists, skipping ingestion",
            config.chroma.collection
        );
    }

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn tour(keyword: &str, server: &str, period: Duration) -> Result<()> {
    let client = ApiClient::new(server);
    let path = client.discovery_path(keyword).await?;
    if path.is_empty() {
        println!("No events found for {keyword:?}. Try a different keyword.");
        return Ok(());
    }

    let total = path.len();
    println!("Discovery: {keyword} ({total} stops, one every {}s)", period.as_secs());

    let stepper = DiscoveryStepper::new();
    let mut locations = stepper.subscribe();
    stepper.start(path).await;
    stepper.start_auto_play_with_period(period).await;

    let mut stop = 0usize;
    loop {
        let current = locations.borrow_and_update().as_ref().cloned();
        if let Some(event) = current {
            stop += 1;
            println!("\n[{stop}/{total}] {} ({})", event.title, event.date);
            println!("    {}", event.summary);
            if !event.url.is_empty() {
                println!("    {}", event.url);
            }
            println!("    lat {:.4}, long {:.4}", event.lat, event.long);
        }
        if stop >= total {
            break;
        }
        if locations.changed().await.is_err() {
            break;
        }
    }

    stepper.stop_auto_play().await;
    Ok(())
}
