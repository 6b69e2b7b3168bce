use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use draftsmith::{api, generate::GeneratorClient, store::Store};

#[derive(Parser)]
#[command(name = "dsmith")]
#[command(about = "Local outline-document studio for AI-assisted drafting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Draftsmith server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "17030")]
        port: u16,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "draftsmith=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let store = Store::open_default()?;
    store.migrate()?;

    let generator = GeneratorClient::from_env();
    if generator.is_none() {
        tracing::warn!("DRAFTSMITH_GENERATOR_URL not set; generation endpoints are disabled");
    }

    let app = api::create_router(api::AppState::new(store, generator));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Draftsmith server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await?,
        // Default: start server on the default port
        None => serve(17030).await?,
    }

    Ok(())
}
