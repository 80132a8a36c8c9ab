use anyhow::Result;
use clap::Parser;
use shortener::config::{self, ConfigOverrides};
use shortener::server;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// URL shortener HTTP service.
///
/// Flags override the matching environment variables.
#[derive(Parser)]
#[command(name = "shortener")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server address, `host:port` or `:port` (SERVER_ADDRESS)
    #[arg(short = 'a', long)]
    server_address: Option<String>,

    /// Base URL of returned short links (BASE_URL)
    #[arg(short = 'b', long)]
    base_url: Option<String>,

    /// Snapshot file for persistent storage (FILE_STORAGE_PATH)
    #[arg(short = 'f', long)]
    file_storage_path: Option<String>,

    /// PostgreSQL connection string (DATABASE_DSN)
    #[arg(short = 'd', long)]
    database_dsn: Option<String>,
}

impl From<Cli> for ConfigOverrides {
    fn from(cli: Cli) -> Self {
        Self {
            server_address: cli.server_address,
            base_url: cli.base_url,
            file_storage_path: cli.file_storage_path,
            database_dsn: cli.database_dsn,
        }
    }
}

fn init_tracing(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load(cli.into())?;

    init_tracing(&config.log_level, &config.log_format);
    config.print_summary();

    server::run(config).await
}
