use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magicstream::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "magicstream=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => cli::commands::init(force).await,
        Commands::Serve { host, port } => cli::commands::serve(config, host, port).await,
        Commands::Check => cli::commands::check(config).await,
        Commands::Movies { format } => cli::commands::movies(config, format).await,
        Commands::Seed { file } => cli::commands::seed(config, &file).await,
    }
}
