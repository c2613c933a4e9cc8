//! CLI command implementations

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::api;
use crate::catalog::models::SeedData;
use crate::cli::{error, info, print_movie_table, success, warn, OutputFormat};
use crate::config::{self, Config, StoreBackend, CONFIG_FILENAME};
use crate::store::{self, bounded};

/// Write a starter magicstream.toml with freshly generated secrets
pub async fn init(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() && !force {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::default_config_content(
        &config::generate_secret(),
        &config::generate_secret(),
    );
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set sentiment.api_key (or OPENAI_API_KEY) to enable admin review ranking, then run 'magicstream serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path)?;
    config.auth.validate()?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting API server on {}:{}", host, port));
    api::run_server(config, &host, port).await?;

    Ok(())
}

/// Validate configuration and connectivity
pub async fn check(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let mut healthy = true;

    match config.auth.validate() {
        Ok(()) => success("Signing secrets configured"),
        Err(e) => {
            error(&e.to_string());
            healthy = false;
        }
    }

    if config.sentiment.api_key().is_some() {
        success(&format!("Sentiment model: {}", config.sentiment.model));
    } else {
        warn("No sentiment api key, admin review updates are disabled");
    }

    match store::connect(&config.database).await {
        Ok(stores) => {
            let genres = bounded(config.database.timeout(), stores.movies.genres()).await?;
            success(&format!(
                "Store reachable ({:?} backend, {} genres)",
                config.database.backend,
                genres.len()
            ));
        }
        Err(e) => {
            error(&format!("Store unavailable: {}", e));
            healthy = false;
        }
    }

    if !healthy {
        anyhow::bail!("configuration check failed");
    }

    success("All checks passed");
    Ok(())
}

/// List catalog movies
pub async fn movies(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;
    let stores = store::connect(&config.database).await?;

    let movies = bounded(config.database.timeout(), stores.movies.find_all()).await?;

    match format {
        OutputFormat::Table => {
            print_movie_table(&movies);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&movies)?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&movies)?;
            println!("{}", yaml);
        }
    }

    Ok(())
}

/// Load reference data into the configured store
pub async fn seed(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    if config.database.backend == StoreBackend::Memory {
        warn("The memory backend does not persist; use database.seed_file to seed it at startup");
    }

    let content = fs::read_to_string(file)
        .with_context(|| format!("reading seed file {}", file.display()))?;
    let data = SeedData::from_yaml(&content)?;

    let stores = store::connect(&config.database).await?;
    bounded(config.database.timeout(), stores.movies.seed(&data)).await?;

    success(&format!(
        "Seeded {} genres, {} rankings and {} movies",
        data.genres.len(),
        data.rankings.len(),
        data.movies.len()
    ));

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    config::load_config(path).map_err(|e| {
        error(&format!("Failed to load config: {}", e));
        e.into()
    })
}
