//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "magicstream.toml";

/// Load configuration from an explicit path, or from the nearest magicstream.toml
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // Compile-time constant pattern; failure here is a bug, not a runtime condition
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Random 64 hex character secret
pub fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Generate a default configuration file. The generated secrets are only
/// fallbacks; SECRET_KEY and SECRET_REFRESH_KEY take precedence.
pub fn default_config_content(access_secret: &str, refresh_secret: &str) -> String {
    format!(
        r#"# MagicStream Configuration

[server]
host = "0.0.0.0"
port = 8080
allowed_origins = ["http://localhost:5173"]

[auth]
access_secret = "${{SECRET_KEY:-{access_secret}}}"
refresh_secret = "${{SECRET_REFRESH_KEY:-{refresh_secret}}}"

[auth.cookies]
path = "/"
secure = true
same_site = "none"
# domain = "magicstream.example.com"

[database]
backend = "memory"  # or "postgres"
# url = "${{DATABASE_URL}}"
timeout_secs = 100
# seed_file = "./seed.yaml"

[catalog]
recommended_movie_limit = ${{RECOMMENDED_MOVIE_LIMIT:-5}}

[sentiment]
api_key = "${{OPENAI_API_KEY}}"
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
# minijinja template with `rankings` and `review` in scope. Blank uses the
# built-in prompt; a template without `review` gets the review appended.
prompt_template = "${{BASE_PROMPT_TEMPLATE:-}}"
"#
    )
}
