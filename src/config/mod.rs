//! Configuration management for MagicStream

pub mod loader;
mod schema;

pub use loader::{
    default_config_content, generate_secret, load_config, load_config_from_path, CONFIG_FILENAME,
};
pub use schema::*;
