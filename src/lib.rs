//! MagicStream - movie catalog backend
//!
//! Cookie based access/refresh JWT sessions, role gated routes, genre
//! recommendations and language model ranked admin reviews.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod sentiment;
pub mod store;

pub use config::Config;
pub use error::Error;
