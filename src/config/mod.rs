//! Configuration loading and layering.
//!
//! Handles the optional TOML config file, CI input resolution,
//! and validation of the values a review run needs.

pub mod loader;

pub use loader::{Config, ConfigError, GithubConfig, ModelConfig, ReviewConfig};
