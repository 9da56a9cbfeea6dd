//! ai-codereview — LLM review comments for pull requests (library crate).
//!
//! Re-exports public modules for the binaries and integration tests.

pub mod config;
pub mod constants;
pub mod diff;
pub mod env;
pub mod github;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod providers;
