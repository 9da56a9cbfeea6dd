//! App-wide constants.
//!
//! Centralises the tool name, environment variable names, media types,
//! and defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "ai-codereview";

/// Crate version, as reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent with every request (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("ai-codereview/", env!("CARGO_PKG_VERSION"));

/// Default REST base URL for the hosting API.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default chat completions endpoint (Azure AI model inference).
pub const DEFAULT_COMPLETION_ENDPOINT: &str = "https://models.inference.ai.azure.com/chat/completions";

/// Default `api-version` query parameter for the completion endpoint.
pub const DEFAULT_API_VERSION: &str = "2024-02-01";

/// Default completion token budget per hunk.
pub const DEFAULT_MAX_TOKENS: u32 = 700;

/// Header carrying the completion API key.
pub const API_KEY_HEADER: &str = "api-key";

// ── Media types ─────────────────────────────────────────────────────

pub const MEDIA_TYPE_JSON: &str = "application/vnd.github+json";
pub const MEDIA_TYPE_DIFF: &str = "application/vnd.github.v3.diff";

// ── Environment variable names ──────────────────────────────────────

/// Path of the JSON event payload written by the CI runner.
pub const ENV_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

// CI action inputs (`INPUT_<NAME>` per the GitHub Actions convention).
pub const ENV_INPUT_GITHUB_TOKEN: &str = "INPUT_GITHUB_TOKEN";
pub const ENV_INPUT_API_KEY: &str = "INPUT_API_KEY";
pub const ENV_INPUT_ENDPOINT: &str = "INPUT_ENDPOINT";
pub const ENV_INPUT_API_VERSION: &str = "INPUT_API_VERSION";
pub const ENV_INPUT_MAX_TOKENS: &str = "INPUT_MAX_TOKENS";
pub const ENV_INPUT_EXCLUDE: &str = "INPUT_EXCLUDE";
pub const ENV_INPUT_MAX_CONCURRENT: &str = "INPUT_MAX_CONCURRENT";
