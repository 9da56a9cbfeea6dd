//! CompletionProvider trait and LLM integration.
//!
//! Provides an abstraction layer over the completion endpoint so the
//! review pipeline can be exercised without network access.

pub mod completion;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ModelReview, Prompt};

/// Errors from the completion provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("completion API error: {0}")]
    ApiError(String),

    #[error("failed to parse completion response: {0}")]
    ParseError(String),

    #[error("completion reply has an unexpected shape: {0}")]
    SchemaError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM-backed hunk review.
///
/// Implementations send the prompt and decode the reply into review
/// entries. Every failure is reported as a [`ProviderError`]; the caller
/// decides whether it is fatal.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Review one hunk and return the model's comments.
    async fn review(&self, prompt: &Prompt) -> Result<Vec<ModelReview>, ProviderError>;
}
