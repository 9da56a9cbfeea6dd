//! Shared types used across all modules.
//!
//! This module defines the core data structures for diffs, CI events,
//! pull request details, prompts, and review comments. Other modules import from
//! here rather than reaching into each other's internals.

pub mod diff;
pub mod event;
pub mod prompt;
pub mod review;

pub use diff::{DiffLine, DiffLineType, FileDiff, Hunk};
pub use event::{EventPayload, PullRequestAction};
pub use prompt::Prompt;
pub use review::{CreateReview, ModelReview, PrDetails, ReviewComment};
