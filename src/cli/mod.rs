//! CLI definitions for the review binary.
//!
//! Uses clap derive macros for argument definitions.

pub mod args;
