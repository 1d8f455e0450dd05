//! Google Gemini integration for DocSage
//!
//! This crate provides the Gemini implementation of the `TextGenerator` and
//! `Embedder` traits.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::GeminiClient;
pub use config::GeminiConfig;

// Re-export core types for convenience
pub use docsage_core::{Embedder, Error, GenerationConfig, Result, RetryConfig, TextGenerator};
