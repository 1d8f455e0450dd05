//! Core traits and types for DocSage
//!
//! This crate defines the fundamental traits and types used across the DocSage system.
//! It provides capability-facing interfaces for text generation backends, embedders,
//! vector indexes and clocks, so the RAG pipeline can be wired against real services
//! or test doubles alike.

pub mod clock;
pub mod config;
pub mod error;
pub mod llm;
pub mod types;
pub mod vector_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RagConfig;
pub use error::{Error, Result};
pub use llm::{Embedder, GenerationConfig, RetryConfig, TextGenerator};
pub use types::*;
pub use vector_store::{IndexStats, Passage, VectorIndex};
