//! Vector index trait and passage type

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A retrievable unit of indexed text with source attribution.
///
/// Passages are produced by the external index and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub text: String,
    pub source_title: String,
    pub source_locator: String,
    pub position_index: u32,
    pub total_segments: u32,
    pub indexed_at: Option<DateTime<Utc>>,
    pub similarity_score: Option<f64>,
}

impl Passage {
    /// Similarity used for ranking; unscored passages count as zero.
    pub fn similarity_or_zero(&self) -> f64 {
        self.similarity_score.unwrap_or(0.0)
    }
}

/// Statistics reported by a vector index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_indexed_passages: u64,
}

/// Trait for keyed nearest-neighbour search services (e.g., Qdrant)
///
/// `search` must be idempotent for identical `(query, top_k)` pairs against an
/// unchanged index. Failures are reported as [`crate::Error::Retrieval`].
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` passages ranked by similarity
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>>;

    /// Get statistics about the index
    async fn stats(&self) -> Result<IndexStats>;
}
