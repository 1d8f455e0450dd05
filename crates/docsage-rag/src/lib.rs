//! Retrieval-augmented question answering for DocSage
//!
//! This crate implements the query pipeline: normalization, optional query
//! rewriting, cached vector retrieval, reranking, grounded generation,
//! confidence assessment and per-session conversation memory. Vector index
//! adapters for Qdrant and an in-memory store are included.

pub mod cache;
pub mod confidence;
pub mod generator;
pub mod local_index;
pub mod memory;
pub mod normalizer;
pub mod prompt;
pub mod qdrant_index;
pub mod reranker;
pub mod rewriter;
pub mod service;


pub use cache::ResultCache;
pub use confidence::{Verdict, assess, verification_score};
pub use generator::{GeneratedAnswer, Generator};
pub use local_index::LocalVectorIndex;
pub use memory::ConversationMemory;
pub use normalizer::{extract_keywords, normalize};
pub use qdrant_index::{QdrantConfig, QdrantVectorIndex};
pub use reranker::Reranker;
pub use rewriter::QueryRewriter;
pub use service::RagService;

// Re-export core types for convenience
pub use docsage_core::{
    Clock, ConfidenceLevel, ConversationTurn, Embedder, Error, IndexStats, ManualClock, Passage,
    QueryRequest, QueryResult, RagConfig, RankedPassage, Result, Role, ServiceStats, SourceRef,
    SystemClock, TextGenerator, VectorIndex,
};
