//! Qdrant-backed vector index

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{CountPointsBuilder, ScoredPoint, SearchPointsBuilder, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tracing::{debug, warn};

use docsage_core::{Embedder, Error, IndexStats, Passage, Result, VectorIndex};

/// Connection settings for a Qdrant collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "handbook".to_string(),
        }
    }
}

impl QdrantConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            url: env::var("QDRANT_URL").unwrap_or(defaults.url),
            collection: env::var("QDRANT_COLLECTION").unwrap_or(defaults.collection),
        }
    }
}

/// Vector index searching a Qdrant collection with query embeddings.
///
/// Points are expected to carry `text`, `title`, `url`, `chunk_index`,
/// `total_chunks` and `indexed_at` (RFC 3339) payload fields, as written by the
/// indexing job.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl QdrantVectorIndex {
    pub fn new(config: &QdrantConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .build()
            .map_err(|e| Error::Configuration(format!("invalid Qdrant client settings: {}", e)))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
            embedder,
        })
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Error::Retrieval(format!("failed to embed query: {}", e)))?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, top_k as u64).with_payload(true),
            )
            .await
            .map_err(|e| Error::Retrieval(format!("Qdrant search failed: {}", e)))?;

        let passages: Vec<Passage> = response
            .result
            .into_iter()
            .filter_map(|point| {
                let passage = passage_from_point(point);
                if passage.is_none() {
                    warn!(collection = %self.collection, "skipping point without id or text");
                }
                passage
            })
            .collect();

        debug!(collection = %self.collection, hits = passages.len(), "qdrant search");
        Ok(passages)
    }

    async fn stats(&self) -> Result<IndexStats> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| Error::Retrieval(format!("Qdrant count failed: {}", e)))?;

        Ok(IndexStats {
            total_indexed_passages: response.result.map(|r| r.count).unwrap_or(0),
        })
    }
}

/// Map a scored point to a passage; points without an id or text are unusable.
fn passage_from_point(point: ScoredPoint) -> Option<Passage> {
    let id = match point.id?.point_id_options? {
        PointIdOptions::Uuid(uuid) => uuid,
        PointIdOptions::Num(num) => num.to_string(),
    };
    let payload = point.payload;
    let text = payload_str(&payload, "text")?;

    Some(Passage {
        id,
        text,
        source_title: payload_str(&payload, "title").unwrap_or_else(|| "Untitled".to_string()),
        source_locator: payload_str(&payload, "url").unwrap_or_default(),
        position_index: payload_u32(&payload, "chunk_index").unwrap_or(0),
        total_segments: payload_u32(&payload, "total_chunks").unwrap_or(1),
        indexed_at: payload_str(&payload, "indexed_at")
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)),
        similarity_score: Some(f64::from(point.score)),
    })
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)?.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}

fn payload_u32(payload: &HashMap<String, Value>, key: &str) -> Option<u32> {
    match payload.get(key)?.kind.as_ref()? {
        Kind::IntegerValue(n) => u32::try_from(*n).ok(),
        Kind::DoubleValue(n) if *n >= 0.0 => Some(*n as u32),
        Kind::StringValue(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::PointId;

    fn point(id: PointId, payload: &[(&str, Value)], score: f32) -> ScoredPoint {
        ScoredPoint {
            id: Some(id),
            payload: payload
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_point_maps_to_passage() {
        let scored = point(
            PointId::from(42u64),
            &[
                ("text", Value::from("Everyone can contribute.")),
                ("title", Value::from("Mission")),
                ("url", Value::from("https://handbook.gitlab.com/handbook/company/mission/")),
                ("chunk_index", Value::from(2i64)),
                ("total_chunks", Value::from(7i64)),
                ("indexed_at", Value::from("2025-05-01T10:00:00Z")),
            ],
            0.875,
        );

        let passage = passage_from_point(scored).unwrap();
        assert_eq!(passage.id, "42");
        assert_eq!(passage.source_title, "Mission");
        assert_eq!(passage.position_index, 2);
        assert_eq!(passage.total_segments, 7);
        assert_eq!(passage.similarity_score, Some(0.875));
        assert_eq!(
            passage.indexed_at.map(|at| at.to_rfc3339()),
            Some("2025-05-01T10:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_point_without_text_is_skipped() {
        let scored = point(
            PointId::from("0b7a1c1e-1111-4b5e-9a0e-2f0c8d7e6a51".to_string()),
            &[("title", Value::from("Mission"))],
            0.9,
        );
        assert!(passage_from_point(scored).is_none());
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let scored = point(
            PointId::from("abc".to_string()),
            &[("text", Value::from("body"))],
            0.5,
        );
        let passage = passage_from_point(scored).unwrap();
        assert_eq!(passage.source_title, "Untitled");
        assert_eq!(passage.total_segments, 1);
        assert!(passage.indexed_at.is_none());
    }
}
