//! In-memory vector index

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use docsage_core::{IndexStats, Passage, Result, VectorIndex};

use crate::normalizer::extract_keywords;

/// Process-local index scoring passages by keyword overlap with the query.
///
/// Scores are the fraction of query keywords found in the passage title or text,
/// so they stay within [0, 1] like a cosine similarity would. Used for demo mode
/// and tests; production deployments point at [`crate::QdrantVectorIndex`].
pub struct LocalVectorIndex {
    passages: RwLock<HashMap<String, Passage>>,
}

impl LocalVectorIndex {
    pub fn new() -> Self {
        Self {
            passages: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, passage: Passage) {
        let mut passages = self.passages.write().unwrap_or_else(|e| e.into_inner());
        passages.insert(passage.id.clone(), passage);
    }

    pub fn insert_batch(&self, batch: impl IntoIterator<Item = Passage>) -> usize {
        let mut passages = self.passages.write().unwrap_or_else(|e| e.into_inner());
        let mut count = 0;
        for passage in batch {
            passages.insert(passage.id.clone(), passage);
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.passages.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn keyword_similarity(keywords: &[String], passage: &Passage) -> f64 {
        if keywords.is_empty() {
            return 0.0;
        }
        let haystack = format!("{} {}", passage.source_title, passage.text).to_lowercase();
        let matches = keywords
            .iter()
            .filter(|keyword| haystack.contains(keyword.as_str()))
            .count();
        matches as f64 / keywords.len() as f64
    }
}

impl Default for LocalVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for LocalVectorIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        let keywords: Vec<String> = extract_keywords(query).into_iter().collect();
        let passages = self.passages.read().unwrap_or_else(|e| e.into_inner());

        let mut results: Vec<Passage> = passages
            .values()
            .map(|passage| {
                let mut scored = passage.clone();
                scored.similarity_score = Some(Self::keyword_similarity(&keywords, passage));
                scored
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity_or_zero()
                .total_cmp(&a.similarity_or_zero())
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(top_k);
        Ok(results)
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            total_indexed_passages: self.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str, title: &str, text: &str) -> Passage {
        Passage {
            id: id.to_string(),
            text: text.to_string(),
            source_title: title.to_string(),
            source_locator: format!("https://handbook.gitlab.com/{}", id),
            position_index: 0,
            total_segments: 1,
            indexed_at: None,
            similarity_score: None,
        }
    }

    #[tokio::test]
    async fn test_search_ranks_by_keyword_overlap() {
        let index = LocalVectorIndex::new();
        index.insert_batch([
            passage("mission", "Mission", "Everyone can contribute to GitLab."),
            passage("values", "Values", "Collaboration, results, efficiency."),
        ]);

        let results = index.search("GitLab mission", 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "mission");
        assert_eq!(results[0].similarity_score, Some(1.0));
        assert_eq!(results[1].similarity_score, Some(0.0));
    }

    #[tokio::test]
    async fn test_search_truncates_and_reports_stats() {
        let index = LocalVectorIndex::new();
        for n in 0..8 {
            index.insert(passage(&format!("p{}", n), "Title", "text"));
        }
        assert_eq!(index.search("title", 3).await.unwrap().len(), 3);
        assert_eq!(index.stats().await.unwrap().total_indexed_passages, 8);
    }
}
