//! End-to-end query pipeline

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use docsage_core::{
    Clock, ConversationTurn, Error, Passage, QueryRequest, QueryResult, RagConfig, RankedPassage,
    Result, ServiceStats, SystemClock, TextGenerator, VectorIndex,
};

use crate::cache::ResultCache;
use crate::confidence;
use crate::generator::Generator;
use crate::memory::ConversationMemory;
use crate::normalizer::normalize;
use crate::reranker::Reranker;
use crate::rewriter::QueryRewriter;

/// Retrieval-augmented question answering over a vector index.
///
/// The cache and conversation store are injected so their lifetime is owned by
/// the embedding process; one service instance is shared by all requests.
pub struct RagService {
    index: Arc<dyn VectorIndex>,
    generator: Generator,
    rewriter: QueryRewriter,
    reranker: Reranker,
    cache: Arc<ResultCache>,
    memory: Arc<ConversationMemory>,
    clock: Arc<dyn Clock>,
    config: RagConfig,
}

impl RagService {
    /// Create a service with fresh stores and the system clock
    pub fn new(
        index: Arc<dyn VectorIndex>,
        backend: Arc<dyn TextGenerator>,
        config: RagConfig,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(ResultCache::new(config.cache_ttl, clock.clone()));
        let memory = Arc::new(ConversationMemory::new(
            config.history_cap,
            config.max_sessions,
        ));
        Self::with_stores(index, backend, cache, memory, clock, config)
    }

    /// Create a service around existing stores
    pub fn with_stores(
        index: Arc<dyn VectorIndex>,
        backend: Arc<dyn TextGenerator>,
        cache: Arc<ResultCache>,
        memory: Arc<ConversationMemory>,
        clock: Arc<dyn Clock>,
        config: RagConfig,
    ) -> Self {
        Self {
            index,
            generator: Generator::new(backend.clone()),
            rewriter: QueryRewriter::new(backend, config.max_rewrites),
            reranker: Reranker::new(config.recency_window_days),
            cache,
            memory,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    /// Answer a question, optionally within a conversation session.
    ///
    /// Conversation memory is only written after a successful generation; a
    /// failure or timeout leaves it untouched.
    #[instrument(
        skip_all,
        fields(
            session_id = request.session_id.as_deref().unwrap_or("-"),
            expansion = request.use_query_expansion
        )
    )]
    pub async fn process_query(&self, request: &QueryRequest) -> Result<QueryResult> {
        let started = Instant::now();

        let outcome = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_pipeline(request, started))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Timeout(format!(
                        "query exceeded {} ms",
                        limit.as_millis()
                    )))
                }),
            None => self.run_pipeline(request, started).await,
        };

        match &outcome {
            Ok(result) => info!(
                confidence = %result.confidence_level,
                chunks = result.chunks_retrieved,
                elapsed_ms = result.processing_time_ms,
                "query answered"
            ),
            Err(e) => error!(kind = e.kind(), error = %e, "query failed"),
        }
        outcome
    }

    /// Drop a session's conversation history
    pub fn clear_session(&self, session_id: &str) -> bool {
        let existed = self.memory.clear(session_id);
        debug!(session_id, existed, "session cleared");
        existed
    }

    /// Observability snapshot
    pub async fn stats(&self) -> Result<ServiceStats> {
        let index_stats = self.index.stats().await?;
        Ok(ServiceStats {
            indexed_passage_count: index_stats.total_indexed_passages,
            cache_hit_rate: self.cache.hit_rate(),
            active_session_count: self.memory.active_sessions(),
        })
    }

    async fn run_pipeline(&self, request: &QueryRequest, started: Instant) -> Result<QueryResult> {
        let normalized = self.validate(&request.query)?;
        let session_id = request.session_id.as_deref();

        let phrasings = self.phrasings(&normalized, request.use_query_expansion).await;
        let retrieved = self.retrieve_all(&phrasings).await?;

        let mut ranked: Vec<RankedPassage> =
            self.reranker.rerank(&request.query, retrieved, self.clock.now());
        ranked.truncate(self.config.top_k);

        let history = self.memory.recent(session_id, self.config.history_window);

        let question = request.query.trim();
        let answer = self.generator.generate(question, &ranked, &history).await?;

        let verdict = confidence::evaluate(&answer.answer_text, &answer.context_text);
        debug!(level = %verdict.level, rule = verdict.rule, "confidence assessed");

        let now = self.clock.now();
        self.memory.append_all(
            session_id,
            [
                ConversationTurn::user(question, now),
                ConversationTurn::assistant(answer.answer_text.clone(), now),
            ],
        );

        Ok(QueryResult {
            answer_text: answer.answer_text,
            sources: answer.sources,
            confidence_level: verdict.level,
            chunks_retrieved: ranked.len(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            session_id: request.session_id.clone(),
        })
    }

    fn validate(&self, query: &str) -> Result<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Query must not be empty".to_string()));
        }
        let chars = trimmed.chars().count();
        if chars > self.config.max_query_chars {
            return Err(Error::Validation(format!(
                "Query is too long ({} characters, maximum {})",
                chars, self.config.max_query_chars
            )));
        }
        Ok(normalize(trimmed))
    }

    /// The search strings for one request, normalized and distinct
    async fn phrasings(&self, normalized: &str, expand: bool) -> Vec<String> {
        if !expand {
            return vec![normalized.to_string()];
        }

        let rewrites = self.rewriter.rewrite(normalized).await;
        let candidates = self
            .config
            .include_original_query
            .then(|| normalized.to_string())
            .into_iter()
            .chain(rewrites.iter().map(|rewrite| normalize(rewrite)));

        let mut seen = HashSet::new();
        let phrasings: Vec<String> = candidates
            .filter(|phrasing| !phrasing.is_empty())
            .filter(|phrasing| seen.insert(phrasing.clone()))
            .take(self.config.max_rewrites + 1)
            .collect();

        if phrasings.is_empty() {
            vec![normalized.to_string()]
        } else {
            phrasings
        }
    }

    /// Retrieve for every phrasing; fails only when every phrasing fails
    async fn retrieve_all(&self, phrasings: &[String]) -> Result<Vec<Passage>> {
        let outcomes = join_all(phrasings.iter().map(|phrasing| self.retrieve_one(phrasing))).await;

        let mut passages = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0;

        for (phrasing, outcome) in phrasings.iter().zip(outcomes) {
            match outcome {
                Ok(found) => {
                    succeeded += 1;
                    passages.extend(found);
                }
                Err(e) => {
                    warn!(phrasing = %phrasing, error = %e, "retrieval failed for phrasing");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(passages),
        }
    }

    async fn retrieve_one(&self, phrasing: &str) -> Result<Vec<Passage>> {
        let threshold = self.config.similarity_threshold;
        let top_k = self.config.top_k;

        let (passages, hit) = self
            .cache
            .get_or_fetch(phrasing, move || async move {
                let found = self.index.search(phrasing, top_k).await.map_err(|e| match e {
                    Error::Retrieval(msg) => Error::Retrieval(msg),
                    other => Error::Retrieval(other.to_string()),
                })?;
                Ok(above_threshold(found, threshold))
            })
            .await?;

        debug!(phrasing, cache_hit = hit, passages = passages.len(), "retrieved");
        Ok(passages)
    }
}

/// Drop passages scoring below `threshold`; unscored passages always pass.
pub fn above_threshold(passages: Vec<Passage>, threshold: f64) -> Vec<Passage> {
    passages
        .into_iter()
        .filter(|passage| {
            passage
                .similarity_score
                .is_none_or(|score| score >= threshold)
        })
        .collect()
}
