//! RAG pipeline configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Tunables of the retrieval and conversation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Passages kept after reranking, and passages requested per phrasing
    pub top_k: usize,
    /// Passages scoring below this are dropped before reranking
    pub similarity_threshold: f64,
    pub cache_ttl: Duration,
    /// Turns retained per session
    pub history_cap: usize,
    /// Most recent turns injected into the prompt
    pub history_window: usize,
    pub max_rewrites: usize,
    /// Retrieve for the original query alongside its rewrites
    pub include_original_query: bool,
    pub max_query_chars: usize,
    pub max_sessions: usize,
    pub recency_window_days: i64,
    pub request_timeout: Option<Duration>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.7,
            cache_ttl: Duration::from_secs(3600),
            history_cap: 10,
            history_window: 3,
            max_rewrites: 3,
            include_original_query: true,
            max_query_chars: 1000,
            max_sessions: 1000,
            recency_window_days: 30,
            request_timeout: None,
        }
    }
}

impl RagConfig {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let request_timeout = match parse_var::<u64, _>(&lookup, "RAG_REQUEST_TIMEOUT_SECS")? {
            Some(0) | None => defaults.request_timeout,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        let config = Self {
            top_k: parse_var(&lookup, "RAG_TOP_K")?.unwrap_or(defaults.top_k),
            similarity_threshold: parse_var(&lookup, "RAG_SIMILARITY_THRESHOLD")?
                .unwrap_or(defaults.similarity_threshold),
            cache_ttl: parse_var(&lookup, "RAG_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            history_cap: parse_var(&lookup, "RAG_HISTORY_CAP")?.unwrap_or(defaults.history_cap),
            history_window: parse_var(&lookup, "RAG_HISTORY_WINDOW")?
                .unwrap_or(defaults.history_window),
            max_rewrites: parse_var(&lookup, "RAG_MAX_REWRITES")?.unwrap_or(defaults.max_rewrites),
            include_original_query: parse_var(&lookup, "RAG_INCLUDE_ORIGINAL_QUERY")?
                .unwrap_or(defaults.include_original_query),
            max_query_chars: parse_var(&lookup, "RAG_MAX_QUERY_CHARS")?
                .unwrap_or(defaults.max_query_chars),
            max_sessions: parse_var(&lookup, "RAG_MAX_SESSIONS")?.unwrap_or(defaults.max_sessions),
            recency_window_days: defaults.recency_window_days,
            request_timeout,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Configuration(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.history_cap == 0 || self.max_sessions == 0 {
            return Err(Error::Configuration(
                "history_cap and max_sessions must be at least 1".to_string(),
            ));
        }
        if self.history_window > self.history_cap {
            return Err(Error::Configuration(format!(
                "history_window ({}) cannot exceed history_cap ({})",
                self.history_window, self.history_cap
            )));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            Error::Configuration(format!("{} has invalid value '{}': {}", key, raw, e))
        }),
    }
}
