//! Query expansion through the generative backend

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use docsage_core::TextGenerator;

use crate::prompt::render_rewrite_prompt;

const MAX_PHRASING_CHARS: usize = 300;

/// Produces alternative search phrasings for one query.
///
/// Never fails: backend errors and unusable output degrade to the original query.
pub struct QueryRewriter {
    backend: Arc<dyn TextGenerator>,
    max_rewrites: usize,
}

impl QueryRewriter {
    pub fn new(backend: Arc<dyn TextGenerator>, max_rewrites: usize) -> Self {
        Self {
            backend,
            max_rewrites: max_rewrites.max(1),
        }
    }

    /// Return 1 to `max_rewrites` phrasings, or `[query]` when rewriting fails
    pub async fn rewrite(&self, query: &str) -> Vec<String> {
        let prompt = render_rewrite_prompt(query, self.max_rewrites);

        let raw = match self.backend.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "query rewrite failed, using original query");
                return vec![query.to_string()];
            }
        };

        let phrasings = parse_phrasings(&raw, self.max_rewrites);
        if phrasings.is_empty() {
            warn!("query rewrite returned no usable phrasings, using original query");
            return vec![query.to_string()];
        }

        debug!(count = phrasings.len(), ?phrasings, "query rewritten");
        phrasings
    }
}

/// Extract distinct phrasings from a line-oriented model response.
fn parse_phrasings(raw: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();

    raw.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.ends_with(':'))
        .filter(|line| line.chars().count() <= MAX_PHRASING_CHARS)
        .filter(|line| seen.insert(line.to_lowercase()))
        .take(limit)
        .collect()
}

fn clean_line(line: &str) -> String {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();

    // Drop "1." / "2)" style numbering.
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let line = if digits > 0 && line[digits..].starts_with(['.', ')']) {
        line[digits + 1..].trim_start()
    } else {
        line
    };

    line.trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}
