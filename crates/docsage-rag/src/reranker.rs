//! Merging and reordering of retrieval results

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use docsage_core::{Passage, RankedPassage};

use crate::normalizer::extract_keywords;

const TITLE_KEYWORD_BOOST: f64 = 0.1;
const RECENCY_BOOST: f64 = 0.05;

/// Composite scorer over the union of results from every phrasing of a query.
///
/// Pure: all inputs, including the current time, are passed in.
#[derive(Debug, Clone)]
pub struct Reranker {
    recency_window: Duration,
}

impl Reranker {
    pub fn new(recency_window_days: i64) -> Self {
        Self {
            recency_window: Duration::days(recency_window_days),
        }
    }

    /// Deduplicate, score and sort passages, best first.
    ///
    /// Keywords come from `original_query`, never from rewritten phrasings.
    pub fn rerank(
        &self,
        original_query: &str,
        passages: Vec<Passage>,
        now: DateTime<Utc>,
    ) -> Vec<RankedPassage> {
        let keywords = extract_keywords(original_query);

        let mut ranked: Vec<RankedPassage> = deduplicate(passages)
            .into_iter()
            .map(|passage| {
                let title = passage.source_title.to_lowercase();
                let title_boost = keywords
                    .iter()
                    .filter(|keyword| title.contains(keyword.as_str()))
                    .count() as f64
                    * TITLE_KEYWORD_BOOST;
                let recency_boost = match passage.indexed_at {
                    Some(indexed_at) if now - indexed_at < self.recency_window => RECENCY_BOOST,
                    _ => 0.0,
                };
                RankedPassage {
                    composite_score: passage.similarity_or_zero() + title_boost + recency_boost,
                    passage,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.composite_score
                .total_cmp(&a.composite_score)
                .then_with(|| {
                    b.passage
                        .similarity_or_zero()
                        .total_cmp(&a.passage.similarity_or_zero())
                })
                .then_with(|| a.passage.id.cmp(&b.passage.id))
        });
        ranked
    }
}

impl Default for Reranker {
    fn default() -> Self {
        Self::new(30)
    }
}

/// Keep one passage per id: the highest similarity wins, the first seen on ties.
/// Survivors stay in first-seen order.
pub fn deduplicate(passages: impl IntoIterator<Item = Passage>) -> Vec<Passage> {
    let mut unique: Vec<Passage> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for passage in passages {
        match positions.get(&passage.id) {
            Some(&pos) => {
                if passage.similarity_or_zero() > unique[pos].similarity_or_zero() {
                    unique[pos] = passage;
                }
            }
            None => {
                positions.insert(passage.id.clone(), unique.len());
                unique.push(passage);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn passage(id: &str, title: &str, score: Option<f64>) -> Passage {
        Passage {
            id: id.to_string(),
            text: format!("body of {}", id),
            source_title: title.to_string(),
            source_locator: format!("https://handbook.gitlab.com/{}", id),
            position_index: 0,
            total_segments: 1,
            indexed_at: None,
            similarity_score: score,
        }
    }

    #[test]
    fn test_title_keyword_boost_reorders() {
        let passages = vec![
            passage("a", "Engineering Onboarding", Some(0.80)),
            passage("b", "Company Values", Some(0.75)),
        ];
        let ranked = Reranker::default().rerank("what are the company values?", passages, now());

        assert_eq!(ranked[0].passage.id, "b");
        assert!((ranked[0].composite_score - 0.95).abs() < 1e-9);
        assert!((ranked[1].composite_score - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_recency_boost_applies_inside_window() {
        let mut fresh = passage("fresh", "Notes", Some(0.7));
        fresh.indexed_at = Some(now() - Duration::days(29));
        let mut stale = passage("stale", "Notes", Some(0.7));
        stale.indexed_at = Some(now() - Duration::days(30));

        let ranked = Reranker::default().rerank("zzz", vec![stale, fresh], now());
        assert_eq!(ranked[0].passage.id, "fresh");
        assert!((ranked[0].composite_score - 0.75).abs() < 1e-9);
        assert!((ranked[1].composite_score - 0.70).abs() < 1e-9);
    }

    #[test]
    fn test_unscored_passage_counts_as_zero() {
        let ranked = Reranker::default().rerank("q", vec![passage("x", "T", None)], now());
        assert_eq!(ranked[0].composite_score, 0.0);
    }

    #[test]
    fn test_deduplicate_keeps_highest_similarity() {
        let passages = vec![
            passage("a", "T", Some(0.71)),
            passage("b", "T", Some(0.80)),
            passage("a", "T", Some(0.93)),
        ];
        let unique = deduplicate(passages);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].id, "a");
        assert_eq!(unique[0].similarity_score, Some(0.93));
    }

    #[test]
    fn test_deduplicate_tie_keeps_first_seen() {
        let mut first = passage("a", "First", Some(0.8));
        first.text = "first".to_string();
        let mut second = passage("a", "Second", Some(0.8));
        second.text = "second".to_string();

        let unique = deduplicate(vec![first, second]);
        assert_eq!(unique[0].text, "first");
    }

    fn arb_passage() -> impl Strategy<Value = Passage> {
        (
            "[a-e]",
            "[A-Za-z ]{0,20}",
            proptest::option::of(0.0f64..=1.0),
            proptest::option::of(0i64..90),
        )
            .prop_map(|(id, title, score, age_days)| {
                let mut p = passage(&id, &title, score);
                p.indexed_at = age_days.map(|days| now() - Duration::days(days));
                p
            })
    }

    proptest! {
        #[test]
        fn rerank_output_is_sorted_unique_and_boosted(
            passages in proptest::collection::vec(arb_passage(), 0..20),
            query in "[a-z ]{0,30}",
        ) {
            let ranked = Reranker::default().rerank(&query, passages, now());

            let ids: HashSet<_> = ranked.iter().map(|r| r.passage.id.clone()).collect();
            prop_assert_eq!(ids.len(), ranked.len());

            for pair in ranked.windows(2) {
                prop_assert!(pair[0].composite_score >= pair[1].composite_score);
            }
            for r in &ranked {
                prop_assert!(r.composite_score >= r.passage.similarity_or_zero());
            }
        }
    }
}
