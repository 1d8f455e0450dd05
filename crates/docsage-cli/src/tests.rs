//! Snapshot tests for terminal rendering

#[cfg(test)]
mod snapshot_tests {
    use crate::{render_result, render_stats};
    use docsage_core::{ConfidenceLevel, QueryResult, ServiceStats, SourceRef};
    use insta::assert_snapshot;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_answer_with_sources() {
        plain();
        let result = QueryResult {
            answer_text: "Everyone can contribute [Source 1].\n".to_string(),
            sources: vec![
                SourceRef {
                    rank: 1,
                    title: "Mission".to_string(),
                    locator: "https://handbook.gitlab.com/handbook/company/mission/".to_string(),
                    relevance_score: Some("0.912".to_string()),
                },
                SourceRef {
                    rank: 2,
                    title: "Values".to_string(),
                    locator: "docs/values.md".to_string(),
                    relevance_score: None,
                },
            ],
            confidence_level: ConfidenceLevel::High,
            chunks_retrieved: 2,
            processing_time_ms: 842,
            session_id: Some("s1".to_string()),
        };

        assert_snapshot!(render_result(&result), @r###"
        Everyone can contribute [Source 1].

        Sources:
          Source 1: Mission
            handbook.gitlab.com/handbook/company/mission (relevance 91.2%)
          Source 2: Values
            docs/values.md

        Answered in 842 ms | 2 passages retrieved | confidence HIGH
        "###);
    }

    #[test]
    fn test_render_answer_without_sources() {
        plain();
        let result = QueryResult {
            answer_text: "I don't have information about that in the provided documentation."
                .to_string(),
            sources: Vec::new(),
            confidence_level: ConfidenceLevel::Low,
            chunks_retrieved: 0,
            processing_time_ms: 120,
            session_id: None,
        };

        assert_snapshot!(render_result(&result), @r###"
        I don't have information about that in the provided documentation.

        Answered in 120 ms | 0 passages retrieved | confidence LOW
        "###);
    }

    #[test]
    fn test_render_stats() {
        plain();
        let stats = ServiceStats {
            indexed_passage_count: 1234,
            cache_hit_rate: 0.25,
            active_session_count: 3,
        };

        assert_snapshot!(render_stats(&stats), @r###"
        Pipeline statistics
          Indexed passages: 1234
          Cache hit rate:   25.0%
          Active sessions:  3
        "###);
    }
}
