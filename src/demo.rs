//! Built-in sample corpus for `--demo`

use chrono::{Duration, Utc};
use docsage_rag::{LocalVectorIndex, Passage};

/// Keyword-overlap scores run lower than embedding similarity
pub const DEMO_SIMILARITY_THRESHOLD: f64 = 0.5;

const CORPUS: &[(&str, &str, &str)] = &[
    (
        "Mission",
        "https://handbook.gitlab.com/handbook/company/mission/",
        "Our mission is to make it so that everyone can contribute. When everyone can \
         contribute, users become contributors and we greatly increase the rate of innovation.",
    ),
    (
        "Vision",
        "https://handbook.gitlab.com/handbook/company/vision/",
        "Our vision is to become the AI-powered DevSecOps platform that empowers everyone \
         to contribute to software.",
    ),
    (
        "Values: Collaboration",
        "https://handbook.gitlab.com/handbook/values/#collaboration",
        "Collaboration means helping others when they ask and giving feedback directly. \
         Kindness, sharing and assuming positive intent are part of collaboration.",
    ),
    (
        "Values: Results",
        "https://handbook.gitlab.com/handbook/values/#results",
        "We do what we promised to each other, customers, users and investors. Results \
         matter more than hours worked.",
    ),
    (
        "Values: Iteration",
        "https://handbook.gitlab.com/handbook/values/#iteration",
        "Iteration means doing the smallest thing possible and getting it out as quickly \
         as possible to get feedback.",
    ),
    (
        "All-Remote",
        "https://handbook.gitlab.com/handbook/company/culture/all-remote/",
        "GitLab is an all-remote company with team members in more than sixty countries. \
         Remote work relies on asynchronous communication and a handbook-first culture.",
    ),
    (
        "Handbook First",
        "https://handbook.gitlab.com/handbook/about/handbook-usage/",
        "The handbook is the single source of truth for how the company operates. Changes \
         to process start with a merge request to the handbook.",
    ),
    (
        "Paid Time Off",
        "https://handbook.gitlab.com/handbook/people-group/paid-time-off/",
        "Team members are encouraged to take paid time off. The flexible time off policy \
         has no fixed limit; take at least 25 days per year.",
    ),
];

/// In-memory index preloaded with a few handbook pages
pub fn sample_index() -> LocalVectorIndex {
    let index = LocalVectorIndex::new();
    let indexed_at = Utc::now() - Duration::days(7);

    index.insert_batch(CORPUS.iter().enumerate().map(|(i, (title, url, text))| Passage {
        id: format!("demo-{}", i),
        text: text.to_string(),
        source_title: title.to_string(),
        source_locator: url.to_string(),
        position_index: 0,
        total_segments: 1,
        indexed_at: Some(indexed_at),
        similarity_score: None,
    }));
    index
}
