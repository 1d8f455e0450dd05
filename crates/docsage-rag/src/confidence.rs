//! Post-hoc confidence heuristics for generated answers
//!
//! The assessor runs an ordered list of rules; the first rule that produces a
//! level decides the outcome. The result is a transparency signal, not a proof
//! of correctness.

use regex::Regex;
use std::sync::LazyLock;

use docsage_core::ConfidenceLevel;

/// Phrases signalling that the model itself could not answer.
const UNCERTAINTY_PHRASES: &[&str] = &[
    "i don't know",
    "i do not know",
    "i'm not sure",
    "i am not sure",
    "not mentioned",
    "no information about",
    "don't have information",
    "do not have information",
    "don't have enough information",
    "no relevant information",
    "cannot find any information",
    "couldn't find any information",
    "could not find any information",
];

/// Common long words that say nothing about grounding.
const VERIFICATION_STOPWORDS: &[&str] = &[
    "this", "that", "with", "from", "have", "been", "were", "they", "their", "there", "which",
    "would", "could", "should", "about", "into", "than", "then", "them", "these", "those", "what",
    "when", "where", "will", "also", "such", "some", "more", "most", "other", "only", "your",
];

const MIN_SENTENCE_CHARS: usize = 20;
const MIN_WORD_CHARS: usize = 3;
const SENTENCE_SUPPORT_RATIO: f64 = 0.5;
const LENGTH_RATIO_LIMIT: f64 = 1.5;

static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Source \d+\]").expect("valid citation regex"));
static QUOTED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]+""#).expect("valid quote regex"));

/// One prioritized heuristic
#[derive(Clone, Copy)]
pub struct ConfidenceRule {
    pub name: &'static str,
    pub evaluate: fn(answer: &str, context: &str) -> Option<ConfidenceLevel>,
}

/// Outcome of an assessment with the rule that decided it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub level: ConfidenceLevel,
    pub rule: &'static str,
}

/// Rules in priority order. The last rule always yields a level.
pub const RULES: &[ConfidenceRule] = &[
    ConfidenceRule {
        name: "explicit_uncertainty",
        evaluate: explicit_uncertainty,
    },
    ConfidenceRule {
        name: "answer_outgrows_context",
        evaluate: answer_outgrows_context,
    },
    ConfidenceRule {
        name: "no_citations_or_quotes",
        evaluate: no_citations_or_quotes,
    },
    ConfidenceRule {
        name: "sentence_verification",
        evaluate: sentence_verification,
    },
];

/// Score an answer against the context it was generated from
pub fn assess(answer: &str, context: &str) -> ConfidenceLevel {
    evaluate(answer, context).level
}

/// Like [`assess`], also naming the deciding rule
pub fn evaluate(answer: &str, context: &str) -> Verdict {
    RULES
        .iter()
        .find_map(|rule| {
            (rule.evaluate)(answer, context).map(|level| Verdict {
                level,
                rule: rule.name,
            })
        })
        .unwrap_or(Verdict {
            level: ConfidenceLevel::Low,
            rule: "fallback",
        })
}

fn explicit_uncertainty(answer: &str, _context: &str) -> Option<ConfidenceLevel> {
    let answer = answer.to_lowercase().replace('\u{2019}', "'");
    UNCERTAINTY_PHRASES
        .iter()
        .any(|phrase| answer.contains(phrase))
        .then_some(ConfidenceLevel::Low)
}

fn answer_outgrows_context(answer: &str, context: &str) -> Option<ConfidenceLevel> {
    let answer_len = answer.chars().count() as f64;
    let context_len = context.chars().count() as f64;
    (answer_len > LENGTH_RATIO_LIMIT * context_len).then_some(ConfidenceLevel::Medium)
}

fn no_citations_or_quotes(answer: &str, context: &str) -> Option<ConfidenceLevel> {
    let ungrounded = !context.trim().is_empty()
        && !CITATION_MARKER.is_match(answer)
        && !QUOTED_SPAN.is_match(answer);
    ungrounded.then_some(ConfidenceLevel::Medium)
}

fn sentence_verification(answer: &str, context: &str) -> Option<ConfidenceLevel> {
    let score = verification_score(answer, context);
    let level = if score < 0.5 {
        ConfidenceLevel::Low
    } else if score < 0.8 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::High
    };
    Some(level)
}

/// Fraction of substantial answer sentences whose content words mostly occur in the context.
///
/// Sentences are split on `.`, `!` and `?`; only those longer than 20 characters count.
/// A counted sentence without any content word is unverified. Returns 1.0 when no
/// sentence qualifies.
pub fn verification_score(answer: &str, context: &str) -> f64 {
    let context = context.to_lowercase();

    let sentences: Vec<&str> = answer
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
        .collect();

    if sentences.is_empty() {
        return 1.0;
    }

    let verified = sentences
        .iter()
        .filter(|sentence| sentence_support(sentence, &context) > SENTENCE_SUPPORT_RATIO)
        .count();

    verified as f64 / sentences.len() as f64
}

fn sentence_support(sentence: &str, context_lower: &str) -> f64 {
    let words: Vec<String> = sentence
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| word.chars().count() > MIN_WORD_CHARS)
        .filter(|word| !VERIFICATION_STOPWORDS.contains(&word.as_str()))
        .collect();

    if words.is_empty() {
        return 0.0;
    }

    let found = words
        .iter()
        .filter(|word| context_lower.contains(word.as_str()))
        .count();
    found as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = "[Source 1: Mission]\n\
        GitLab's mission is to make it so that everyone can contribute. \
        When everyone can contribute, users become contributors and we greatly increase \
        the rate of innovation.";

    #[test]
    fn test_uncertainty_phrase_is_low_regardless_of_context() {
        for answer in [
            "I don't know.",
            "Honestly, I DON'T KNOW what the policy says [Source 1].",
            "I don\u{2019}t know",
        ] {
            assert_eq!(assess(answer, CONTEXT), ConfidenceLevel::Low, "{}", answer);
            assert_eq!(assess(answer, ""), ConfidenceLevel::Low, "{}", answer);
        }
    }

    #[test]
    fn test_cited_instruction_mentioning_cannot_find_is_not_uncertainty() {
        let answer = "If you cannot find the page, everyone can contribute [Source 1].";
        assert_ne!(evaluate(answer, CONTEXT).rule, "explicit_uncertainty");

        let verdict = evaluate("I cannot find any information about bonuses.", CONTEXT);
        assert_eq!(verdict.level, ConfidenceLevel::Low);
        assert_eq!(verdict.rule, "explicit_uncertainty");
    }

    #[test]
    fn test_no_information_disclaimer_with_empty_context_is_low() {
        let verdict = evaluate(
            "I don't have information about that in the provided documentation.",
            "",
        );
        assert_eq!(verdict.level, ConfidenceLevel::Low);
        assert_eq!(verdict.rule, "explicit_uncertainty");
    }

    #[test]
    fn test_overlong_answer_is_medium() {
        let answer = "Everyone can contribute [Source 1]. ".repeat(20);
        let verdict = evaluate(&answer, "Everyone can contribute.");
        assert_eq!(verdict.level, ConfidenceLevel::Medium);
        assert_eq!(verdict.rule, "answer_outgrows_context");
    }

    #[test]
    fn test_missing_citations_is_medium() {
        let verdict = evaluate("The mission is that everyone can contribute.", CONTEXT);
        assert_eq!(verdict.level, ConfidenceLevel::Medium);
        assert_eq!(verdict.rule, "no_citations_or_quotes");
    }

    #[test]
    fn test_quoted_text_counts_as_grounding() {
        let answer = "The handbook says \"everyone can contribute\".";
        assert_ne!(evaluate(answer, CONTEXT).rule, "no_citations_or_quotes");
    }

    #[test]
    fn test_grounded_cited_answer_is_high() {
        let answer = "GitLab's mission is to make it so that everyone can contribute [Source 1].";
        assert!(answer.len() <= CONTEXT.len());
        assert!(verification_score(answer, CONTEXT) >= 0.8);
        let verdict = evaluate(answer, CONTEXT);
        assert_eq!(verdict.level, ConfidenceLevel::High);
        assert_eq!(verdict.rule, "sentence_verification");
    }

    #[test]
    fn test_unsupported_claims_are_low() {
        let answer = "Quarterly revenue exceeded projections substantially [Source 1]. \
            Shareholders received generous dividends afterwards [Source 1].";
        let context = format!("{} {}", CONTEXT, "padding ".repeat(40));
        assert_eq!(assess(answer, &context), ConfidenceLevel::Low);
    }

    #[test]
    fn test_partially_supported_answer_is_medium() {
        let answer = "GitLab's mission is that everyone can contribute [Source 1]. \
            Quarterly revenue exceeded projections substantially.";
        let context = format!("{} {}", CONTEXT, "padding ".repeat(40));
        assert!((verification_score(answer, &context) - 0.5).abs() < 1e-9);
        assert_eq!(assess(answer, &context), ConfidenceLevel::Medium);
    }

    #[test]
    fn test_verification_score_without_qualifying_sentences() {
        assert_eq!(verification_score("Yes [Source 1].", CONTEXT), 1.0);
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<_> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(
            names,
            [
                "explicit_uncertainty",
                "answer_outgrows_context",
                "no_citations_or_quotes",
                "sentence_verification"
            ]
        );
    }
}
