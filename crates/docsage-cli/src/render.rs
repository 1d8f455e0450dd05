//! Answer, source and statistics rendering

use colored::*;
use docsage_core::{ConfidenceLevel, QueryResult, ServiceStats};
use std::fmt::Write;
use url::Url;

/// Confidence level, colour-coded
pub fn confidence_label(level: ConfidenceLevel) -> ColoredString {
    let label = level.to_string().to_uppercase();
    match level {
        ConfidenceLevel::High => label.green().bold(),
        ConfidenceLevel::Medium => label.yellow().bold(),
        ConfidenceLevel::Low => label.red().bold(),
    }
}

/// Turn a `0.912`-style relevance score into `91.2%`
pub fn format_relevance(score: Option<&str>) -> Option<String> {
    let value: f64 = score?.trim().parse().ok()?;
    Some(format!("{:.1}%", value * 100.0))
}

/// Shorten a web locator to host, path and fragment; other locators pass through
pub fn display_locator(locator: &str) -> String {
    match Url::parse(locator) {
        Ok(url) if url.host_str().is_some() => {
            let mut shown = format!(
                "{}{}",
                url.host_str().unwrap_or_default(),
                url.path().trim_end_matches('/')
            );
            if let Some(fragment) = url.fragment() {
                shown.push('#');
                shown.push_str(fragment);
            }
            shown
        }
        _ => locator.to_string(),
    }
}

/// Full rendering of one answer: text, numbered sources and a footer line
pub fn render_result(result: &QueryResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.answer_text.trim());

    if !result.sources.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Sources:".bold());
        for source in &result.sources {
            let _ = writeln!(
                out,
                "  {} {}",
                format!("Source {}:", source.rank).cyan(),
                source.title
            );
            let mut detail = display_locator(&source.locator).dimmed().to_string();
            if let Some(relevance) = format_relevance(source.relevance_score.as_deref()) {
                let _ = write!(detail, " (relevance {})", relevance);
            }
            let _ = writeln!(out, "    {}", detail);
        }
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "{} {} ms | {} passages retrieved | confidence {}",
        "Answered in".dimmed(),
        result.processing_time_ms,
        result.chunks_retrieved,
        confidence_label(result.confidence_level)
    );
    out
}

/// `/stats` output
pub fn render_stats(stats: &ServiceStats) -> String {
    format!(
        "{}\n  Indexed passages: {}\n  Cache hit rate:   {:.1}%\n  Active sessions:  {}",
        "Pipeline statistics".bold(),
        stats.indexed_passage_count,
        stats.cache_hit_rate * 100.0,
        stats.active_session_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_relevance() {
        assert_eq!(format_relevance(Some("0.912")).as_deref(), Some("91.2%"));
        assert_eq!(format_relevance(Some("n/a")), None);
        assert_eq!(format_relevance(None), None);
    }

    #[test]
    fn test_display_locator() {
        assert_eq!(
            display_locator("https://handbook.gitlab.com/handbook/values/#collaboration"),
            "handbook.gitlab.com/handbook/values#collaboration"
        );
        assert_eq!(display_locator("docs/values.md"), "docs/values.md");
    }
}
