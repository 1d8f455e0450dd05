//! Prompt templates for grounded generation and query rewriting

use docsage_core::{ConversationTurn, RankedPassage};

/// Fixed system instructions for grounded answering.
pub const SYSTEM_INSTRUCTIONS: &str = "\
You are a documentation assistant answering questions about the company handbook and direction pages.

Rules:
1. Answer ONLY from the information in the CONTEXT section. Never use outside knowledge.
2. If the context does not contain the answer, say \"I don't have information about that in the provided documentation.\"
3. Cite every factual claim with its source marker, for example [Source 1] or [Source 2].
4. Prefer direct quotations from the context for factual claims, wrapped in double quotes.
5. Do not speculate, guess, or invent names, numbers, dates, or policies.
6. Keep answers concise and well structured.";

const EMPTY_CONTEXT: &str = "No relevant documentation was found for this question.";

/// Everything a grounded prompt is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct PromptParts<'a> {
    pub instructions: &'a str,
    pub passages: &'a [RankedPassage],
    pub history: &'a [ConversationTurn],
    pub question: &'a str,
}

/// Number passages as `[Source N: title]` blocks, in ranking order.
///
/// Returns an empty string when there are no passages.
pub fn render_context(passages: &[RankedPassage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, ranked)| {
            format!(
                "[Source {}: {}]\n{}",
                i + 1,
                ranked.passage.source_title,
                ranked.passage.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render prior turns as a `Role: text` transcript.
pub fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the full generation prompt.
pub fn render_prompt(parts: &PromptParts<'_>) -> String {
    let context = render_context(parts.passages);

    let mut prompt = String::new();
    prompt.push_str(parts.instructions.trim());
    prompt.push_str("\n\nCONTEXT:\n");
    if context.is_empty() {
        prompt.push_str(EMPTY_CONTEXT);
    } else {
        prompt.push_str(&context);
    }

    if !parts.history.is_empty() {
        prompt.push_str("\n\nPREVIOUS CONVERSATION:\n");
        prompt.push_str(&render_history(parts.history));
    }

    prompt.push_str("\n\nQUESTION: ");
    prompt.push_str(parts.question.trim());
    prompt.push_str("\n\nANSWER:");
    prompt
}

/// Prompt asking the backend for alternative search phrasings.
pub fn render_rewrite_prompt(query: &str, max_rewrites: usize) -> String {
    format!(
        "Rewrite the search query below into at most {max} alternative phrasings that would help \
find relevant passages in a company handbook.\n\
Fix spelling and phrasing, and expand abbreviations, but do NOT add topics, names or facts \
that are not in the original query.\n\
Return one phrasing per line with no numbering, bullets or commentary.\n\n\
Query: {query}\n\nPhrasings:",
        max = max_rewrites,
        query = query.trim()
    )
}
