//! Grounded answer generation

use std::sync::Arc;
use tracing::debug;

use docsage_core::{ConversationTurn, Error, RankedPassage, Result, SourceRef, TextGenerator};

use crate::prompt::{PromptParts, SYSTEM_INSTRUCTIONS, render_context, render_prompt};

/// A generated answer with the attribution and context it was grounded on
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub answer_text: String,
    pub sources: Vec<SourceRef>,
    /// The context block exactly as it appeared in the prompt
    pub context_text: String,
}

/// Builds grounded prompts and calls the text backend
pub struct Generator {
    backend: Arc<dyn TextGenerator>,
}

impl Generator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    /// Generate an answer to `question` from `passages` and recent `history`.
    ///
    /// Any backend failure, including an empty completion, is a
    /// [`Error::Generation`]; no partial answer is ever returned.
    pub async fn generate(
        &self,
        question: &str,
        passages: &[RankedPassage],
        history: &[ConversationTurn],
    ) -> Result<GeneratedAnswer> {
        let prompt = render_prompt(&PromptParts {
            instructions: SYSTEM_INSTRUCTIONS,
            passages,
            history,
            question,
        });
        debug!(
            prompt_chars = prompt.len(),
            passages = passages.len(),
            history_turns = history.len(),
            model = self.backend.model_id(),
            "generating answer"
        );

        let raw = self.backend.complete(&prompt).await.map_err(|e| match e {
            Error::Generation(msg) => Error::Generation(msg),
            other => Error::Generation(other.to_string()),
        })?;

        let answer_text = raw.trim().to_string();
        if answer_text.is_empty() {
            return Err(Error::Generation("backend returned an empty answer".to_string()));
        }

        Ok(GeneratedAnswer {
            answer_text,
            sources: source_refs(passages),
            context_text: render_context(passages),
        })
    }
}

/// One attribution entry per passage, numbered as in the prompt
pub fn source_refs(passages: &[RankedPassage]) -> Vec<SourceRef> {
    passages
        .iter()
        .enumerate()
        .map(|(i, ranked)| SourceRef {
            rank: i + 1,
            title: ranked.passage.source_title.clone(),
            locator: ranked.passage.source_locator.clone(),
            relevance_score: ranked
                .passage
                .similarity_score
                .map(|score| format!("{:.3}", score)),
        })
        .collect()
}
