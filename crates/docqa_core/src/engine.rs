//! crates/docqa_core/src/engine.rs
//!
//! The answer engine: retrieval, prompt rendering, generation and output cleaning.

use crate::cleaning::clean_output;
use crate::domain::AnswerOutcome;
use crate::index::DocumentIndex;
use crate::indexer::ChunkIndexer;
use crate::ports::{GenerationService, PortResult};
use crate::prompts::PromptPolicy;
use std::sync::Arc;
use tracing::{debug, info};

/// Default retrieval depth.
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Clone)]
pub struct AnswerEngine {
    indexer: ChunkIndexer,
    generator: Arc<dyn GenerationService>,
    policy: PromptPolicy,
    top_k: usize,
}

impl AnswerEngine {
    pub fn new(
        indexer: ChunkIndexer,
        generator: Arc<dyn GenerationService>,
        policy: PromptPolicy,
        top_k: usize,
    ) -> Self {
        Self {
            indexer,
            generator,
            policy,
            top_k,
        }
    }

    pub fn policy(&self) -> &PromptPolicy {
        &self.policy
    }

    /// Answers `question` against `index`.
    ///
    /// The generative model is only invoked when an index with content is present.
    pub async fn answer(
        &self,
        question: &str,
        index: Option<&DocumentIndex>,
    ) -> PortResult<AnswerOutcome> {
        let Some(index) = index else {
            return Ok(AnswerOutcome::NoDocument);
        };
        if index.is_empty() {
            return Ok(AnswerOutcome::NoContent);
        }

        let chunks = self.indexer.query(index, question, self.top_k).await?;
        let context = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = self.policy.render(&context, question);
        debug!("PROMPT:\n{}", prompt);

        let raw_answer = self.generator.generate(&prompt).await?;
        debug!("RAW ANSWER:\n{}", raw_answer);

        let answer = match self.policy.cleaning_catalog() {
            Some(catalog) => {
                let cleaned = clean_output(&raw_answer, catalog);
                info!("Cleaned classification answer: '{}'", cleaned);
                cleaned
            }
            None => raw_answer.trim().to_string(),
        };

        Ok(AnswerOutcome::Answered(answer))
    }
}
