//! In-process fakes for the model and extraction ports, used by unit tests.

use crate::ports::{EmbeddingService, GenerationService, PortResult, TextExtractionService};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

const DIMENSION: usize = 64;

/// Hashes lowercase words into a fixed number of buckets.
#[derive(Default)]
pub struct BagOfWordsEmbedder {
    delay: Option<Duration>,
}

impl BagOfWordsEmbedder {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize))
                % DIMENSION;
            v[bucket] += 1.0;
        }
        v[DIMENSION - 1] += 0.01;
        v
    }
}

#[async_trait]
impl EmbeddingService for BagOfWordsEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> PortResult<Vec<Vec<f32>>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Returns the same canned text for every prompt and records the prompts.
pub struct ScriptedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Treats the upload as UTF-8 text.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractionService for PlainTextExtractor {
    async fn extract_text(&self, file_bytes: &[u8]) -> String {
        String::from_utf8_lossy(file_bytes).into_owned()
    }
}
