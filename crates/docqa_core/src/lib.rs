pub mod catalog;
pub mod chunking;
pub mod cleaning;
pub mod domain;
pub mod engine;
pub mod index;
pub mod indexer;
pub mod pipeline;
pub mod ports;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::JobCatalog;
pub use chunking::ChunkingConfig;
pub use domain::{AnswerOutcome, Chunk, JobTitle, User, UserCredentials};
pub use engine::AnswerEngine;
pub use index::DocumentIndex;
pub use indexer::ChunkIndexer;
pub use pipeline::{DocumentSlot, IngestReport, QaPipeline};
pub use ports::{
    CredentialStore, EmbeddingService, GenerationService, PortError, PortResult,
    TextExtractionService,
};
pub use prompts::PromptPolicy;
