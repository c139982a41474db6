pub mod db;
pub mod embeddings;
pub mod memory_db;
pub mod pdf;
pub mod qa_llm;
pub mod retry;

pub use db::PgCredentialStore;
pub use embeddings::OpenAiEmbeddingAdapter;
pub use memory_db::InMemoryCredentialStore;
pub use pdf::PdfTextExtractor;
pub use qa_llm::OpenAiQaAdapter;
pub use retry::{single_attempt_client, RetryPolicy};
