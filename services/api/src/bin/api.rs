//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        InMemoryCredentialStore, OpenAiEmbeddingAdapter, OpenAiQaAdapter, PdfTextExtractor,
        single_attempt_client, PgCredentialStore, RetryPolicy,
    },
    config::{AnswerPolicyKind, Config},
    error::ApiError,
    web::{self, state::AppState, token::TokenService},
};
use async_openai::config::OpenAIConfig;
use docqa_core::{
    AnswerEngine, ChunkIndexer, ChunkingConfig, CredentialStore, JobCatalog, PromptPolicy,
    QaPipeline,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BUNDLED_JOB_TITLES: &str = include_str!("../../resources/job_titles.json");

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Credential Store ---
    let db: Arc<dyn CredentialStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = PgCredentialStore::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; accounts are kept in memory and lost on restart.");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    // --- 3. Initialize Model Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url);
    }
    // The client makes one attempt per call; `RetryPolicy` does the retrying.
    let openai_client = single_attempt_client(openai_config);

    let retry = RetryPolicy::new(
        config.model_max_retries,
        Duration::from_secs(config.model_timeout_secs),
    );
    let embedder = Arc::new(OpenAiEmbeddingAdapter::new(
        openai_client.clone(),
        config.embedding_model.clone(),
        retry,
    ));
    let generator = Arc::new(OpenAiQaAdapter::new(
        openai_client,
        config.qa_model.clone(),
        retry,
    ));

    // --- 4. Assemble the Q&A Pipeline ---
    let chunking = ChunkingConfig::new(config.chunk_size, config.chunk_overlap)?;
    let indexer = ChunkIndexer::new(embedder, chunking);
    let policy = build_policy(&config)?;
    info!(
        "Answer policy: {:?}, chunk size {}, overlap {}, top-k {}.",
        config.answer_policy, config.chunk_size, config.chunk_overlap, config.top_k
    );
    let engine = AnswerEngine::new(indexer.clone(), generator, policy, config.top_k);
    let pipeline = Arc::new(QaPipeline::new(
        Arc::new(PdfTextExtractor::new()),
        indexer,
        engine,
    ));

    // --- 5. Build the Shared AppState ---
    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        chrono::Duration::minutes(config.token_expiry_minutes),
    ));
    let app_state = Arc::new(AppState {
        db,
        config: config.clone(),
        tokens,
        pipeline,
    });

    // --- 6. Create the Web Router ---
    let app = web::router(app_state);

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_policy(config: &Config) -> Result<PromptPolicy, ApiError> {
    match config.answer_policy {
        AnswerPolicyKind::Open => Ok(PromptPolicy::OpenEnded),
        AnswerPolicyKind::JobTitle => {
            let catalog = match &config.job_titles_path {
                Some(path) => {
                    info!("Loading job titles from {}", path.display());
                    JobCatalog::from_json(&std::fs::read_to_string(path)?)?
                }
                None => JobCatalog::from_json(BUNDLED_JOB_TITLES)?,
            };
            if catalog.is_empty() {
                return Err(ApiError::Internal(
                    "The job title catalog must not be empty".to_string(),
                ));
            }
            Ok(PromptPolicy::JobTitle {
                catalog,
                clean_output: config.clean_output,
            })
        }
    }
}
