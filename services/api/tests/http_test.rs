//! End-to-end tests for the HTTP gateway, driven through the router with
//! in-process fakes for the models and the PDF extractor.

use api_lib::adapters::InMemoryCredentialStore;
use api_lib::config::Config;
use api_lib::web::{self, state::AppState, token::TokenService};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docqa_core::ports::{EmbeddingService, GenerationService, PortResult, TextExtractionService};
use docqa_core::{
    AnswerEngine, ChunkIndexer, ChunkingConfig, JobCatalog, PromptPolicy, QaPipeline,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "docqa-test-boundary";

struct LetterCountEmbedder;

#[async_trait]
impl EmbeddingService for LetterCountEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> PortResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0f32; 27];
                for c in t.to_lowercase().chars() {
                    match c {
                        'a'..='z' => v[(c as u8 - b'a') as usize] += 1.0,
                        _ => v[26] += 0.1,
                    }
                }
                v[26] += 0.01;
                v
            })
            .collect())
    }
}

struct CannedGenerator(&'static str);

#[async_trait]
impl GenerationService for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> PortResult<String> {
        Ok(self.0.to_string())
    }
}

/// Treats the uploaded bytes as UTF-8 text.
struct Utf8Extractor;

#[async_trait]
impl TextExtractionService for Utf8Extractor {
    async fn extract_text(&self, file_bytes: &[u8]) -> String {
        String::from_utf8_lossy(file_bytes).into_owned()
    }
}

fn test_app(policy: PromptPolicy, reply: &'static str) -> Router {
    let config = Config::from_lookup(|key: &str| match key {
        "JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    })
    .unwrap();

    let indexer = ChunkIndexer::new(
        Arc::new(LetterCountEmbedder),
        ChunkingConfig::new(200, 20).unwrap(),
    );
    let engine = AnswerEngine::new(indexer.clone(), Arc::new(CannedGenerator(reply)), policy, 3);
    let pipeline = QaPipeline::new(Arc::new(Utf8Extractor), indexer, engine);

    let state = AppState {
        db: Arc::new(InMemoryCredentialStore::new()),
        tokens: Arc::new(TokenService::new(
            &config.jwt_secret,
            chrono::Duration::minutes(config.token_expiry_minutes),
        )),
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
    };
    web::router(Arc::new(state))
}

fn job_title_policy() -> PromptPolicy {
    let catalog =
        JobCatalog::from_json(include_str!("../resources/job_titles.json")).unwrap();
    PromptPolicy::JobTitle {
        catalog,
        clean_output: true,
    }
}

fn json_request(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn upload_request(file_name: &str, contents: &str, token: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/pdf\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        c = contents
    );
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn signup_and_login(app: &Router, email: &str, password: &str) -> String {
    let credentials = json!({ "email": email, "password": password });
    let (status, body) = send(app, json_request("/signup", credentials.clone(), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User created");

    let (status, body) = send(app, json_request("/login", credentials, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_signup_login_issues_token_for_user() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    let token = signup_and_login(&app, "ada@example.com", "pa55word").await;

    let tokens = TokenService::new("integration-secret", chrono::Duration::minutes(60));
    assert_eq!(tokens.validate(&token).as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_duplicate_signup_and_bad_login() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    signup_and_login(&app, "ada@example.com", "pa55word").await;

    let again = json!({ "email": "ada@example.com", "password": "other" });
    let (status, body) = send(&app, json_request("/signup", again, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    let wrong = json!({ "email": "ada@example.com", "password": "nope" });
    let (status, body) = send(&app, json_request("/login", wrong, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid credentials");

    let unknown = json!({ "email": "bob@example.com", "password": "pa55word" });
    let (status, _) = send(&app, json_request("/login", unknown, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_reject_bad_tokens() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    let question = json!({ "query": "anything" });

    let (status, _) = send(&app, json_request("/ask", question.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, json_request("/ask", question.clone(), Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let basic = Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Basic YWRhOnBhc3M=")
        .body(Body::from(question.to_string()))
        .unwrap();
    let response = app.clone().oneshot(basic).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

/// A valid `/upload` or `/ask` request carrying an arbitrary `Authorization` header.
fn with_authorization(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let (content_type, body) = if uri == "/upload" {
        (
            format!("multipart/form-data; boundary={}", BOUNDARY),
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\n\r\nSkills: SQL\r\n--{b}--\r\n",
                b = BOUNDARY
            ),
        )
    } else {
        (
            "application/json".to_string(),
            json!({ "query": "anything" }).to_string(),
        )
    };

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_malformed_bearer_headers_on_every_protected_route() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    // a real account, so only the header shape is at fault
    let token = signup_and_login(&app, "ada@example.com", "pa55word").await;
    let wrong_scheme = format!("Token {}", token);

    for uri in ["/upload", "/ask"] {
        for authorization in [
            None,
            Some("Bearer "),
            Some("Bearer"),
            Some("Basic YWRhOnBhc3M="),
            Some(token.as_str()),
            Some(wrong_scheme.as_str()),
            Some("Bearer not-a-jwt"),
        ] {
            let response = app
                .clone()
                .oneshot(with_authorization(uri, authorization))
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{} accepted {:?}",
                uri,
                authorization
            );
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
        }
    }

    // the same requests go through with a well-formed header
    let bearer = format!("Bearer {}", token);
    for uri in ["/upload", "/ask"] {
        let (status, _) = send(&app, with_authorization(uri, Some(&bearer))).await;
        assert_eq!(status, StatusCode::OK, "{} rejected a valid token", uri);
    }
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    let tokens = TokenService::new("integration-secret", chrono::Duration::minutes(60));
    let ghost = tokens.issue("ghost@example.com").unwrap();

    let (status, _) = send(&app, json_request("/ask", json!({ "query": "hi" }), Some(&ghost))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ask_before_upload_and_blank_question() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    let token = signup_and_login(&app, "ada@example.com", "pa55word").await;

    let (status, body) = send(&app, json_request("/ask", json!({ "query": "Who am I?" }), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Please upload a PDF first." }));

    let (status, _) = send(&app, json_request("/ask", json!({ "query": "   " }), Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_then_classify_resume() {
    let app = test_app(
        job_title_policy(),
        "Based on the resume, the best fit is Data Analyst.\nThis is because of SQL.",
    );
    let token = signup_and_login(&app, "ada@example.com", "pa55word").await;

    let resume = "Skills: Python, SQL, Tableau, Excel. Built weekly reporting dashboards.";
    let (status, body) = send(&app, upload_request("resume.pdf", resume, &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "PDF processed successfully");

    let question = json!({ "query": "What job role is suitable for me?" });
    let (status, body) = send(&app, json_request("/ask", question, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "Data Analyst" }));
}

#[tokio::test]
async fn test_empty_document_has_no_content() {
    let app = test_app(PromptPolicy::OpenEnded, "should not be used");
    let token = signup_and_login(&app, "ada@example.com", "pa55word").await;

    let (status, _) = send(&app, upload_request("blank.pdf", "", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, json_request("/ask", json!({ "query": "Summary?" }), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "No content available in the uploaded document.");
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = test_app(PromptPolicy::OpenEnded, "unused");
    let token = signup_and_login(&app, "ada@example.com", "pa55word").await;

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
