//! Integration tests for the classification REST surface.
//!
//! Each test spins up a fake inference server and the real triage router
//! on random ports, then drives `/classify` over HTTP with reqwest.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use inbox_triage::api::triage_routes;
use inbox_triage::config::{InferenceConfig, ServiceConfig};
use inbox_triage::inference::{HfInferenceClient, InferenceBackend};
use inbox_triage::pipeline::ClassificationPipeline;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

const IMPORTANT_TEMPLATE: &str =
    "Agradeço seu email. Analisarei sua solicitação e retornarei em breve com uma solução.";
const NOT_IMPORTANT_TEMPLATE: &str =
    "Obrigado pelo seu email! Agradeço o contato e fico feliz em ajudar.";

/// How the fake inference server behaves.
#[derive(Clone, Copy)]
enum Remote {
    /// Classifier says "negative", generator answers after the marker.
    Healthy,
    /// Every endpoint answers 500.
    Failing,
    /// Every endpoint answers 200 with a body of the wrong shape.
    Malformed,
}

#[derive(Clone)]
struct FakeState {
    mode: Remote,
    classify_calls: Arc<AtomicUsize>,
}

async fn fake_classify(State(state): State<FakeState>) -> impl IntoResponse {
    state.classify_calls.fetch_add(1, Ordering::SeqCst);
    match state.mode {
        Remote::Healthy => (
            StatusCode::OK,
            Json(json!([[
                {"label": "negative", "score": 0.81},
                {"label": "neutral", "score": 0.12},
                {"label": "positive", "score": 0.07}
            ]])),
        ),
        Remote::Failing => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "model crashed"})),
        ),
        Remote::Malformed => (StatusCode::OK, Json(json!({"unexpected": true}))),
    }
}

async fn fake_generate(State(state): State<FakeState>) -> impl IntoResponse {
    match state.mode {
        Remote::Healthy => (
            StatusCode::OK,
            Json(json!([{
                "generated_text": "Responda: '...'. Resposta: Já estamos investigando o incidente."
            }])),
        ),
        Remote::Failing => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "model loading"})),
        ),
        Remote::Malformed => (StatusCode::OK, Json(json!([{"text": "missing field"}]))),
    }
}

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Start the fake inference server, return (base url, classify call counter).
async fn start_fake_remote(mode: Remote) -> (String, Arc<AtomicUsize>) {
    let classify_calls = Arc::new(AtomicUsize::new(0));
    let state = FakeState {
        mode,
        classify_calls: Arc::clone(&classify_calls),
    };
    let app = Router::new()
        .route("/classify", post(fake_classify))
        .route("/generate", post(fake_generate))
        .with_state(state);

    let (listener, port) = bind().await;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}"), classify_calls)
}

/// Start the triage server against the given inference base url.
async fn start_server(remote_base: &str) -> u16 {
    let config = ServiceConfig {
        inference: InferenceConfig {
            api_key: None,
            classify_url: format!("{remote_base}/classify"),
            generate_url: format!("{remote_base}/generate"),
            timeout: Duration::from_secs(2),
        },
        ..ServiceConfig::default()
    };
    let backend: Arc<dyn InferenceBackend> = Arc::new(HfInferenceClient::new(
        reqwest::Client::new(),
        &config.inference,
    ));
    let pipeline = ClassificationPipeline::from_config(&config, backend).unwrap();
    let app = triage_routes(Arc::new(pipeline));

    let (listener, port) = bind().await;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the servers a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;
    port
}

async fn classify_json(port: u16, email: &str) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/classify"))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

async fn classify_upload(port: u16, file_name: &str, bytes: Vec<u8>) -> (u16, Value) {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);
    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/classify"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

// ── Status endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn home_and_health_respond() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let home: Value = reqwest::get(format!("http://127.0.0.1:{port}/"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(home["message"], "API de Classificação de Emails Online!");

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "OK");
    })
    .await
    .expect("test timed out");
}

// ── Remote healthy ───────────────────────────────────────────────────

#[tokio::test]
async fn remote_label_and_generated_reply_are_used() {
    timeout(TEST_TIMEOUT, async {
        let (remote, calls) = start_fake_remote(Remote::Healthy).await;
        let port = start_server(&remote).await;

        // The keyword scorer alone would say NotImportant for this text.
        let (status, json) =
            classify_json(port, "obrigado pela ajuda, excelente atendimento").await;
        assert_eq!(status, 200);
        assert_eq!(json["status"], "success");
        assert_eq!(json["category"], "Important");
        assert_eq!(json["response"], "Já estamos investigando o incidente.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn single_word_never_reaches_remote_classifier() {
    timeout(TEST_TIMEOUT, async {
        let (remote, calls) = start_fake_remote(Remote::Healthy).await;
        let port = start_server(&remote).await;

        let (status, json) = classify_json(port, "ok").await;
        assert_eq!(status, 200);
        assert_eq!(json["category"], "Important");
        assert_eq!(json["content_length"], 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    })
    .await
    .expect("test timed out");
}

// ── Remote degraded ──────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_remote_falls_back_to_keywords_and_template() {
    timeout(TEST_TIMEOUT, async {
        // Nothing listens on port 1.
        let port = start_server("http://127.0.0.1:1").await;

        let (status, json) = classify_json(port, "urgente: sistema fora do ar").await;
        assert_eq!(status, 200);
        assert_eq!(json["status"], "success");
        assert_eq!(json["category"], "Important");
        assert_eq!(json["response"], IMPORTANT_TEMPLATE);
        assert_eq!(json["content_length"], 27);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn thank_you_note_with_unreachable_remote() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let (status, json) =
            classify_json(port, "obrigado pela ajuda, excelente atendimento").await;
        assert_eq!(status, 200);
        assert_eq!(json["category"], "NotImportant");
        assert_eq!(json["response"], NOT_IMPORTANT_TEMPLATE);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn server_errors_from_remote_never_fail_the_request() {
    timeout(TEST_TIMEOUT, async {
        let (remote, calls) = start_fake_remote(Remote::Failing).await;
        let port = start_server(&remote).await;

        let (status, json) = classify_json(port, "parabéns pelo bom trabalho").await;
        assert_eq!(status, 200);
        assert_eq!(json["status"], "success");
        assert_eq!(json["category"], "NotImportant");
        assert_eq!(json["response"], NOT_IMPORTANT_TEMPLATE);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_remote_payloads_never_fail_the_request() {
    timeout(TEST_TIMEOUT, async {
        let (remote, _calls) = start_fake_remote(Remote::Malformed).await;
        let port = start_server(&remote).await;

        let (status, json) = classify_json(port, "urgente: sistema fora do ar").await;
        assert_eq!(status, 200);
        assert_eq!(json["category"], "Important");
        assert_eq!(json["response"], IMPORTANT_TEMPLATE);
    })
    .await
    .expect("test timed out");
}

// ── Validation and uploads ───────────────────────────────────────────

#[tokio::test]
async fn whitespace_only_email_is_an_error_without_category() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let (status, json) = classify_json(port, " \n\t ").await;
        assert_eq!(status, 400);
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Nenhum conteúdo fornecido");
        assert!(json.get("category").is_none());
        assert!(json.get("response").is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn txt_upload_is_classified_with_exact_length() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let text = "Olá,\nO relatório está com erro e precisamos corrigir hoje.\n";
        let (status, json) = classify_upload(port, "Chamado.TXT", text.as_bytes().to_vec()).await;
        assert_eq!(status, 200);
        assert_eq!(json["category"], "Important");
        assert_eq!(json["content_length"], text.chars().count());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn csv_upload_is_unsupported() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let (status, json) = classify_upload(port, "emails.csv", b"from,subject\n".to_vec()).await;
        assert_eq!(status, 400);
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Formato não suportado. Use .txt ou .pdf");
        assert!(json.get("category").is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_txt_upload_is_a_validation_error() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let (status, json) = classify_upload(port, "vazio.txt", b"   \n".to_vec()).await;
        assert_eq!(status, 400);
        assert_eq!(json["error"], "Nenhum conteúdo fornecido");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn pdf_upload_is_extracted_and_classified() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let pdf = include_bytes!("fixtures/urgente.pdf").to_vec();
        let (status, json) = classify_upload(port, "mail.pdf", pdf).await;
        assert_eq!(status, 200);
        assert_eq!(json["status"], "success");
        assert_eq!(json["category"], "Important");
        assert_eq!(json["response"], IMPORTANT_TEMPLATE);
        assert_eq!(json["content_length"], "urgente: sistema fora do ar".chars().count());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn corrupt_pdf_upload_is_an_internal_error() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let (status, json) =
            classify_upload(port, "email.pdf", b"definitely not a pdf".to_vec()).await;
        assert_eq!(status, 500);
        assert_eq!(json["status"], "error");
        assert!(!json["error"].as_str().unwrap().is_empty());
        assert!(json.get("category").is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn multipart_email_field_is_accepted() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let form = reqwest::multipart::Form::new().text("email", "feliz natal a todos da equipe");
        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/classify"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["category"], "NotImportant");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn form_body_is_accepted() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/classify"))
            .form(&[("email", "o sistema não funciona desde ontem")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["category"], "Important");
        assert_eq!(json["content_length"], 34);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    timeout(TEST_TIMEOUT, async {
        let port = start_server("http://127.0.0.1:1").await;

        let resp = reqwest::Client::new()
            .request(
                reqwest::Method::OPTIONS,
                format!("http://127.0.0.1:{port}/classify"),
            )
            .header("Origin", "http://localhost:8080")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["access-control-allow-origin"].to_str().unwrap(),
            "*"
        );
        let methods = resp.headers()["access-control-allow-methods"]
            .to_str()
            .unwrap()
            .to_string();
        assert!(methods.contains("POST"));
        assert!(methods.contains("OPTIONS"));
    })
    .await
    .expect("test timed out");
}
