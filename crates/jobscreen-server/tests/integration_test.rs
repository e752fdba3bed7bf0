//! Integration tests for the JobScreen HTTP surface

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use candle_core::{DType, Device, Tensor};
use jobscreen_classifiers::{ArtifactConfig, LstmDims, SequenceClassifier, Vocabulary};
use jobscreen_core::{Error, Result};
use jobscreen_policy::{InferenceService, ServiceSettings};
use jobscreen_server::{create_router, AppState, ServerConfig};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

struct StubClassifier {
    score: Option<f32>,
    calls: AtomicU32,
}

impl StubClassifier {
    fn scoring(score: f32) -> Arc<Self> {
        Arc::new(Self {
            score: Some(score),
            calls: AtomicU32::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            score: None,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl SequenceClassifier for StubClassifier {
    async fn score(&self, _ids: &[u32]) -> Result<f32> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.score
            .ok_or_else(|| Error::classifier("forward pass produced NaN"))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn metrics_handle() -> PrometheusHandle {
    // Not installed globally so every test can own one
    PrometheusBuilder::new().build_recorder().handle()
}

fn router_with(classifier: Arc<StubClassifier>, max_body_bytes: usize) -> Router {
    let vocabulary = Vocabulary::from_ranked_words(
        ["data", "entry", "clerk", "work", "from", "home"],
        Some("<OOV>"),
    )
    .unwrap();
    let service =
        InferenceService::new(Arc::new(vocabulary), classifier, ServiceSettings::default())
            .unwrap();

    create_router(AppState::new(
        Arc::new(service),
        metrics_handle(),
        max_body_bytes,
    ))
}

fn predict_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn scam_posting() -> Value {
    json!({
        "title": "Data Entry Clerk - Work From Home",
        "description": "Earn $500 weekly from home. No experience required."
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_index_endpoint() {
    let app = router_with(StubClassifier::scoring(0.5), 65536);
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send_json(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Fake Job Detection API is running");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = router_with(StubClassifier::scoring(0.5), 65536);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = router_with(StubClassifier::scoring(0.5), 65536);
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_predict_fake() {
    let classifier = StubClassifier::scoring(0.8);
    let app = router_with(classifier.clone(), 65536);

    let (status, body) = send_json(app, predict_request(scam_posting().to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction_label"], "FAKE");
    assert_eq!(body["fake_probability"], 0.8);
    assert!(body["decision_reason"]
        .as_str()
        .unwrap()
        .contains("scam patterns"));
    assert_eq!(body["thresholds_used"]["suspicious"], 0.15);
    assert_eq!(body["thresholds_used"]["fake"], 0.5);
    assert_eq!(classifier.calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_predict_likely_real() {
    let app = router_with(StubClassifier::scoring(0.1), 65536);

    let (status, body) = send_json(app, predict_request(scam_posting().to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction_label"], "LIKELY_REAL");
}

#[tokio::test]
async fn test_predict_insufficient_data() {
    let classifier = StubClassifier::scoring(0.9);
    let app = router_with(classifier.clone(), 65536);

    let (status, body) = send_json(app, predict_request(r#"{"title": "Clerk"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "insufficient_data");
    assert_eq!(
        body["message"],
        "Please provide proper job title and description for analysis."
    );
    assert_eq!(classifier.calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn test_predict_empty_object_is_insufficient() {
    let app = router_with(StubClassifier::scoring(0.9), 65536);

    let (status, body) = send_json(app, predict_request("{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "insufficient_data");
}

#[tokio::test]
async fn test_predict_malformed_json() {
    let app = router_with(StubClassifier::scoring(0.5), 65536);

    let (status, body) = send_json(app, predict_request("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_predict_wrong_field_type() {
    let app = router_with(StubClassifier::scoring(0.5), 65536);

    let (status, _) = send_json(app, predict_request(r#"{"title": 42}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_classifier_failure() {
    let app = router_with(StubClassifier::failing(), 65536);

    let (status, body) = send_json(app, predict_request(scam_posting().to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "inference_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("NaN"));
}

#[tokio::test]
async fn test_predict_nan_score_is_server_error() {
    let app = router_with(StubClassifier::scoring(f32::NAN), 65536);

    let (status, body) = send_json(app, predict_request(scam_posting().to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "inference_error");
}

#[tokio::test]
async fn test_body_limit() {
    let app = router_with(StubClassifier::scoring(0.5), 128);
    let payload = json!({ "description": "x".repeat(1024) }).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = router_with(StubClassifier::scoring(0.5), 65536);
    let request = Request::builder().uri("/v1/unknown").body(Body::empty()).unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

const DIMS: LstmDims = LstmDims {
    vocab_size: 16,
    embed_dim: 4,
    hidden1: 3,
    hidden2: 2,
};

const TOKENIZER_JSON: &str = r#"{
    "class_name": "Tokenizer",
    "config": {
        "num_words": 16,
        "lower": true,
        "split": " ",
        "char_level": false,
        "oov_token": "<OOV>",
        "word_index": "{\"<OOV>\": 1, \"data\": 2, \"entry\": 3, \"clerk\": 4, \"work\": 5, \"from\": 6, \"home\": 7}"
    }
}"#;

/// Zero recurrent weights leave the final state at zero, so the output is
/// `sigmoid(classifier_bias)`
fn write_artifacts(dir: &Path, classifier_bias: f32) -> ArtifactConfig {
    let dev = Device::Cpu;
    let zeros = |shape: &[usize]| Tensor::zeros(shape, DType::F32, &dev).unwrap();

    let mut tensors: HashMap<String, Tensor> = HashMap::new();
    tensors.insert(
        "embedding.weight".to_string(),
        Tensor::randn(0f32, 1f32, (DIMS.vocab_size, DIMS.embed_dim), &dev).unwrap(),
    );
    for (prefix, input, hidden) in [
        ("lstm1", DIMS.embed_dim, DIMS.hidden1),
        ("lstm2", DIMS.hidden1, DIMS.hidden2),
    ] {
        tensors.insert(format!("{prefix}.weight_ih_l0"), zeros(&[4 * hidden, input]));
        tensors.insert(format!("{prefix}.weight_hh_l0"), zeros(&[4 * hidden, hidden]));
        tensors.insert(format!("{prefix}.bias_ih_l0"), zeros(&[4 * hidden]));
        tensors.insert(format!("{prefix}.bias_hh_l0"), zeros(&[4 * hidden]));
    }
    tensors.insert("classifier.weight".to_string(), zeros(&[1, DIMS.hidden2]));
    tensors.insert(
        "classifier.bias".to_string(),
        Tensor::new(&[classifier_bias], &dev).unwrap(),
    );

    let model_path = dir.join("model.safetensors");
    let vocab_path = dir.join("tokenizer.json");
    candle_core::safetensors::save(&tensors, &model_path).unwrap();
    std::fs::write(&vocab_path, TOKENIZER_JSON).unwrap();

    ArtifactConfig::local(model_path, vocab_path).with_dims(DIMS)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_stack_with_real_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        artifacts: write_artifacts(dir.path(), 2.0),
        ..Default::default()
    };

    let state = AppState::from_config(&config, metrics_handle()).await.unwrap();
    let app = create_router(state);

    let (status, body) = send_json(app, predict_request(scam_posting().to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction_label"], "FAKE");
    // sigmoid(2.0) = 0.880797...
    assert_eq!(body["fake_probability"], 0.8808);
}

#[tokio::test]
async fn test_missing_artifacts_fail_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        artifacts: ArtifactConfig::local(
            dir.path().join("missing.safetensors"),
            dir.path().join("missing.json"),
        ),
        ..Default::default()
    };

    assert!(AppState::from_config(&config, metrics_handle()).await.is_err());
}
