use api::{create_router, load_engine, run_server, AppState, ServiceConfig};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use feature_engine::FeatureContract;
use inference_engine::{InferenceEngine, ModelArtifact, ModelSpec};
use serde_json::{json, Value};
use std::sync::Arc;
use storage::{read_log, InferenceLogger};
use tower::ServiceExt; // for `oneshot`

fn artifact(weights: Vec<f64>) -> ModelArtifact {
    ModelArtifact {
        contract: FeatureContract::build(&series_store::all_channels()).unwrap(),
        decision_threshold: 0.5,
        model: ModelSpec::Logistic {
            weights,
            intercept: -1.0,
        },
    }
}

fn engine() -> Arc<InferenceEngine> {
    let mut weights = vec![0.0; 42];
    weights[20] = 0.5;
    Arc::new(InferenceEngine::from_artifact(artifact(weights), "memory").unwrap())
}

fn app() -> Router {
    create_router(Arc::new(AppState::new(engine())))
}

async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["feature_count"], 42);
    assert_eq!(body["contract_version"], 1);
    assert_eq!(body["model_kind"], "logistic");
}

#[tokio::test]
async fn test_predict_zero_vector() {
    let (status, body) = post_json(app(), json!({ "features": vec![0.0; 42] }).to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let probability = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(body["will_fail_soon"], 0);
}

#[tokio::test]
async fn test_predict_high_risk() {
    let mut features = vec![0.0; 42];
    features[20] = 10.0;
    let (status, body) = post_json(app(), json!({ "features": features }).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["will_fail_soon"], 1);
}

#[tokio::test]
async fn test_predict_wrong_length() {
    let (status, body) = post_json(app(), json!({ "features": vec![0.0; 41] }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Expected 42 features, but received 41");
}

#[tokio::test]
async fn test_predict_malformed_json() {
    let (status, body) = post_json(app(), "{\"features\": [1.0, ".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, _) = post_json(app(), json!({ "values": [1.0] }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predictions_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs/inference_logs.jsonl");
    let logger = Arc::new(InferenceLogger::open(&path).unwrap());
    let app = create_router(Arc::new(AppState::new(engine()).with_logger(logger.clone())));

    post_json(app.clone(), json!({ "features": vec![1.0; 42] }).to_string()).await;
    post_json(app.clone(), json!({ "features": vec![1.0; 3] }).to_string()).await;
    post_json(app, json!({ "features": vec![2.0; 42] }).to_string()).await;

    // Rejected requests are not logged
    let records = read_log(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(logger.records_written(), 2);
    assert_eq!(records[1].features, vec![2.0; 42]);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_model_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        model_path: dir.path().join("absent.json"),
        inference_log_path: None,
        port: 0,
        ..ServiceConfig::default()
    };
    let err = run_server(&config).await.unwrap_err();
    assert!(err.to_string().contains("Model unavailable"));
}

#[tokio::test]
async fn test_predict_unscorable_values() {
    let mut weights = vec![0.0; 42];
    weights[0] = 10.0;
    weights[1] = 10.0;
    let engine = InferenceEngine::from_artifact(artifact(weights), "memory").unwrap();
    let app = create_router(Arc::new(AppState::new(Arc::new(engine))));

    let mut features = vec![0.0; 42];
    features[0] = 1e308;
    features[1] = -1e308;
    let (status, body) = post_json(app, json!({ "features": features }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("too large"));
}

#[test]
fn test_model_checked_against_configured_contract() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.json");
    artifact(vec![0.0; 42]).save(&model_path).unwrap();

    let matching = dir.path().join("contract.json");
    FeatureContract::build(&series_store::all_channels())
        .unwrap()
        .save(&matching)
        .unwrap();
    let foreign = dir.path().join("foreign.json");
    FeatureContract::build(&["sensor_2", "sensor_3"]).unwrap().save(&foreign).unwrap();

    let mut config = ServiceConfig {
        model_path,
        contract_path: Some(matching),
        inference_log_path: None,
        ..ServiceConfig::default()
    };
    assert_eq!(load_engine(&config).unwrap().contract().len(), 42);

    config.contract_path = Some(foreign);
    let err = load_engine(&config).unwrap_err();
    assert!(err.to_string().contains("expected 4 features"));

    config.contract_path = Some(dir.path().join("absent.json"));
    assert!(load_engine(&config).is_err());
}
