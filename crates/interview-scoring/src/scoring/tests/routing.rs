use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::common::*;
use crate::scoring::service::safe_default_score;
use crate::scoring::ScoringEngine;

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn predict_returns_bounded_score() {
    let app = router_for(fallback_engine());

    let response = app
        .oneshot(post_json(
            "/predict",
            json!({ "interview_data": STRONG_ANSWER, "role": "Backend Engineer", "level": "Senior" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let score = body["ml_score"].as_f64().expect("score");
    assert!((5.0..=95.0).contains(&score), "{score}");
    assert!(body.get("fallback").is_none());
}

#[tokio::test]
async fn predict_defaults_role_and_level() {
    let app = router_for(ScoringEngine::without_artifact());

    let response = app
        .oneshot(post_json("/predict", json!({ "interview_data": WEAK_ANSWER })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert!(body["ml_score"].as_f64().expect("score") <= 15.0);
}

#[tokio::test]
async fn predict_scores_with_rules_when_predictor_panics() {
    let payload = json!({ "interview_data": STRONG_ANSWER });

    let panicking = router_for(engine_with(PanickingPredictor))
        .oneshot(post_json("/predict", payload.clone()))
        .await
        .expect("response");
    let rules_only = router_for(fallback_engine())
        .oneshot(post_json("/predict", payload))
        .await
        .expect("response");

    assert_eq!(panicking.status(), StatusCode::OK);
    let panicking = read_json_body(panicking).await;
    let rules_only = read_json_body(rules_only).await;
    assert_eq!(panicking["ml_score"], rules_only["ml_score"]);
    assert!(panicking.get("fallback").is_none());
}

#[tokio::test]
async fn detailed_scoring_survives_predictor_panics() {
    let app = router_for(engine_with(PanickingPredictor));

    let response = app
        .oneshot(post_json("/api/v1/score", json!({ "text": STRONG_ANSWER })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["method"], json!("heuristic"));
    assert_eq!(body["model_score"], json!(null));
}

#[test]
fn safe_default_stays_in_bounded_band() {
    for seed in 0..200 {
        let score = safe_default_score(&mut StdRng::seed_from_u64(seed));
        assert!((40.0..=60.0).contains(&score), "{score}");
        assert_eq!(score, (score * 100.0).round() / 100.0);
    }
}

#[tokio::test]
async fn detailed_scoring_requires_an_artifact() {
    let app = router_for(ScoringEngine::without_artifact());

    let response = app
        .oneshot(post_json("/api/v1/score", json!({ "text": STRONG_ANSWER })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("model not available"));
}

#[tokio::test]
async fn detailed_scoring_rejects_missing_transcript() {
    let app = router_for(fallback_engine());

    let response = app
        .oneshot(post_json("/api/v1/score", json!({ "role": "Data Scientist" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn detailed_scoring_rejects_out_of_range_external_score() {
    let app = router_for(fallback_engine());

    let response = app
        .oneshot(post_json(
            "/api/v1/score",
            json!({ "text": STRONG_ANSWER, "external_score": 140.0 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn detailed_scoring_reports_categories_and_agreement() {
    let app = router_for(engine_with(FixedPredictor(62.0)));

    let response = app
        .oneshot(post_json(
            "/api/v1/score",
            json!({
                "messages": [
                    { "role": "assistant", "content": "Walk me through a system you designed." },
                    { "role": "user", "content": STRONG_ANSWER }
                ],
                "role": "Backend Engineer",
                "level": "Senior",
                "external_score": 0.0
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;

    let categories = body["category_scores"].as_object().expect("categories");
    assert_eq!(categories.len(), 5);
    for name in [
        "Communication Skills",
        "Technical Knowledge",
        "Problem Solving",
        "Cultural Fit",
        "Confidence & Clarity",
    ] {
        let entry = &categories[name];
        let score = entry["model_score"].as_f64().expect("category score");
        assert!((0.0..=100.0).contains(&score));
        assert!(entry["variance"].as_f64().expect("variance") >= 0.0);
    }

    assert_eq!(body["method"], json!("model"));
    assert_eq!(body["model_score"], json!(62.0));
    assert_eq!(body["ml_insights"]["model_loaded"], json!(true));
    assert_eq!(body["ml_insights"]["scoring_method"], json!("Trained ML Model"));
    assert_eq!(body["agreement"]["level"], json!("DIVERGENT"));
    assert_eq!(body["agreement"]["label"], json!("Divergent Scores"));
}

#[tokio::test]
async fn detailed_scoring_without_external_score_is_model_only() {
    let app = router_for(fallback_engine());

    let response = app
        .oneshot(post_json("/api/v1/score", json!({ "text": STRONG_ANSWER })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["method"], json!("heuristic"));
    assert_eq!(body["agreement"]["level"], json!("ML_ONLY"));
    assert_eq!(body["ml_insights"]["model_loaded"], json!(false));
}

#[tokio::test]
async fn model_info_describes_the_artifact() {
    let app = router_for(fallback_engine());

    let response = app.oneshot(get("/model-info")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["performance_metrics"]["r2_score"], json!(0.82));
    assert_eq!(body["scoring_range"], json!("0-100"));
    assert_eq!(
        body["feature_columns"].as_array().expect("columns").len(),
        9
    );
}

#[tokio::test]
async fn model_info_requires_an_artifact() {
    let app = router_for(ScoringEngine::without_artifact());

    let response = app.oneshot(get("/model-info")).await.expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn status_reports_model_state() {
    let app = router_for(engine_with(FixedPredictor(50.0)));

    let response = app.oneshot(get("/")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["model_loaded"], json!(true));
}
