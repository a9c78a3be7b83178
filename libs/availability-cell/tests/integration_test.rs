use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use availability_cell::router::availability_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

async fn create_test_app(config: AppConfig) -> Router {
    availability_routes(Arc::new(config))
}

fn set_request(token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_set_availability_success() {
    let mock_server = MockServer::start().await;

    let doctor = TestUser::doctor("doctor@example.com");
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/replace_doctor_availability"))
        .and(body_partial_json(json!({"p_doctor_id": doctor.id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_window_response(
                &Uuid::new_v4().to_string(),
                &doctor.id.to_string(),
                "monday",
                "09:00:00",
                "17:00:00",
            )
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config.clone()).await;
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(24));

    let response = app
        .oneshot(set_request(
            &token,
            json!([{"day_of_week": "monday", "start_time": "09:00", "end_time": "05:00:00 PM"}]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["success"], json!(true));
    assert_eq!(parsed["availability"][0]["day_of_week"], json!("monday"));
}

#[tokio::test]
async fn test_set_availability_empty_list_clears_schedule() {
    let mock_server = MockServer::start().await;

    let doctor = TestUser::doctor("doctor@example.com");
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/replace_doctor_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config.clone()).await;
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(24));

    let response = app.oneshot(set_request(&token, json!([]))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["availability"], json!([]));
}

#[tokio::test]
async fn test_set_availability_rejects_inverted_window() {
    let mock_server = MockServer::start().await;

    let doctor = TestUser::doctor("doctor@example.com");
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    let app = create_test_app(config.clone()).await;
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(24));

    let response = app
        .oneshot(set_request(
            &token,
            json!([{"day_of_week": "monday", "start_time": "17:00:00", "end_time": "09:00:00"}]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_availability_rejects_unparseable_time() {
    let doctor = TestUser::doctor("doctor@example.com");
    let config = TestConfig::default().to_app_config();

    let app = create_test_app(config.clone()).await;
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(24));

    let response = app
        .oneshot(set_request(
            &token,
            json!([{"day_of_week": "monday", "start_time": "nine-ish", "end_time": "17:00:00"}]),
        ))
        .await
        .unwrap();

    // Deserialization of the window fails before any handler logic runs.
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_set_availability_rejects_patient() {
    let patient = TestUser::patient("patient@example.com");
    let config = TestConfig::default().to_app_config();

    let app = create_test_app(config.clone()).await;
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(24));

    let response = app
        .oneshot(set_request(
            &token,
            json!([{"day_of_week": "monday", "start_time": "09:00:00", "end_time": "17:00:00"}]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_availability_success() {
    let mock_server = MockServer::start().await;

    let doctor = TestUser::doctor("doctor@example.com");
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_window_response(
                &Uuid::new_v4().to_string(),
                &doctor.id.to_string(),
                "monday",
                "09:00:00",
                "17:00:00",
            ),
            MockSupabaseResponses::availability_window_response(
                &Uuid::new_v4().to_string(),
                &doctor.id.to_string(),
                "wednesday",
                "10:00:00",
                "14:00:00",
            ),
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config.clone()).await;
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(24));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rejects_invalid_signature_token() {
    let doctor = TestUser::doctor("doctor@example.com");
    let config = TestConfig::default().to_app_config();

    let app = create_test_app(config).await;
    let token = JwtTestUtils::create_invalid_signature_token(&doctor);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejects_malformed_token() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .header("Authorization", format!("Bearer {}", JwtTestUtils::create_malformed_token()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
