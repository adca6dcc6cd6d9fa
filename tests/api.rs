mod common;

use std::sync::Arc;

use audio_worker::{
    build_router, AppState, CommandBackend, JobDispatcher, ProcessingEngine,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{fixture_engine, write_tone};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

fn fixture_app(tmp: &TempDir) -> Router {
    let engine = fixture_engine(&tmp.path().join("processed"));
    build_router(AppState::new(JobDispatcher::new(Arc::new(engine))))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_online_and_backend() {
    let tmp = tempdir().unwrap();
    let app = fixture_app(&tmp);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let v: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["status"], "online");
    assert_eq!(v["separationBackend"], "fixture");
    assert_eq!(v["simulated"], true);
}

#[tokio::test]
async fn trim_over_http_returns_output_path() {
    let tmp = tempdir().unwrap();
    let song = tmp.path().join("song.mp3");
    write_tone(&song, 12.0, 1);

    let (status, v) = post_json(
        fixture_app(&tmp),
        "/process",
        json!({
            "sourcePath": song,
            "taskKind": "trim",
            "parameters": { "start": 1, "end": 3 }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "completed");
    let out = tmp.path().join("processed").join("trimmed_song.mp3");
    assert_eq!(v["result"]["outputPath"], json!(out));
}

#[tokio::test]
async fn separate_over_http_with_legacy_fields() {
    let tmp = tempdir().unwrap();
    let song = tmp.path().join("song.wav");
    write_tone(&song, 0.5, 2);

    let (status, v) = post_json(
        fixture_app(&tmp),
        "/process",
        json!({ "file_path": song, "task_type": "separate" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let stems = v["result"]["stems"].as_object().unwrap();
    assert_eq!(stems.len(), 4);
    for key in ["vocals", "drums", "bass", "other"] {
        assert!(stems.contains_key(key), "missing {key}");
    }
}

#[tokio::test]
async fn missing_source_maps_to_404() {
    let tmp = tempdir().unwrap();
    let (status, v) = post_json(
        fixture_app(&tmp),
        "/process",
        json!({ "sourcePath": "/definitely/not/here.wav", "taskKind": "trim" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"]["kind"], "not_found");
}

#[tokio::test]
async fn unknown_task_maps_to_400() {
    let tmp = tempdir().unwrap();
    let song = tmp.path().join("song.wav");
    write_tone(&song, 0.5, 1);

    let (status, v) = post_json(
        fixture_app(&tmp),
        "/process",
        json!({ "sourcePath": song, "taskKind": "master" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["status"], "rejected");
    assert_eq!(v["error"]["kind"], "invalid_request");
}

#[tokio::test]
async fn undecodable_source_maps_to_500() {
    let tmp = tempdir().unwrap();
    let bogus = tmp.path().join("bogus.wav");
    std::fs::write(&bogus, b"xx").unwrap();

    let (status, v) = post_json(
        fixture_app(&tmp),
        "/process",
        json!({ "sourcePath": bogus, "taskKind": "trim" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["status"], "failed");
    assert_eq!(v["error"]["kind"], "decode_error");
}

#[tokio::test]
async fn malformed_body_gets_rejected_envelope() {
    let tmp = tempdir().unwrap();
    let song = tmp.path().join("song.wav");
    write_tone(&song, 0.5, 1);

    for body in [
        json!({ "sourcePath": song, "taskKind": "trim", "parameters": 5 }),
        json!({ "sourcePath": song }),
    ] {
        let (status, v) = post_json(fixture_app(&tmp), "/process", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["status"], "rejected");
        assert_eq!(v["error"]["kind"], "invalid_request");
    }
}

#[tokio::test]
async fn malformed_body_with_missing_source_maps_to_404() {
    let tmp = tempdir().unwrap();
    let (status, v) = post_json(
        fixture_app(&tmp),
        "/process",
        json!({ "sourcePath": "/definitely/not/here.wav", "parameters": [1] }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["status"], "rejected");
    assert_eq!(v["error"]["kind"], "not_found");
}

#[tokio::test]
async fn non_json_body_maps_to_400() {
    let tmp = tempdir().unwrap();
    let response = fixture_app(&tmp)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let v: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["error"]["kind"], "invalid_request");
}

#[tokio::test]
async fn unavailable_separator_maps_to_503() {
    let tmp = tempdir().unwrap();
    let song = tmp.path().join("song.wav");
    write_tone(&song, 0.5, 1);
    let backend = CommandBackend::new("audio-worker-missing-tool", vec![]);
    let engine = ProcessingEngine::new(tmp.path().join("processed"), Arc::new(backend)).unwrap();
    let app = build_router(AppState::new(JobDispatcher::new(Arc::new(engine))));

    let (status, v) = post_json(
        app,
        "/process",
        json!({ "sourcePath": song, "taskKind": "separate" }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(v["error"]["kind"], "separation_unavailable");
}
