use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::Service;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, RouterOptions, ServerState, StaticUploads};
use service::errors::ServiceError;
use service::image::{local::LocalDiskHost, ImageHost};
use service::item::{domain::IngestPolicy, repository::memory::MemoryItemStore, ItemService};

const BOUNDARY: &str = "itemhub-test-boundary";

struct FailingHost;

#[async_trait]
impl ImageHost for FailingHost {
    fn backend(&self) -> &'static str { "failing" }

    async fn upload(&self, _bytes: Vec<u8>, _storage_name: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Upstream("image host returned 502 Bad Gateway: api key=hunter2".into()))
    }
}

fn build_app_with(images: Arc<dyn ImageHost>, uploads: Option<StaticUploads>, policy: IngestPolicy) -> Router {
    let items = ItemService::new(Arc::new(MemoryItemStore::new()), images, policy);
    let state = ServerState { items: Arc::new(items) };
    let opts = RouterOptions { cors: CorsLayer::very_permissive(), uploads, max_upload_bytes: 1024 * 1024 };
    routes::build_router(state, opts)
}

/// Memory store plus local image backend; the `TempDir` must outlive the router.
fn build_app() -> anyhow::Result<(Router, TempDir)> {
    let tmp = TempDir::new()?;
    let dir = tmp.path().join("uploads");
    let host = LocalDiskHost::new(dir.clone(), "/uploads");
    let uploads = StaticUploads { dir, public_path: "/uploads".into() };
    Ok((build_app_with(Arc::new(host), Some(uploads), IngestPolicy::default()), tmp))
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n").as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_multipart(parts: &[Part<'_>]) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/items")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))?)
}

fn post_json(body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/items")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?)
}

fn get(uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().method("GET").uri(uri).body(Body::empty())?)
}

fn delete(uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().method("DELETE").uri(uri).body(Body::empty())?)
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Vec<u8>)> {
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

async fn send_json(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let (status, bytes) = send(app, req).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn list_len(app: &Router) -> anyhow::Result<usize> {
    let (status, body) = send_json(app, get("/items")?).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body.as_array().map(|a| a.len()).unwrap_or(0))
}

#[tokio::test]
async fn test_json_submission_without_image() -> anyhow::Result<()> {
    let (app, _tmp) = build_app()?;
    let (status, body) =
        send_json(&app, post_json(json!({"name": "Drone X", "description": "quad", "price": 199.99}))?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1, "name": "Drone X", "description": "quad", "price": 199.99, "image": ""}));

    let (status, fetched) = send_json(&app, get("/items/1")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
    Ok(())
}

#[tokio::test]
async fn test_multipart_upload_is_stored_and_served() -> anyhow::Result<()> {
    let (app, tmp) = build_app()?;
    let png = b"\x89PNG fake bytes";
    let req = post_multipart(&[
        Part::Text("name", "Drone X"),
        Part::Text("description", "quad"),
        Part::Text("price", "199.99"),
        Part::File("image", "drone.PNG", png),
    ])?;
    let (status, body) = send_json(&app, req).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], json!(199.99));

    let image = body["image"].as_str().unwrap_or_default().to_string();
    assert!(image.starts_with("/uploads/") && image.ends_with(".png"), "{image}");

    let file_name = image.trim_start_matches("/uploads/");
    assert_eq!(std::fs::read(tmp.path().join("uploads").join(file_name))?, png.to_vec());

    let (status, served) = send(&app, get(&image)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, png.to_vec());
    Ok(())
}

#[tokio::test]
async fn test_multipart_text_image_is_kept_as_reference() -> anyhow::Result<()> {
    let (app, _tmp) = build_app()?;
    let req = post_multipart(&[
        Part::Text("name", "Lamp"),
        Part::Text("price", "5"),
        Part::Text("image", "https://cdn.example.test/lamp.jpg"),
    ])?;
    let (status, body) = send_json(&app, req).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["image"], json!("https://cdn.example.test/lamp.jpg"));
    assert_eq!(body["description"], json!(""));
    Ok(())
}

#[tokio::test]
async fn test_validation_failures_are_400_and_store_nothing() -> anyhow::Result<()> {
    let (app, _tmp) = build_app()?;
    let bad = [
        json!({"name": "", "price": 1}),
        json!({"name": "   ", "price": 1}),
        json!({"name": "x"}),
        json!({"name": "x", "price": -1}),
        json!({"name": "x", "price": "abc"}),
        json!({"name": "x", "price": 1, "image": "ftp://nope"}),
    ];
    for body in bad {
        let (status, err) = send_json(&app, post_json(body.clone())?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(err["error"], json!("Validation Error"));
    }
    assert_eq!(list_len(&app).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_json_bodies_are_400() -> anyhow::Result<()> {
    let (app, _tmp) = build_app()?;
    let mistyped = [
        json!({"name": 5, "price": 1}),
        json!({"name": "x", "price": true}),
        json!({"name": "x", "price": [1]}),
        json!({"name": "x", "price": 1, "image": 7}),
    ];
    for body in mistyped {
        let (status, err) = send_json(&app, post_json(body.clone())?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(err["error"], json!("Validation Error"));
    }

    let syntax = Request::builder()
        .method("POST")
        .uri("/items")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let (status, _) = send_json(&app, syntax).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/items")
        .body(Body::from(r#"{"name":"x","price":1}"#))?;
    let (status, err) = send_json(&app, no_content_type).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], json!("Validation Error"));

    assert_eq!(list_len(&app).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_required_image_policy() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let app = build_app_with(
        Arc::new(LocalDiskHost::new(tmp.path(), "/uploads")),
        None,
        IngestPolicy { require_image: true },
    );
    let (status, _) = send_json(&app, post_json(json!({"name": "x", "price": 1}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send_json(&app, post_json(json!({"name": "x", "price": 1, "image": "/static/x.png"}))?).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn test_image_host_failure_is_500_without_detail() -> anyhow::Result<()> {
    let app = build_app_with(Arc::new(FailingHost), None, IngestPolicy::default());
    let req = post_multipart(&[Part::Text("name", "x"), Part::Text("price", "1"), Part::File("image", "a.png", b"abc")])?;
    let (status, bytes) = send(&app, req).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(bytes)?;
    assert!(!text.contains("hunter2"));
    assert!(!text.contains("502"));
    assert_eq!(list_len(&app).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_list_keeps_insertion_order() -> anyhow::Result<()> {
    let (app, _tmp) = build_app()?;
    for name in ["a", "b", "c"] {
        let (status, _) = send_json(&app, post_json(json!({"name": name, "price": 1}))?).await?;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, body) = send_json(&app, get("/items")?).await?;
    let names: Vec<&str> = body.as_array().into_iter().flatten().filter_map(|i| i["name"].as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    let ids: Vec<u64> = body.as_array().into_iter().flatten().filter_map(|i| i["id"].as_u64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_get_and_delete_by_id() -> anyhow::Result<()> {
    let (app, _tmp) = build_app()?;
    send_json(&app, post_json(json!({"name": "a", "price": 1}))?).await?;

    let (status, _) = send_json(&app, get("/items/99")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_json(&app, get("/items/abc")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, delete("/items/1")?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    // already gone: still 204
    let (status, _) = send(&app, delete("/items/1")?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, delete("/items/abc")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, get("/items/1")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // ids are not reused after delete
    let (_, body) = send_json(&app, post_json(json!({"name": "b", "price": 1}))?).await?;
    assert_eq!(body["id"], json!(2));
    Ok(())
}

#[tokio::test]
async fn test_health_metrics_and_docs() -> anyhow::Result<()> {
    service::observability::init();
    let (app, _tmp) = build_app()?;

    let (status, body) = send_json(&app, get("/health")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    send_json(&app, post_json(json!({"name": "a", "price": 1}))?).await?;
    let (status, metrics) = send(&app, get("/metrics")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(metrics)?.contains("itemhub_items_created_total"));

    let (status, doc) = send_json(&app, get("/api-docs/openapi.json")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/items").is_some());
    assert!(doc["paths"].get("/items/{id}").is_some());
    Ok(())
}

#[tokio::test]
async fn test_postgres_backed_app() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(());
    }
    let mut cfg = configs::AppConfig::default();
    cfg.storage.backend = configs::StoreBackend::Postgres;
    let tmp = TempDir::new()?;
    cfg.images.upload_dir = tmp.path().join("uploads").to_string_lossy().into_owned();
    cfg.normalize_and_validate()?;
    let app = server::startup::build_app(&cfg).await?;

    let name = format!("pg_{}", Uuid::new_v4());
    let (status, body) = send_json(&app, post_json(json!({"name": name, "price": "12.5"}))?).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap_or_default().to_string();
    assert!(Uuid::parse_str(&id).is_ok());

    let (status, fetched) = send_json(&app, get(&format!("/items/{id}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["price"], json!(12.5));

    let (status, _) = send_json(&app, get("/items/1")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, delete(&format!("/items/{id}"))?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}
