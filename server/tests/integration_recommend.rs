use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_app, ServerConfig};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const CATALOG: &str = concat!(
    r#"{"id":"g1","package_type":"Deluxe","start_city":"Mumbai","destination":"Goa","hotel_details":"Sea Shell Resort Calangute","price":20000}"#, "\n",
    r#"{"id":"g2","package_type":"Deluxe","start_city":"Mumbai","destination":"Goa","hotel_details":"Sea Shell Resort Calangute","price":21000}"#, "\n",
    r#"{"id":"g3","package_type":"Deluxe","start_city":"Mumbai","destination":"Goa","hotel_details":"Hilltop Cabins","price":9000}"#, "\n",
    r#"{"id":"m1","package_type":"Budget","start_city":"Delhi","destination":"Manali","hotel_details":"Snow Valley","price":7000}"#, "\n",
);

fn setup(admin_token: Option<&str>) -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let catalog = dir.path().join("catalog.jsonl");
    fs::write(&catalog, CATALOG).unwrap();
    let config = ServerConfig {
        catalog,
        feedback_log: dir.path().join("feedback.log"),
        admin_token: admin_token.map(str::to_string),
        sample: 0,
        seed: 42,
    };
    let app = build_app(config).unwrap();
    (dir, app)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::String(String::from_utf8_lossy(&body).into_owned()));
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri).header("content-type", "application/json").body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn recommend_returns_ranked_results() {
    let (_dir, app) = setup(None);
    let (status, json) = send(app, get("/recommend?package_type=Deluxe&start_city=Mumbai&destination=Goa&max_price=25000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matched"], true);
    let ids: Vec<&str> = json["results"].as_array().unwrap().iter().map(|h| h["id"].as_str().unwrap()).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[2], "g3");
}

#[tokio::test]
async fn limit_counts_hits_before_truncation() {
    let (_dir, app) = setup(None);
    let (_, json) = send(app.clone(), get("/recommend?package_type=Deluxe&start_city=Mumbai&destination=Goa&max_price=25000&limit=1")).await;
    assert_eq!(json["total_hits"], 3);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);

    let (_, json) = send(app, get("/recommend?package_type=Deluxe&start_city=Mumbai&destination=Goa&max_price=25000&limit=0")).await;
    assert_eq!(json["matched"], true);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sample_caps_the_indexed_catalog() {
    let dir = tempdir().unwrap();
    let catalog = dir.path().join("catalog.jsonl");
    fs::write(&catalog, CATALOG).unwrap();
    let config = ServerConfig {
        catalog,
        feedback_log: dir.path().join("feedback.log"),
        admin_token: Some("secret".into()),
        sample: 2,
        seed: 42,
    };
    let app = build_app(config).unwrap();
    let req = Request::post("/admin/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, json) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entries"], 2);
}

#[tokio::test]
async fn recommend_reports_no_match() {
    let (_dir, app) = setup(None);
    let (status, json) = send(app, get("/recommend?package_type=Luxury&start_city=Mumbai&destination=Goa&max_price=25000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matched"], false);
    assert_eq!(json["total_hits"], 0);
}

#[tokio::test]
async fn facets_list_filter_values() {
    let (_dir, app) = setup(None);
    let (_, json) = send(app, get("/facets")).await;
    assert_eq!(json["package_types"], serde_json::json!(["Deluxe", "Budget"]));
    assert_eq!(json["destinations"], serde_json::json!(["Goa", "Manali"]));
    assert_eq!(json["max_price"], 21000.0);
}

#[tokio::test]
async fn feedback_is_appended() {
    let (dir, app) = setup(None);
    let (status, _) = send(app.clone(), post_json("/feedback", r#"{"feedback":"great picks"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app.clone(), post_json("/feedback", r#"{"feedback":"   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(app, post_json("/feedback", r#"{"feedback":"two\nlines"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let logged = fs::read_to_string(dir.path().join("feedback.log")).unwrap();
    assert_eq!(logged, "great picks\ntwo lines\n");
}

#[tokio::test]
async fn reload_requires_token_and_swaps_index() {
    let (dir, app) = setup(Some("secret"));
    let (status, _) = send(app.clone(), Request::post("/admin/reload").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    append_entry(dir.path());
    let req = Request::post("/admin/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, json) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entries"], 5);

    let (_, json) = send(app, get("/recommend?package_type=Luxury&start_city=Pune&destination=Ooty&max_price=50000")).await;
    assert_eq!(json["matched"], true);
}

#[tokio::test]
async fn failed_reload_keeps_previous_index() {
    let (dir, app) = setup(Some("secret"));
    fs::write(dir.path().join("catalog.jsonl"), "").unwrap();
    let req = Request::post("/admin/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, json) = send(app, get("/recommend?package_type=Budget&start_city=Delhi&destination=Manali")).await;
    assert_eq!(json["matched"], true);
}

fn append_entry(dir: &Path) {
    let mut text = CATALOG.to_string();
    text.push_str(r#"{"id":"o1","package_type":"Luxury","start_city":"Pune","destination":"Ooty","hotel_details":"Tea Estate Bungalow","price":40000}"#);
    text.push('\n');
    fs::write(dir.join("catalog.jsonl"), text).unwrap();
}
