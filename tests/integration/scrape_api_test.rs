// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_server, create_test_app, PanickingRenderer};
use axum::body::Bytes;
use axum::http::StatusCode;
use jobcrawlrs::engines::stub_renderer::fixtures;
use jobcrawlrs::infrastructure::snapshot_store::InMemorySnapshotStore;
use serde_json::{json, Value};
use std::sync::Arc;

const DE_SEARCH: &str = "https://de.indeed.com/jobs?q=Rust%20Engineer&l=Berlin";

fn body(countries: Value) -> Value {
    json!({
        "jobTitle": "Rust Engineer",
        "location": "Berlin",
        "countries": countries,
    })
}

#[tokio::test]
async fn empty_countries_is_bad_request() {
    let app = create_test_app();

    let response = app.server.post("/scrape").json(&body(json!([]))).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Missing required parameters" }));
    assert_eq!(app.renderer.contexts_opened(), 0);
}

#[tokio::test]
async fn missing_job_title_is_bad_request() {
    let app = create_test_app();

    let response = app
        .server
        .post("/scrape")
        .json(&json!({ "location": "Berlin", "countries": ["de"] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Missing required parameters" }));
    assert_eq!(app.renderer.contexts_opened(), 0);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = create_test_app();

    let response = app
        .server
        .post("/scrape")
        .bytes(Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Missing required parameters" }));
}

#[tokio::test]
async fn single_page_with_duplicate_listing() {
    let app = create_test_app();
    app.renderer.serve_page(
        DE_SEARCH,
        fixtures::listing_page(&["/viewjob?jk=a1", "/viewjob?jk=a1"], false),
    );
    app.renderer.serve_detail(
        "https://de.indeed.com/viewjob?jk=a1",
        fixtures::detail_page("Rust Engineer", "Ferris GmbH", "Berlin"),
    );

    let response = app.server.post("/scrape").json(&body(json!(["de"]))).await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["totalJobs"], 1);
    assert_eq!(report["totalPages"], 1);
    assert!(report["scrapeDurationSeconds"].as_f64().unwrap() >= 0.0);
    assert_eq!(
        report["jobs"][0],
        json!({
            "title": "Rust Engineer",
            "company": "Ferris GmbH",
            "location": "Berlin",
            "salary": "55.000 € - 70.000 € pro Jahr",
            "link": "https://de.indeed.com/viewjob?jk=a1",
            "source": "Indeed",
        })
    );
    assert_eq!(
        report["countries"],
        json!([{ "country": "de", "jobs": 1, "pagesVisited": 1, "status": "exhausted" }])
    );
}

#[tokio::test]
async fn unmapped_country_is_scraped_from_default_endpoint() {
    let app = create_test_app();
    app.renderer.serve_page(
        DE_SEARCH,
        fixtures::listing_page(&["/viewjob?jk=b2"], false),
    );
    app.renderer.serve_detail(
        "https://de.indeed.com/viewjob?jk=b2",
        fixtures::detail_page("Rust Engineer", "Ferris GmbH", "Berlin"),
    );

    let response = app
        .server
        .post("/scrape")
        .json(&body(json!(["de", "xx"])))
        .await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["totalJobs"], 2);
    assert_eq!(report["totalPages"], 2);
    let searches = app
        .renderer
        .navigations()
        .iter()
        .filter(|url| url.as_str() == DE_SEARCH)
        .count();
    assert_eq!(searches, 2);
}

#[tokio::test]
async fn failed_results_page_is_reported_not_raised() {
    let app = create_test_app();
    app.renderer.serve_page(DE_SEARCH, fixtures::empty_page());

    let response = app.server.post("/scrape").json(&body(json!(["de"]))).await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["totalJobs"], 0);
    assert_eq!(report["countries"][0]["status"], "extraction_failed");
    assert_eq!(app.snapshots.names(), vec!["error_page_de_0.html".to_string()]);
}

#[tokio::test]
async fn filters_reach_the_search_url() {
    let app = create_test_app();
    let filtered = format!("{}&fromage=7&remotejob=true", DE_SEARCH);
    app.renderer
        .serve_page(filtered.clone(), fixtures::listing_page(&[], false));

    let response = app
        .server
        .post("/scrape")
        .json(&json!({
            "jobTitle": "Rust Engineer",
            "location": "Berlin",
            "countries": ["de"],
            "filters": { "fromage": 7, "remotejob": "true" },
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(app.renderer.navigations(), vec![filtered]);
}

#[tokio::test]
async fn renderer_panic_is_internal_error() {
    let server = create_server(
        Arc::new(PanickingRenderer),
        Arc::new(InMemorySnapshotStore::new()),
    );

    let response = server.post("/scrape").json(&body(json!(["de"]))).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "An error occurred while scraping jobs" }));
}

#[tokio::test]
async fn version_and_metrics_routes() {
    let app = create_test_app();

    let version = app.server.get("/version").await;
    version.assert_status_ok();
    version.assert_text(env!("CARGO_PKG_VERSION"));

    app.server.get("/metrics").await.assert_status_ok();
}
