mod common;

use axum::http::{Method, StatusCode};
use clinic_client::{ClientError, Console};
use common::{MockApi, config, connect};
use serde_json::json;
use shared::error::ErrorCode;
use shared::models::{BranchCreate, BranchUpdate, DEFAULT_BRANCH_COLOR, UNASSIGNED_USER};
use tempfile::TempDir;

fn branch_rows() -> serde_json::Value {
    json!([
        { "id": "1", "name": "Makati", "address": "Ayala Ave", "contactNumber": "02-123", "user_id": "ana", "colorCode": "#ff0000" },
        { "id": "2", "name": "Quezon City", "address": "Timog Ave", "contact_number": null, "user_id": "", "color_code": null },
        { "id": "3", "name": "Pasig", "address": "Ortigas Center", "user_id": null }
    ])
}

#[tokio::test]
async fn test_refresh_search_and_page() {
    let api = MockApi::start().await;
    api.on(Method::GET, "branches.php", &[], branch_rows());
    let dir = TempDir::new().unwrap();
    let console = Console::connect(config(&api, &dir).with_page_size(2))
        .await
        .unwrap();
    let mut branches = console.branches();

    let loaded = branches.refresh().await.unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[1].user_id, None);
    assert_eq!(loaded[1].color_code, None);

    let hits = branches.search("AVE");
    assert_eq!(hits.len(), 2);
    assert!(branches.search("ana").iter().any(|b| b.id == 1));

    assert_eq!(branches.find(3).unwrap().name, "Pasig");
    let err = branches.find(9).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::BranchNotFound));

    let page = branches.page("", 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.total_pages, 2);
}

#[tokio::test]
async fn test_create_applies_defaults_and_reloads() {
    let api = MockApi::start().await;
    api.on(Method::GET, "branches.php", &[], branch_rows());
    api.on(
        Method::POST,
        "branches.php",
        &[],
        json!({ "success": true, "id": 4 }),
    );
    let dir = TempDir::new().unwrap();
    let console = connect(&api, &dir).await;
    let mut branches = console.branches();

    let mut create = BranchCreate::new("  Alabang ", "Filinvest");
    create.user_id = Some(UNASSIGNED_USER.to_string());
    create.color_code = String::new();
    let id = branches.create(create).await.unwrap();
    assert_eq!(id, Some(4));

    let posted = api.requests_to(Method::POST, "branches.php");
    let body = posted[0].body.as_ref().unwrap();
    assert_eq!(body["name"], "Alabang");
    assert_eq!(body["colorCode"], DEFAULT_BRANCH_COLOR);
    assert!(body["user_id"].is_null());

    // List reloaded after the write
    assert_eq!(branches.branches().len(), 3);
}

#[tokio::test]
async fn test_create_rejects_missing_address_locally() {
    let api = MockApi::start().await;
    let dir = TempDir::new().unwrap();
    let console = connect(&api, &dir).await;
    let mut branches = console.branches();

    let err = branches
        .create(BranchCreate::new("Alabang", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Domain(_)));
    assert!(api.requests_to(Method::POST, "branches.php").is_empty());
}

#[tokio::test]
async fn test_update_unassigns_user() {
    let api = MockApi::start().await;
    api.on(Method::GET, "branches.php", &[], branch_rows());
    api.on(
        Method::POST,
        "branches.php",
        &[("id", "1")],
        json!({ "success": true, "message": "Branch updated" }),
    );
    let dir = TempDir::new().unwrap();
    let console = connect(&api, &dir).await;
    let mut branches = console.branches();
    branches.refresh().await.unwrap();

    let mut update = BranchUpdate::from_branch(&branches.branches()[0]);
    update.user_id = Some(UNASSIGNED_USER.to_string());
    branches.update(1, update).await.unwrap();

    let posted = api.requests_to(Method::POST, "branches.php");
    assert_eq!(posted[0].param("id"), Some("1"));
    let body = posted[0].body.as_ref().unwrap();
    assert!(body["user_id"].is_null());
    assert_eq!(body["colorCode"], "#ff0000");
}

#[tokio::test]
async fn test_server_failure_keeps_previous_list() {
    let api = MockApi::start().await;
    api.on(Method::GET, "branches.php", &[], branch_rows());
    let dir = TempDir::new().unwrap();
    let console = connect(&api, &dir).await;
    let mut branches = console.branches();
    branches.refresh().await.unwrap();

    api.on_raw(
        Method::GET,
        "branches.php",
        &[],
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"Database unavailable"}"#,
    );
    let err = branches.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::Internal(ref msg) if msg == "Database unavailable"));
    assert_eq!(branches.branches().len(), 3);
}

#[tokio::test]
async fn test_update_succeeds_when_reload_fails() {
    let api = MockApi::start().await;
    api.on(Method::GET, "branches.php", &[], branch_rows());
    api.on(
        Method::POST,
        "branches.php",
        &[("id", "1")],
        json!({ "success": true }),
    );
    let dir = TempDir::new().unwrap();
    let console = connect(&api, &dir).await;
    let mut branches = console.branches();
    branches.refresh().await.unwrap();

    api.on_raw(
        Method::GET,
        "branches.php",
        &[],
        StatusCode::SERVICE_UNAVAILABLE,
        "maintenance",
    );
    let mut update = BranchUpdate::from_branch(&branches.branches()[0]);
    update.name = "Makati Central".into();
    branches.update(1, update).await.unwrap();

    assert_eq!(api.requests_to(Method::POST, "branches.php").len(), 1);
    // Stale list kept until the next successful refresh
    assert_eq!(branches.branches()[0].name, "Makati");
}

#[tokio::test]
async fn test_envelope_error_on_success_status() {
    let api = MockApi::start().await;
    api.on(
        Method::POST,
        "branches.php",
        &[],
        json!({ "success": false, "message": "Branch name already exists" }),
    );
    let dir = TempDir::new().unwrap();
    let console = connect(&api, &dir).await;
    let mut branches = console.branches();

    let err = branches
        .create(BranchCreate::new("Makati", "Ayala Ave"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server(ref msg) if msg == "Branch name already exists"));
}
