//! # Integration Tests for clr-api
//!
//! Tests license generation, scroll hash verification, treaty ledger
//! queries, vault retrieval and lookup, export download, audit trail,
//! statistics, health probes, and OpenAPI spec generation.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use clr_api::state::AppState;

/// Helper: build the test app with a zero mesh pulse so `quiesce`
/// settles immediately.
fn test_state() -> AppState {
    AppState::with_pulse_latency(Duration::ZERO)
}

fn test_app(state: &AppState) -> axum::Router {
    clr_api::app(state.clone())
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn post_json(app: &axum::Router, uri: &str, body: Value) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(app: &axum::Router, uri: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn generate_body(app_id: &str, user_id: &str, domain: &str) -> Value {
    json!({
        "appId": app_id,
        "appName": format!("{app_id} App"),
        "userId": user_id,
        "domain": domain,
        "issuedTo": format!("{user_id}@example.com"),
    })
}

async fn generate(app: &axum::Router, app_id: &str, user_id: &str, domain: &str) -> Value {
    let response = post_json(
        app,
        "/api/licenses/generate",
        generate_body(app_id, user_id, domain),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let state = test_state();
    let response = get(&test_app(&state), "/health/liveness").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let state = test_state();
    let response = get(&test_app(&state), "/health/readiness").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- License Generation -------------------------------------------------------

#[tokio::test]
async fn test_generate_license_returns_full_record() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;

    assert_eq!(body["success"], true);
    let license = &body["license"];
    assert!(license["licenseId"].as_str().unwrap().starts_with("CLR_app_1_"));
    assert!(license["scrollHash"].as_str().unwrap().starts_with("scroll_"));
    // First issuance lands one past the documented start position.
    assert_eq!(license["ledgerPosition"], 1835);
    assert_eq!(license["scrollBound"], true);
    assert_eq!(license["complianceStatus"], "VERIFIED");
    assert_eq!(license["tier"], "STANDARD");
    assert!(license["pdfUrl"].as_str().unwrap().ends_with(".pdf"));

    let vault = &body["vault"];
    assert!(vault["vaultId"].as_str().unwrap().starts_with("VAULT_"));
    assert_eq!(vault["stored"], true);
    assert_eq!(vault["backupStatus"], "PENDING");
}

#[tokio::test]
async fn test_generate_positions_are_monotonic() {
    let state = test_state();
    let app = test_app(&state);
    let first = generate(&app, "app_1", "user_1", "one.example.com").await;
    let second = generate(&app, "app_2", "user_2", "two.example.com").await;
    assert_eq!(first["license"]["ledgerPosition"], 1835);
    assert_eq!(second["license"]["ledgerPosition"], 1836);
}

#[tokio::test]
async fn test_generate_accepts_tier_and_sector() {
    let state = test_state();
    let app = test_app(&state);
    let mut body = generate_body("app_1", "user_1", "one.example.com");
    body["tier"] = json!("premium");
    body["sector"] = json!("fintech");
    let response = post_json(&app, "/api/licenses/generate", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["license"]["tier"], "PREMIUM");
    assert_eq!(body["license"]["sector"], "fintech");
}

#[tokio::test]
async fn test_generate_rejects_missing_field() {
    let state = test_state();
    let app = test_app(&state);
    let mut body = generate_body("app_1", "user_1", "one.example.com");
    body["domain"] = json!("");
    let response = post_json(&app, "/api/licenses/generate", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("domain"));
}

#[tokio::test]
async fn test_generate_rejects_unknown_tier() {
    let state = test_state();
    let app = test_app(&state);
    let mut body = generate_body("app_1", "user_1", "one.example.com");
    body["tier"] = json!("GOLD");
    let response = post_json(&app, "/api/licenses/generate", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Scroll Hash Verification -------------------------------------------------

#[tokio::test]
async fn test_verify_known_scroll_hash() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;
    let scroll_hash = body["license"]["scrollHash"].as_str().unwrap().to_string();

    let response = post_json(
        &app,
        "/api/licenses/verify",
        json!({ "scrollHash": scroll_hash }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["verified"], true);
    assert_eq!(body["scrollHash"], scroll_hash);
}

#[tokio::test]
async fn test_verify_unknown_scroll_hash() {
    let state = test_state();
    let app = test_app(&state);
    let response = post_json(
        &app,
        "/api/licenses/verify",
        json!({ "scrollHash": "scroll_deadbeef" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["verified"], false);
}

#[tokio::test]
async fn test_verify_requires_scroll_hash() {
    let state = test_state();
    let app = test_app(&state);
    let response = post_json(&app, "/api/licenses/verify", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Treaty Ledger ------------------------------------------------------------

#[tokio::test]
async fn test_ledger_entry_lookup() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;
    let position = body["license"]["ledgerPosition"].as_u64().unwrap();

    let response = get(&app, &format!("/api/licenses/treaty-log/{position}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["position"], position);
    assert_eq!(body["entry"]["position"], position);
    assert_eq!(body["entry"]["appId"], "app_1");
}

#[tokio::test]
async fn test_ledger_entry_missing_position() {
    let state = test_state();
    let app = test_app(&state);
    let response = get(&app, "/api/licenses/treaty-log/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_ledger_entry_non_numeric_position() {
    let state = test_state();
    let app = test_app(&state);
    let response = get(&app, "/api/licenses/treaty-log/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ledger_pagination() {
    let state = test_state();
    let app = test_app(&state);
    for i in 0..5 {
        generate(&app, &format!("app_{i}"), "user_1", "one.example.com").await;
    }

    let response = get(&app, "/api/licenses/treaty-log?limit=2&offset=0").await;
    let body = body_json(response).await;
    let log = body["log"].as_array().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0]["position"], 1835);
    assert_eq!(log[1]["position"], 1836);
    assert_eq!(body["pagination"]["count"], 2);

    let response = get(&app, "/api/licenses/treaty-log?limit=2&offset=4").await;
    let body = body_json(response).await;
    let log = body["log"].as_array().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["position"], 1839);
}

#[tokio::test]
async fn test_issuer_statistics() {
    let state = test_state();
    let app = test_app(&state);
    generate(&app, "app_1", "user_1", "one.example.com").await;
    state.quiesce().await;

    let response = get(&app, "/api/licenses/claimroot/statistics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let stats = &body["statistics"];
    assert_eq!(stats["totalIssued"], 1);
    assert_eq!(stats["currentPosition"], 1835);
    assert_eq!(stats["syncedCount"], 1);
    assert_eq!(stats["scrollBound"], 1);
}

// -- Vault Retrieval ----------------------------------------------------------

#[tokio::test]
async fn test_vault_retrieve_stored_license() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;
    let license_id = body["license"]["licenseId"].as_str().unwrap().to_string();

    let response = get(&app, &format!("/api/licenses/vault/{license_id}?userId=user_1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["license"]["licenseId"], license_id.as_str());
    assert!(body["vaultId"].as_str().unwrap().starts_with("VAULT_"));
}

#[tokio::test]
async fn test_vault_retrieve_missing_license() {
    let state = test_state();
    let app = test_app(&state);
    let response = get(&app, "/api/licenses/vault/CLR_missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vault_multi_key_lookups() {
    let state = test_state();
    let app = test_app(&state);
    generate(&app, "app_1", "alice", "a.example.com").await;
    generate(&app, "app_1", "bob", "b.example.com").await;
    generate(&app, "app_2", "alice", "a.example.com").await;

    let body = body_json(get(&app, "/api/licenses/vault/user/alice").await).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["userId"], "alice");

    let body = body_json(get(&app, "/api/licenses/vault/domain/a.example.com").await).await;
    assert_eq!(body["count"], 2);

    let body = body_json(get(&app, "/api/licenses/vault/app/app_1").await).await;
    assert_eq!(body["count"], 2);

    let body = body_json(get(&app, "/api/licenses/vault/user/carol").await).await;
    assert_eq!(body["count"], 0);
    assert!(body["licenses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_vault_verify_and_health_after_sync() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;
    let license_id = body["license"]["licenseId"].as_str().unwrap().to_string();
    state.quiesce().await;

    let body = body_json(get(&app, &format!("/api/licenses/vault/verify/{license_id}")).await).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["expired"], false);
    assert_eq!(body["backupSynced"], true);

    let body = body_json(get(&app, "/api/licenses/vault/health").await).await;
    assert_eq!(body["healthy"], true);
    assert!(body["issues"].as_array().unwrap().is_empty());
    assert_eq!(body["backupConnected"], true);
    assert_eq!(body["encryptionActive"], true);
}

#[tokio::test]
async fn test_vault_verify_missing_license() {
    let state = test_state();
    let app = test_app(&state);
    let body = body_json(get(&app, "/api/licenses/vault/verify/CLR_missing").await).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["expired"], false);
    assert_eq!(body["backupSynced"], false);
}

// -- Export -------------------------------------------------------------------

#[tokio::test]
async fn test_vault_export_download() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;
    let license_id = body["license"]["licenseId"].as_str().unwrap().to_string();
    state.quiesce().await;

    let response = get(
        &app,
        &format!("/api/licenses/vault/export/{license_id}?userId=user_1"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"{license_id}.json\"")
    );

    let payload = body_json(response).await;
    assert_eq!(payload["license"]["licenseId"], license_id.as_str());
    assert_eq!(payload["vaultMetadata"]["backupStatus"], "SYNCED");
    assert_eq!(payload["exportedBy"], "user_1");
}

#[tokio::test]
async fn test_vault_export_missing_license() {
    let state = test_state();
    let app = test_app(&state);
    let response = get(&app, "/api/licenses/vault/export/CLR_missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Statistics and Audit Trail -----------------------------------------------

#[tokio::test]
async fn test_vault_statistics() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;
    let license_id = body["license"]["licenseId"].as_str().unwrap().to_string();
    get(&app, &format!("/api/licenses/vault/{license_id}")).await;
    state.quiesce().await;

    let body = body_json(get(&app, "/api/licenses/vault/statistics").await).await;
    let stats = &body["statistics"];
    assert_eq!(stats["totalLicenses"], 1);
    assert_eq!(stats["syncedCount"], 1);
    // One STORE and one RETRIEVE so far.
    assert_eq!(stats["auditEntries"], 2);
    assert!(stats["lastBackup"].is_string());
}

#[tokio::test]
async fn test_vault_audit_log_pagination_and_filter() {
    let state = test_state();
    let app = test_app(&state);
    let body = generate(&app, "app_1", "user_1", "one.example.com").await;
    let license_id = body["license"]["licenseId"].as_str().unwrap().to_string();
    generate(&app, "app_2", "user_2", "two.example.com").await;
    get(&app, &format!("/api/licenses/vault/{license_id}")).await;

    let body = body_json(get(&app, "/api/licenses/vault/audit-log?limit=2&offset=0").await).await;
    let entries = body["auditLog"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["operation"], "STORE");
    assert_eq!(body["pagination"]["count"], 2);

    let body = body_json(
        get(&app, &format!("/api/licenses/vault/audit-log/{license_id}")).await,
    )
    .await;
    assert_eq!(body["count"], 2);
    let entries = body["auditLog"].as_array().unwrap();
    assert_eq!(entries[0]["operation"], "STORE");
    assert_eq!(entries[1]["operation"], "RETRIEVE");
    assert_eq!(entries[1]["metadata"]["accessCount"], 1);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let state = test_state();
    let app = test_app(&state);
    let response = get(&app, "/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/api/licenses/generate"].is_object());
    assert!(spec["paths"]["/api/licenses/vault/{license_id}"].is_object());
}

// -- End-to-End Scenario ------------------------------------------------------

/// Full lifecycle: generate, verify the scroll hash, read the ledger
/// entry, retrieve from the vault, verify in the vault, export, and
/// confirm the audit trail saw every step.
#[tokio::test]
async fn test_full_license_lifecycle() {
    let state = test_state();
    let app = test_app(&state);

    let body = generate(&app, "buildnest", "user_42", "shop.example.com").await;
    let license = &body["license"];
    let license_id = license["licenseId"].as_str().unwrap().to_string();
    let scroll_hash = license["scrollHash"].as_str().unwrap().to_string();
    let position = license["ledgerPosition"].as_u64().unwrap();
    assert_eq!(position, 1835);
    state.quiesce().await;

    let body = body_json(
        post_json(&app, "/api/licenses/verify", json!({ "scrollHash": scroll_hash })).await,
    )
    .await;
    assert_eq!(body["verified"], true);

    let body = body_json(get(&app, &format!("/api/licenses/treaty-log/{position}")).await).await;
    assert_eq!(body["entry"]["licenseId"], license_id.as_str());
    assert_eq!(body["entry"]["synced"], true);

    let body = body_json(get(&app, &format!("/api/licenses/vault/{license_id}")).await).await;
    assert_eq!(body["license"]["scrollHash"], scroll_hash.as_str());

    let body = body_json(get(&app, &format!("/api/licenses/vault/verify/{license_id}")).await).await;
    assert_eq!(body["valid"], true);

    let response = get(&app, &format!("/api/licenses/vault/export/{license_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(
        get(&app, &format!("/api/licenses/vault/audit-log/{license_id}")).await,
    )
    .await;
    let operations: Vec<&str> = body["auditLog"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["operation"].as_str().unwrap())
        .collect();
    assert_eq!(operations, vec!["STORE", "RETRIEVE", "VERIFY", "EXPORT"]);
}
