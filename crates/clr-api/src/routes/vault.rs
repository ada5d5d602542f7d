// SPDX-License-Identifier: BUSL-1.1
//! # License Vault API Endpoints
//!
//! REST endpoints for the License Store: retrieval, multi-key lookup,
//! verification, export download, statistics, audit trail, and health.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/api/licenses/vault/:licenseId` | `get_license` |
//! | `GET` | `/api/licenses/vault/user/:userId` | `licenses_for_user` |
//! | `GET` | `/api/licenses/vault/domain/:domain` | `licenses_for_domain` |
//! | `GET` | `/api/licenses/vault/app/:appId` | `licenses_for_app` |
//! | `GET` | `/api/licenses/vault/verify/:licenseId` | `verify_license` |
//! | `GET` | `/api/licenses/vault/export/:licenseId` | `export_license` |
//! | `GET` | `/api/licenses/vault/statistics` | `vault_statistics` |
//! | `GET` | `/api/licenses/vault/audit-log` | `audit_log` |
//! | `GET` | `/api/licenses/vault/audit-log/:licenseId` | `audit_log_for_license` |
//! | `GET` | `/api/licenses/vault/health` | `vault_health` |

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::routes::licenses::PaginationParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Optional caller identity, recorded in the audit trail.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ActorParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the vault router. Static segments (`user`, `statistics`, ...)
/// take priority over the `:licenseId` capture.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/licenses/vault/user/:user_id", get(licenses_for_user))
        .route("/api/licenses/vault/domain/:domain", get(licenses_for_domain))
        .route("/api/licenses/vault/app/:app_id", get(licenses_for_app))
        .route("/api/licenses/vault/verify/:license_id", get(verify_license))
        .route("/api/licenses/vault/export/:license_id", get(export_license))
        .route("/api/licenses/vault/statistics", get(vault_statistics))
        .route("/api/licenses/vault/audit-log", get(audit_log))
        .route(
            "/api/licenses/vault/audit-log/:license_id",
            get(audit_log_for_license),
        )
        .route("/api/licenses/vault/health", get(vault_health))
        .route("/api/licenses/vault/:license_id", get(get_license))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/licenses/vault/:licenseId — Retrieve one stored license.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/{license_id}",
    params(
        ("license_id" = String, Path, description = "License identifier"),
        ActorParams,
    ),
    responses(
        (status = 200, description = "Stored license"),
        (status = 404, description = "License not in vault", body = crate::error::ErrorBody),
    ),
    tag = "vault"
)]
async fn get_license(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
    Query(actor): Query<ActorParams>,
) -> Result<impl IntoResponse, AppError> {
    let out = state.vault.retrieve(&license_id, actor.user_id);
    if !out.success {
        return Err(AppError::not_found(format!(
            "license {license_id} not found in vault"
        )));
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "license": out.license,
        "vaultId": out.vault_id,
        "message": out.message,
    })))
}

/// GET /api/licenses/vault/user/:userId — All licenses for a user.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/user/{user_id}",
    params(("user_id" = String, Path, description = "Owning user")),
    responses((status = 200, description = "Licenses for the user")),
    tag = "vault"
)]
async fn licenses_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let licenses = state.vault.licenses_for_user(&user_id);
    let count = licenses.len();
    Ok(Json(serde_json::json!({
        "success": true,
        "licenses": licenses,
        "count": count,
        "userId": user_id,
    })))
}

/// GET /api/licenses/vault/domain/:domain — All licenses bound to a domain.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/domain/{domain}",
    params(("domain" = String, Path, description = "Licensed domain")),
    responses((status = 200, description = "Licenses for the domain")),
    tag = "vault"
)]
async fn licenses_for_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let licenses = state.vault.licenses_for_domain(&domain);
    let count = licenses.len();
    Ok(Json(serde_json::json!({
        "success": true,
        "licenses": licenses,
        "count": count,
        "domain": domain,
    })))
}

/// GET /api/licenses/vault/app/:appId — All licenses issued for an app.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/app/{app_id}",
    params(("app_id" = String, Path, description = "Application identifier")),
    responses((status = 200, description = "Licenses for the app")),
    tag = "vault"
)]
async fn licenses_for_app(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let licenses = state.vault.licenses_for_app(&app_id);
    let count = licenses.len();
    Ok(Json(serde_json::json!({
        "success": true,
        "licenses": licenses,
        "count": count,
        "appId": app_id,
    })))
}

/// GET /api/licenses/vault/verify/:licenseId — Verify a stored license.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/verify/{license_id}",
    params(("license_id" = String, Path, description = "License identifier")),
    responses((status = 200, description = "Verification verdict")),
    tag = "vault"
)]
async fn verify_license(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let verdict = state.vault.verify(&license_id);
    Ok(Json(serde_json::json!({
        "success": true,
        "valid": verdict.valid,
        "expired": verdict.expired,
        "backupSynced": verdict.backup_synced,
        "message": verdict.message,
        "licenseId": license_id,
    })))
}

/// GET /api/licenses/vault/export/:licenseId — Download a license export.
///
/// Returns the export document as a JSON attachment.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/export/{license_id}",
    params(
        ("license_id" = String, Path, description = "License identifier"),
        ActorParams,
    ),
    responses(
        (status = 200, description = "JSON export attachment"),
        (status = 404, description = "License not in vault", body = crate::error::ErrorBody),
    ),
    tag = "vault"
)]
async fn export_license(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
    Query(actor): Query<ActorParams>,
) -> Result<impl IntoResponse, AppError> {
    let out = state.vault.export(&license_id, actor.user_id);
    let payload = out.payload.ok_or_else(|| {
        AppError::not_found(format!("license {license_id} not found in vault"))
    })?;
    let body = serde_json::to_vec_pretty(&payload)
        .map_err(|e| AppError::Internal(format!("export serialization error: {e}")))?;
    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{license_id}.json\""),
        ),
    ];
    Ok((headers, body))
}

/// GET /api/licenses/vault/statistics — Vault statistics.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/statistics",
    responses((status = 200, description = "Vault statistics")),
    tag = "vault"
)]
async fn vault_statistics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(serde_json::json!({
        "success": true,
        "statistics": state.vault.statistics(),
        "timestamp": chrono::Utc::now(),
    })))
}

/// GET /api/licenses/vault/audit-log — Paginated audit trail.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/audit-log",
    params(PaginationParams),
    responses((status = 200, description = "Audit trail page")),
    tag = "vault"
)]
async fn audit_log(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.vault.audit_log(params.limit, params.offset);
    let count = entries.len();
    Ok(Json(serde_json::json!({
        "success": true,
        "auditLog": entries,
        "pagination": {
            "limit": params.limit,
            "offset": params.offset,
            "count": count,
        },
    })))
}

/// GET /api/licenses/vault/audit-log/:licenseId — Audit trail for one license.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/audit-log/{license_id}",
    params(("license_id" = String, Path, description = "License identifier")),
    responses((status = 200, description = "Audit entries for the license")),
    tag = "vault"
)]
async fn audit_log_for_license(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.vault.audit_log_for_license(&license_id);
    let count = entries.len();
    Ok(Json(serde_json::json!({
        "success": true,
        "auditLog": entries,
        "count": count,
        "licenseId": license_id,
    })))
}

/// GET /api/licenses/vault/health — Vault health report.
#[utoipa::path(
    get,
    path = "/api/licenses/vault/health",
    responses((status = 200, description = "Vault health")),
    tag = "vault"
)]
async fn vault_health(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let health = state.vault.health();
    Ok(Json(serde_json::json!({
        "healthy": health.healthy,
        "issues": health.issues,
        "backupConnected": health.backup_connected,
        "encryptionActive": health.encryption_active,
    })))
}
