// SPDX-License-Identifier: BUSL-1.1
//! # License Issuance API Endpoints
//!
//! REST endpoints for the License Issuer: generation (issue + vault
//! store in one call), scroll hash verification, treaty ledger queries,
//! and issuer statistics.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/api/licenses/generate` | `generate_license` |
//! | `POST` | `/api/licenses/verify` | `verify_license` |
//! | `GET` | `/api/licenses/treaty-log/:position` | `get_ledger_entry` |
//! | `GET` | `/api/licenses/treaty-log` | `get_ledger_log` |
//! | `GET` | `/api/licenses/claimroot/statistics` | `issuer_statistics` |

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use clr_core::{License, LicenseTier};
use clr_ledger::{IssueRequest, IssuerStatistics, LedgerEntry, TokenVerification};
use clr_vault::BackupStatus;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request to generate a new license.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLicenseRequest {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub issued_to: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    /// "STANDARD", "PREMIUM", or "SOVEREIGN"; case-insensitive,
    /// defaults to "STANDARD".
    #[serde(default)]
    pub tier: Option<String>,
}

/// Vault confirmation embedded in the generation response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultConfirmation {
    pub vault_id: String,
    pub stored: bool,
    #[schema(value_type = String)]
    pub backup_status: BackupStatus,
}

/// Response envelope for license generation.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateLicenseResponse {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object)]
    pub license: License,
    pub vault: VaultConfirmation,
}

/// Request to verify a scroll hash against the treaty ledger.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLicenseRequest {
    #[serde(default)]
    pub scroll_hash: Option<String>,
}

/// Response envelope for scroll hash verification.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLicenseResponse {
    pub success: bool,
    pub verified: bool,
    pub message: String,
    pub scroll_hash: String,
}

/// Pagination query parameters for ledger listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Maximum entries to return (default 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Entries to skip (default 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Response envelope for a single ledger entry lookup.
#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub entry: LedgerEntry,
    pub position: u64,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the license issuance router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/licenses/generate", post(generate_license))
        .route("/api/licenses/verify", post(verify_license))
        .route("/api/licenses/treaty-log/:position", get(get_ledger_entry))
        .route("/api/licenses/treaty-log", get(get_ledger_log))
        .route("/api/licenses/claimroot/statistics", get(issuer_statistics))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Pull a required field out of the request, rejecting absent or
/// blank values.
fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

/// POST /api/licenses/generate — Issue a license and store it in the vault.
#[utoipa::path(
    post,
    path = "/api/licenses/generate",
    request_body = GenerateLicenseRequest,
    responses(
        (status = 201, description = "License issued and stored", body = GenerateLicenseResponse),
        (status = 400, description = "Missing or invalid field", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
async fn generate_license(
    State(state): State<AppState>,
    Json(req): Json<GenerateLicenseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tier = match req.tier.as_deref() {
        Some(t) if !t.trim().is_empty() => LicenseTier::parse(t)?,
        _ => LicenseTier::default(),
    };
    let user_id = required(req.user_id, "userId")?;
    let issue = IssueRequest {
        app_id: required(req.app_id, "appId")?,
        app_name: required(req.app_name, "appName")?,
        user_id: user_id.clone(),
        domain: required(req.domain, "domain")?,
        issued_to: required(req.issued_to, "issuedTo")?,
        sector: req.sector.filter(|s| !s.trim().is_empty()),
        tier,
    };

    let license = state.issuer.issue(issue);
    let stored = state.vault.store(license.clone(), Some(user_id));
    let vault_id = stored
        .vault_id
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_default();

    let response = GenerateLicenseResponse {
        success: true,
        message: "License generated, scroll-bound, and stored in vault".to_string(),
        license,
        vault: VaultConfirmation {
            vault_id,
            stored: stored.success,
            backup_status: BackupStatus::Pending,
        },
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/licenses/verify — Verify a scroll hash against the treaty ledger.
#[utoipa::path(
    post,
    path = "/api/licenses/verify",
    request_body = VerifyLicenseRequest,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyLicenseResponse),
        (status = 400, description = "Missing scroll hash", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
async fn verify_license(
    State(state): State<AppState>,
    Json(req): Json<VerifyLicenseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let scroll_hash = required(req.scroll_hash, "scrollHash")?;
    let TokenVerification { valid, message } = state.issuer.verify_token(&scroll_hash);
    Ok(Json(VerifyLicenseResponse {
        success: true,
        verified: valid,
        message,
        scroll_hash,
    }))
}

/// GET /api/licenses/treaty-log/:position — Look up one ledger entry.
#[utoipa::path(
    get,
    path = "/api/licenses/treaty-log/{position}",
    params(("position" = u64, Path, description = "Treaty ledger position")),
    responses(
        (status = 200, description = "Ledger entry", body = LedgerEntryResponse),
        (status = 404, description = "No entry at position", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
async fn get_ledger_entry(
    State(state): State<AppState>,
    Path(position): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state
        .issuer
        .ledger_entry(position)
        .ok_or_else(|| AppError::not_found(format!("no treaty ledger entry at position {position}")))?;
    Ok(Json(LedgerEntryResponse {
        success: true,
        entry,
        position,
    }))
}

/// GET /api/licenses/treaty-log — Paginated ledger listing.
#[utoipa::path(
    get,
    path = "/api/licenses/treaty-log",
    params(PaginationParams),
    responses(
        (status = 200, description = "Ledger page"),
    ),
    tag = "licenses"
)]
async fn get_ledger_log(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let log = state.issuer.ledger_slice(params.limit, params.offset);
    let count = log.len();
    Ok(Json(serde_json::json!({
        "success": true,
        "log": log,
        "pagination": {
            "limit": params.limit,
            "offset": params.offset,
            "count": count,
        },
    })))
}

/// GET /api/licenses/claimroot/statistics — Issuer statistics.
#[utoipa::path(
    get,
    path = "/api/licenses/claimroot/statistics",
    responses(
        (status = 200, description = "Issuer statistics"),
    ),
    tag = "licenses"
)]
async fn issuer_statistics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let statistics: IssuerStatistics = state.issuer.statistics();
    Ok(Json(serde_json::json!({
        "success": true,
        "statistics": statistics,
        "timestamp": chrono::Utc::now(),
    })))
}
