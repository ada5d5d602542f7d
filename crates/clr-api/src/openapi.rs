// SPDX-License-Identifier: BUSL-1.1
//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClaimRoot API — License Issuance and Vault",
        version = "0.3.7",
        description = "License issuance and storage for the ClaimRoot stack.\n\nProvides:\n- **License generation** with treaty ledger positions and scroll hash binding\n- **Scroll hash verification** against the treaty ledger\n- **Treaty ledger** queries, single entry and paginated\n- **License Vault** storage with backup replication, multi-key lookup, verification, JSON export, statistics, audit trail, and health\n\nAll endpoints are unauthenticated; deploy behind a trusted gateway.",
        license(name = "BUSL-1.1"),
        contact(name = "ClaimRoot", url = "https://github.com/claimroot/stack")
    ),
    servers(
        (url = "http://localhost:4100", description = "Local development server"),
    ),
    paths(
        // ── License Issuer ──────────────────────────────────────────────
        crate::routes::licenses::generate_license,
        crate::routes::licenses::verify_license,
        crate::routes::licenses::get_ledger_entry,
        crate::routes::licenses::get_ledger_log,
        crate::routes::licenses::issuer_statistics,
        // ── License Vault ───────────────────────────────────────────────
        crate::routes::vault::get_license,
        crate::routes::vault::licenses_for_user,
        crate::routes::vault::licenses_for_domain,
        crate::routes::vault::licenses_for_app,
        crate::routes::vault::verify_license,
        crate::routes::vault::export_license,
        crate::routes::vault::vault_statistics,
        crate::routes::vault::audit_log,
        crate::routes::vault::audit_log_for_license,
        crate::routes::vault::vault_health,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::licenses::GenerateLicenseRequest,
            crate::routes::licenses::GenerateLicenseResponse,
            crate::routes::licenses::VaultConfirmation,
            crate::routes::licenses::VerifyLicenseRequest,
            crate::routes::licenses::VerifyLicenseResponse,
            crate::routes::licenses::LedgerEntryResponse,
        )
    ),
    tags(
        (name = "licenses", description = "License issuance and treaty ledger"),
        (name = "vault", description = "License Vault storage and audit"),
    )
)]
pub struct ApiDoc;

/// Serve the assembled spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_includes_all_route_prefixes() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.contains("/api/licenses/generate")));
        assert!(paths.iter().any(|p| p.contains("/api/licenses/treaty-log")));
        assert!(paths.iter().any(|p| p.contains("/api/licenses/vault")));
    }
}
