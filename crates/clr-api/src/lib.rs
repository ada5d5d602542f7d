// SPDX-License-Identifier: BUSL-1.1
//! # clr-api — Axum API Services for the ClaimRoot Stack
//!
//! HTTP surface over the License Issuer (`clr-ledger`) and the License
//! Vault (`clr-vault`).
//!
//! ## API Surface
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/api/licenses/generate`, `/verify`, `/treaty-log/*`, `/claimroot/*` | [`routes::licenses`] | License Issuer |
//! | `/api/licenses/vault/*` | [`routes::vault`] | License Vault |
//! | `/health/*` | [`app`] | Unauthenticated probes |
//! | `/openapi.json` | [`openapi`] | Generated spec |
//!
//! No authentication layer: the service is deployed behind a trusted
//! gateway, matching the existing API contract.

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::licenses::router())
        .merge(routes::vault::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http());

    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(probes).merge(api).with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the in-memory stores are accessible and
/// the mesh transport reports connected.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.issuer.current_position();
    let _ = state.vault.len();
    if !state.vault.health().backup_connected {
        return (StatusCode::SERVICE_UNAVAILABLE, "mesh disconnected").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
