// HTTP route handlers for the Veritas API

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use veritas_common::constraints::{validate, ConstraintReport};
use veritas_common::types::{VerifyReport, VerifyRequest};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ConstraintRequest {
    pub input: String,
    pub constraints: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub backend: String,
    pub timeout_ms: u64,
}

/// POST /verify - Run a candidate against its test cases
///
/// Always 200: failures are described by the report itself.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Json<VerifyReport> {
    let report = state.harness.verify_request(&request).await;
    info!(
        cases = request.test_cases.len(),
        success = report.success,
        passed = report.passed,
        "Verify request served"
    );
    Json(report)
}

/// POST /constraints - Check one input against constraint strings
pub async fn check_constraints(Json(request): Json<ConstraintRequest>) -> Json<ConstraintReport> {
    Json(validate(&request.input, &request.constraints))
}

/// GET /status - Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let settings = state.harness.settings();
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "ok",
            backend: settings.backend.to_string(),
            timeout_ms: settings.timeout_ms,
        }),
    )
}
