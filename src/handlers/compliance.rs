// Operator-facing compliance endpoints
//
// Everything here goes through the compliance store directly; the
// evaluation algorithm itself never clears a hit-and-run flag, so the
// clear endpoint is the administrative escape hatch.

use crate::core::error::AdminError;
use crate::core::state::AppState;
use crate::models::admin::{
    ComplianceListQuery, CompliancePairQuery, RecordListResponse, RecordResponse,
    SuccessResponse, ThresholdQuery,
};
use crate::utils::auth::verify_api_key;
use crate::wal::wal::WalOperation;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Look up one compliance record
///
/// GET /compliance/record?api_key=<key>&user_id=<id>&torrent_id=<id>
pub async fn record_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompliancePairQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized compliance record access attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let record = state
        .compliance_store
        .get(params.user_id, params.torrent_id)
        .ok_or_else(|| {
            AdminError::NotFound(format!(
                "No compliance record for user {} on torrent {}",
                params.user_id, params.torrent_id
            ))
        })?;

    Ok((
        StatusCode::OK,
        Json(RecordResponse {
            success: true,
            record,
        }),
    )
        .into_response())
}

/// List all records currently flagged as hit-and-run
///
/// GET /compliance/list?api_key=<key>
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ComplianceListQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized compliance list access attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let records = state.compliance_store.flagged();

    Ok((
        StatusCode::OK,
        Json(RecordListResponse {
            success: true,
            records,
        }),
    )
        .into_response())
}

/// Clear the hit-and-run flag on one record
///
/// GET /compliance/clear?api_key=<key>&user_id=<id>&torrent_id=<id>
pub async fn clear_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompliancePairQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized compliance clear attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let record = state
        .compliance_store
        .clear_hit_and_run(params.user_id, params.torrent_id)
        .ok_or_else(|| {
            AdminError::NotFound(format!(
                "No compliance record for user {} on torrent {}",
                params.user_id, params.torrent_id
            ))
        })?;

    state
        .wal
        .log_operation(&WalOperation::UpsertRecord {
            record: record.clone(),
        })
        .map_err(|e| AdminError::WalError(e.to_string()))?;

    info!(
        user_id = params.user_id,
        torrent_id = params.torrent_id,
        "Hit-and-run flag cleared by operator"
    );

    Ok((
        StatusCode::OK,
        Json(RecordResponse {
            success: true,
            record,
        }),
    )
        .into_response())
}

/// Update the required seeding minutes at runtime
///
/// GET /compliance/threshold?api_key=<key>&minutes=<n>
///
/// Announces already in flight keep the value they read; subsequent
/// evaluations pick up the new threshold.
pub async fn threshold_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ThresholdQuery>,
) -> Result<Response, AdminError> {
    if !verify_api_key(&params.api_key, &state.config.api.api_key) {
        warn!("Unauthorized threshold update attempt");
        return Err(AdminError::InvalidApiKey);
    }

    let previous = state
        .required_seeding_minutes
        .swap(params.minutes, Ordering::Relaxed);

    info!(
        previous_minutes = previous,
        minutes = params.minutes,
        "Seeding requirement updated"
    );

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: format!(
                "Required seeding minutes updated from {} to {}",
                previous, params.minutes
            ),
        }),
    )
        .into_response())
}
