//! Request handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::transaction::{BroadcastTransactionRequest, MonitoringStatusResponse};

#[derive(Debug, Serialize)]
pub struct HealthcheckResponse {
    pub message: &'static str,
}

/// `GET /healthcheck`
pub async fn healthcheck() -> Json<HealthcheckResponse> {
    Json(HealthcheckResponse {
        message: "Healthcheck Successful",
    })
}

/// `POST /transactions/broadcast`
///
/// Validates, forwards once, then holds the connection open until the
/// transaction reaches a terminal status.
pub async fn broadcast_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BroadcastTransactionRequest>, JsonRejection>,
) -> Result<Json<MonitoringStatusResponse>, ApiError> {
    let request_id = request_id(&headers);

    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(request_id = %request_id, error = %rejection.body_text(), "Malformed broadcast request");
        ApiError::from(rejection)
    })?;

    request.validate().map_err(|e| {
        tracing::warn!(request_id = %request_id, error = %e, "Invalid broadcast request");
        ApiError::from(e)
    })?;

    let broadcast = state.transactions.forward(&request).await?;

    let status = state
        .transactions
        .poll_until_terminal(&broadcast.tx_hash, state.transactions.poll_interval())
        .await?;

    Ok(Json(status))
}
