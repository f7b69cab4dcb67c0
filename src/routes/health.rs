use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    AppState, database,
    error::{AppError, Result},
    services::storage_service,
};

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let pool = database::check_health(&state.db).await?;

    for bucket in [&state.storage.products_bucket, &state.storage.banner_bucket] {
        storage_service::check_bucket(&state.s3_client, bucket)
            .await
            .map_err(|e| AppError::StorageError(format!("Bucket {} unreachable: {}", bucket, e)))?;
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "database": "connected",
            "connections": pool,
            "storage": "connected"
        })),
    ))
}
