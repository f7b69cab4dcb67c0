use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::{AppError, Result},
    models::LoginRequest,
    queries::admin_queries,
};

/// Checks the password against every admin row. Issues no session.
pub async fn login_admin(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<StatusCode> {
    if payload.password.is_empty() {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let admins = admin_queries::get_all_admins(&state.db).await?;

    for admin in &admins {
        let is_valid = bcrypt::verify(&payload.password, &admin.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

        if is_valid {
            tracing::info!("Admin {} signed in", admin.id);
            return Ok(StatusCode::NO_CONTENT);
        }
    }

    Err(AppError::Unauthorized("Invalid password".to_string()))
}
