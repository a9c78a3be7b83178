use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthenticatedUser, Role};
use shared_models::error::AppError;

use crate::models::{AvailabilityError, AvailabilityWindowInput};
use crate::services::availability::AvailabilityService;

/// Set or replace the weekly availability for the logged-in doctor. The
/// submitted list replaces any existing windows wholesale.
#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(windows): Json<Vec<AvailabilityWindowInput>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    match user.role {
        Role::Doctor => {}
        Role::Patient => {
            return Err(AppError::Forbidden(
                "Only doctors can manage availability".to_string(),
            ));
        }
    }

    let service = AvailabilityService::new(&state);

    let stored = service
        .replace_availability(user.id, windows, token)
        .await
        .map_err(|e| match e {
            AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
            AvailabilityError::Database(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!({
        "success": true,
        "availability": stored,
        "message": "Availability updated successfully"
    })))
}

/// List the logged-in doctor's current availability windows.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    match user.role {
        Role::Doctor => {}
        Role::Patient => {
            return Err(AppError::Forbidden(
                "Only doctors can manage availability".to_string(),
            ));
        }
    }

    let service = AvailabilityService::new(&state);

    let windows = service
        .get_doctor_availability(user.id, token)
        .await
        .map_err(|e| match e {
            AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
            AvailabilityError::Database(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!(windows)))
}
