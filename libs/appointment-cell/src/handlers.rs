use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthenticatedUser, Role};
use shared_models::error::AppError;

use crate::models::{parse_appointment_time, BookAppointmentRequest, SchedulingError};
use crate::services::booking::AppointmentBookingService;
use crate::services::lifecycle::AppointmentLifecycleService;

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::DoctorNotFound | SchedulingError::AppointmentNotFound => {
            AppError::NotFound(e.to_string())
        }
        SchedulingError::OutsideAvailability
        | SchedulingError::BadTimeFormat(_)
        | SchedulingError::InvalidTransition(_) => AppError::BadRequest(e.to_string()),
        SchedulingError::SlotTaken => AppError::Conflict(e.to_string()),
        SchedulingError::Forbidden => AppError::Forbidden(e.to_string()),
        SchedulingError::Database(msg) => AppError::Database(msg),
    }
}

/// Book an appointment for the logged-in patient.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    match user.role {
        Role::Patient => {}
        Role::Doctor => {
            return Err(AppError::Forbidden(
                "Only patients can book appointments".to_string(),
            ));
        }
    }

    let instant =
        parse_appointment_time(&request.appointment_time).map_err(map_scheduling_error)?;

    let service = AppointmentBookingService::new(&state);
    let appointment = service
        .book_appointment(user.id, request.doctor_id, instant, token)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

/// List the logged-in doctor's appointments, soonest first.
#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    match user.role {
        Role::Doctor => {}
        Role::Patient => {
            return Err(AppError::Forbidden(
                "Only doctors can view their appointment schedule".to_string(),
            ));
        }
    }

    let service = AppointmentBookingService::new(&state);
    let appointments = service
        .list_for_doctor(user.id, token)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!(appointments)))
}

/// Cancel an appointment. Ownership and status checks live in the service;
/// either party on the appointment may cancel while it is still scheduled.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();

    let service = AppointmentLifecycleService::new(&state);
    let cancelled = service
        .cancel_appointment(appointment_id, &user, token)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": cancelled,
        "message": "Appointment cancelled successfully"
    })))
}
