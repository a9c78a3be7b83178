use chrono::Utc;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::AuthenticatedUser;

use crate::models::{Appointment, AppointmentStatus, SchedulingError};
use crate::services::booking::AppointmentBookingService;

/// Governs status changes after an appointment exists. Transitions not in
/// `valid_transitions` are rejected with the current status in the error.
pub struct AppointmentLifecycleService {
    booking: AppointmentBookingService,
    supabase: SupabaseClient,
}

impl AppointmentLifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            booking: AppointmentBookingService::new(config),
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
        match from {
            AppointmentStatus::Scheduled => {
                &[AppointmentStatus::Cancelled, AppointmentStatus::Completed]
            }
            AppointmentStatus::Cancelled => &[],
            AppointmentStatus::Completed => &[],
        }
    }

    pub fn validate_status_transition(
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        if Self::valid_transitions(from).contains(&to) {
            Ok(())
        } else {
            Err(SchedulingError::InvalidTransition(from))
        }
    }

    /// Cancel an appointment on behalf of `actor`. Only the appointment's
    /// doctor or patient may cancel, and only while it is still scheduled.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        actor: &AuthenticatedUser,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self.booking.get_appointment(appointment_id, auth_token).await?;

        if actor.id != appointment.doctor_id && actor.id != appointment.patient_id {
            return Err(SchedulingError::Forbidden);
        }

        Self::validate_status_transition(appointment.status, AppointmentStatus::Cancelled)?;

        let payload = json!({
            "status": AppointmentStatus::Cancelled.to_string(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let updated: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(payload),
                Some(headers),
            )
            .await
            .map_err(|e| SchedulingError::Database(e.to_string()))?;

        let cancelled = updated
            .into_iter()
            .next()
            .ok_or(SchedulingError::AppointmentNotFound)?;

        info!("Cancelled appointment {} by user {}", appointment_id, actor.id);
        Ok(cancelled)
    }
}
