use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use availability_cell::services::availability::AvailabilityService;
use availability_cell::services::slot::is_within_availability;
use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};

use crate::models::{Appointment, AppointmentStatus, SchedulingError};
use crate::services::conflict::ConflictDetectionService;

/// Orchestrates a booking end to end: resolve the doctor, check the slot
/// against the weekly schedule, check for a clash, then insert. The insert
/// itself can still lose a race, in which case the database's uniqueness
/// constraint reports the clash and the caller sees the same error as a
/// pre-checked one.
pub struct AppointmentBookingService {
    supabase: SupabaseClient,
    availability: AvailabilityService,
    conflicts: ConflictDetectionService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            availability: AvailabilityService::new(config),
            conflicts: ConflictDetectionService::new(config),
        }
    }

    pub async fn book_appointment(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        appointment_time: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking request: patient {} with doctor {} at {}",
            patient_id, doctor_id, appointment_time
        );

        self.resolve_doctor(doctor_id, auth_token).await?;

        let windows = self
            .availability
            .get_doctor_availability(doctor_id, auth_token)
            .await
            .map_err(|e| SchedulingError::Database(e.to_string()))?;

        if !is_within_availability(&windows, appointment_time) {
            return Err(SchedulingError::OutsideAvailability);
        }

        if self
            .conflicts
            .has_conflict(doctor_id, appointment_time, auth_token)
            .await?
        {
            return Err(SchedulingError::SlotTaken);
        }

        let payload = json!({
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "appointment_time": appointment_time.to_rfc3339(),
            "status": AppointmentStatus::Scheduled.to_string(),
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let created: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(payload),
                Some(headers),
            )
            .await
            .map_err(|e| match e {
                // Lost the race to a concurrent booking on the same slot.
                SupabaseError::Conflict(_) => SchedulingError::SlotTaken,
                other => SchedulingError::Database(other.to_string()),
            })?;

        let appointment = created
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::Database("Insert returned no rows".to_string()))?;

        info!("Booked appointment {}", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let result: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Database(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or(SchedulingError::AppointmentNotFound)
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        debug!("Listing appointments for doctor {}", doctor_id);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=appointment_time.asc",
            doctor_id
        );

        self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Database(e.to_string()))
    }

    async fn resolve_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<(), SchedulingError> {
        let path = format!("/rest/v1/users?id=eq.{}&role=eq.doctor&limit=1", doctor_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(SchedulingError::DoctorNotFound);
        }
        Ok(())
    }
}
