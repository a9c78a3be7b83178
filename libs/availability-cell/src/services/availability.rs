use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, AvailabilityWindow, AvailabilityWindowInput};

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Replace a doctor's entire weekly schedule. The old windows are
    /// discarded and the new set installed in a single transaction on the
    /// database side, so concurrent readers see either the old set or the
    /// new one. An empty list clears the schedule.
    pub async fn replace_availability(
        &self,
        doctor_id: Uuid,
        windows: Vec<AvailabilityWindowInput>,
        auth_token: &str,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        debug!("Replacing availability for doctor {} with {} windows", doctor_id, windows.len());

        for window in &windows {
            if window.start_time >= window.end_time {
                return Err(AvailabilityError::Validation(format!(
                    "Window start time {} must be before end time {}",
                    window.start_time, window.end_time
                )));
            }
        }

        let payload = json!({
            "p_doctor_id": doctor_id,
            "p_windows": windows.iter().map(|w| json!({
                "day_of_week": w.day_of_week.to_string(),
                "start_time": w.start_time.format("%H:%M:%S").to_string(),
                "end_time": w.end_time.format("%H:%M:%S").to_string(),
            })).collect::<Vec<_>>()
        });

        let result: Vec<Value> = self.supabase.request(
            Method::POST,
            "/rest/v1/rpc/replace_doctor_availability",
            Some(auth_token),
            Some(payload),
        ).await.map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let stored: Vec<AvailabilityWindow> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<AvailabilityWindow>, _>>()
            .map_err(|e| AvailabilityError::Database(format!("Failed to parse windows: {}", e)))?;

        debug!("Installed {} windows for doctor {}", stored.len(), doctor_id);
        Ok(stored)
    }

    /// Fetch a doctor's current weekly schedule. Order is not significant.
    pub async fn get_doctor_availability(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let path = format!(
            "/rest/v1/availability_windows?doctor_id=eq.{}&order=day_of_week.asc,start_time.asc",
            doctor_id
        );
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let windows: Vec<AvailabilityWindow> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<AvailabilityWindow>, _>>()
            .map_err(|e| AvailabilityError::Database(format!("Failed to parse windows: {}", e)))?;

        Ok(windows)
    }
}
