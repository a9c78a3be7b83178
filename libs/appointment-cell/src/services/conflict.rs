use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::SchedulingError;

/// Answers "does this doctor already have a live appointment at this exact
/// instant". Cancelled appointments do not count, so a freed slot can be
/// rebooked.
pub struct ConflictDetectionService {
    supabase: SupabaseClient,
}

impl ConflictDetectionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        instant: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<bool, SchedulingError> {
        let timestamp = instant.to_rfc3339_opts(SecondsFormat::Secs, true);
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_time=eq.{}&status=neq.cancelled&limit=1",
            doctor_id,
            urlencoding::encode(&timestamp)
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::Database(e.to_string()))?;

        debug!(
            "Conflict probe for doctor {} at {}: {} existing",
            doctor_id,
            timestamp,
            result.len()
        );

        Ok(!result.is_empty())
    }
}
