use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFeedback {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub rating: i32,
    pub feedback_text: Option<String>,
    pub created_at: DateTime<Utc>,
}
