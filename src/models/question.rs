use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const BEHAVIORAL: &str = "behavioral";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub session_id: Uuid,
    /// 1-based, strictly increasing within a session.
    pub turn_index: i32,
    pub question_type: Option<String>,
    pub prompt_text: String,
    pub created_at: DateTime<Utc>,
}
