use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionHistory {
    pub question_id: Uuid,
    pub turn_index: i32,
    pub question_type: Option<String>,
    pub prompt: String,
    pub answer: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub score: Option<i32>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistory {
    pub session_id: Uuid,
    pub role: String,
    pub difficulty: String,
    pub status: String,
    pub boss_health: i32,
    pub player_health: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<SessionHistory>,
}
