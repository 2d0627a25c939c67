use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Evaluation {
    pub id: Uuid,
    pub answer_id: Uuid,
    pub score: i32,
    pub feedback_text: String,
    pub rubric_scores: Option<JsonValue>,
}
