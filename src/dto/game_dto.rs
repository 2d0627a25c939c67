use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn full_health() -> i32 {
    crate::services::battle_service::MAX_HEALTH
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub difficulty: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartGameRequest {
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub session_id: Uuid,
    pub game_id: String,
    pub role: String,
    pub difficulty: String,
    pub total_questions: u32,
    pub boss_health: i32,
    pub player_health: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub role: Option<String>,
    #[serde(default)]
    pub question_number: u32,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<Uuid>,
    pub question_number: u32,
    pub question: String,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Answer is required"))]
    pub answer: String,
    pub question: Option<String>,
    #[serde(default = "full_health")]
    pub boss_health: i32,
    #[serde(default = "full_health")]
    pub player_health: i32,
    pub role: Option<String>,
    pub session_id: Option<Uuid>,
    pub question_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub damage: i32,
    pub boss_health: i32,
    pub player_health: i32,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbandonRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbandonResponse {
    pub session_id: Uuid,
    pub status: String,
}
