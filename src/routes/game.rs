use axum::{extract::State, Json};
use validator::Validate;

use crate::dto::game_dto::{
    AbandonRequest, AbandonResponse, AnswerRequest, AnswerResponse, QuestionRequest,
    QuestionResponse, StartGameRequest, StartGameResponse,
};
use crate::middleware::auth::MaybeUser;
use crate::services::battle_service::{ensure_playable, SubmitAnswer};
use crate::services::question_service::TOTAL_QUESTIONS;
use crate::services::role_catalog;
use crate::AppState;

#[axum::debug_handler]
pub async fn start_game(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Json(req): Json<StartGameRequest>,
) -> crate::error::Result<Json<StartGameResponse>> {
    let role = role_catalog::lookup(req.role.as_deref().unwrap_or_default());
    let session = state.session_service.create_session(user_id, role).await?;
    tracing::info!(session_id = %session.id, role = role.id, "game started");

    Ok(Json(StartGameResponse {
        session_id: session.id,
        game_id: format!("game_{}", session.id),
        role: session.role,
        difficulty: session.difficulty,
        total_questions: TOTAL_QUESTIONS,
        boss_health: session.boss_health,
        player_health: session.player_health,
    }))
}

#[axum::debug_handler]
pub async fn next_question(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Json(req): Json<QuestionRequest>,
) -> crate::error::Result<Json<QuestionResponse>> {
    let generated = state
        .question_service
        .next_question(req.role.as_deref(), req.question_number, req.session_id, user_id)
        .await?;

    Ok(Json(QuestionResponse {
        question_id: generated.question_id,
        question_number: generated.question_number,
        question: generated.question,
        total_questions: TOTAL_QUESTIONS,
    }))
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Json(req): Json<AnswerRequest>,
) -> crate::error::Result<Json<AnswerResponse>> {
    req.validate()?;
    let outcome = state
        .battle_service
        .submit_answer(SubmitAnswer {
            answer: req.answer,
            question: req.question,
            boss_health: req.boss_health,
            player_health: req.player_health,
            role: req.role,
            session_id: req.session_id,
            question_id: req.question_id,
            user_id,
        })
        .await?;

    Ok(Json(AnswerResponse {
        damage: outcome.damage,
        boss_health: outcome.boss_health,
        player_health: outcome.player_health,
        feedback: outcome.feedback,
        status: outcome.result.map(|s| s.as_str().to_string()),
    }))
}

#[axum::debug_handler]
pub async fn abandon_game(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Json(req): Json<AbandonRequest>,
) -> crate::error::Result<Json<AbandonResponse>> {
    let session = state.session_service.get_session(req.session_id).await?;
    ensure_playable(&session, user_id)?;
    let updated = state.session_service.abandon(req.session_id).await?;

    Ok(Json(AbandonResponse {
        session_id: updated.id,
        status: updated.status,
    }))
}
