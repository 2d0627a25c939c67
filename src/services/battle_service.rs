//! The battle state machine.
//!
//! A graded answer deals `score` damage to the boss. Scores below
//! [`COUNTER_THRESHOLD`] let the boss hit back for the shortfall. Health is
//! clamped to `0..=100` on the way in and on the way out. When both sides
//! drop to zero on the same turn the player wins: the boss check runs first.

use crate::error::{Error, Result};
use crate::models::question::{Question, BEHAVIORAL};
use crate::models::session::{InterviewSession, SessionStatus};
use crate::services::grade_parser::{parse_grade, Grade};
use crate::services::llm_service::{ChatMessage, LlmGateway};
use crate::services::prompt_service::{build_grading_prompt, GRADER_PERSONA};
use crate::services::role_catalog::{self, Difficulty, RoleInfo};
use crate::services::session_service::SessionService;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_HEALTH: i32 = 100;
pub const COUNTER_THRESHOLD: i32 = 30;
pub const GRADING_UNAVAILABLE: &str =
    "Unable to grade your answer right now. Please check the API configuration and try again.";

pub fn clamp_health(value: i32) -> i32 {
    value.clamp(0, MAX_HEALTH)
}

pub fn counter_message(player_damage: i32) -> String {
    format!("The boss counterattacks for {} damage!", player_damage)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub damage: i32,
    pub player_damage: i32,
    pub boss_health: i32,
    pub player_health: i32,
    pub feedback: String,
    /// Terminal status reached on this turn, if any.
    pub result: Option<SessionStatus>,
}

pub fn resolve_turn(grade: &Grade, boss_health: i32, player_health: i32) -> TurnOutcome {
    let damage = grade.score.clamp(0, 100);
    let player_damage = if damage < COUNTER_THRESHOLD {
        COUNTER_THRESHOLD - damage
    } else {
        0
    };

    let mut feedback = grade.feedback.clone();
    if player_damage > 0 {
        if !feedback.is_empty() {
            feedback.push(' ');
        }
        feedback.push_str(&counter_message(player_damage));
    }

    let boss_health = clamp_health(clamp_health(boss_health) - damage);
    let player_health = clamp_health(clamp_health(player_health) - player_damage);

    let result = if boss_health == 0 {
        Some(SessionStatus::CompletedWon)
    } else if player_health == 0 {
        Some(SessionStatus::CompletedLost)
    } else {
        None
    };

    TurnOutcome {
        damage,
        player_damage,
        boss_health,
        player_health,
        feedback,
        result,
    }
}

#[derive(Debug, Clone)]
pub struct SubmitAnswer {
    pub answer: String,
    pub question: Option<String>,
    pub boss_health: i32,
    pub player_health: i32,
    pub role: Option<String>,
    pub session_id: Option<Uuid>,
    pub question_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Where a turn's side effects go once grading succeeds.
enum TurnTarget {
    Detached,
    Session {
        session_id: Uuid,
        question_id: Option<Uuid>,
    },
}

#[derive(Clone)]
pub struct BattleService {
    llm: Arc<dyn LlmGateway>,
    sessions: SessionService,
}

impl BattleService {
    pub fn new(llm: Arc<dyn LlmGateway>, sessions: SessionService) -> Self {
        Self { llm, sessions }
    }

    pub async fn grade(
        &self,
        question: &str,
        answer: &str,
        role: &RoleInfo,
        difficulty: Difficulty,
    ) -> Result<Grade> {
        let messages = vec![
            ChatMessage::system(GRADER_PERSONA),
            ChatMessage::user(build_grading_prompt(question, answer, role, difficulty)),
        ];
        let raw = self.llm.call(&messages).await.map_err(|e| {
            tracing::error!(error = ?e, role = role.id, "grading call failed");
            Error::ServiceUnavailable(GRADING_UNAVAILABLE.to_string())
        })?;
        parse_grade(&raw).map_err(|e| {
            tracing::warn!(error = %e, raw = %raw, "grader output could not be parsed");
            Error::ServiceUnavailable(GRADING_UNAVAILABLE.to_string())
        })
    }

    /// Grades an answer and applies the turn. Nothing is written unless
    /// grading succeeds, and the answer, its evaluation and the session update
    /// commit together.
    pub async fn submit_answer(&self, cmd: SubmitAnswer) -> Result<TurnOutcome> {
        let answer = cmd.answer.trim();
        if answer.is_empty() {
            return Err(Error::BadRequest("Answer must not be empty".to_string()));
        }

        let (target, session, stored_question) = self.resolve_target(&cmd).await?;

        let question_text = grading_question(stored_question.as_ref(), cmd.question.as_deref())?;

        let (role, difficulty) = match &session {
            Some(s) => {
                let role = role_catalog::lookup(&s.role);
                (role, s.difficulty.parse().unwrap_or(role.difficulty))
            }
            None => {
                let role = role_catalog::lookup(cmd.role.as_deref().unwrap_or_default());
                (role, role.difficulty)
            }
        };

        let grade = self.grade(&question_text, answer, role, difficulty).await?;

        match target {
            TurnTarget::Detached => Ok(resolve_turn(&grade, cmd.boss_health, cmd.player_health)),
            TurnTarget::Session {
                session_id,
                question_id,
            } => {
                self.persist_turn(
                    session_id,
                    question_id,
                    &question_text,
                    answer,
                    cmd.user_id,
                    &grade,
                )
                .await
            }
        }
    }

    async fn resolve_target(
        &self,
        cmd: &SubmitAnswer,
    ) -> Result<(TurnTarget, Option<InterviewSession>, Option<Question>)> {
        let stored_question = match cmd.question_id {
            Some(id) => Some(self.sessions.get_question(id).await?),
            None => None,
        };

        let session_id = match (cmd.session_id, &stored_question) {
            (Some(sid), Some(q)) if q.session_id != sid => {
                return Err(Error::BadRequest(
                    "Question does not belong to this session".to_string(),
                ))
            }
            (Some(sid), _) => Some(sid),
            (None, Some(q)) => Some(q.session_id),
            (None, None) => None,
        };

        let Some(session_id) = session_id else {
            return Ok((TurnTarget::Detached, None, None));
        };

        let session = self.sessions.get_session(session_id).await?;
        ensure_playable(&session, cmd.user_id)?;

        Ok((
            TurnTarget::Session {
                session_id,
                question_id: cmd.question_id,
            },
            Some(session),
            stored_question,
        ))
    }

    async fn persist_turn(
        &self,
        session_id: Uuid,
        question_id: Option<Uuid>,
        question_text: &str,
        answer: &str,
        user_id: Option<Uuid>,
        grade: &Grade,
    ) -> Result<TurnOutcome> {
        let mut tx = self.sessions.begin().await?;

        // Re-read under lock: the pre-check above ran before the model call.
        let session = SessionService::lock_session(&mut tx, session_id).await?;
        ensure_playable(&session, user_id)?;

        let question_id = match question_id {
            Some(id) => id,
            None => {
                let question = SessionService::add_question(
                    &mut tx,
                    session_id,
                    1,
                    BEHAVIORAL,
                    question_text,
                )
                .await?;
                question.id
            }
        };

        let outcome = resolve_turn(grade, session.boss_health, session.player_health);

        let stored_answer =
            SessionService::insert_answer(&mut tx, question_id, user_id, answer).await?;
        let rubric = grade
            .rubric
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        SessionService::insert_evaluation(
            &mut tx,
            stored_answer.id,
            grade.score,
            &outcome.feedback,
            rubric,
        )
        .await?;
        SessionService::apply_turn(
            &mut tx,
            &session,
            outcome.boss_health,
            outcome.player_health,
            outcome.result,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            session_id = %session_id,
            score = grade.score,
            boss_health = outcome.boss_health,
            player_health = outcome.player_health,
            result = ?outcome.result,
            "turn recorded"
        );
        Ok(outcome)
    }
}

/// The prompt an answer is graded against. A stored question always wins
/// over text sent by the client, since the evaluation is filed under it.
pub fn grading_question(stored: Option<&Question>, supplied: Option<&str>) -> Result<String> {
    if let Some(question) = stored {
        return Ok(question.prompt_text.clone());
    }
    supplied
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::BadRequest("Question must not be empty".to_string()))
}

/// A session accepts turns only while in progress, and an owned session only
/// from its owner.
pub fn ensure_playable(session: &InterviewSession, user_id: Option<Uuid>) -> Result<()> {
    if let Some(owner) = session.user_id {
        if user_id != Some(owner) {
            return Err(Error::Forbidden(
                "This session belongs to another player".to_string(),
            ));
        }
    }
    if !session.is_in_progress() {
        return Err(Error::Conflict(format!(
            "Session is already {}",
            session.status()
        )));
    }
    Ok(())
}
