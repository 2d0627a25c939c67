use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::evaluation::Evaluation;
use crate::models::question::Question;
use crate::models::session::{InterviewSession, SessionStatus};
use crate::services::role_catalog::RoleInfo;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// One row of a session's transcript: a question with its latest answer and
/// that answer's evaluation, if any.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TranscriptRow {
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub turn_index: i32,
    pub question_type: Option<String>,
    pub prompt_text: String,
    pub answer_text: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub score: Option<i32>,
    pub feedback_text: Option<String>,
}

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn create_session(
        &self,
        user_id: Option<Uuid>,
        role: &RoleInfo,
    ) -> Result<InterviewSession> {
        let session = sqlx::query_as::<_, InterviewSession>(
            r#"
            INSERT INTO interview_sessions (user_id, role, difficulty, status)
            VALUES ($1, $2, $3, 'in_progress')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(role.id)
        .bind(role.difficulty.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn get_session(&self, session_id: Uuid) -> Result<InterviewSession> {
        sqlx::query_as::<_, InterviewSession>(r#"SELECT * FROM interview_sessions WHERE id = $1"#)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    pub async fn get_question(&self, question_id: Uuid) -> Result<Question> {
        sqlx::query_as::<_, Question>(r#"SELECT * FROM questions WHERE id = $1"#)
            .bind(question_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))
    }

    /// Locks the session row for the rest of the transaction. Concurrent
    /// turns on the same session queue up here.
    pub async fn lock_session(
        conn: &mut PgConnection,
        session_id: Uuid,
    ) -> Result<InterviewSession> {
        sqlx::query_as::<_, InterviewSession>(
            r#"SELECT * FROM interview_sessions WHERE id = $1 FOR UPDATE"#,
        )
        .bind(session_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    /// Appends a question to a session. The requested index is honoured
    /// unless it would not be strictly greater than the last stored turn.
    pub async fn add_question(
        conn: &mut PgConnection,
        session_id: Uuid,
        requested_turn: i32,
        question_type: &str,
        prompt_text: &str,
    ) -> Result<Question> {
        let last_turn: Option<i32> =
            sqlx::query_scalar(r#"SELECT MAX(turn_index) FROM questions WHERE session_id = $1"#)
                .bind(session_id)
                .fetch_one(&mut *conn)
                .await?;
        let turn_index = next_turn_index(requested_turn, last_turn)
            .ok_or_else(|| Error::Conflict("Session has no turns left".to_string()))?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (session_id, turn_index, question_type, prompt_text)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(turn_index)
        .bind(question_type)
        .bind(prompt_text)
        .fetch_one(&mut *conn)
        .await?;

        Ok(question)
    }

    /// Stores a generated question under the session lock so two requests
    /// cannot claim the same turn.
    pub async fn record_question(
        &self,
        session_id: Uuid,
        requested_turn: i32,
        question_type: &str,
        prompt_text: &str,
    ) -> Result<Question> {
        let mut tx = self.begin().await?;
        let session = Self::lock_session(&mut tx, session_id).await?;
        if !session.is_in_progress() {
            return Err(Error::Conflict(format!(
                "Session is already {}",
                session.status()
            )));
        }
        let question =
            Self::add_question(&mut tx, session_id, requested_turn, question_type, prompt_text)
                .await?;
        tx.commit().await?;

        tracing::info!(
            session_id = %session_id,
            turn_index = question.turn_index,
            "question recorded"
        );
        Ok(question)
    }

    pub async fn insert_answer(
        conn: &mut PgConnection,
        question_id: Uuid,
        user_id: Option<Uuid>,
        answer_text: &str,
    ) -> Result<Answer> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (question_id, user_id, answer_text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(question_id)
        .bind(user_id)
        .bind(answer_text)
        .fetch_one(conn)
        .await?;

        Ok(answer)
    }

    pub async fn insert_evaluation(
        conn: &mut PgConnection,
        answer_id: Uuid,
        score: i32,
        feedback_text: &str,
        rubric_scores: Option<JsonValue>,
    ) -> Result<Evaluation> {
        let evaluation = sqlx::query_as::<_, Evaluation>(
            r#"
            INSERT INTO evaluations (answer_id, score, feedback_text, rubric_scores)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(answer_id)
        .bind(score)
        .bind(feedback_text)
        .bind(rubric_scores)
        .fetch_one(conn)
        .await?;

        Ok(evaluation)
    }

    /// Writes post-turn health and, when the turn ended the battle, the
    /// terminal status. Only in-progress rows are touched.
    pub async fn apply_turn(
        conn: &mut PgConnection,
        session: &InterviewSession,
        boss_health: i32,
        player_health: i32,
        next_status: Option<SessionStatus>,
    ) -> Result<InterviewSession> {
        let status = match next_status {
            Some(next) if session.status().can_transition_to(next) => next,
            Some(next) => {
                return Err(Error::Conflict(format!(
                    "Cannot move session from {} to {}",
                    session.status(),
                    next
                )))
            }
            None => session.status(),
        };

        sqlx::query_as::<_, InterviewSession>(
            r#"
            UPDATE interview_sessions
            SET boss_health = $2,
                player_health = $3,
                status = $4,
                ended_at = CASE WHEN $4 = 'in_progress' THEN ended_at ELSE NOW() END
            WHERE id = $1 AND status = 'in_progress'
            RETURNING *
            "#,
        )
        .bind(session.id)
        .bind(boss_health)
        .bind(player_health)
        .bind(status.as_str())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::Conflict("Session is no longer in progress".to_string()))
    }

    pub async fn abandon(&self, session_id: Uuid) -> Result<InterviewSession> {
        let mut tx = self.begin().await?;
        let session = Self::lock_session(&mut tx, session_id).await?;
        let updated = Self::apply_turn(
            &mut tx,
            &session,
            session.boss_health,
            session.player_health,
            Some(SessionStatus::Abandoned),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(session_id = %session_id, "session abandoned");
        Ok(updated)
    }

    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<InterviewSession>> {
        let sessions = sqlx::query_as::<_, InterviewSession>(
            r#"
            SELECT * FROM interview_sessions
            WHERE user_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    pub async fn transcripts(&self, session_ids: &[Uuid]) -> Result<Vec<TranscriptRow>> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, TranscriptRow>(
            r#"
            SELECT q.session_id, q.id AS question_id, q.turn_index, q.question_type, q.prompt_text,
                   a.answer_text, a.answered_at, e.score, e.feedback_text
            FROM questions q
            LEFT JOIN LATERAL (
                SELECT id, answer_text, answered_at FROM answers
                WHERE question_id = q.id
                ORDER BY answered_at DESC
                LIMIT 1
            ) a ON TRUE
            LEFT JOIN evaluations e ON e.answer_id = a.id
            WHERE q.session_id = ANY($1)
            ORDER BY q.session_id, q.turn_index ASC
            "#,
        )
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Highest turn a session may reach.
pub const MAX_TURN_INDEX: i32 = 10_000;

/// `None` once the session has used up [`MAX_TURN_INDEX`] turns or the
/// requested turn is beyond it.
pub fn next_turn_index(requested_turn: i32, last_turn: Option<i32>) -> Option<i32> {
    let floor = match last_turn {
        Some(t) => t.checked_add(1)?,
        None => 1,
    };
    let turn = requested_turn.max(floor);
    (turn <= MAX_TURN_INDEX).then_some(turn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_question_honours_the_requested_turn() {
        assert_eq!(next_turn_index(1, None), Some(1));
        assert_eq!(next_turn_index(3, None), Some(3));
        assert_eq!(next_turn_index(0, None), Some(1));
    }

    #[test]
    fn turn_index_never_repeats_or_goes_backwards() {
        assert_eq!(next_turn_index(2, Some(1)), Some(2));
        assert_eq!(next_turn_index(2, Some(2)), Some(3));
        assert_eq!(next_turn_index(1, Some(4)), Some(5));
    }

    #[test]
    fn exhausted_turns_are_refused_instead_of_wrapping() {
        assert_eq!(next_turn_index(1, Some(i32::MAX)), None);
        assert_eq!(next_turn_index(1, Some(MAX_TURN_INDEX)), None);
        assert_eq!(next_turn_index(MAX_TURN_INDEX + 1, None), None);
        assert_eq!(next_turn_index(i32::MAX, None), None);
        assert_eq!(next_turn_index(1, Some(MAX_TURN_INDEX - 1)), Some(MAX_TURN_INDEX));
    }
}
