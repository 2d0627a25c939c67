use crate::dto::history_dto::{QuestionHistory, SessionHistory};
use crate::error::Result;
use crate::models::session::InterviewSession;
use crate::services::session_service::{SessionService, TranscriptRow};
use std::collections::HashMap;
use uuid::Uuid;

pub const HISTORY_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct HistoryService {
    sessions: SessionService,
}

impl HistoryService {
    pub fn new(sessions: SessionService) -> Self {
        Self { sessions }
    }

    pub async fn for_user(&self, user_id: Uuid) -> Result<Vec<SessionHistory>> {
        let sessions = self.sessions.list_for_user(user_id, HISTORY_LIMIT).await?;
        let ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
        let rows = self.sessions.transcripts(&ids).await?;
        Ok(assemble_history(sessions, rows))
    }
}

/// Groups transcript rows under their sessions. Session order is kept as
/// given; questions are ordered by turn.
pub fn assemble_history(
    sessions: Vec<InterviewSession>,
    rows: Vec<TranscriptRow>,
) -> Vec<SessionHistory> {
    let mut by_session: HashMap<Uuid, Vec<QuestionHistory>> = HashMap::new();
    for row in rows {
        by_session
            .entry(row.session_id)
            .or_default()
            .push(QuestionHistory {
                question_id: row.question_id,
                turn_index: row.turn_index,
                question_type: row.question_type,
                prompt: row.prompt_text,
                answer: row.answer_text,
                answered_at: row.answered_at,
                score: row.score,
                feedback: row.feedback_text,
            });
    }

    sessions
        .into_iter()
        .map(|s| {
            let mut questions = by_session.remove(&s.id).unwrap_or_default();
            questions.sort_by_key(|q| q.turn_index);
            SessionHistory {
                session_id: s.id,
                role: s.role,
                difficulty: s.difficulty,
                status: s.status,
                boss_health: s.boss_health,
                player_health: s.player_health,
                started_at: Some(s.started_at),
                ended_at: s.ended_at,
                questions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(id: Uuid) -> InterviewSession {
        InterviewSession {
            id,
            user_id: None,
            role: "software_engineer".into(),
            difficulty: "Medium".into(),
            status: "in_progress".into(),
            boss_health: 100,
            player_health: 100,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    fn row(session_id: Uuid, turn_index: i32, score: Option<i32>) -> TranscriptRow {
        TranscriptRow {
            session_id,
            question_id: Uuid::new_v4(),
            turn_index,
            question_type: Some("behavioral".into()),
            prompt_text: format!("Question {}", turn_index),
            answer_text: score.map(|_| "An answer".to_string()),
            answered_at: score.map(|_| Utc::now()),
            score,
            feedback_text: score.map(|_| "Feedback".to_string()),
        }
    }

    #[test]
    fn rows_are_grouped_and_ordered_by_turn() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![row(a, 2, None), row(b, 1, Some(40)), row(a, 1, Some(85))];

        let history = assemble_history(vec![session(b), session(a)], rows);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].session_id, b);
        assert_eq!(history[1].questions.len(), 2);
        assert_eq!(history[1].questions[0].turn_index, 1);
        assert_eq!(history[1].questions[0].score, Some(85));
        assert_eq!(history[1].questions[1].answer, None);
    }

    #[test]
    fn sessions_without_questions_are_still_listed() {
        let id = Uuid::new_v4();
        let history = assemble_history(vec![session(id)], Vec::new());
        assert_eq!(history.len(), 1);
        assert!(history[0].questions.is_empty());
    }
}
