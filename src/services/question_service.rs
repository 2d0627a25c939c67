use crate::error::{Error, Result};
use crate::models::question::BEHAVIORAL;
use crate::services::battle_service::ensure_playable;
use crate::services::llm_service::{ChatMessage, LlmGateway};
use crate::services::prompt_service::{build_question_prompt, INTERVIEWER_PERSONA};
use crate::services::role_catalog::{self, Difficulty, RoleInfo};
use crate::services::session_service::{SessionService, MAX_TURN_INDEX};
use std::sync::Arc;
use uuid::Uuid;

/// Advertised length of an interview. Not enforced.
pub const TOTAL_QUESTIONS: u32 = 5;
pub const GENERATION_UNAVAILABLE: &str =
    "Unable to generate a question right now. Please check the API configuration and try again.";

#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    pub question_id: Option<Uuid>,
    /// 1-based number of the question just generated.
    pub question_number: u32,
    pub question: String,
}

#[derive(Clone)]
pub struct QuestionService {
    llm: Arc<dyn LlmGateway>,
    sessions: SessionService,
}

impl QuestionService {
    pub fn new(llm: Arc<dyn LlmGateway>, sessions: SessionService) -> Self {
        Self { llm, sessions }
    }

    pub async fn generate(
        &self,
        role: &RoleInfo,
        turn_number: u32,
        difficulty: Difficulty,
    ) -> Result<String> {
        let messages = vec![
            ChatMessage::system(INTERVIEWER_PERSONA),
            ChatMessage::user(build_question_prompt(role, turn_number, difficulty)),
        ];
        let raw = self.llm.call(&messages).await.map_err(|e| {
            tracing::error!(error = ?e, role = role.id, turn_number, "question generation failed");
            Error::ServiceUnavailable(GENERATION_UNAVAILABLE.to_string())
        })?;
        clean_question(&raw).ok_or_else(|| {
            tracing::warn!(raw = %raw, "model returned no usable question text");
            Error::ServiceUnavailable(GENERATION_UNAVAILABLE.to_string())
        })
    }

    /// Generates the question after `question_number` and, when a session is
    /// named, stores it as that session's next turn.
    pub async fn next_question(
        &self,
        role_id: Option<&str>,
        question_number: u32,
        session_id: Option<Uuid>,
        user_id: Option<Uuid>,
    ) -> Result<GeneratedQuestion> {
        let turn_number = question_number.saturating_add(1);

        let session = match session_id {
            Some(id) => {
                let requested_turn = i32::try_from(turn_number)
                    .ok()
                    .filter(|t| *t <= MAX_TURN_INDEX)
                    .ok_or_else(|| Error::BadRequest("questionNumber is too large".to_string()))?;
                let session = self.sessions.get_session(id).await?;
                ensure_playable(&session, user_id)?;
                Some((session, requested_turn))
            }
            None => None,
        };

        let (role, difficulty) = match &session {
            Some((s, _)) => {
                let role = role_catalog::lookup(&s.role);
                (role, s.difficulty.parse().unwrap_or(role.difficulty))
            }
            None => {
                let role = role_catalog::lookup(role_id.unwrap_or_default());
                (role, role.difficulty)
            }
        };

        let question = self.generate(role, turn_number, difficulty).await?;

        let question_id = match session {
            Some((s, requested_turn)) => {
                let stored = self
                    .sessions
                    .record_question(s.id, requested_turn, BEHAVIORAL, &question)
                    .await?;
                Some(stored.id)
            }
            None => None,
        };

        Ok(GeneratedQuestion {
            question_id,
            question_number: turn_number,
            question,
        })
    }
}

/// Strips the wrapping a model tends to add despite instructions: a
/// "Question:" label, numbering and surrounding quotes.
pub fn clean_question(raw: &str) -> Option<String> {
    let mut text = raw.trim();
    for prefix in ["Question:", "question:", "Q:"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
        }
    }
    // List markers only: one or two digits, a dot or paren, then whitespace.
    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if (1..=2).contains(&digits) {
        let rest = &text[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if rest.starts_with(char::is_whitespace) {
                text = rest;
            }
        }
    }
    let text = text
        .trim()
        .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::{LlmError, MockLlmGateway};
    use sqlx::postgres::PgPoolOptions;

    fn service(llm: MockLlmGateway) -> QuestionService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@127.0.0.1:1/unused")
            .unwrap();
        QuestionService::new(Arc::new(llm), SessionService::new(pool))
    }

    #[test]
    fn clean_question_strips_common_wrapping() {
        assert_eq!(
            clean_question("  \"Tell me about a conflict.\"  ").as_deref(),
            Some("Tell me about a conflict.")
        );
        assert_eq!(
            clean_question("Question: 1. Describe a failure.").as_deref(),
            Some("Describe a failure.")
        );
        assert_eq!(clean_question("12) Walk me through a launch.").as_deref(), Some("Walk me through a launch."));
        assert_eq!(clean_question("   ").as_deref(), None);
        assert_eq!(clean_question("\"\"").as_deref(), None);
    }

    #[test]
    fn clean_question_keeps_leading_numbers_that_are_content() {
        assert_eq!(
            clean_question("2020) was a hard year for many teams. How did yours adapt?").as_deref(),
            Some("2020) was a hard year for many teams. How did yours adapt?")
        );
        assert_eq!(
            clean_question("3.5 years is a long tenure. What kept you there?").as_deref(),
            Some("3.5 years is a long tenure. What kept you there?")
        );
        assert_eq!(
            clean_question("100. Tell me about scaling a team.").as_deref(),
            Some("100. Tell me about scaling a team.")
        );
    }

    #[tokio::test]
    async fn detached_question_advances_the_number() {
        let mut llm = MockLlmGateway::new();
        llm.expect_call()
            .withf(|messages| messages[1].content.contains("question number 3"))
            .returning(|_| Ok("Tell me about a tough deadline.".to_string()));
        let svc = service(llm);

        let q = svc
            .next_question(Some("software_engineer"), 2, None, None)
            .await
            .unwrap();
        assert_eq!(q.question_number, 3);
        assert_eq!(q.question, "Tell me about a tough deadline.");
        assert!(q.question_id.is_none());
    }

    #[tokio::test]
    async fn unknown_role_uses_default_role_metadata() {
        let mut llm = MockLlmGateway::new();
        llm.expect_call()
            .withf(|messages| messages[1].content.contains("Software Engineer"))
            .returning(|_| Ok("Describe a bug you chased.".to_string()));
        let svc = service(llm);

        let q = svc.next_question(Some("wizard"), 0, None, None).await.unwrap();
        assert_eq!(q.question_number, 1);
    }

    #[tokio::test]
    async fn oversized_question_number_is_rejected_before_any_work() {
        let mut llm = MockLlmGateway::new();
        llm.expect_call().never();
        let svc = service(llm);

        let err = svc
            .next_question(None, u32::MAX, Some(Uuid::new_v4()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let err = svc
            .next_question(None, MAX_TURN_INDEX as u32, Some(Uuid::new_v4()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn gateway_failure_is_service_unavailable() {
        let mut llm = MockLlmGateway::new();
        llm.expect_call()
            .returning(|_| Err(LlmError::Status { status: 500, body: "boom".into() }));
        let svc = service(llm);

        let err = svc.next_question(None, 0, None, None).await.unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }
}
