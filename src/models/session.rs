use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSession {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub role: String,
    /// Snapshot of the role's difficulty when the session was created.
    pub difficulty: String,
    pub status: String,
    pub boss_health: i32,
    pub player_health: i32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl InterviewSession {
    /// Unknown values in the column are treated as terminal so a corrupt row
    /// can never be played.
    pub fn status(&self) -> SessionStatus {
        self.status.parse().unwrap_or(SessionStatus::Abandoned)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status() == SessionStatus::InProgress
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    CompletedWon,
    CompletedLost,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::CompletedWon => "completed_won",
            SessionStatus::CompletedLost => "completed_lost",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    /// Status only moves forward: in_progress to any terminal state, never back.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        *self == SessionStatus::InProgress && next.is_terminal()
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed_won" => Ok(SessionStatus::CompletedWon),
            "completed_lost" => Ok(SessionStatus::CompletedLost),
            "abandoned" => Ok(SessionStatus::Abandoned),
            other => Err(format!("unknown session status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_in_progress_moves_forward() {
        use SessionStatus::*;
        assert!(InProgress.can_transition_to(CompletedWon));
        assert!(InProgress.can_transition_to(CompletedLost));
        assert!(InProgress.can_transition_to(Abandoned));
        assert!(!InProgress.can_transition_to(InProgress));
        for terminal in [CompletedWon, CompletedLost, Abandoned] {
            for next in [InProgress, CompletedWon, CompletedLost, Abandoned] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn status_text_round_trips_through_column_values() {
        for s in ["in_progress", "completed_won", "completed_lost", "abandoned"] {
            assert_eq!(s.parse::<SessionStatus>().unwrap().as_str(), s);
        }
        assert!("completed".parse::<SessionStatus>().is_err());
    }
}
