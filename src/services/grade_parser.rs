use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

pub const GENERIC_FEEDBACK: &str = "Your answer was graded, but the interviewer left no comments.";

static SCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)SCORE\s*:\s*(-?\d+)").unwrap());
static FEEDBACK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)FEEDBACK\s*:\s*(.*)").unwrap());
static RUBRIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(RELEVANCE|DEPTH|EXAMPLES|CLARITY)\s*:\s*(-?\d+)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    /// Always within 0..=100.
    pub score: i32,
    pub feedback: String,
    /// Per-criterion sub-scores, only when the grader volunteered them.
    pub rubric: Option<BTreeMap<String, i32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradeParseError {
    #[error("grader output has no SCORE line")]
    MissingScore,
}

pub fn parse_grade(raw: &str) -> Result<Grade, GradeParseError> {
    let caps = SCORE_RE.captures(raw).ok_or(GradeParseError::MissingScore)?;
    let score = clamp_number(&caps[1], 0, 100);

    let feedback = FEEDBACK_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| {
            m.as_str()
                .lines()
                .map(str::trim)
                .take_while(|l| !SCORE_RE.is_match(l) && !RUBRIC_RE.is_match(l))
                .find(|l| !l.is_empty())
        })
        .map(|l| l.to_string())
        .unwrap_or_else(|| GENERIC_FEEDBACK.to_string());

    let rubric: BTreeMap<String, i32> = RUBRIC_RE
        .captures_iter(raw)
        .map(|c| (c[1].to_ascii_lowercase(), clamp_number(&c[2], 0, 25)))
        .collect();

    Ok(Grade {
        score,
        feedback,
        rubric: if rubric.is_empty() { None } else { Some(rubric) },
    })
}

// Numbers too long for i64 saturate instead of failing.
fn clamp_number(digits: &str, min: i32, max: i32) -> i32 {
    let value = digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    });
    value.clamp(min as i64, max as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_two_line_output() {
        let grade = parse_grade("SCORE: 85\nFEEDBACK: Strong example with clear impact.").unwrap();
        assert_eq!(grade.score, 85);
        assert_eq!(grade.feedback, "Strong example with clear impact.");
        assert_eq!(grade.rubric, None);
    }

    #[test]
    fn score_token_is_case_insensitive() {
        let grade = parse_grade("score:42\nfeedback: ok").unwrap();
        assert_eq!(grade.score, 42);
        assert_eq!(grade.feedback, "ok");
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        assert_eq!(parse_grade("SCORE: 250").unwrap().score, 100);
        assert_eq!(parse_grade("SCORE: -15").unwrap().score, 0);
        assert_eq!(parse_grade("SCORE: 99999999999999999999999").unwrap().score, 100);
    }

    #[test]
    fn missing_score_is_a_failure_not_zero() {
        assert_eq!(
            parse_grade("FEEDBACK: looks fine"),
            Err(GradeParseError::MissingScore)
        );
        assert_eq!(parse_grade(""), Err(GradeParseError::MissingScore));
        assert_eq!(parse_grade("I'd give it an 80."), Err(GradeParseError::MissingScore));
    }

    #[test]
    fn missing_feedback_uses_generic_text() {
        let grade = parse_grade("SCORE: 60").unwrap();
        assert_eq!(grade.feedback, GENERIC_FEEDBACK);
        let blank = parse_grade("SCORE: 60\nFEEDBACK:   ").unwrap();
        assert_eq!(blank.feedback, GENERIC_FEEDBACK);
    }

    #[test]
    fn only_first_feedback_line_is_kept() {
        let raw = "Here you go.\nSCORE: 70\nFEEDBACK:\n  Good structure.\nSecond line ignored.";
        let grade = parse_grade(raw).unwrap();
        assert_eq!(grade.score, 70);
        assert_eq!(grade.feedback, "Good structure.");
    }

    #[test]
    fn feedback_never_swallows_a_following_score_line() {
        let grade = parse_grade("FEEDBACK:\nSCORE: 70").unwrap();
        assert_eq!(grade.score, 70);
        assert_eq!(grade.feedback, GENERIC_FEEDBACK);

        let grade = parse_grade("FEEDBACK:\n\nDEPTH: 20\nSCORE: 65").unwrap();
        assert_eq!(grade.feedback, GENERIC_FEEDBACK);

        let grade = parse_grade("FEEDBACK: Clear and concrete.\nSCORE: 90").unwrap();
        assert_eq!(grade.feedback, "Clear and concrete.");
    }

    #[test]
    fn optional_rubric_lines_are_collected() {
        let raw = "RELEVANCE: 20\nDEPTH: 18\nEXAMPLES: 40\nCLARITY: 22\nSCORE: 80\nFEEDBACK: Nice.";
        let grade = parse_grade(raw).unwrap();
        let rubric = grade.rubric.unwrap();
        assert_eq!(rubric["relevance"], 20);
        assert_eq!(rubric["examples"], 25);
        assert_eq!(rubric.len(), 4);
    }
}
