//! Prompt construction for question generation and answer grading.
//!
//! Both builders are pure; the wording is not load-bearing, but the grading
//! prompt's output directive must stay in sync with `grade_parser`.

use crate::services::role_catalog::{Difficulty, RoleInfo};

pub const INTERVIEWER_PERSONA: &str = "You are a seasoned hiring manager running a behavioral \
interview. You are concise, fair and never break character.";

pub const GRADER_PERSONA: &str = "You are a strict but fair interview grader. You always answer \
in the exact output format requested.";

fn question_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Ask a basic question that lets the candidate recall a straightforward past experience."
        }
        Difficulty::Medium => {
            "Ask about how the candidate handled a challenge, setback or disagreement at work."
        }
        Difficulty::Hard => {
            "Ask about a complex, ambiguous scenario with competing priorities that requires \
             careful reasoning about trade-offs."
        }
    }
}

fn leniency_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Be lenient: reward any honest, relevant attempt.",
        Difficulty::Medium => "Be balanced: expect a clear situation, action and result.",
        Difficulty::Hard => {
            "Be demanding: only award high scores for specific, well-reasoned answers with \
             measurable outcomes."
        }
    }
}

pub fn build_question_prompt(role: &RoleInfo, turn_number: u32, difficulty: Difficulty) -> String {
    format!(
        "You are interviewing a candidate for the role of {name}.\n\
         Role description: {description}\n\
         This is question number {turn} of the interview. Difficulty: {difficulty}.\n\
         {instruction}\n\
         Ask exactly one behavioral interview question. Respond with ONLY the question text: \
         no preamble, no numbering, no quotes.",
        name = role.name,
        description = role.description,
        turn = turn_number,
        difficulty = difficulty,
        instruction = question_instruction(difficulty),
    )
}

pub fn build_grading_prompt(
    question: &str,
    answer: &str,
    role: &RoleInfo,
    difficulty: Difficulty,
) -> String {
    format!(
        "Grade a candidate's answer in a behavioral interview for the role of {name}.\n\
         Role description: {description}\n\
         Difficulty: {difficulty}. {leniency}\n\n\
         Question: {question}\n\
         Answer: {answer}\n\n\
         Rubric (100 points total):\n\
         - Relevance to the question (25 points)\n\
         - Depth and insight (25 points)\n\
         - Concrete examples (25 points)\n\
         - Communication clarity (25 points)\n\n\
         Respond with EXACTLY two lines and nothing else:\n\
         SCORE: <integer from 0 to 100>\n\
         FEEDBACK: <1-2 sentences of feedback>\n\n\
         Example:\n\
         SCORE: 72\n\
         FEEDBACK: Clear structure and a relevant example, but the outcome lacked measurable impact.",
        name = role.name,
        description = role.description,
        difficulty = difficulty,
        leniency = leniency_instruction(difficulty),
        question = question.trim(),
        answer = answer.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::role_catalog::lookup;

    #[test]
    fn question_prompt_embeds_role_turn_and_difficulty() {
        let role = lookup("data_scientist");
        let prompt = build_question_prompt(role, 3, Difficulty::Medium);
        assert!(prompt.contains(role.description));
        assert!(prompt.contains("question number 3"));
        assert!(prompt.contains("challenge"));
        assert!(prompt.contains("ONLY the question text"));
    }

    #[test]
    fn question_prompt_varies_with_difficulty() {
        let role = lookup("software_engineer");
        let easy = build_question_prompt(role, 1, Difficulty::Easy);
        let hard = build_question_prompt(role, 1, Difficulty::Hard);
        assert!(easy.contains("basic"));
        assert!(hard.contains("complex"));
        assert_ne!(easy, hard);
    }

    #[test]
    fn grading_prompt_carries_rubric_and_output_format() {
        let role = lookup("product_manager");
        let prompt = build_grading_prompt(
            "Tell me about a time you prioritized features.",
            "  I used RICE scoring.  ",
            role,
            Difficulty::Hard,
        );
        assert!(prompt.contains("Question: Tell me about a time you prioritized features."));
        assert!(prompt.contains("Answer: I used RICE scoring."));
        for criterion in ["Relevance", "Depth", "Concrete examples", "Communication clarity"] {
            assert!(prompt.contains(criterion), "missing {}", criterion);
        }
        assert!(prompt.contains("SCORE: <integer"));
        assert!(prompt.contains("FEEDBACK: <1-2 sentences"));
        assert!(prompt.contains("SCORE: 72"));
        assert!(prompt.contains("demanding"));
    }
}
