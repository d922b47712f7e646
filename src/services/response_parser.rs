use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::models::domain::evaluation::Evaluation;
use crate::models::domain::question::Question;

// Model replies routinely wrap the JSON list in ``` or ```json fences.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?").expect("code fence pattern is valid"));

pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneratedQuestionDto {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer_key: String,
}

/// Parse a generation reply into questions. Entries missing a question or an
/// answer key are dropped; any other shape mismatch is a parse error, never a
/// best-effort partial result.
pub fn parse_generated_questions(raw: &str) -> AppResult<Vec<Question>> {
    let stripped = strip_code_fences(raw);

    let items: Vec<GeneratedQuestionDto> = serde_json::from_str(&stripped)
        .map_err(|err| AppError::GenerationParseError(format!("question list: {err}")))?;

    let questions: Vec<Question> = items
        .into_iter()
        .filter(|item| !item.question.trim().is_empty() && !item.answer_key.trim().is_empty())
        .map(|item| Question {
            topic: item.topic.trim().to_string(),
            question: item.question.trim().to_string(),
            answer_key: item.answer_key.trim().to_string(),
        })
        .collect();

    if questions.is_empty() {
        return Err(AppError::GenerationParseError(
            "the model returned no usable questions".to_string(),
        ));
    }

    Ok(questions)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GradedAnswerDto {
    score: i64,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    model_answer: String,
}

/// Parse a grading reply. The list must match the submitted batch length
/// exactly; mismatched lengths are never zipped silently.
pub fn parse_evaluations(raw: &str, expected_len: usize) -> AppResult<Vec<Evaluation>> {
    let stripped = strip_code_fences(raw);

    let items: Vec<GradedAnswerDto> = serde_json::from_str(&stripped)
        .map_err(|err| AppError::GenerationParseError(format!("evaluation list: {err}")))?;

    if items.len() != expected_len {
        return Err(AppError::GenerationParseError(format!(
            "expected {expected_len} evaluations, the model returned {}",
            items.len()
        )));
    }

    items
        .into_iter()
        .map(|item| {
            if !(0..=10).contains(&item.score) {
                return Err(AppError::GenerationParseError(format!(
                    "score {} is outside the 0-10 range",
                    item.score
                )));
            }
            Ok(Evaluation {
                score: item.score as u8,
                feedback: item.feedback.trim().to_string(),
                model_answer: item.model_answer.trim().to_string(),
            })
        })
        .collect()
}
