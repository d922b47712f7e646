use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Per-question grading result, positionally aligned with the active
/// question set. Produced only by the evaluator and overwritten wholesale on
/// each successful evaluation run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Evaluation {
    pub score: u8,
    pub feedback: String,
    pub model_answer: String,
}

pub const MAX_SCORE_PER_QUESTION: u32 = 10;

/// Aggregate over one evaluation run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ScoreSummary {
    pub total: u32,
    pub max: u32,
    pub percentage: f64,
}

impl ScoreSummary {
    pub fn from_evaluations(evaluations: &[Evaluation]) -> AppResult<Self> {
        let max = MAX_SCORE_PER_QUESTION * evaluations.len() as u32;
        if max == 0 {
            return Err(AppError::NothingToEvaluate);
        }

        let total: u32 = evaluations.iter().map(|e| e.score as u32).sum();
        let percentage = (total as f64 / max as f64 * 100.0 * 10.0).round() / 10.0;

        Ok(ScoreSummary {
            total,
            max,
            percentage,
        })
    }
}
