use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::evaluation::ScoreSummary;
use crate::models::domain::session::{SessionPhase, SessionState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIngestedResponse {
    pub filename: String,
    pub characters: usize,
    /// True when the cached text for the same filename was reused.
    pub cached: bool,
    /// True when extraction produced no text, e.g. a scanned/image-only PDF
    /// that would need OCR (unsupported).
    pub extracted_empty: bool,
}

/// A question as shown to the candidate. The answer key stays on the server
/// until evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub index: usize,
    pub topic: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSummaryView {
    pub set_id: u32,
    pub question_count: usize,
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationView {
    pub index: usize,
    pub question: String,
    pub score: u8,
    pub feedback: String,
    pub model_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub set_id: Option<u32>,
    /// True when answers changed after this report was computed.
    pub stale: bool,
    pub results: Vec<EvaluationView>,
    pub summary: ScoreSummary,
}

impl EvaluationReport {
    pub fn from_state(state: &SessionState) -> Option<Self> {
        if state.evaluations.is_empty() {
            return None;
        }
        let summary = ScoreSummary::from_evaluations(&state.evaluations).ok()?;

        let questions = state
            .active_set
            .as_ref()
            .map(|set| set.questions.as_slice())
            .unwrap_or_default();

        let results = state
            .evaluations
            .iter()
            .enumerate()
            .map(|(index, evaluation)| EvaluationView {
                index,
                question: questions
                    .get(index)
                    .map(|q| q.question.clone())
                    .unwrap_or_default(),
                score: evaluation.score,
                feedback: evaluation.feedback.clone(),
                model_answer: evaluation.model_answer.clone(),
            })
            .collect();

        Some(EvaluationReport {
            set_id: state.evaluated_set_id,
            stale: state.evaluation_is_stale(),
            results,
            summary,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionOutcomeResponse {
    pub index: usize,
    /// True when the identical recording was already consumed for this slot;
    /// informational, the request still succeeds.
    pub already_transcribed: bool,
    /// True when the transcript was appended to the answer.
    pub merged: bool,
    pub transcript: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentView {
    pub filename: String,
    pub characters: usize,
    pub extracted_empty: bool,
}

/// Everything a stateless form UI needs to re-render a session after any
/// action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub round: u32,
    pub round_token: Uuid,
    pub set_id: Option<u32>,
    pub document: Option<DocumentView>,
    pub questions: Vec<QuestionView>,
    pub answers: Vec<String>,
    pub answer_field_keys: Vec<String>,
    pub evaluation: Option<EvaluationReport>,
    pub used_topics: Vec<String>,
    pub previous_sets: Vec<SetSummaryView>,
}

impl SessionSnapshot {
    pub fn from_state(state: &SessionState) -> Self {
        let questions = state
            .active_set
            .as_ref()
            .map(|set| {
                set.questions
                    .iter()
                    .enumerate()
                    .map(|(index, q)| QuestionView {
                        index,
                        topic: q.topic.clone(),
                        question: q.question.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let previous_sets = state
            .history
            .iter()
            .map(|set| SetSummaryView {
                set_id: set.set_id,
                question_count: set.questions.len(),
                topics: set.topics.clone(),
                created_at: set.created_at,
            })
            .collect();

        SessionSnapshot {
            session_id: state.id,
            phase: state.phase,
            round: state.round,
            round_token: state.round_token,
            set_id: state.active_set.as_ref().map(|s| s.set_id),
            document: state.document.as_ref().map(|d| DocumentView {
                filename: d.filename.clone(),
                characters: d.text.chars().count(),
                extracted_empty: d.is_extracted_empty(),
            }),
            questions,
            answers: state.answers_text(),
            answer_field_keys: state.answer_field_keys(),
            evaluation: EvaluationReport::from_state(state),
            used_topics: state.used_topics(),
            previous_sets,
        }
    }
}
