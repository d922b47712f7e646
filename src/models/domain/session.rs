use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::evaluation::Evaluation;
use crate::models::domain::question::{Question, QuestionSet};

/// Phase of a session. Advanced only through the named transition methods on
/// [`SessionState`]; handlers never assign it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Generating,
    AwaitingAnswers,
    Evaluating,
    Evaluated,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Generating => write!(f, "generating"),
            SessionPhase::AwaitingAnswers => write!(f, "awaiting_answers"),
            SessionPhase::Evaluating => write!(f, "evaluating"),
            SessionPhase::Evaluated => write!(f, "evaluated"),
        }
    }
}

/// Extracted text of the uploaded study manual, cached per session and keyed
/// by filename so re-uploading the same file skips extraction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub filename: String,
    pub text: String,
    pub uploaded_at: DateTime<Utc>,
}

impl SourceDocument {
    /// True for scanned/image-only PDFs where extraction yielded no text.
    pub fn is_extracted_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One free-text answer slot, positionally aligned with the active question
/// set. `last_audio_digest` remembers the most recently merged recording so a
/// re-delivered payload is not appended twice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSlot {
    pub text: String,
    pub last_audio_digest: Option<String>,
}

/// Result of merging a transcript into an answer slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Transcript appended (space-joined) to the slot text.
    Applied,
    /// Identical payload already consumed for this slot; state unchanged.
    AlreadyTranscribed,
    /// Transcription produced no text; state unchanged.
    EmptyTranscript,
}

/// Hex SHA-256 of a raw payload, used as the idempotency key for dictation
/// re-delivery.
pub fn payload_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// All state for one user session. One instance per session, owned by the
/// session repository; never process-global.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub phase: SessionPhase,
    /// Counts explicit generation requests. Advances once per user-initiated
    /// generate/new-set action, never again on an internal failure.
    pub round: u32,
    /// Namespaces the answer input fields for the current round so stale
    /// inputs from a discarded round are never read as current.
    pub round_token: Uuid,
    next_set_id: u32,
    pub document: Option<SourceDocument>,
    pub active_set: Option<QuestionSet>,
    pub answers: Vec<AnswerSlot>,
    pub evaluations: Vec<Evaluation>,
    pub evaluated_set_id: Option<u32>,
    answers_dirty_since_evaluation: bool,
    pub history: Vec<QuestionSet>,
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(id: Uuid) -> Self {
        SessionState {
            id,
            phase: SessionPhase::Idle,
            round: 0,
            round_token: Uuid::new_v4(),
            next_set_id: 0,
            document: None,
            active_set: None,
            answers: Vec::new(),
            evaluations: Vec::new(),
            evaluated_set_id: None,
            answers_dirty_since_evaluation: false,
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Union of topic labels across every committed question set, sorted for
    /// deterministic prompt embedding. Sets that failed to generate were
    /// never committed, so they contribute nothing.
    pub fn used_topics(&self) -> Vec<String> {
        let mut topics = BTreeSet::new();
        for set in &self.history {
            for topic in &set.topics {
                topics.insert(topic.clone());
            }
        }
        topics.into_iter().collect()
    }

    /// An explicit user request for a fresh generation. Consumes a round
    /// number and a fresh input namespace immediately; the previous active
    /// set stays visible until a replacement is committed.
    pub fn request_generation(&mut self) {
        self.round += 1;
        self.round_token = Uuid::new_v4();
        self.phase = SessionPhase::Generating;
    }

    /// An explicit user request for a new round: per-round state is cleared
    /// before generation, while history and the topic ledger are preserved.
    pub fn request_new_round(&mut self) {
        self.round += 1;
        self.round_token = Uuid::new_v4();
        self.active_set = None;
        self.answers.clear();
        self.evaluations.clear();
        self.evaluated_set_id = None;
        self.answers_dirty_since_evaluation = false;
        self.phase = SessionPhase::Generating;
    }

    /// Commit a successful generation atomically: the set joins the history,
    /// becomes active, and the answer/evaluation arrays are reset to match
    /// its length. Returns the assigned set id.
    pub fn commit_question_set(&mut self, questions: Vec<Question>) -> u32 {
        let set = QuestionSet::new(self.next_set_id, questions);
        self.next_set_id += 1;

        self.answers = vec![AnswerSlot::default(); set.len()];
        self.evaluations.clear();
        self.evaluated_set_id = None;
        self.answers_dirty_since_evaluation = false;
        self.history.push(set.clone());
        let set_id = set.set_id;
        self.active_set = Some(set);
        self.phase = SessionPhase::AwaitingAnswers;
        set_id
    }

    /// Generation failed: no partial set is committed and the previous
    /// per-round state is left untouched (only the round number and input
    /// namespace were already consumed by the explicit request).
    pub fn abort_generation(&mut self) {
        self.phase = match (&self.active_set, self.evaluations.is_empty()) {
            (Some(_), false) => SessionPhase::Evaluated,
            (Some(_), true) => SessionPhase::AwaitingAnswers,
            (None, _) => SessionPhase::Idle,
        };
    }

    pub fn ensure_round(&self, token: Uuid) -> AppResult<()> {
        if token != self.round_token {
            return Err(AppError::RoundMismatch(format!(
                "input was captured for an earlier round; the current round is {}",
                self.round
            )));
        }
        Ok(())
    }

    fn ensure_answer_index(&self, index: usize) -> AppResult<()> {
        if index >= self.answers.len() {
            return Err(AppError::IndexOutOfRange(format!(
                "answer index {index} of {}",
                self.answers.len()
            )));
        }
        Ok(())
    }

    /// Last-write-wins replacement of the typed answer at `index`.
    pub fn set_answer(&mut self, index: usize, text: &str) -> AppResult<()> {
        self.ensure_answer_index(index)?;
        self.answers[index].text = text.trim().to_string();
        if !self.evaluations.is_empty() {
            self.answers_dirty_since_evaluation = true;
        }
        Ok(())
    }

    /// True when the payload with this digest was the last one merged into
    /// the slot. Checked before the transcription service is called so a
    /// re-delivered recording costs nothing.
    pub fn already_transcribed(&self, index: usize, digest: &str) -> AppResult<bool> {
        self.ensure_answer_index(index)?;
        Ok(self.answers[index].last_audio_digest.as_deref() == Some(digest))
    }

    /// Append a transcript to the answer at `index` (space-joined), guarded
    /// by the payload digest so the same recording is never appended twice.
    pub fn merge_transcription(
        &mut self,
        index: usize,
        transcript: &str,
        digest: &str,
    ) -> AppResult<MergeOutcome> {
        self.ensure_answer_index(index)?;

        if self.answers[index].last_audio_digest.as_deref() == Some(digest) {
            return Ok(MergeOutcome::AlreadyTranscribed);
        }

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Ok(MergeOutcome::EmptyTranscript);
        }

        let slot = &mut self.answers[index];
        let existing = slot.text.trim();
        slot.text = if existing.is_empty() {
            transcript.to_string()
        } else {
            format!("{existing} {transcript}")
        };
        slot.last_audio_digest = Some(digest.to_string());
        if !self.evaluations.is_empty() {
            self.answers_dirty_since_evaluation = true;
        }
        Ok(MergeOutcome::Applied)
    }

    pub fn answers_text(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.text.clone()).collect()
    }

    /// Input-field keys for the current round, one per question. Regenerated
    /// with every explicit generation request.
    pub fn answer_field_keys(&self) -> Vec<String> {
        (0..self.answers.len())
            .map(|i| format!("ans_{}_{i}", self.round_token))
            .collect()
    }

    pub fn begin_evaluation(&mut self) -> AppResult<()> {
        if self.active_set.is_none() {
            return Err(AppError::NothingToEvaluate);
        }
        self.phase = SessionPhase::Evaluating;
        Ok(())
    }

    /// Overwrite the evaluation array wholesale with a successful run.
    pub fn commit_evaluations(&mut self, evaluations: Vec<Evaluation>) {
        self.evaluated_set_id = self.active_set.as_ref().map(|s| s.set_id);
        self.evaluations = evaluations;
        self.answers_dirty_since_evaluation = false;
        self.phase = SessionPhase::Evaluated;
    }

    /// Evaluation failed: the previous report, if any, stays visible.
    pub fn abort_evaluation(&mut self) {
        self.phase = if self.evaluations.is_empty() {
            SessionPhase::AwaitingAnswers
        } else {
            SessionPhase::Evaluated
        };
    }

    /// True when answers changed after the current report was computed, so a
    /// renderer can distinguish a stale report from a fresh one.
    pub fn evaluation_is_stale(&self) -> bool {
        !self.evaluations.is_empty() && self.answers_dirty_since_evaluation
    }
}
