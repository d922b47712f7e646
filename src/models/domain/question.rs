use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generated short-answer exam item. Immutable once generated; the
/// evaluator references it by position rather than copying it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub topic: String,
    pub question: String,
    pub answer_key: String,
}

/// One batch of generated questions plus their topic labels.
///
/// Created atomically on a successful generation call, appended to the
/// session history and never mutated afterwards. The history is what backs
/// the cross-round topic ledger.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionSet {
    pub set_id: u32,
    pub questions: Vec<Question>,
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl QuestionSet {
    pub fn new(set_id: u32, questions: Vec<Question>) -> Self {
        let mut topics: Vec<String> = Vec::new();
        for question in &questions {
            let topic = question.topic.trim();
            if !topic.is_empty() && !topics.iter().any(|t| t == topic) {
                topics.push(topic.to_string());
            }
        }

        QuestionSet {
            set_id,
            questions,
            topics,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
