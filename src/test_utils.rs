#[cfg(test)]
pub mod fixtures {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::app_state::AppState;
    use crate::config::Config;
    use crate::errors::AppResult;
    use crate::models::domain::question::Question;
    use crate::repositories::InMemorySessionRepository;
    use crate::services::{ChatModel, DocumentExtractor, DocumentService, SpeechToText};

    /// Canned generation reply, fenced the way models actually reply.
    pub const GENERATION_REPLY: &str = r#"```json
[
  {"topic": "empyema", "question": "Stages of empyema?", "answer_key": "Exudative, fibrinopurulent, organizing"},
  {"topic": "chylothorax", "question": "Diagnostic triglyceride level?", "answer_key": "> 110 mg/dL"}
]
```"#;

    /// Canned grading reply for a three-question set: 9 + 6 + 10 = 25/30.
    pub const EVALUATION_REPLY: &str = r#"```json
[
  {"score": 9, "feedback": "solid", "model_answer": "ideal a"},
  {"score": 6, "feedback": "gaps", "model_answer": "ideal b"},
  {"score": 10, "feedback": "complete", "model_answer": "ideal c"}
]
```"#;

    pub fn test_question(topic: &str) -> Question {
        Question {
            topic: topic.to_string(),
            question: format!("question about {topic}"),
            answer_key: format!("answer key about {topic}"),
        }
    }

    struct StubChatModel {
        reply: String,
    }

    #[async_trait]
    impl ChatModel for StubChatModel {
        async fn complete(&self, _model: &str, _prompt: &str, _temperature: f32) -> AppResult<String> {
            Ok(self.reply.clone())
        }
    }

    struct StubSpeechToText {
        transcript: String,
    }

    #[async_trait]
    impl SpeechToText for StubSpeechToText {
        async fn transcribe(&self, _filename: &str, _audio: Vec<u8>) -> AppResult<String> {
            Ok(self.transcript.clone())
        }
    }

    struct StubExtractor {
        text: String,
    }

    impl DocumentExtractor for StubExtractor {
        fn extract_text(&self, _bytes: &[u8]) -> AppResult<String> {
            Ok(self.text.clone())
        }
    }

    pub fn stub_app_state(chat_reply: &str, transcript: &str, document_text: &str) -> AppState {
        AppState::with_components(
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(StubChatModel {
                reply: chat_reply.to_string(),
            }),
            Arc::new(StubSpeechToText {
                transcript: transcript.to_string(),
            }),
            Arc::new(DocumentService::new(Arc::new(StubExtractor {
                text: document_text.to_string(),
            }))),
            Config::test_config(),
        )
    }

    pub fn test_app_state() -> AppState {
        stub_app_state("not json", "unused transcript", "stub document text")
    }

    pub fn test_app_state_with_chat_reply(reply: &str) -> AppState {
        stub_app_state(reply, "unused transcript", "stub document text")
    }

    pub fn test_app_state_with_transcript(transcript: &str) -> AppState {
        stub_app_state("not json", transcript, "stub document text")
    }

    pub fn test_app_state_with_document_text(text: &str) -> AppState {
        stub_app_state("not json", "unused transcript", text)
    }
}
