use std::sync::Arc;

use crate::constants::prompts;
use crate::errors::{AppError, AppResult};
use crate::models::domain::question::Question;
use crate::services::model_gateway::ChatModel;
use crate::services::response_parser;

/// Orchestrates one completion call per generation request. The caller owns
/// the commit: nothing here touches session state, so a failure commits no
/// partial set.
pub struct QuestionSetGenerator {
    model: Arc<dyn ChatModel>,
    model_name: String,
    temperature: f32,
}

impl QuestionSetGenerator {
    pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>, temperature: f32) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            temperature,
        }
    }

    pub async fn generate(
        &self,
        document_text: &str,
        count: u8,
        excluded_topics: &[String],
    ) -> AppResult<Vec<Question>> {
        if document_text.trim().is_empty() {
            return Err(AppError::EmptyDocument(
                "the extracted document text is empty; a scanned PDF would require OCR".to_string(),
            ));
        }
        if !(1..=10).contains(&count) {
            return Err(AppError::ValidationError(format!(
                "question count must be between 1 and 10, got {count}"
            )));
        }

        let prompt = prompts::build_generation_prompt(document_text, count, excluded_topics);
        let raw = self
            .model
            .complete(&self.model_name, &prompt, self.temperature)
            .await?;

        let mut questions = response_parser::parse_generated_questions(&raw)?;
        if questions.len() > count as usize {
            log::warn!(
                "model returned {} questions for a request of {count}; truncating",
                questions.len()
            );
            questions.truncate(count as usize);
        }

        log::info!(
            "generated {} questions with {} ({} topics excluded)",
            questions.len(),
            self.model_name,
            excluded_topics.len()
        );
        Ok(questions)
    }
}
