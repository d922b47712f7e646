use std::sync::Arc;

use crate::constants::prompts;
use crate::errors::{AppError, AppResult};
use crate::models::domain::evaluation::Evaluation;
use crate::models::domain::question::Question;
use crate::services::model_gateway::ChatModel;
use crate::services::response_parser;

/// Grades a whole answer batch with a single completion call, bounding
/// latency and cost to one round trip regardless of set size.
pub struct Evaluator {
    model: Arc<dyn ChatModel>,
    model_name: String,
    temperature: f32,
}

impl Evaluator {
    pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>, temperature: f32) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            temperature,
        }
    }

    pub async fn evaluate(
        &self,
        questions: &[Question],
        answers: &[String],
    ) -> AppResult<Vec<Evaluation>> {
        if questions.len() != answers.len() {
            return Err(AppError::LengthMismatch(format!(
                "{} questions but {} answers",
                questions.len(),
                answers.len()
            )));
        }
        if questions.is_empty() {
            return Err(AppError::NothingToEvaluate);
        }

        let prompt = prompts::build_grading_prompt(questions, answers);
        let raw = self
            .model
            .complete(&self.model_name, &prompt, self.temperature)
            .await?;

        let evaluations = response_parser::parse_evaluations(&raw, questions.len())?;

        log::info!(
            "evaluated {} answers with {}",
            evaluations.len(),
            self.model_name
        );
        Ok(evaluations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model_gateway::MockChatModel;

    fn question(topic: &str) -> Question {
        Question {
            topic: topic.to_string(),
            question: format!("question about {topic}"),
            answer_key: format!("key about {topic}"),
        }
    }

    fn answers(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn evaluator(mock: MockChatModel) -> Evaluator {
        Evaluator::new(Arc::new(mock), "gpt-4o-mini", 0.0)
    }

    #[tokio::test]
    async fn grades_a_batch_in_one_call() {
        let mut mock = MockChatModel::new();
        mock.expect_complete()
            .withf(|model, prompt, temperature| {
                model == "gpt-4o-mini"
                    && prompt.contains("question about a")
                    && prompt.contains("my answer to b")
                    && *temperature == 0.0
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(r#"```json
                [
                  {"score": 9, "feedback": "solid", "model_answer": "ideal a"},
                  {"score": 6, "feedback": "gaps", "model_answer": "ideal b"}
                ]
                ```"#
                    .to_string())
            });

        let evaluations = evaluator(mock)
            .evaluate(
                &[question("a"), question("b")],
                &answers(&["my answer to a", "my answer to b"]),
            )
            .await
            .unwrap();

        assert_eq!(evaluations.len(), 2);
        assert_eq!(evaluations[0].score, 9);
        assert_eq!(evaluations[1].model_answer, "ideal b");
    }

    #[tokio::test]
    async fn length_mismatch_fails_before_any_model_call() {
        let mut mock = MockChatModel::new();
        mock.expect_complete().times(0);

        let result = evaluator(mock)
            .evaluate(
                &[question("a"), question("b"), question("c")],
                &answers(&["one", "two"]),
            )
            .await;

        assert!(matches!(result, Err(AppError::LengthMismatch(_))));
    }

    #[tokio::test]
    async fn empty_batch_is_nothing_to_evaluate() {
        let mut mock = MockChatModel::new();
        mock.expect_complete().times(0);

        let result = evaluator(mock).evaluate(&[], &[]).await;

        assert!(matches!(result, Err(AppError::NothingToEvaluate)));
    }

    #[tokio::test]
    async fn short_reply_is_a_parse_error_not_a_zip() {
        let mut mock = MockChatModel::new();
        mock.expect_complete().returning(|_, _, _| {
            Ok(r#"[{"score": 9, "feedback": "only one", "model_answer": ""}]"#.to_string())
        });

        let result = evaluator(mock)
            .evaluate(&[question("a"), question("b")], &answers(&["x", "y"]))
            .await;

        assert!(matches!(result, Err(AppError::GenerationParseError(_))));
    }

    #[tokio::test]
    async fn service_failures_propagate() {
        let mut mock = MockChatModel::new();
        mock.expect_complete()
            .returning(|_, _, _| Err(AppError::ServiceError("timeout".to_string())));

        let result = evaluator(mock)
            .evaluate(&[question("a")], &answers(&["x"]))
            .await;

        assert!(matches!(result, Err(AppError::ServiceError(_))));
    }
}
