use std::sync::Arc;

use crate::{
    config::Config,
    repositories::{InMemorySessionRepository, SessionRepository},
    services::{
        ChatModel, DocumentService, Evaluator, OpenAiGateway, PdfTextExtractor,
        QuestionSetGenerator, SpeechToText,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionRepository>,
    pub generator: Arc<QuestionSetGenerator>,
    pub evaluator: Arc<Evaluator>,
    pub transcriber: Arc<dyn SpeechToText>,
    pub documents: Arc<DocumentService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gateway = Arc::new(OpenAiGateway::new(&config));

        Self::with_components(
            Arc::new(InMemorySessionRepository::new()),
            gateway.clone(),
            gateway,
            Arc::new(DocumentService::new(Arc::new(PdfTextExtractor))),
            config,
        )
    }

    /// Composition seam: tests inject stub models and extractors here.
    pub fn with_components(
        sessions: Arc<dyn SessionRepository>,
        chat: Arc<dyn ChatModel>,
        transcriber: Arc<dyn SpeechToText>,
        documents: Arc<DocumentService>,
        config: Config,
    ) -> Self {
        let generator = Arc::new(QuestionSetGenerator::new(
            chat.clone(),
            config.generation_model.clone(),
            config.generation_temperature,
        ));
        let evaluator = Arc::new(Evaluator::new(
            chat,
            config.grading_model.clone(),
            config.grading_temperature,
        ));

        Self {
            sessions,
            generator,
            evaluator,
            transcriber,
            documents,
            config: Arc::new(config),
        }
    }
}
