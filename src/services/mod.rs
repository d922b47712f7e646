pub mod document_service;
pub mod evaluation_service;
pub mod model_gateway;
pub mod question_service;
pub mod response_parser;

pub use document_service::{DocumentExtractor, DocumentService, PdfTextExtractor};
pub use evaluation_service::Evaluator;
pub use model_gateway::{ChatModel, OpenAiGateway, SpeechToText};
pub use question_service::QuestionSetGenerator;
