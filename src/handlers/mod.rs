pub mod answer_handler;
pub mod document_handler;
pub mod evaluation_handler;
pub mod question_handler;
pub mod session_handler;

pub use answer_handler::{set_answer, transcribe_answer};
pub use document_handler::upload_document;
pub use evaluation_handler::evaluate_answers;
pub use question_handler::{generate_questions, start_new_round};
pub use session_handler::{create_session, delete_session, get_session, health_check};
