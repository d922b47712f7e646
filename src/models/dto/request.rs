use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Body for the generate and new-round endpoints. The slider in the form UI
/// allows 1 to 10 questions per set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuestionsRequest {
    #[validate(range(min = 1, max = 10, message = "question count must be between 1 and 10"))]
    pub count: u8,
}

/// Body for typed answer submission. `round_token` ties the input to the
/// round it was rendered for; a token from a discarded round is rejected.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetAnswerRequest {
    pub round_token: Uuid,
    #[validate(length(max = 20000, message = "answer text is too long"))]
    pub text: String,
}

/// Query parameters for the raw-bytes document upload.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUploadQuery {
    pub filename: String,
}

/// Query parameters for the raw-bytes dictation upload.
#[derive(Debug, Clone, Deserialize)]
pub struct DictationQuery {
    pub filename: String,
    pub round_token: Uuid,
}
