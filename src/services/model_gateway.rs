use async_openai::{
    config::OpenAIConfig,
    types::audio::{AudioInput, CreateTranscriptionRequestArgs},
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Single-prompt completion seam. Generation and grading both go through
/// this; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str, temperature: f32) -> AppResult<String>;
}

/// Dictation transcription seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, filename: &str, audio: Vec<u8>) -> AppResult<String>;
}

/// OpenAI-backed implementation of both seams, also usable against any
/// API-compatible endpoint via `OPENAI_API_BASE`.
pub struct OpenAiGateway {
    client: Client<OpenAIConfig>,
    transcription_model: String,
}

impl OpenAiGateway {
    pub fn new(config: &Config) -> Self {
        let mut openai_config =
            OpenAIConfig::new().with_api_key(config.openai_api_key.expose_secret());
        if let Some(base) = &config.openai_api_base {
            openai_config = openai_config.with_api_base(base);
        }

        Self {
            client: Client::with_config(openai_config),
            transcription_model: config.transcription_model.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiGateway {
    async fn complete(&self, model: &str, prompt: &str, temperature: f32) -> AppResult<String> {
        log::debug!(
            "calling completion model {model} (prompt length {} chars)",
            prompt.len()
        );

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .temperature(temperature)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::ServiceError("completion response contained no content".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl SpeechToText for OpenAiGateway {
    async fn transcribe(&self, filename: &str, audio: Vec<u8>) -> AppResult<String> {
        log::debug!(
            "transcribing {filename} ({} bytes) with {}",
            audio.len(),
            self.transcription_model
        );

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(filename.to_string(), audio))
            .model(&self.transcription_model)
            .build()?;

        let response = self.client.audio().transcription().create(request).await?;

        Ok(response.text.trim().to_string())
    }
}
