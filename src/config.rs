use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub openai_api_key: SecretString,
    pub openai_api_base: Option<String>,
    pub generation_model: String,
    pub grading_model: String,
    pub transcription_model: String,
    pub generation_temperature: f32,
    pub grading_temperature: f32,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: SecretString::from(
                env::var("OPENAI_API_KEY").unwrap_or_else(|_| "dev_key_set_openai_api_key".to_string()),
            ),
            openai_api_base: env::var("OPENAI_API_BASE").ok(),
            generation_model: env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            grading_model: env::var("GRADING_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            transcription_model: env::var("TRANSCRIPTION_MODEL")
                .unwrap_or_else(|_| "whisper-1".to_string()),
            generation_temperature: env::var("GENERATION_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.8),
            grading_temperature: env::var("GRADING_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.0),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(20 * 1024 * 1024),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let api_key = self.openai_api_key.expose_secret();

        if api_key == "dev_key_set_openai_api_key" || api_key.is_empty() {
            panic!(
                "FATAL: OPENAI_API_KEY is not set! Set the OPENAI_API_KEY environment variable."
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            openai_api_key: SecretString::from("test_api_key".to_string()),
            openai_api_base: None,
            generation_model: "gpt-4.1-mini".to_string(),
            grading_model: "gpt-4o-mini".to_string(),
            transcription_model: "whisper-1".to_string(),
            generation_temperature: 0.8,
            grading_temperature: 0.0,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            max_upload_bytes: 1024 * 1024,
        }
    }
}
