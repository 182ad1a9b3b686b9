use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AiError;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed instruction sent with every request. Each call carries only this
/// plus the user's current text: turns are stateless, no history is sent.
const SYSTEM_PROMPT: &str = "Você é um assistente virtual amigável e prestativo. \
    Responda de forma clara, concisa e útil. Use um tom conversacional e informal. \
    Mantenha suas respostas relativamente curtas (1-3 frases) a menos que seja \
    necessário mais detalhes.";

#[derive(Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<RequestMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        }
    }

    /// One stateless completion round-trip for the user's text.
    pub async fn complete(&self, user_text: &str) -> Result<String, AiError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                RequestMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                RequestMessage {
                    role: "user",
                    content: user_text.to_string(),
                },
            ],
            temperature: 0.7,
            stream: false,
        };

        debug!(model = %self.model, "requesting completion");

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let completion: CompletionResponse = response.json().await?;
        let text = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AiError::EmptyCompletion);
        }

        Ok(text)
    }
}
