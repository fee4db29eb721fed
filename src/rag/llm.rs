//! Chat model backed by an OpenAI-compatible chat-completions API.

use super::{ChatMessage, ChatModel, ChatRole};
use crate::config::LlmSettings;
use crate::error::{Result, TubeQaError};
use crate::openai::{create_client, Endpoint};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Hosted LLM reached through an OpenAI-compatible endpoint (Groq by default).
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a chat model for the given endpoint and settings.
    ///
    /// Fails when the endpoint carries no API key.
    pub fn new(endpoint: &Endpoint, settings: &LlmSettings) -> Result<Self> {
        if endpoint.api_key.is_none() {
            return Err(TubeQaError::Config(format!(
                "{} not set. Add it to the environment or a .env file.",
                settings.api_key_env
            )));
        }
        if settings.model.trim().is_empty() {
            return Err(TubeQaError::Config("llm.model is empty".to_string()));
        }

        Ok(Self {
            client: create_client(endpoint)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.clone();
    let built: ChatCompletionRequestMessage = match message.role {
        ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| TubeQaError::OpenAI(e.to_string()))?
            .into(),
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| TubeQaError::OpenAI(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| TubeQaError::OpenAI(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            TubeQaError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TubeQaError::OpenAI("Empty response from LLM".to_string()))?
            .clone();

        debug!("LLM replied with {} chars", answer.len());
        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
