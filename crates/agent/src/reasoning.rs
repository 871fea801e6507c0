//! Reasoning client adapter.
//!
//! Turns the provider's raw choices into exactly one [`AssistantTurn`].
//! Anything else is a protocol violation and ends the session.

use std::sync::Arc;

use tracing::debug;
use wrapwright_config::AppConfig;
use wrapwright_core::error::AgentError;
use wrapwright_core::message::Message;
use wrapwright_core::provider::{
    AssistantTurn, FunctionDefinition, Provider, ProviderRequest, Usage,
};

/// One validated model turn.
#[derive(Debug, Clone)]
pub struct Completion {
    pub turn: AssistantTurn,
    pub model: String,
    pub usage: Option<Usage>,
}

pub struct ReasoningClient {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ReasoningClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, config.model.clone(), config.max_tokens_per_response)
            .with_temperature(config.temperature)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub async fn complete(
        &self,
        messages: Vec<Message>,
        functions: &[FunctionDefinition],
    ) -> Result<Completion, AgentError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            functions: functions.to_vec(),
        };

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            "Requesting completion"
        );
        let response = self.provider.complete(request).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::MalformedCompletion("completion returned no choices".into())
        })?;
        let message = choice.message.ok_or_else(|| {
            AgentError::MalformedCompletion("completion choice has no message".into())
        })?;
        let turn = message.into_turn().ok_or_else(|| {
            AgentError::MalformedCompletion(
                "completion message has neither content nor a function call".into(),
            )
        })?;

        Ok(Completion {
            turn,
            model: response.model,
            usage: response.usage,
        })
    }
}
