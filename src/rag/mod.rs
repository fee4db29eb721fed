//! Conversational question answering over a video's transcript.
//!
//! A [`QaChain`] binds a [`Retriever`] over one video's index to a hosted
//! [`ChatModel`]. Follow-up questions are condensed into standalone ones using
//! the prior turns before retrieval.

mod chain;
pub mod context;
mod llm;

pub use chain::QaChain;
pub use context::Retriever;
pub use llm::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

/// A single message sent to the chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One answered question in a session's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a conversation and return the model's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Name of the underlying model.
    fn model(&self) -> &str;
}
