//! LLM client abstraction and the Groq chat completions client.
//!
//! - `LlmClient`: async chat completion interface used by the agent loop
//! - `ChatMessage` / `ChatResponse` / `ToolCall`: OpenAI-compatible wire types
//! - `LlmError`: failure taxonomy for model calls

mod error;
mod groq;
mod types;

use async_trait::async_trait;

pub use error::LlmError;
pub use groq::GroqClient;
pub use types::{
    ChatMessage, ChatResponse, FunctionCall, FunctionDefinition, Role, TokenUsage, ToolCall,
    ToolDefinition,
};

/// A chat-completion capable model endpoint.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the conversation and return the model's next message.
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError>;
}
