//! # Research Agent
//!
//! A hosted LLM wired into a prebuilt react agent with no tools attached.
//!
//! This library provides:
//! - Environment and `.env` based configuration
//! - A Groq chat completions client behind the `LlmClient` trait
//! - A tool-based agent loop, run here with an empty tool registry
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use research_agent::{agent::create_react_agent, llm::{ChatMessage, GroqClient}, tools::ToolRegistry, Config};
//!
//! let config = Config::from_env()?;
//! let llm = Arc::new(GroqClient::from_config(&config)?);
//! let agent = create_react_agent(llm, ToolRegistry::empty(), &config.model, config.max_iterations);
//! let output = agent.invoke(vec![ChatMessage::user("What is the capital of Tamil Nadu?")]).await?;
//! println!("{}", output.last_message_text());
//! ```

pub mod agent;
pub mod config;
pub mod llm;
pub mod research;
pub mod tools;

pub use config::Config;
pub use research::ResearchResponse;
