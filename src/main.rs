//! Research Agent - CLI Entry Point
//!
//! Asks the hosted model one question through the react agent and prints the
//! final message. The question can be replaced by the first argument.

use std::sync::Arc;

use research_agent::agent::{create_react_agent, RESEARCH_ASSISTANT_PROMPT};
use research_agent::config::{self, Config};
use research_agent::llm::{ChatMessage, GroqClient};
use research_agent::tools::ToolRegistry;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_QUESTION: &str = "What is the capital of Tamil Nadu?";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the answer
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "research_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    config::load_dotenv();
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.model);

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_QUESTION.to_string());

    let llm = Arc::new(GroqClient::from_config(&config)?);
    let mut agent = create_react_agent(
        llm,
        ToolRegistry::empty(),
        config.model.clone(),
        config.max_iterations,
    );
    if config.use_system_prompt {
        agent = agent.with_system_prompt(RESEARCH_ASSISTANT_PROMPT);
    }

    let output = agent
        .invoke(vec![ChatMessage::user(question)])
        .await?;

    println!("{}", output.last_message_text());

    Ok(())
}
