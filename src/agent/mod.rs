//! Agent module - a prebuilt "react" agent.
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Send the conversation and the available tool schemas to the model
//! 2. If the model requests tool calls, execute them and feed results back
//! 3. Repeat until the model produces a final message or max iterations reached
//!
//! With an empty tool registry the loop ends after the first model reply.

mod agent_loop;
mod prompt;

pub use agent_loop::{create_react_agent, AgentOutput, AgentStep, ReactAgent, StepKind};
pub use prompt::{build_system_prompt, RESEARCH_ASSISTANT_PROMPT};
