//! System prompt templates for the agent.

use crate::tools::ToolRegistry;

/// Research assistant persona. Only sent when `USE_SYSTEM_PROMPT` is enabled.
pub const RESEARCH_ASSISTANT_PROMPT: &str = "You are a helpful research assistant that helps generate research papers.
Answer the user's questions accurately and use the available tools when necessary.
Be concise and professional in your responses.";

/// Build the system prompt, listing tool definitions when any are registered.
pub fn build_system_prompt(base: &str, tools: &ToolRegistry) -> String {
    if tools.is_empty() {
        return base.to_string();
    }

    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{base}\n\n## Available Tools\n{tool_descriptions}",
        base = base,
        tool_descriptions = tool_descriptions
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_tools_leaves_prompt_untouched() {
        let prompt = build_system_prompt(RESEARCH_ASSISTANT_PROMPT, &ToolRegistry::empty());
        assert_eq!(prompt, RESEARCH_ASSISTANT_PROMPT);
        assert!(prompt.starts_with("You are a helpful research assistant"));
    }
}
