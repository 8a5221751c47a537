//! Core agent loop implementation.

use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::llm::{ChatMessage, LlmClient, Role, ToolCall};
use crate::tools::ToolRegistry;

use super::prompt::build_system_prompt;

/// Kind of entry in the run trace.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Tool is being called
    ToolCall,
    /// Tool returned a result
    ToolResult,
    /// Agent produced final response
    Response,
}

/// A single entry in the run trace.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    /// Timestamp (RFC 3339)
    pub timestamp: String,

    pub kind: StepKind,

    pub content: String,
}

impl AgentStep {
    fn new(kind: StepKind, content: String) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
            content,
        }
    }
}

/// Result of [`ReactAgent::invoke`].
#[derive(Debug, Clone)]
pub struct AgentOutput {
    /// Input messages followed by everything the run appended.
    pub messages: Vec<ChatMessage>,

    pub steps: Vec<AgentStep>,
}

impl AgentOutput {
    /// Text content of the last message, empty if it has none.
    pub fn last_message_text(&self) -> &str {
        self.messages
            .last()
            .and_then(|m| m.content.as_deref())
            .unwrap_or_default()
    }
}

/// A model bound to a tool set, run as a think/act loop.
pub struct ReactAgent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: String,
    max_iterations: usize,
    system_prompt: Option<String>,
}

/// Build a react agent over `llm` with the given tools.
pub fn create_react_agent(
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: impl Into<String>,
    max_iterations: usize,
) -> ReactAgent {
    ReactAgent {
        llm,
        tools,
        model: model.into(),
        max_iterations,
        system_prompt: None,
    }
}

impl ReactAgent {
    /// Prepend a system prompt to every model call. It is not part of the
    /// returned messages.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Run the loop over `messages` until the model answers without tool calls.
    pub async fn invoke(&self, messages: Vec<ChatMessage>) -> anyhow::Result<AgentOutput> {
        let span = tracing::info_span!("agent_run", run_id = %Uuid::new_v4(), model = %self.model);
        self.run(messages).instrument(span).await
    }

    async fn run(&self, mut messages: Vec<ChatMessage>) -> anyhow::Result<AgentOutput> {
        let mut steps = Vec::new();

        let system = self
            .system_prompt
            .as_deref()
            .map(|base| ChatMessage::system(build_system_prompt(base, &self.tools)));

        let tool_schemas = self.tools.get_tool_schemas();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let request: Vec<ChatMessage> = system
                .iter()
                .cloned()
                .chain(messages.iter().cloned())
                .collect();

            let response = self
                .llm
                .chat_completion(&self.model, &request, Some(tool_schemas.as_slice()))
                .await?;

            if let Some(tool_calls) = response.tool_calls.filter(|c| !c.is_empty()) {
                messages.push(ChatMessage {
                    role: Role::Assistant,
                    content: response.content,
                    tool_calls: Some(tool_calls.clone()),
                    tool_call_id: None,
                });

                for tool_call in &tool_calls {
                    steps.push(AgentStep::new(
                        StepKind::ToolCall,
                        format!(
                            "Calling tool: {} with args: {}",
                            tool_call.function.name, tool_call.function.arguments
                        ),
                    ));

                    let result_str = match self.execute_tool_call(tool_call).await {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::warn!("Tool {} failed: {}", tool_call.function.name, e);
                            format!("Error: {}", e)
                        }
                    };

                    steps.push(AgentStep::new(
                        StepKind::ToolResult,
                        truncate_for_log(&result_str, 1000),
                    ));

                    messages.push(ChatMessage::tool(tool_call.id.clone(), result_str));
                }

                continue;
            }

            // No tool calls - this is the final response, possibly empty
            let content = response.content.unwrap_or_else(|| {
                tracing::warn!("LLM returned an empty final message");
                String::new()
            });
            tracing::info!("Agent finished after {} iteration(s)", iteration + 1);
            steps.push(AgentStep::new(
                StepKind::Response,
                truncate_for_log(&content, 2000),
            ));
            messages.push(ChatMessage::assistant(content));
            return Ok(AgentOutput { messages, steps });
        }

        Err(anyhow::anyhow!(
            "Max iterations ({}) reached without completion",
            self.max_iterations
        ))
    }

    async fn execute_tool_call(&self, tool_call: &ToolCall) -> anyhow::Result<String> {
        let name = &tool_call.function.name;
        let raw = tool_call.function.arguments.trim();

        // Argument-less calls may arrive as an empty string.
        let args: serde_json::Value = if raw.is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("invalid arguments for {}: {}", name, e))?
        };

        self.tools.execute(name, args).await
    }
}

/// Truncate a string for logging purposes, on a char boundary.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::llm::{ChatResponse, FunctionCall, LlmError, ToolDefinition};
    use crate::tools::Tool;

    /// Replays canned responses and records every request it receives.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<ChatResponse>>,
        requests: Mutex<Vec<(Vec<ChatMessage>, usize)>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<ChatResponse>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(Vec<ChatMessage>, usize)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            tools: Option<&[ToolDefinition]>,
        ) -> Result<ChatResponse, LlmError> {
            self.requests
                .lock()
                .unwrap()
                .push((messages.to_vec(), tools.map_or(0, |t| t.len())));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::Api {
                    status: 500,
                    body: "script exhausted".to_string(),
                })
        }
    }

    struct Capital;

    #[async_trait]
    impl Tool for Capital {
        fn name(&self) -> &str {
            "capital_of"
        }

        fn description(&self) -> &str {
            "Look up the capital of an Indian state"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"state": {"type": "string"}}})
        }

        async fn execute(&self, args: Value) -> anyhow::Result<String> {
            match args["state"].as_str() {
                Some("Tamil Nadu") => Ok("Chennai".to_string()),
                other => Err(anyhow::anyhow!("no data for {:?}", other)),
            }
        }
    }

    fn answer(text: &str) -> ChatResponse {
        ChatResponse {
            content: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ChatResponse {
        ChatResponse {
            content: None,
            tool_calls: Some(vec![ToolCall {
                id: id.to_string(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }]),
            usage: None,
        }
    }

    #[tokio::test]
    async fn answers_directly_without_tools() {
        let llm = ScriptedLlm::new(vec![answer("Chennai is the capital of Tamil Nadu.")]);
        let agent = create_react_agent(llm.clone(), ToolRegistry::empty(), "llama", 25);

        let input = ChatMessage::from_pair("human", "What is the capital of Tamil Nadu?").unwrap();
        let output = agent.invoke(vec![input.clone()]).await.unwrap();

        assert_eq!(output.last_message_text(), "Chennai is the capital of Tamil Nadu.");
        assert_eq!(output.messages.len(), 2);
        assert_eq!(output.messages[0], input);
        assert_eq!(output.messages[1].role, Role::Assistant);
        assert_eq!(output.steps.len(), 1);
        assert_eq!(output.steps[0].kind, StepKind::Response);

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, vec![input]);
        assert_eq!(requests[0].1, 0);
    }

    #[tokio::test]
    async fn runs_tool_then_answers() {
        let llm = ScriptedLlm::new(vec![
            call("call_1", "capital_of", r#"{"state":"Tamil Nadu"}"#),
            answer("It is Chennai."),
        ]);
        let mut tools = ToolRegistry::empty();
        tools.register(Arc::new(Capital));
        let agent = create_react_agent(llm.clone(), tools, "llama", 5);

        let output = agent
            .invoke(vec![ChatMessage::user("Capital of Tamil Nadu?")])
            .await
            .unwrap();

        let roles: Vec<Role> = output.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );
        assert_eq!(output.messages[2], ChatMessage::tool("call_1", "Chennai"));
        assert_eq!(output.last_message_text(), "It is Chennai.");

        let kinds: Vec<StepKind> = output.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::ToolCall, StepKind::ToolResult, StepKind::Response]
        );

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].1, 1);
        assert_eq!(requests[1].0.len(), 3);
    }

    #[tokio::test]
    async fn unknown_tool_error_is_fed_back() {
        let llm = ScriptedLlm::new(vec![
            call("call_7", "web_search", r#"{"query":"Tamil Nadu"}"#),
            answer("Chennai."),
        ]);
        let agent = create_react_agent(llm, ToolRegistry::empty(), "llama", 5);

        let output = agent.invoke(vec![ChatMessage::user("q")]).await.unwrap();

        assert_eq!(
            output.messages[2],
            ChatMessage::tool("call_7", "Error: Unknown tool: web_search")
        );
        assert_eq!(output.last_message_text(), "Chennai.");
    }

    #[tokio::test]
    async fn empty_reply_ends_with_empty_message() {
        let llm = ScriptedLlm::new(vec![ChatResponse::default()]);
        let agent = create_react_agent(llm, ToolRegistry::empty(), "llama", 5);

        let output = agent.invoke(vec![ChatMessage::user("q")]).await.unwrap();

        assert_eq!(output.messages.len(), 2);
        assert_eq!(output.messages[1], ChatMessage::assistant(""));
        assert_eq!(output.last_message_text(), "");
        assert_eq!(output.steps[0].kind, StepKind::Response);
    }

    #[tokio::test]
    async fn malformed_arguments_are_reported_to_the_model() {
        let llm = ScriptedLlm::new(vec![
            call("call_3", "capital_of", r#"{"state": "Tamil Nadu""#),
            answer("Chennai."),
        ]);
        let mut tools = ToolRegistry::empty();
        tools.register(Arc::new(Capital));
        let agent = create_react_agent(llm, tools, "llama", 5);

        let output = agent.invoke(vec![ChatMessage::user("q")]).await.unwrap();

        let result = output.messages[2].content.as_deref().unwrap();
        assert!(
            result.starts_with("Error: invalid arguments for capital_of: "),
            "unexpected tool result: {}",
            result
        );
        assert_eq!(output.messages[2].tool_call_id.as_deref(), Some("call_3"));
        assert_eq!(output.last_message_text(), "Chennai.");
    }

    #[tokio::test]
    async fn stops_at_iteration_limit() {
        let llm = ScriptedLlm::new(vec![
            call("a", "capital_of", "{}"),
            call("b", "capital_of", "{}"),
            answer("too late"),
        ]);
        let mut tools = ToolRegistry::empty();
        tools.register(Arc::new(Capital));
        let agent = create_react_agent(llm.clone(), tools, "llama", 2);

        let err = agent.invoke(vec![ChatMessage::user("q")]).await.unwrap_err();
        assert_eq!(err.to_string(), "Max iterations (2) reached without completion");
        assert_eq!(llm.requests().len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let llm = ScriptedLlm::new(vec![]);
        let agent = create_react_agent(llm, ToolRegistry::empty(), "llama", 5);

        let err = agent.invoke(vec![ChatMessage::user("q")]).await.unwrap_err();
        assert!(err.downcast_ref::<LlmError>().is_some());
    }

    #[tokio::test]
    async fn system_prompt_is_sent_but_not_returned() {
        let llm = ScriptedLlm::new(vec![answer("Chennai.")]);
        let agent = create_react_agent(llm.clone(), ToolRegistry::empty(), "llama", 5)
            .with_system_prompt("Be concise.");

        let output = agent.invoke(vec![ChatMessage::user("q")]).await.unwrap();

        assert!(output.messages.iter().all(|m| m.role != Role::System));
        let sent = &llm.requests()[0].0;
        assert_eq!(sent[0], ChatMessage::system("Be concise."));
        assert_eq!(sent[1], ChatMessage::user("q"));
    }

    #[test]
    fn last_message_without_content() {
        let output = AgentOutput {
            messages: vec![],
            steps: vec![],
        };
        assert_eq!(output.last_message_text(), "");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("தமிழ்நாடு", 4), "த... [truncated]");
    }
}
