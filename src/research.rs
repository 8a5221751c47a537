//! Structured research result.
//!
//! Declared for a structured-output mode; the agent run does not construct it.

use serde::{Deserialize, Serialize};

/// Result record a research assistant would produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResearchResponse {
    pub topic: String,
    pub summary: String,
    /// Source identifiers, in citation order
    pub sources: Vec<String>,
    /// Names of the tools consulted, in call order
    pub tools_used: Vec<String>,
}
