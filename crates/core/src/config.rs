use serde::Serialize;
use taxagent_model::ToolConfig;

use crate::tool::ToolDescriptor;

/// What an agent is: where it is reached, how it is instructed and which
/// tools it can use.
///
/// The config is a plain value. Nothing is checked or sent anywhere until
/// [`Agent::setup`](crate::Agent::setup) is called, so empty ids are
/// accepted here and only rejected by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    endpoint_id: String,
    instructions: String,
    tools: Vec<ToolDescriptor>,
}

impl AgentConfig {
    /// Creates a config without tools.
    #[inline]
    pub fn new<S1, S2>(endpoint_id: S1, instructions: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            endpoint_id: endpoint_id.into(),
            instructions: instructions.into(),
            tools: vec![],
        }
    }

    /// Appends a tool.
    #[inline]
    pub fn with_tool<T: Into<ToolDescriptor>>(mut self, tool: T) -> Self {
        self.tools.push(tool.into());
        self
    }

    /// Returns the agent endpoint id.
    #[inline]
    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    /// Returns the routing instructions.
    #[inline]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Returns the tools in declaration order.
    #[inline]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Returns the serializable description of this config.
    ///
    /// Equal configs produce equal payloads, and the JSON encoding of a
    /// payload is stable.
    pub fn payload(&self) -> AgentPayload {
        AgentPayload {
            endpoint_id: self.endpoint_id.clone(),
            instructions: self.instructions.clone(),
            tools: self
                .tools
                .iter()
                .map(|tool| ToolPayload {
                    display_name: tool.display_name().to_owned(),
                    description: tool.description().to_owned(),
                    tool_config: tool.tool_config(),
                })
                .collect(),
        }
    }
}

/// Serializable description of an [`AgentConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPayload {
    /// Agent endpoint id.
    pub endpoint_id: String,
    /// Routing instructions.
    pub instructions: String,
    /// Tools in declaration order.
    pub tools: Vec<ToolPayload>,
}

/// Serializable description of one tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPayload {
    /// Name the tool is registered under.
    pub display_name: String,
    /// Description the routing model reads.
    pub description: String,
    /// Service configuration.
    pub tool_config: ToolConfig,
}

#[cfg(test)]
mod tests {
    use taxagent_model::InputLocation;

    use super::*;
    use crate::tool::{RagTool, SqlTool};

    fn config(connection_id: &str) -> AgentConfig {
        AgentConfig::new("ep:1", "Answer questions.")
            .with_tool(
                SqlTool::builder("sql", InputLocation::inline("DDL"))
                    .with_connection_id(connection_id)
                    .build(),
            )
            .with_tool(RagTool::new("rag", ["kb:1"]))
    }

    #[test]
    fn test_payload_is_deterministic() {
        let a = config("conn:1").payload();
        let b = config("conn:1").payload();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_ne!(a, config("conn:2").payload());
    }

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(config("conn:1").payload()).unwrap();
        assert_eq!(payload["endpointId"], "ep:1");
        assert_eq!(payload["tools"][0]["displayName"], "sql");
        assert_eq!(
            payload["tools"][0]["toolConfig"]["toolConfigType"],
            "SQL_TOOL_CONFIG"
        );
        assert_eq!(
            payload["tools"][1]["toolConfig"]["knowledgeBaseConfigs"][0]
                ["knowledgeBaseId"],
            "kb:1"
        );
    }

    #[test]
    fn test_empty_ids_are_accepted() {
        let config = AgentConfig::new("", "");
        assert_eq!(config.endpoint_id(), "");
        assert!(config.tools().is_empty());
    }
}
