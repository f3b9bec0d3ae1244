use serde::{Deserialize, Serialize};

/// Lifecycle of a remote resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// The resource is being created.
    Creating,
    /// The resource is being updated.
    Updating,
    /// The resource is ready for use.
    Active,
    /// The resource is being deleted.
    Deleting,
    /// The resource has been deleted.
    Deleted,
    /// The last operation on the resource failed.
    Failed,
    /// A state this crate doesn't know about.
    #[serde(other)]
    Unknown,
}

impl LifecycleState {
    /// Returns `true` if no further transition is expected without a new
    /// operation on the resource.
    #[inline]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Creating | Self::Updating | Self::Deleting)
    }
}

/// An agent endpoint, the addressable entry through which conversations
/// reach an agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEndpoint {
    /// Identifier of the endpoint.
    pub id: String,
    /// Identifier of the agent behind this endpoint.
    pub agent_id: String,
    /// Compartment the endpoint belongs to.
    pub compartment_id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Current lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<LifecycleState>,
}

/// Instruction customization for one of the models the service runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmCustomization {
    /// Free-form instruction text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl LlmCustomization {
    /// Creates a customization carrying the given instruction.
    #[inline]
    pub fn with_instruction<S: Into<String>>(instruction: S) -> Self {
        Self {
            instruction: Some(instruction.into()),
        }
    }
}

/// Model configuration of an agent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// Customization of the model that routes user input to tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_llm_customization: Option<LlmCustomization>,
}

impl LlmConfig {
    /// Returns the routing instruction, if any.
    #[inline]
    pub fn routing_instruction(&self) -> Option<&str> {
        self.routing_llm_customization
            .as_ref()
            .and_then(|c| c.instruction.as_deref())
    }
}

/// An agent as stored by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAgent {
    /// Identifier of the agent.
    pub id: String,
    /// Compartment the agent belongs to.
    pub compartment_id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description of the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Model configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_config: Option<LlmConfig>,
    /// Current lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<LifecycleState>,
}

impl RemoteAgent {
    /// Returns the instruction the agent currently routes with.
    #[inline]
    pub fn instruction(&self) -> Option<&str> {
        self.llm_config
            .as_ref()
            .and_then(LlmConfig::routing_instruction)
    }
}

/// Payload for updating an agent. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentDetails {
    /// New human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New model configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_config: Option<LlmConfig>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_agent_instruction() {
        let agent: RemoteAgent = serde_json::from_value(json!({
            "id": "agent:1",
            "compartmentId": "compartment:1",
            "llmConfig": {
                "routingLlmCustomization": { "instruction": "Be brief" }
            },
            "lifecycleState": "ACTIVE",
            "timeCreated": "2025-07-18T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(agent.instruction(), Some("Be brief"));
        assert_eq!(agent.lifecycle_state, Some(LifecycleState::Active));
    }

    #[test]
    fn test_unknown_lifecycle_state() {
        let state: LifecycleState =
            serde_json::from_value(json!("NEEDS_ATTENTION")).unwrap();
        assert_eq!(state, LifecycleState::Unknown);
        assert!(state.is_settled());
        assert!(!LifecycleState::Creating.is_settled());
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let details = UpdateAgentDetails {
            llm_config: Some(LlmConfig {
                routing_llm_customization: Some(
                    LlmCustomization::with_instruction("Hello"),
                ),
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&details).unwrap(),
            json!({
                "llmConfig": {
                    "routingLlmCustomization": { "instruction": "Hello" }
                }
            })
        );
    }
}
