use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload for opening a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionDetails {
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description of the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A conversation session. Turns in the same session share context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identifier of the session.
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Message the agent greets the session with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
}

/// The result of a function the caller executed for the agent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "performedActionType")]
pub enum PerformedAction {
    /// Output of a function calling tool.
    #[serde(
        rename = "FUNCTION_CALLING_PERFORMED_ACTION",
        rename_all = "camelCase"
    )]
    FunctionCalling {
        /// Identifier of the required action being answered.
        action_id: String,
        /// Output of the function.
        function_call_output: String,
    },
}

/// Payload of one conversation turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetails {
    /// The user input. Empty when the turn only carries performed
    /// actions.
    pub user_message: String,
    /// Whether the result is streamed.
    pub should_stream: bool,
    /// Session the turn belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Outputs of previously required actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub performed_actions: Vec<PerformedAction>,
}

/// Where a citation was found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Type of the location, e.g. `OCI_OBJECT_STORAGE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location_type: Option<String>,
    /// URL of the source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A passage a message is based on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    /// The cited text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    /// Where the text was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
}

/// Content of a message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    /// The text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Passages the text is based on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

/// A message produced by the agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Role of the author, usually `AGENT`.
    pub role: String,
    /// Message content.
    #[serde(default)]
    pub content: MessageContent,
    /// Creation time as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
}

/// One step the service took while executing a turn.
///
/// The set of trace types is owned by the service, so only the common
/// members are typed and the rest is kept as is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Type of the trace, e.g. `TOOL_INVOCATION_TRACE`.
    pub trace_type: String,
    /// Identifier of the trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Creation time as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    /// Type-specific members.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// A call the service wants the caller to make.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    /// Name of the function.
    pub name: String,
    /// Arguments encoded as a JSON object string.
    #[serde(default)]
    pub arguments: String,
}

/// An action the caller has to perform before the turn can continue.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "requiredActionType")]
pub enum RequiredAction {
    /// Call a function calling tool.
    #[serde(
        rename = "FUNCTION_CALLING_REQUIRED_ACTION",
        rename_all = "camelCase"
    )]
    FunctionCalling {
        /// Identifier to answer with.
        action_id: String,
        /// The requested call.
        function_call: FunctionCall,
    },
    /// An action type this crate doesn't know about.
    #[serde(other)]
    Unsupported,
}

/// The complete result of a conversation turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResult {
    /// The agent's answer. Absent while actions are still required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Execution traces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<Trace>,
    /// Actions the caller has to perform.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_actions: Vec<RequiredAction>,
    /// Token usage as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_details: Option<Value>,
}

impl ChatResult {
    /// Returns the text of the message, if any.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref()?.content.text.as_deref()
    }
}
