use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::agent::{LifecycleState, LlmCustomization};

/// Where the service reads a piece of text from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "inputLocationType")]
pub enum InputLocation {
    /// The text is carried in the payload itself.
    #[serde(rename = "INLINE")]
    Inline {
        /// The text.
        content: String,
    },
    /// The text is stored in an object storage bucket.
    #[serde(rename = "OBJECT_STORAGE_PREFIX", rename_all = "camelCase")]
    ObjectStoragePrefix {
        /// Object storage namespace.
        namespace_name: String,
        /// Bucket name.
        bucket_name: String,
        /// Object name prefix.
        prefix: String,
    },
}

impl InputLocation {
    /// Creates an inline location.
    #[inline]
    pub fn inline<S: Into<String>>(content: S) -> Self {
        Self::Inline {
            content: content.into(),
        }
    }
}

/// SQL dialect the generated statements target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlDialect {
    /// Oracle SQL.
    OracleSql,
    /// SQLite.
    SqlLite,
}

/// Size of the model generating SQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelSize {
    /// Faster, less capable.
    Small,
    /// Slower, more capable.
    Large,
}

/// Connection used to execute generated SQL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "connectionType")]
pub enum DatabaseConnection {
    /// A pre-provisioned database tools connection.
    #[serde(rename = "DATABASE_TOOL_CONNECTION", rename_all = "camelCase")]
    DatabaseToolConnection {
        /// Identifier of the connection.
        connection_id: String,
    },
}

/// Configuration of a natural-language-to-SQL tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlToolConfig {
    /// Target dialect.
    pub dialect: SqlDialect,
    /// Generation model size.
    pub model_size: ModelSize,
    /// Whether generated statements are executed.
    #[serde(default)]
    pub should_enable_sql_execution: bool,
    /// Whether failed statements are corrected and retried by the
    /// service.
    #[serde(default)]
    pub should_enable_self_correction: bool,
    /// Database schema (DDL).
    pub database_schema: InputLocation,
    /// Natural-language description of tables and columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_and_column_description: Option<InputLocation>,
    /// In-context learning examples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icl_examples: Option<InputLocation>,
    /// Connection used for execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_connection: Option<DatabaseConnection>,
    /// Custom instruction for the generation model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_llm_customization: Option<LlmCustomization>,
}

/// Reference to a knowledge base.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseConfig {
    /// Identifier of the knowledge base.
    pub knowledge_base_id: String,
}

/// Configuration of a retrieval-augmented-generation tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagToolConfig {
    /// Knowledge bases the tool searches.
    #[serde(default)]
    pub knowledge_base_configs: Vec<KnowledgeBaseConfig>,
    /// Custom instruction for the generation model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_llm_customization: Option<LlmCustomization>,
}

/// Declaration of a function the caller executes on behalf of the agent.
///
/// The service accepts a flat string map as parameters, so a JSON schema
/// has its `properties` and `required` members stored as JSON strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    /// Name of the function.
    pub name: String,
    /// Description of the function.
    #[serde(default)]
    pub description: String,
    /// Flattened parameter schema.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Configuration of a function calling tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallingToolConfig {
    /// The declared function.
    pub function: FunctionDefinition,
}

/// The configuration of a tool, tagged by its type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "toolConfigType")]
pub enum ToolConfig {
    /// Natural-language-to-SQL.
    #[serde(rename = "SQL_TOOL_CONFIG")]
    Sql(SqlToolConfig),
    /// Retrieval over knowledge bases.
    #[serde(rename = "RAG_TOOL_CONFIG")]
    Rag(RagToolConfig),
    /// A function executed by the caller.
    #[serde(rename = "FUNCTION_CALLING_TOOL_CONFIG")]
    FunctionCalling(FunctionCallingToolConfig),
}

/// A tool as registered on the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    /// Identifier of the tool.
    pub id: String,
    /// Human-readable name, unique per agent.
    pub display_name: String,
    /// Description the routing model reads.
    #[serde(default)]
    pub description: String,
    /// Tool configuration.
    pub tool_config: ToolConfig,
    /// Current lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<LifecycleState>,
}

/// Payload for registering a tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateToolDetails {
    /// Agent the tool is attached to.
    pub agent_id: String,
    /// Compartment of the tool.
    pub compartment_id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Description the routing model reads.
    pub description: String,
    /// Tool configuration.
    pub tool_config: ToolConfig,
}

/// Payload for updating a tool. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateToolDetails {
    /// New human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

/// Container of a list operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection<T> {
    /// Items in this page.
    pub items: Vec<T>,
}
