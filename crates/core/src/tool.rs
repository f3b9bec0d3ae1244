//! Tools the remote agent can use.
//!
//! Two families exist. Prebuilt tools ([`SqlTool`], [`RagTool`]) run
//! entirely inside the service; this crate only describes them. Function
//! tools ([`Tool`]) are declared to the service but executed by this
//! process whenever a turn requires them.

mod error;
mod executor;
mod function;
mod rag;
mod sql;

use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::Value;
use taxagent_model::{FunctionDefinition, ToolConfig};

pub use error::{Error, ErrorKind};
pub(crate) use executor::Executor;
pub use rag::RagTool;
pub use sql::{SqlTool, SqlToolBuilder};

/// The result of a tool call.
pub type ToolResult = Result<String, Error>;

/// A function tool that can be called by the agent.
///
/// Implementations of this trait should be stateless, and may not maintain
/// any internal state.
///
/// The tool can be context-aware, meaning it can access additional
/// information about the current execution context, such as the current
/// user. To do this, make the context an immutable state of the tool, which
/// can be set during initialization, and copy it when executing.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the tool.
    fn name(&self) -> &str;

    /// Returns the description of the tool.
    fn description(&self) -> &str;

    /// Returns the parameter schema of the tool, as a JSON schema object.
    fn parameter_schema(&self) -> &Value;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of
    /// `self`.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn definition(&self) -> FunctionDefinition;

    fn execute(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>>;
}

pub(crate) struct AnyTool<T: Tool>(pub T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn definition(&self) -> FunctionDefinition {
        function::definition(
            self.0.name(),
            self.0.description(),
            self.0.parameter_schema(),
        )
    }

    #[inline]
    fn execute(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let input: T::Input = match serde_json::from_value(arguments) {
            Ok(input) => input,
            Err(err) => {
                let reason = format!("{err}");
                return Box::pin(std::future::ready(ToolResult::Err(
                    Error::invalid_input().with_reason(reason),
                )));
            }
        };
        Box::pin(self.0.execute(input))
    }
}

/// An ordered collection of function tools.
#[derive(Default)]
pub struct Toolset {
    pub(crate) tools: Vec<Box<dyn ToolObject>>,
}

impl Toolset {
    /// Adds a tool.
    #[inline]
    pub fn add<T: Tool>(&mut self, tool: T) {
        self.tools.push(Box::new(AnyTool(tool)));
    }

    /// Returns the number of tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if there are no tools.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A group of related function tools registered together.
pub trait Toolkit {
    /// Adds the tools of this kit to `toolset`.
    fn register(self, toolset: &mut Toolset);
}

/// Describes a tool as it is declared to the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolDescriptor {
    /// Natural-language-to-SQL.
    Sql(SqlTool),
    /// Retrieval over knowledge bases.
    Rag(RagTool),
    /// A function executed by this process.
    Function(FunctionDefinition),
}

impl ToolDescriptor {
    /// Returns the name the tool is registered under.
    pub fn display_name(&self) -> &str {
        match self {
            ToolDescriptor::Sql(tool) => tool.name(),
            ToolDescriptor::Rag(tool) => tool.name(),
            ToolDescriptor::Function(function) => &function.name,
        }
    }

    /// Returns the description the routing model reads.
    pub fn description(&self) -> &str {
        match self {
            ToolDescriptor::Sql(tool) => tool.description(),
            ToolDescriptor::Rag(tool) => tool.description(),
            ToolDescriptor::Function(function) => &function.description,
        }
    }

    /// Returns the service configuration of the tool.
    pub fn tool_config(&self) -> ToolConfig {
        match self {
            ToolDescriptor::Sql(tool) => ToolConfig::Sql(tool.to_config()),
            ToolDescriptor::Rag(tool) => ToolConfig::Rag(tool.to_config()),
            ToolDescriptor::Function(function) => ToolConfig::FunctionCalling(
                taxagent_model::FunctionCallingToolConfig {
                    function: function.clone(),
                },
            ),
        }
    }
}

impl From<SqlTool> for ToolDescriptor {
    #[inline]
    fn from(tool: SqlTool) -> Self {
        Self::Sql(tool)
    }
}

impl From<RagTool> for ToolDescriptor {
    #[inline]
    fn from(tool: RagTool) -> Self {
        Self::Rag(tool)
    }
}
