use std::error::Error;

use crate::agent::{AgentEndpoint, RemoteAgent, UpdateAgentDetails};
use crate::chat::{ChatDetails, ChatResult, CreateSessionDetails, Session};
use crate::error::ErrorKind;
use crate::tool::{CreateToolDetails, RemoteTool, UpdateToolDetails};

/// The error type for an agent service.
pub trait AgentServiceError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents the remote agent service, which hosts agents,
/// keeps their tool registrations and executes conversation turns.
///
/// Implementations should behave like stateless objects from the
/// caller's point of view: every piece of state (agents, tools,
/// sessions) lives in the service and is addressed by identifiers.
///
/// Every method returns a future that is independent of `self` and of
/// the borrowed arguments, so callers are free to drop the service
/// while a request is in flight.
pub trait AgentService: Send + Sync {
    /// The error type that may be returned by the service.
    type Error: AgentServiceError;

    /// Fetches an agent endpoint, which tells the agent and compartment
    /// it belongs to.
    fn get_agent_endpoint(
        &self,
        endpoint_id: &str,
    ) -> impl Future<Output = Result<AgentEndpoint, Self::Error>> + Send + 'static;

    /// Fetches an agent.
    fn get_agent(
        &self,
        agent_id: &str,
    ) -> impl Future<Output = Result<RemoteAgent, Self::Error>> + Send + 'static;

    /// Updates the mutable properties of an agent.
    fn update_agent(
        &self,
        agent_id: &str,
        details: &UpdateAgentDetails,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static;

    /// Lists the tools registered on an agent.
    fn list_tools(
        &self,
        agent_id: &str,
        compartment_id: &str,
    ) -> impl Future<Output = Result<Vec<RemoteTool>, Self::Error>> + Send + 'static;

    /// Fetches a tool.
    fn get_tool(
        &self,
        tool_id: &str,
    ) -> impl Future<Output = Result<RemoteTool, Self::Error>> + Send + 'static;

    /// Registers a new tool on an agent.
    fn create_tool(
        &self,
        details: &CreateToolDetails,
    ) -> impl Future<Output = Result<RemoteTool, Self::Error>> + Send + 'static;

    /// Updates a registered tool.
    fn update_tool(
        &self,
        tool_id: &str,
        details: &UpdateToolDetails,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static;

    /// Removes a registered tool.
    fn delete_tool(
        &self,
        tool_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static;

    /// Opens a new conversation session on an endpoint.
    fn create_session(
        &self,
        endpoint_id: &str,
        details: &CreateSessionDetails,
    ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'static;

    /// Executes one conversation turn and waits for the complete result.
    fn chat(
        &self,
        endpoint_id: &str,
        details: &ChatDetails,
    ) -> impl Future<Output = Result<ChatResult, Self::Error>> + Send + 'static;
}
