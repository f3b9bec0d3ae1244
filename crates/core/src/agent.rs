mod builder;
mod run;
mod setup;
#[cfg(test)]
mod tests;

use std::time::Duration;

use taxagent_model::AgentService;

use crate::config::AgentConfig;
use crate::tool::Executor as ToolExecutor;
pub use builder::AgentBuilder;

/// How many exchanges a turn may take by default.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// An agent registered on a remote [`AgentService`].
///
/// An agent starts detached: building it performs no request. Call
/// [`setup`](Agent::setup) once to push the instructions and tools to the
/// service, then [`run`](Agent::run) as many turns as needed.
pub struct Agent<S> {
    service: S,
    config: AgentConfig,
    tool_executor: ToolExecutor,
    max_steps: usize,
    poll_interval: Duration,
    poll_attempts: u32,
    binding: Option<Binding>,
}

/// Where the agent lives on the service, known after setup.
#[derive(Clone, Debug)]
struct Binding {
    agent_id: String,
    compartment_id: String,
}

impl<S: AgentService> Agent<S> {
    /// Returns the config the agent was built with, including the function
    /// tools registered on the builder.
    #[inline]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns `true` once [`setup`](Agent::setup) has succeeded.
    #[inline]
    pub fn is_set_up(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns the id of the remote agent, known after setup.
    #[inline]
    pub fn agent_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|binding| binding.agent_id.as_str())
    }

    /// Returns the compartment of the remote agent, known after setup.
    #[inline]
    pub fn compartment_id(&self) -> Option<&str> {
        self.binding
            .as_ref()
            .map(|binding| binding.compartment_id.as_str())
    }
}
