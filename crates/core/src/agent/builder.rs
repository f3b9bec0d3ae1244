use std::time::Duration;

use taxagent_model::AgentService;

use super::{Agent, DEFAULT_MAX_STEPS};
use crate::config::AgentConfig;
use crate::tool::{
    Executor as ToolExecutor, Tool, ToolDescriptor, Toolkit, Toolset,
};

/// [`Agent`] builder.
pub struct AgentBuilder<S> {
    service: S,
    config: AgentConfig,
    toolset: Toolset,
    max_steps: usize,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl<S: AgentService> AgentBuilder<S> {
    /// Creates a new builder with the specified service and config.
    #[inline]
    pub fn with_service(service: S, config: AgentConfig) -> Self {
        Self {
            service,
            config,
            toolset: Toolset::default(),
            max_steps: DEFAULT_MAX_STEPS,
            poll_interval: Duration::from_secs(2),
            poll_attempts: 60,
        }
    }

    /// Registers a function tool executed by this process.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.toolset.add(tool);
        self
    }

    /// Registers all tools of a toolkit.
    #[inline]
    pub fn with_toolkit<K: Toolkit>(mut self, toolkit: K) -> Self {
        toolkit.register(&mut self.toolset);
        self
    }

    /// Sets how many exchanges a single turn may take.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the delay between two lifecycle checks during setup.
    #[inline]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets how many lifecycle checks are made per tool during setup.
    #[inline]
    pub fn with_poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = attempts;
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Agent<S> {
        let Self {
            service,
            mut config,
            toolset,
            max_steps,
            poll_interval,
            poll_attempts,
        } = self;

        let tool_executor = ToolExecutor::with_tools(toolset.tools);
        for definition in tool_executor.definitions() {
            config = config.with_tool(ToolDescriptor::Function(definition));
        }

        Agent {
            service,
            config,
            tool_executor,
            max_steps,
            poll_interval,
            poll_attempts,
            binding: None,
        }
    }
}
