use std::collections::HashSet;

use taxagent_model::{
    AgentService, CreateToolDetails, LifecycleState, LlmConfig,
    LlmCustomization, RemoteTool, UpdateAgentDetails, UpdateToolDetails,
};
use tracing::Instrument;

use super::{Agent, Binding};
use crate::error::{Error, service_error};
use crate::tool::ToolDescriptor;

/// What setup has to do with one declared tool.
#[derive(Debug, PartialEq, Eq)]
enum ToolChange<'a> {
    Create(&'a ToolDescriptor),
    Update(&'a RemoteTool, &'a ToolDescriptor),
    Keep(&'a RemoteTool),
}

impl<S: AgentService> Agent<S> {
    /// Registers the agent on the service.
    ///
    /// The endpoint is resolved to its agent, the routing instructions are
    /// written to the agent if they differ, and the remote tools are made
    /// to match the declared ones by display name: missing tools are
    /// created, changed tools updated and undeclared tools deleted. Setup
    /// returns once every created or updated tool is active.
    ///
    /// Calling `setup` again re-synchronises the agent.
    pub async fn setup(&mut self) -> Result<(), Error> {
        let span = info_span!("setup", endpoint = self.config.endpoint_id());
        let binding = self.sync().instrument(span).await?;
        self.binding = Some(binding);
        Ok(())
    }

    async fn sync(&self) -> Result<Binding, Error> {
        let mut names = HashSet::new();
        for tool in self.config.tools() {
            if !names.insert(tool.display_name()) {
                let name = tool.display_name().to_owned();
                return Err(Error::DuplicateTool(name));
            }
        }

        let endpoint = self
            .service
            .get_agent_endpoint(self.config.endpoint_id())
            .await
            .map_err(service_error)?;
        debug!("endpoint belongs to agent {}", endpoint.agent_id);

        let agent = self
            .service
            .get_agent(&endpoint.agent_id)
            .await
            .map_err(service_error)?;
        if agent.instruction() != Some(self.config.instructions()) {
            info!("updating agent instructions");
            let details = UpdateAgentDetails {
                llm_config: Some(LlmConfig {
                    routing_llm_customization: Some(
                        LlmCustomization::with_instruction(
                            self.config.instructions(),
                        ),
                    ),
                }),
                ..Default::default()
            };
            self.service
                .update_agent(&agent.id, &details)
                .await
                .map_err(service_error)?;
        }

        let remote_tools = self
            .service
            .list_tools(&agent.id, &agent.compartment_id)
            .await
            .map_err(service_error)?;
        let (changes, stale) = plan(self.config.tools(), &remote_tools);

        for tool in stale {
            info!("deleting tool {} ({})", tool.display_name, tool.id);
            self.service
                .delete_tool(&tool.id)
                .await
                .map_err(service_error)?;
        }

        let mut pending = vec![];
        for change in changes {
            match change {
                ToolChange::Create(tool) => {
                    info!("creating tool {}", tool.display_name());
                    let details = CreateToolDetails {
                        agent_id: agent.id.clone(),
                        compartment_id: agent.compartment_id.clone(),
                        display_name: tool.display_name().to_owned(),
                        description: tool.description().to_owned(),
                        tool_config: tool.tool_config(),
                    };
                    let created = self
                        .service
                        .create_tool(&details)
                        .await
                        .map_err(service_error)?;
                    if created.lifecycle_state != Some(LifecycleState::Active) {
                        pending.push(created.id);
                    }
                }
                ToolChange::Update(remote, tool) => {
                    info!(
                        "updating tool {} ({})",
                        remote.display_name, remote.id
                    );
                    let details = UpdateToolDetails {
                        display_name: None,
                        description: Some(tool.description().to_owned()),
                        tool_config: Some(tool.tool_config()),
                    };
                    self.service
                        .update_tool(&remote.id, &details)
                        .await
                        .map_err(service_error)?;
                    pending.push(remote.id.clone());
                }
                ToolChange::Keep(remote) => {
                    debug!("tool {} is up to date", remote.display_name);
                    if remote.lifecycle_state != Some(LifecycleState::Active) {
                        pending.push(remote.id.clone());
                    }
                }
            }
        }

        for tool_id in pending {
            self.wait_until_active(&tool_id).await?;
        }

        Ok(Binding {
            agent_id: agent.id,
            compartment_id: agent.compartment_id,
        })
    }

    async fn wait_until_active(&self, tool_id: &str) -> Result<(), Error> {
        let mut last = None;
        for attempt in 0..self.poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.poll_interval).await;
            }
            let tool = self
                .service
                .get_tool(tool_id)
                .await
                .map_err(service_error)?;
            trace!("tool {tool_id} is {:?}", tool.lifecycle_state);
            match tool.lifecycle_state {
                Some(LifecycleState::Active) => return Ok(()),
                Some(state) if state.is_settled() => {
                    return Err(Error::ToolNotActive {
                        name: tool.display_name,
                        state: Some(state),
                    });
                }
                state => last = Some((tool.display_name, state)),
            }
        }

        let (name, state) = last.unwrap_or_else(|| (tool_id.to_owned(), None));
        Err(Error::ToolNotActive { name, state })
    }
}

/// Matches declared tools with remote ones by display name.
///
/// Returns the change for every declared tool, in declaration order, and
/// the remote tools nobody declares. When several remote tools share a
/// name, the first one is kept and the others are stale. Tools that are
/// deleted or being deleted are ignored.
fn plan<'a>(
    declared: &'a [ToolDescriptor],
    remote: &'a [RemoteTool],
) -> (Vec<ToolChange<'a>>, Vec<&'a RemoteTool>) {
    let remote: Vec<_> = remote
        .iter()
        .filter(|tool| {
            !matches!(
                tool.lifecycle_state,
                Some(LifecycleState::Deleted | LifecycleState::Deleting)
            )
        })
        .collect();
    let mut matched = HashSet::new();
    let changes = declared
        .iter()
        .map(|tool| {
            let found = remote.iter().position(|remote| {
                remote.display_name == tool.display_name()
            });
            match found {
                Some(idx) => {
                    matched.insert(idx);
                    let remote = remote[idx];
                    if remote.description == tool.description()
                        && remote.tool_config == tool.tool_config()
                    {
                        ToolChange::Keep(remote)
                    } else {
                        ToolChange::Update(remote, tool)
                    }
                }
                None => ToolChange::Create(tool),
            }
        })
        .collect();
    let stale = remote
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !matched.contains(idx))
        .map(|(_, tool)| tool)
        .collect();
    (changes, stale)
}
