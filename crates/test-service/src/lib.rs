//! A local fake agent service for testing purpose.

mod preset;

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::{Ready, ready};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taxagent_model::{
    AgentEndpoint, AgentService, AgentServiceError, ChatDetails, ChatResult,
    CreateSessionDetails, CreateToolDetails, ErrorKind, LifecycleState,
    Message, MessageContent, RemoteAgent, RemoteTool, Session,
    UpdateAgentDetails, UpdateToolDetails,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl AgentServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Operations of [`AgentService`], used to inject failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    GetAgentEndpoint,
    GetAgent,
    UpdateAgent,
    ListTools,
    GetTool,
    CreateTool,
    UpdateTool,
    DeleteTool,
    CreateSession,
    Chat,
}

/// A request received by the fake service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedRequest {
    GetAgentEndpoint(String),
    GetAgent(String),
    UpdateAgent(String, UpdateAgentDetails),
    ListTools {
        agent_id: String,
        compartment_id: String,
    },
    GetTool(String),
    CreateTool(CreateToolDetails),
    UpdateTool(String, UpdateToolDetails),
    DeleteTool(String),
    CreateSession(String),
    Chat(String, ChatDetails),
}

#[derive(Default)]
struct State {
    endpoints: HashMap<String, AgentEndpoint>,
    agents: HashMap<String, RemoteAgent>,
    tools: BTreeMap<String, RemoteTool>,
    // Remaining `get_tool` calls before a tool becomes active.
    pending_polls: HashMap<String, u32>,
    activation_polls: u32,
    sessions: HashSet<String>,
    turns: VecDeque<PresetTurn>,
    failures: HashMap<Operation, ErrorKind>,
    requests: Vec<RecordedRequest>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}:{}", self.next_id)
    }

    fn check(&mut self, op: Operation) -> Result<(), Error> {
        match self.failures.remove(&op) {
            Some(kind) => Err(Error::new(format!("injected {op:?}"), kind)),
            None => Ok(()),
        }
    }

    fn tool_mut(&mut self, tool_id: &str) -> Result<&mut RemoteTool, Error> {
        self.tools
            .get_mut(tool_id)
            .ok_or_else(|| Error::new("tool not found", ErrorKind::NotFound))
    }
}

/// A local fake agent service for testing purpose.
///
/// The service keeps agents, tools and sessions in memory and answers chat
/// requests with the preset turns in the order they were added. If there
/// are no enough turns, an error will be returned. Every request is
/// recorded and can be inspected afterwards.
///
/// Clones share the same state, so a clone can be kept by the test while
/// the original is moved into the agent.
///
/// # Note
///
/// This type is not optimized for production use. You should only use it
/// for testing.
#[derive(Clone, Default)]
pub struct TestAgentService {
    state: Arc<Mutex<State>>,
}

impl TestAgentService {
    /// Creates a service hosting one agent behind one endpoint.
    pub fn with_endpoint(
        endpoint_id: &str,
        agent_id: &str,
        compartment_id: &str,
    ) -> Self {
        let service = Self::default();
        {
            let mut state = service.lock();
            state.endpoints.insert(
                endpoint_id.to_owned(),
                AgentEndpoint {
                    id: endpoint_id.to_owned(),
                    agent_id: agent_id.to_owned(),
                    compartment_id: compartment_id.to_owned(),
                    display_name: None,
                    lifecycle_state: Some(LifecycleState::Active),
                },
            );
            state.agents.insert(
                agent_id.to_owned(),
                RemoteAgent {
                    id: agent_id.to_owned(),
                    compartment_id: compartment_id.to_owned(),
                    display_name: None,
                    description: None,
                    llm_config: None,
                    lifecycle_state: Some(LifecycleState::Active),
                },
            );
        }
        service
    }

    /// Adds a tool that already exists on the service.
    pub fn add_remote_tool(&self, tool: RemoteTool) {
        self.lock().tools.insert(tool.id.clone(), tool);
    }

    /// Adds the result of the next unanswered chat request.
    pub fn add_turn(&self, turn: PresetTurn) {
        self.lock().turns.push_back(turn);
    }

    /// Makes the next call of `op` fail with `kind`.
    pub fn fail_next(&self, op: Operation, kind: ErrorKind) {
        self.lock().failures.insert(op, kind);
    }

    /// Sets how many times `get_tool` reports a created or updated tool as
    /// still in progress.
    pub fn set_activation_polls(&self, polls: u32) {
        self.lock().activation_polls = polls;
    }

    /// Returns all requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Returns the chat requests received so far.
    pub fn chat_requests(&self) -> Vec<ChatDetails> {
        self.lock()
            .requests
            .iter()
            .filter_map(|req| match req {
                RecordedRequest::Chat(_, details) => Some(details.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the tools currently registered, ordered by id.
    pub fn tools(&self) -> Vec<RemoteTool> {
        self.lock().tools.values().cloned().collect()
    }

    /// Returns an agent as currently stored.
    pub fn agent(&self, agent_id: &str) -> Option<RemoteAgent> {
        self.lock().agents.get(agent_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle<T>(
        &self,
        op: Operation,
        request: RecordedRequest,
        f: impl FnOnce(&mut State) -> Result<T, Error>,
    ) -> Ready<Result<T, Error>> {
        let mut state = self.lock();
        state.requests.push(request);
        let result = state.check(op).and_then(|_| f(&mut state));
        ready(result)
    }
}

impl AgentService for TestAgentService {
    type Error = Error;

    fn get_agent_endpoint(
        &self,
        endpoint_id: &str,
    ) -> impl Future<Output = Result<AgentEndpoint, Self::Error>> + Send + 'static
    {
        self.handle(
            Operation::GetAgentEndpoint,
            RecordedRequest::GetAgentEndpoint(endpoint_id.to_owned()),
            |state| {
                state.endpoints.get(endpoint_id).cloned().ok_or_else(|| {
                    Error::new("endpoint not found", ErrorKind::NotFound)
                })
            },
        )
    }

    fn get_agent(
        &self,
        agent_id: &str,
    ) -> impl Future<Output = Result<RemoteAgent, Self::Error>> + Send + 'static
    {
        self.handle(
            Operation::GetAgent,
            RecordedRequest::GetAgent(agent_id.to_owned()),
            |state| {
                state.agents.get(agent_id).cloned().ok_or_else(|| {
                    Error::new("agent not found", ErrorKind::NotFound)
                })
            },
        )
    }

    fn update_agent(
        &self,
        agent_id: &str,
        details: &UpdateAgentDetails,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        self.handle(
            Operation::UpdateAgent,
            RecordedRequest::UpdateAgent(agent_id.to_owned(), details.clone()),
            |state| {
                let agent = state.agents.get_mut(agent_id).ok_or_else(|| {
                    Error::new("agent not found", ErrorKind::NotFound)
                })?;
                if let Some(name) = &details.display_name {
                    agent.display_name = Some(name.clone());
                }
                if let Some(description) = &details.description {
                    agent.description = Some(description.clone());
                }
                if let Some(llm_config) = &details.llm_config {
                    agent.llm_config = Some(llm_config.clone());
                }
                Ok(())
            },
        )
    }

    fn list_tools(
        &self,
        agent_id: &str,
        compartment_id: &str,
    ) -> impl Future<Output = Result<Vec<RemoteTool>, Self::Error>> + Send + 'static
    {
        self.handle(
            Operation::ListTools,
            RecordedRequest::ListTools {
                agent_id: agent_id.to_owned(),
                compartment_id: compartment_id.to_owned(),
            },
            |state| Ok(state.tools.values().cloned().collect()),
        )
    }

    fn get_tool(
        &self,
        tool_id: &str,
    ) -> impl Future<Output = Result<RemoteTool, Self::Error>> + Send + 'static
    {
        self.handle(
            Operation::GetTool,
            RecordedRequest::GetTool(tool_id.to_owned()),
            |state| {
                let remaining = state.pending_polls.remove(tool_id);
                let tool = state.tool_mut(tool_id)?;
                match remaining {
                    Some(polls) if polls > 1 => {
                        let tool = tool.clone();
                        state.pending_polls.insert(tool_id.to_owned(), polls - 1);
                        Ok(tool)
                    }
                    _ => {
                        tool.lifecycle_state = Some(LifecycleState::Active);
                        Ok(tool.clone())
                    }
                }
            },
        )
    }

    fn create_tool(
        &self,
        details: &CreateToolDetails,
    ) -> impl Future<Output = Result<RemoteTool, Self::Error>> + Send + 'static
    {
        self.handle(
            Operation::CreateTool,
            RecordedRequest::CreateTool(details.clone()),
            |state| {
                let id = state.next_id("tool");
                let polls = state.activation_polls;
                let tool = RemoteTool {
                    id: id.clone(),
                    display_name: details.display_name.clone(),
                    description: details.description.clone(),
                    tool_config: details.tool_config.clone(),
                    lifecycle_state: Some(if polls > 0 {
                        LifecycleState::Creating
                    } else {
                        LifecycleState::Active
                    }),
                };
                if polls > 0 {
                    state.pending_polls.insert(id.clone(), polls);
                }
                state.tools.insert(id, tool.clone());
                Ok(tool)
            },
        )
    }

    fn update_tool(
        &self,
        tool_id: &str,
        details: &UpdateToolDetails,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        self.handle(
            Operation::UpdateTool,
            RecordedRequest::UpdateTool(tool_id.to_owned(), details.clone()),
            |state| {
                let polls = state.activation_polls;
                let tool = state.tool_mut(tool_id)?;
                if let Some(name) = &details.display_name {
                    tool.display_name = name.clone();
                }
                if let Some(description) = &details.description {
                    tool.description = description.clone();
                }
                if let Some(config) = &details.tool_config {
                    tool.tool_config = config.clone();
                }
                if polls > 0 {
                    tool.lifecycle_state = Some(LifecycleState::Updating);
                    state.pending_polls.insert(tool_id.to_owned(), polls);
                }
                Ok(())
            },
        )
    }

    fn delete_tool(
        &self,
        tool_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        self.handle(
            Operation::DeleteTool,
            RecordedRequest::DeleteTool(tool_id.to_owned()),
            |state| {
                state.tools.remove(tool_id).map(|_| ()).ok_or_else(|| {
                    Error::new("tool not found", ErrorKind::NotFound)
                })
            },
        )
    }

    fn create_session(
        &self,
        endpoint_id: &str,
        details: &CreateSessionDetails,
    ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'static {
        self.handle(
            Operation::CreateSession,
            RecordedRequest::CreateSession(endpoint_id.to_owned()),
            |state| {
                if !state.endpoints.contains_key(endpoint_id) {
                    return Err(Error::new(
                        "endpoint not found",
                        ErrorKind::NotFound,
                    ));
                }
                let id = state.next_id("session");
                state.sessions.insert(id.clone());
                Ok(Session {
                    id,
                    display_name: details.display_name.clone(),
                    welcome_message: None,
                })
            },
        )
    }

    fn chat(
        &self,
        endpoint_id: &str,
        details: &ChatDetails,
    ) -> impl Future<Output = Result<ChatResult, Self::Error>> + Send + 'static
    {
        self.handle(
            Operation::Chat,
            RecordedRequest::Chat(endpoint_id.to_owned(), details.clone()),
            |state| {
                if !state.endpoints.contains_key(endpoint_id) {
                    return Err(Error::new(
                        "endpoint not found",
                        ErrorKind::NotFound,
                    ));
                }
                let Some(session_id) = &details.session_id else {
                    return Err(Error::new(
                        "session id is required",
                        ErrorKind::InvalidRequest,
                    ));
                };
                if !state.sessions.contains(session_id) {
                    return Err(Error::new(
                        "session not found",
                        ErrorKind::NotFound,
                    ));
                }
                let Some(turn) = state.turns.pop_front() else {
                    return Err(Error::new(
                        "no enough turns",
                        ErrorKind::RateLimitExceeded,
                    ));
                };
                Ok(ChatResult {
                    message: turn.text.map(|text| Message {
                        role: "AGENT".to_owned(),
                        content: MessageContent {
                            text: Some(text),
                            citations: vec![],
                        },
                        time_created: None,
                    }),
                    traces: turn.traces,
                    required_actions: turn.required_actions,
                    usage_details: None,
                })
            },
        )
    }
}
