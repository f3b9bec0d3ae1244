use std::future::ready;
use std::time::Duration;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};
use taxagent_model::{
    ErrorKind, InputLocation, LifecycleState, ModelSize, PerformedAction,
    RagToolConfig, RemoteTool, SqlDialect, ToolConfig,
};
use taxagent_test_service::{
    Operation, PresetTurn, RecordedRequest, TestAgentService,
};

use crate::tool::{RagTool, SqlTool, Tool, ToolResult, Toolkit, Toolset};
use crate::{AgentBuilder, AgentConfig, Error};

const ENDPOINT: &str = "ep:1";
const AGENT: &str = "agent:1";
const COMPARTMENT: &str = "compartment:1";

fn service() -> TestAgentService {
    TestAgentService::with_endpoint(ENDPOINT, AGENT, COMPARTMENT)
}

fn config() -> AgentConfig {
    AgentConfig::new(ENDPOINT, "Answer from policies and flight data.")
        .with_tool(
            SqlTool::builder("flights", InputLocation::inline("CREATE TABLE"))
                .with_description("Flight data")
                .with_connection_id("conn:1")
                .with_dialect(SqlDialect::OracleSql)
                .with_model_size(ModelSize::Large)
                .build(),
        )
        .with_tool(
            RagTool::new("policies", ["kb:1"]).with_description("RAG search"),
        )
}

#[derive(Deserialize, JsonSchema)]
struct LookupParameters {
    #[schemars(description = "Id of the user.")]
    user_id: String,
}

struct LookupTool {
    schema: Value,
}

impl Tool for LookupTool {
    type Input = LookupParameters;

    fn name(&self) -> &str {
        "lookup_user"
    }

    fn description(&self) -> &str {
        "Looks up a user."
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(format!("{} is Jane", input.user_id)))
    }
}

struct LookupKit;

impl Toolkit for LookupKit {
    fn register(self, toolset: &mut Toolset) {
        toolset.add(LookupTool {
            schema: schema_for!(LookupParameters).to_value(),
        });
    }
}

#[tokio::test]
async fn test_run_before_setup() {
    let service = service();
    let agent = AgentBuilder::with_service(service.clone(), config()).build();
    assert!(!agent.is_set_up());

    let err = agent.run("Hello", None).await.unwrap_err();
    assert!(matches!(err, Error::NotSetUp));
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_setup_registers_tools() {
    let service = service();
    let mut agent =
        AgentBuilder::with_service(service.clone(), config()).build();
    agent.setup().await.unwrap();
    assert_eq!(agent.agent_id(), Some(AGENT));
    assert_eq!(agent.compartment_id(), Some(COMPARTMENT));

    let remote_agent = service.agent(AGENT).unwrap();
    assert_eq!(
        remote_agent.instruction(),
        Some("Answer from policies and flight data.")
    );

    let tools = service.tools();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].display_name, "flights");
    let ToolConfig::Sql(sql) = &tools[0].tool_config else {
        panic!("unexpected tool config: {:?}", tools[0].tool_config);
    };
    assert_eq!(sql.database_schema, InputLocation::inline("CREATE TABLE"));
    assert_eq!(sql.dialect, SqlDialect::OracleSql);
    assert_eq!(sql.model_size, ModelSize::Large);
    assert_eq!(tools[1].display_name, "policies");
    assert_eq!(tools[1].description, "RAG search");
}

#[tokio::test]
async fn test_setup_is_idempotent() {
    let service = service();
    let mut agent =
        AgentBuilder::with_service(service.clone(), config()).build();
    agent.setup().await.unwrap();
    let first = service.requests().len();

    agent.setup().await.unwrap();
    let second = &service.requests()[first..];
    assert!(second.iter().all(|req| matches!(
        req,
        RecordedRequest::GetAgentEndpoint(_)
            | RecordedRequest::GetAgent(_)
            | RecordedRequest::ListTools { .. }
    )));
    assert_eq!(service.tools().len(), 2);
}

#[tokio::test]
async fn test_setup_syncs_changed_tools() {
    let service = service();
    let mut agent =
        AgentBuilder::with_service(service.clone(), config()).build();
    agent.setup().await.unwrap();
    let stale_id = service.tools()[1].id.clone();

    let changed = AgentConfig::new(ENDPOINT, "Answer from flight data.")
        .with_tool(
            SqlTool::builder("flights", InputLocation::inline("CREATE TABLE"))
                .with_description("Flight data")
                .with_connection_id("conn:2")
                .build(),
        );
    let mut agent =
        AgentBuilder::with_service(service.clone(), changed).build();
    agent.setup().await.unwrap();

    let tools = service.tools();
    assert_eq!(tools.len(), 1);
    let ToolConfig::Sql(sql) = &tools[0].tool_config else {
        panic!("unexpected tool config: {:?}", tools[0].tool_config);
    };
    assert!(format!("{:?}", sql.database_connection).contains("conn:2"));
    assert!(
        service
            .requests()
            .contains(&RecordedRequest::DeleteTool(stale_id))
    );
    assert_eq!(
        service.agent(AGENT).unwrap().instruction(),
        Some("Answer from flight data.")
    );
}

#[tokio::test]
async fn test_setup_skips_deleted_tools() {
    let service = service();
    let deleted = |id: &str, name: &str, state| RemoteTool {
        id: id.to_owned(),
        display_name: name.to_owned(),
        description: String::new(),
        tool_config: ToolConfig::Rag(RagToolConfig {
            knowledge_base_configs: vec![],
            generation_llm_customization: None,
        }),
        lifecycle_state: Some(state),
    };
    service.add_remote_tool(deleted(
        "tool:old",
        "flights",
        LifecycleState::Deleted,
    ));
    service.add_remote_tool(deleted(
        "tool:gone",
        "archive",
        LifecycleState::Deleting,
    ));

    let mut agent =
        AgentBuilder::with_service(service.clone(), config()).build();
    agent.setup().await.unwrap();

    let requests = service.requests();
    assert!(
        !requests
            .iter()
            .any(|req| matches!(req, RecordedRequest::DeleteTool(_)))
    );
    assert!(!requests.iter().any(|req| matches!(
        req,
        RecordedRequest::UpdateTool(id, _) | RecordedRequest::GetTool(id)
            if id == "tool:old"
    )));
    let created = requests
        .iter()
        .filter(|req| matches!(req, RecordedRequest::CreateTool(_)))
        .count();
    assert_eq!(created, 2);

    let active: Vec<_> = service
        .tools()
        .into_iter()
        .filter(|tool| tool.lifecycle_state == Some(LifecycleState::Active))
        .map(|tool| tool.display_name)
        .collect();
    assert_eq!(active.len(), 2);
    assert!(active.contains(&"flights".to_owned()));
    assert!(active.contains(&"policies".to_owned()));
}

#[tokio::test]
async fn test_setup_rejects_duplicate_tools() {
    let service = service();
    let config = config().with_tool(RagTool::new("policies", ["kb:2"]));
    let mut agent = AgentBuilder::with_service(service.clone(), config).build();

    let err = agent.setup().await.unwrap_err();
    assert!(matches!(err, Error::DuplicateTool(name) if name == "policies"));
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_empty_ids_fail_remotely() {
    let service = service();
    let config = AgentConfig::new("", "")
        .with_tool(RagTool::new("policies", [""]));
    let mut agent = AgentBuilder::with_service(service.clone(), config).build();
    assert_eq!(agent.config().endpoint_id(), "");

    let err = agent.setup().await.unwrap_err();
    assert_eq!(err.service_kind(), Some(ErrorKind::NotFound));
    assert!(!agent.is_set_up());
}

#[tokio::test(start_paused = true)]
async fn test_setup_waits_for_active_tools() {
    let service = service();
    service.set_activation_polls(3);
    let mut agent = AgentBuilder::with_service(service.clone(), config())
        .with_poll_interval(Duration::from_secs(5))
        .build();

    let started = tokio::time::Instant::now();
    agent.setup().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(20));

    let polls = service
        .requests()
        .iter()
        .filter(|req| matches!(req, RecordedRequest::GetTool(_)))
        .count();
    assert_eq!(polls, 6);
    assert!(service.tools().iter().all(|tool| {
        tool.lifecycle_state == Some(LifecycleState::Active)
    }));
}

#[tokio::test(start_paused = true)]
async fn test_setup_gives_up_on_inactive_tools() {
    let service = service();
    service.set_activation_polls(10);
    let mut agent = AgentBuilder::with_service(service.clone(), config())
        .with_poll_interval(Duration::from_secs(1))
        .with_poll_attempts(3)
        .build();

    let err = agent.setup().await.unwrap_err();
    assert!(matches!(
        err,
        Error::ToolNotActive {
            ref name,
            state: Some(LifecycleState::Creating),
        } if name == "flights"
    ));
}

#[tokio::test]
async fn test_runs_without_session_are_independent() {
    let service = service();
    service.add_turn(PresetTurn::with_text("Refunds are allowed."));
    service.add_turn(PresetTurn::with_text("5 rows returned"));

    let mut agent =
        AgentBuilder::with_service(service.clone(), config()).build();
    agent.setup().await.unwrap();

    let first = agent.run("give me policies", None).await.unwrap();
    let second = agent.run("get all rows", None).await.unwrap();
    assert_ne!(first.session_id(), second.session_id());
    assert_eq!(first.text(), Some("Refunds are allowed."));
    assert_eq!(second.text(), Some("5 rows returned"));

    let chats = service.chat_requests();
    assert_eq!(chats[0].session_id.as_deref(), Some(first.session_id()));
    assert_eq!(chats[1].session_id.as_deref(), Some(second.session_id()));
    assert_eq!(chats[1].user_message, "get all rows");
}

#[tokio::test]
async fn test_run_continues_session() {
    let service = service();
    service.add_turn(PresetTurn::with_text("Hi"));
    service.add_turn(PresetTurn::with_text("Again"));

    let mut agent =
        AgentBuilder::with_service(service.clone(), config()).build();
    agent.setup().await.unwrap();

    let first = agent.run("Hello", None).await.unwrap();
    let second = agent.run("More", Some(first.session_id())).await.unwrap();
    assert_eq!(second.session_id(), first.session_id());

    let sessions = service
        .requests()
        .iter()
        .filter(|req| matches!(req, RecordedRequest::CreateSession(_)))
        .count();
    assert_eq!(sessions, 1);
    assert!(service.chat_requests().iter().all(|chat| {
        chat.session_id.as_deref() == Some(first.session_id())
    }));
}

#[tokio::test]
async fn test_run_performs_function_calls() {
    let service = service();
    service.add_turn(PresetTurn::with_function_call(
        "action:1",
        "lookup_user",
        json!({ "user_id": "user_123" }),
    ));
    service.add_turn(PresetTurn::with_text("The user is Jane."));

    let mut agent = AgentBuilder::with_service(service.clone(), config())
        .with_toolkit(LookupKit)
        .build();
    assert_eq!(agent.config().tools().len(), 3);
    agent.setup().await.unwrap();

    let function = service
        .tools()
        .into_iter()
        .find_map(|tool| match tool.tool_config {
            ToolConfig::FunctionCalling(config) => Some(config.function),
            _ => None,
        })
        .unwrap();
    assert_eq!(function.name, "lookup_user");
    assert_eq!(function.parameters["required"], r#"["user_id"]"#);

    let response = agent.run("Who am I?", None).await.unwrap();
    assert_eq!(response.text(), Some("The user is Jane."));

    let chats = service.chat_requests();
    assert_eq!(chats.len(), 2);
    assert_eq!(
        chats[1].performed_actions,
        vec![PerformedAction::FunctionCalling {
            action_id: "action:1".to_owned(),
            function_call_output: "user_123 is Jane".to_owned(),
        }]
    );
    assert_eq!(chats[1].session_id, chats[0].session_id);
}

#[tokio::test]
async fn test_run_exceeds_max_steps() {
    let service = service();
    for idx in 0..3 {
        service.add_turn(PresetTurn::with_function_call(
            format!("action:{idx}"),
            "lookup_user",
            json!({ "user_id": "user_123" }),
        ));
    }

    let mut agent = AgentBuilder::with_service(service.clone(), config())
        .with_tool(LookupTool {
            schema: schema_for!(LookupParameters).to_value(),
        })
        .with_max_steps(2)
        .build();
    agent.setup().await.unwrap();

    let err = agent.run("Who am I?", None).await.unwrap_err();
    assert!(matches!(err, Error::MaxStepsExceeded(2)));
    assert_eq!(service.chat_requests().len(), 2);
}

#[tokio::test]
async fn test_run_without_steps_opens_no_session() {
    let service = service();
    let mut agent = AgentBuilder::with_service(service.clone(), config())
        .with_max_steps(0)
        .build();
    agent.setup().await.unwrap();
    let before = service.requests().len();

    let err = agent.run("Who am I?", None).await.unwrap_err();
    assert!(matches!(err, Error::MaxStepsExceeded(0)));
    assert_eq!(service.requests().len(), before);
}

#[tokio::test]
async fn test_service_errors_propagate() {
    let service = service();
    let mut agent =
        AgentBuilder::with_service(service.clone(), config()).build();
    agent.setup().await.unwrap();

    service.fail_next(Operation::Chat, ErrorKind::Unauthorized);
    service.add_turn(PresetTurn::with_text("unused"));
    let err = agent.run("Hello", None).await.unwrap_err();
    assert_eq!(err.service_kind(), Some(ErrorKind::Unauthorized));
    assert!(format!("{err}").starts_with("agent service error (Unauthorized)"));
}
