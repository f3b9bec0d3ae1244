use serde_json::json;
use taxagent::core::AgentBuilder;
use taxagent::driver::{DEFAULT_INPUTS, DEMO_CONTEXT, RunOptions, run_turns};
use taxagent::presets::{
    self, DEFAULT_SQL_CONNECTION_ID, FLIGHT_DATA_SCHEMA, FLIGHT_SQL_TOOL_NAME,
    PresetOptions,
};
use taxagent::settings::Settings;
use taxagent::tools::AccountToolkit;
use taxagent_model::{InputLocation, ToolConfig};
use taxagent_test_service::{PresetTurn, TestAgentService};

fn settings() -> Settings {
    Settings::from_lookup(|key| {
        let value = match key {
            "OCI_CONFIG_FILE" => "~/.oci/config",
            "OCI_PROFILE" => "DEFAULT",
            "AGENT_REGION" => "us-chicago-1",
            "AGENT_EP_ID" => "ep:1",
            "TAX_AGENT_KB_ME_ID" => "kb:me",
            _ => return None,
        };
        Some(value.to_owned())
    })
    .unwrap()
}

fn inputs() -> Vec<String> {
    DEFAULT_INPUTS.iter().map(|input| input.to_string()).collect()
}

#[tokio::test]
async fn test_default_turns() {
    let service = TestAgentService::with_endpoint("ep:1", "agent:1", "c:1");
    service.add_turn(PresetTurn::with_text("Terms apply to all bookings."));
    service.add_turn(
        PresetTurn::with_text("5 rows returned").with_trace(
            "TOOL_INVOCATION_TRACE",
            json!({ "generatedSql": "SELECT * FROM FLIGHT_DATA" }),
        ),
    );

    let config =
        presets::build_agent_config(&settings(), &PresetOptions::default())
            .unwrap();
    let mut agent = AgentBuilder::with_service(service.clone(), config).build();
    agent.setup().await.unwrap();

    let sql = service
        .tools()
        .into_iter()
        .find(|tool| tool.display_name == FLIGHT_SQL_TOOL_NAME)
        .unwrap();
    let ToolConfig::Sql(sql) = sql.tool_config else {
        panic!("unexpected tool config: {:?}", sql.tool_config);
    };
    assert_eq!(sql.database_schema, InputLocation::inline(FLIGHT_DATA_SCHEMA));
    assert!(
        format!("{:?}", sql.database_connection)
            .contains(DEFAULT_SQL_CONNECTION_ID)
    );

    let mut out = vec![];
    let responses =
        run_turns(&agent, &inputs(), &RunOptions::default(), &mut out)
            .await
            .unwrap();
    assert_eq!(responses.len(), 2);
    assert_ne!(responses[0].session_id(), responses[1].session_id());
    assert_eq!(responses[1].text(), Some("5 rows returned"));

    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with(
        "> give me policies on terms and conditions\n\
         Terms apply to all bookings.\n\n\
         > get all rows from table flight_data\n\
         5 rows returned\n\n\
         Traces:\n\
         --- TOOL_INVOCATION_TRACE (trace:1)\n"
    ));
    assert!(out.contains("\"generatedSql\": \"SELECT * FROM FLIGHT_DATA\""));
}

#[tokio::test]
async fn test_chained_turns_with_context() {
    let service = TestAgentService::with_endpoint("ep:1", "agent:1", "c:1");
    service.add_turn(PresetTurn::with_function_call(
        "action:1",
        "get_user_info",
        json!({ "user_id": "user_123" }),
    ));
    service.add_turn(PresetTurn::with_text("You are Jane Doe."));
    service.add_turn(PresetTurn::with_text("Acme Travel Ltd."));

    let config =
        presets::build_agent_config(&settings(), &PresetOptions::default())
            .unwrap();
    let mut agent = AgentBuilder::with_service(service.clone(), config)
        .with_toolkit(AccountToolkit::new())
        .build();
    agent.setup().await.unwrap();
    assert_eq!(service.tools().len(), 4);

    let inputs = vec![
        "Get user information for user logged in.".to_owned(),
        "Get more information about the organization.".to_owned(),
    ];
    let options = RunOptions {
        chain_session: true,
        context: Some(DEMO_CONTEXT.to_owned()),
        show_traces: false,
        color: false,
    };
    let mut out = vec![];
    let responses = run_turns(&agent, &inputs, &options, &mut out)
        .await
        .unwrap();
    assert_eq!(responses[0].session_id(), responses[1].session_id());

    let chats = service.chat_requests();
    assert_eq!(chats.len(), 3);
    assert_eq!(
        chats[0].user_message,
        format!("{DEMO_CONTEXT} Get user information for user logged in.")
    );
    assert!(chats[1].user_message.is_empty());
    assert_eq!(chats[1].performed_actions.len(), 1);
    assert!(
        chats
            .iter()
            .all(|chat| chat.session_id == chats[0].session_id)
    );

    let out = String::from_utf8(out).unwrap();
    assert!(!out.contains("Traces:"));
    assert!(out.contains("You are Jane Doe.\n"));
}

#[tokio::test]
async fn test_failing_turn_stops_the_run() {
    let service = TestAgentService::with_endpoint("ep:1", "agent:1", "c:1");
    service.add_turn(PresetTurn::with_text("Only one answer."));

    let config =
        presets::build_agent_config(&settings(), &PresetOptions::default())
            .unwrap();
    let mut agent = AgentBuilder::with_service(service.clone(), config).build();
    agent.setup().await.unwrap();

    let mut out = vec![];
    let err = run_turns(&agent, &inputs(), &RunOptions::default(), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, taxagent::Error::Agent(_)));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "> give me policies on terms and conditions\nOnly one answer.\n\n"
    );
}
