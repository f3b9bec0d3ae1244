use std::collections::HashMap;

use serde_json::{Value, json};
use taxagent_model::{FunctionDefinition, PerformedAction, RequiredAction};
use tracing::Instrument;

use crate::tool::{Error, ToolObject, ToolResult};

/// An executor that handles the actions required by the service.
pub struct Executor {
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Executor {
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut tool_map = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name();
            tool_map.insert(name.to_owned(), tool);
        }
        let tools = tool_map;
        Self { tools }
    }

    /// Returns the function definitions, ordered by name.
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        let mut definitions: Vec<_> =
            self.tools.values().map(|tool| tool.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Runs the requested functions one after another.
    ///
    /// Failures are reported back to the service as the output of the
    /// action, so a bad call never aborts the turn.
    pub async fn perform(
        &self,
        actions: &[RequiredAction],
    ) -> Vec<PerformedAction> {
        self.perform_in_order(actions)
            .instrument(debug_span!("tool executor"))
            .await
    }

    async fn perform_in_order(
        &self,
        actions: &[RequiredAction],
    ) -> Vec<PerformedAction> {
        let mut performed = Vec::with_capacity(actions.len());
        for action in actions {
            let RequiredAction::FunctionCalling {
                action_id,
                function_call,
            } = action
            else {
                warn!("skipping unsupported required action");
                continue;
            };
            trace!(
                "calling a tool ({action_id}) with args: {}",
                function_call.arguments
            );
            let result = self
                .call(&function_call.name, &function_call.arguments)
                .await;
            let output = match result {
                Ok(output) => output,
                Err(err) => {
                    warn!("tool {} failed: {err}", function_call.name);
                    json!({ "error": err.reason() }).to_string()
                }
            };
            performed.push(PerformedAction::FunctionCalling {
                action_id: action_id.clone(),
                function_call_output: output,
            });
        }
        performed
    }

    async fn call(&self, name: &str, arguments: &str) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            return Err(Error::not_found()
                .with_reason(format!("unknown function: {name}")));
        };
        let arguments = if arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(arguments).map_err(|err| {
                Error::invalid_input().with_reason(format!("{err}"))
            })?
        };
        tool.execute(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde::Deserialize;
    use taxagent_model::FunctionCall;

    use super::*;
    use crate::tool::{AnyTool, Tool};

    #[derive(Deserialize)]
    struct EchoInput {
        text: String,
    }

    struct EchoTool {
        schema: Value,
    }

    impl Tool for EchoTool {
        type Input = EchoInput;

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the text"
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok(input.text))
        }
    }

    fn call(action_id: &str, name: &str, arguments: &str) -> RequiredAction {
        RequiredAction::FunctionCalling {
            action_id: action_id.to_owned(),
            function_call: FunctionCall {
                name: name.to_owned(),
                arguments: arguments.to_owned(),
            },
        }
    }

    fn output(action: &PerformedAction) -> &str {
        let PerformedAction::FunctionCalling {
            function_call_output,
            ..
        } = action;
        function_call_output
    }

    #[tokio::test]
    async fn test_perform() {
        let executor = Executor::with_tools(vec![Box::new(AnyTool(EchoTool {
            schema: json!({ "type": "object" }),
        }))]);
        assert_eq!(executor.definitions()[0].name, "echo");

        let performed = executor
            .perform(&[
                call("action:1", "echo", r#"{"text":"hi"}"#),
                RequiredAction::Unsupported,
                call("action:2", "read_file", "{}"),
                call("action:3", "echo", "{not json"),
                call("action:4", "echo", "{}"),
            ])
            .await;

        assert_eq!(performed.len(), 4);
        assert_eq!(output(&performed[0]), "hi");
        assert_eq!(
            output(&performed[1]),
            r#"{"error":"unknown function: read_file"}"#
        );
        assert!(output(&performed[2]).starts_with(r#"{"error":"#));
        assert!(output(&performed[3]).contains("missing field"));

        let PerformedAction::FunctionCalling { action_id, .. } = &performed[3];
        assert_eq!(action_id, "action:4");
    }
}
