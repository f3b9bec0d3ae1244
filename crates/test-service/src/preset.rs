use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taxagent_model::{FunctionCall, RequiredAction, Trace};

/// The preset result of one chat request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetTurn {
    /// Text of the agent message. `None` produces no message.
    pub text: Option<String>,
    /// Traces attached to the result.
    pub traces: Vec<Trace>,
    /// Actions the caller has to perform.
    pub required_actions: Vec<RequiredAction>,
}

impl PresetTurn {
    /// Creates a `PresetTurn` answering with the specified text.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Creates a `PresetTurn` that asks the caller to call a function.
    #[inline]
    pub fn with_function_call<S1, S2>(
        action_id: S1,
        name: S2,
        arguments: Value,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            required_actions: vec![RequiredAction::FunctionCalling {
                action_id: action_id.into(),
                function_call: FunctionCall {
                    name: name.into(),
                    arguments: arguments.to_string(),
                },
            }],
            ..Default::default()
        }
    }

    /// Attaches a trace of the given type.
    #[inline]
    pub fn with_trace<S: Into<String>>(
        mut self,
        trace_type: S,
        details: Value,
    ) -> Self {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.traces.push(Trace {
            trace_type: trace_type.into(),
            key: Some(format!("trace:{}", self.traces.len() + 1)),
            time_created: None,
            details,
        });
        self
    }
}
