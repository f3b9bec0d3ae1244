use std::collections::BTreeMap;

use serde_json::Value;
use taxagent_model::FunctionDefinition;

/// Flattens a JSON schema into the string map the service accepts.
pub(crate) fn definition(
    name: &str,
    description: &str,
    schema: &Value,
) -> FunctionDefinition {
    let mut parameters = BTreeMap::new();
    let schema_type = schema
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("object");
    parameters.insert("type".to_owned(), schema_type.to_owned());
    for key in ["properties", "required"] {
        if let Some(value) = schema.get(key) {
            parameters.insert(key.to_owned(), value.to_string());
        }
    }

    FunctionDefinition {
        name: name.to_owned(),
        description: description.trim().to_owned(),
        parameters,
    }
}
