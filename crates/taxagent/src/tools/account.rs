use std::collections::BTreeMap;
use std::future::ready;
use std::sync::Arc;

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taxagent_core::tool::{
    Error as ToolError, Tool, ToolResult, Toolkit, Toolset,
};

#[derive(Deserialize, JsonSchema)]
pub struct UserInfoParameters {
    #[schemars(description = "The id of the user, e.g. `user_123`.")]
    user_id: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct OrgInfoParameters {
    #[schemars(description = "The id of the organization, e.g. `org_456`.")]
    org_id: String,
}

/// A user account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Organization the user works for.
    pub org_id: String,
}

/// An organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrgInfo {
    /// Legal name.
    pub name: String,
    /// Industry the organization operates in.
    pub industry: String,
    /// Country of registration.
    pub country: String,
}

/// An in-memory account directory.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    users: BTreeMap<String, UserInfo>,
    orgs: BTreeMap<String, OrgInfo>,
}

impl Directory {
    /// Returns the directory the demo runs with.
    pub fn demo() -> Self {
        let mut directory = Self::default();
        directory.users.insert(
            "user_123".to_owned(),
            UserInfo {
                name: "Jane Doe".to_owned(),
                email: "jane.doe@example.com".to_owned(),
                org_id: "org_456".to_owned(),
            },
        );
        directory.orgs.insert(
            "org_456".to_owned(),
            OrgInfo {
                name: "Acme Travel Ltd.".to_owned(),
                industry: "Business travel".to_owned(),
                country: "USA".to_owned(),
            },
        );
        directory
    }
}

/// Looks up user accounts and their organizations.
///
/// The caller is expected to tell the agent who the logged in user is,
/// typically by prefixing the input with a context line.
#[derive(Clone, Debug)]
pub struct AccountToolkit {
    directory: Arc<Directory>,
}

impl AccountToolkit {
    /// Creates a toolkit over the demo directory.
    #[inline]
    pub fn new() -> Self {
        Self::with_directory(Directory::demo())
    }

    /// Creates a toolkit over the given directory.
    #[inline]
    pub fn with_directory(directory: Directory) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }
}

impl Default for AccountToolkit {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Toolkit for AccountToolkit {
    fn register(self, toolset: &mut Toolset) {
        toolset.add(UserInfoTool {
            directory: Arc::clone(&self.directory),
            parameter_schema: schema_for!(UserInfoParameters).to_value(),
        });
        toolset.add(OrgInfoTool {
            directory: self.directory,
            parameter_schema: schema_for!(OrgInfoParameters).to_value(),
        });
    }
}

/// A tool returning the account of a user.
pub struct UserInfoTool {
    directory: Arc<Directory>,
    parameter_schema: Value,
}

impl Tool for UserInfoTool {
    type Input = UserInfoParameters;

    fn name(&self) -> &str {
        "get_user_info"
    }

    fn description(&self) -> &str {
        r#"
Get the account information of a user: name, email and the id of the
organization the user works for."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: UserInfoParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let result = match self.directory.users.get(&input.user_id) {
            Some(user) => to_output(user),
            None => Err(ToolError::execution_error()
                .with_reason(format!("no user with id `{}`", input.user_id))),
        };
        ready(result)
    }
}

/// A tool returning the details of an organization.
pub struct OrgInfoTool {
    directory: Arc<Directory>,
    parameter_schema: Value,
}

impl Tool for OrgInfoTool {
    type Input = OrgInfoParameters;

    fn name(&self) -> &str {
        "get_org_info"
    }

    fn description(&self) -> &str {
        "Get the name, industry and country of an organization."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: OrgInfoParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let result = match self.directory.orgs.get(&input.org_id) {
            Some(org) => to_output(org),
            None => Err(ToolError::execution_error().with_reason(format!(
                "no organization with id `{}`",
                input.org_id
            ))),
        };
        ready(result)
    }
}

fn to_output<T: Serialize>(value: &T) -> ToolResult {
    serde_json::to_string(value).map_err(|err| {
        ToolError::execution_error().with_reason(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tools() -> (UserInfoTool, OrgInfoTool) {
        let directory = Arc::new(Directory::demo());
        (
            UserInfoTool {
                directory: Arc::clone(&directory),
                parameter_schema: schema_for!(UserInfoParameters).to_value(),
            },
            OrgInfoTool {
                directory,
                parameter_schema: schema_for!(OrgInfoParameters).to_value(),
            },
        )
    }

    #[tokio::test]
    async fn test_user_and_org() {
        let (users, orgs) = tools();

        let output = users
            .execute(UserInfoParameters {
                user_id: "user_123".to_owned(),
            })
            .await
            .unwrap();
        let user: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(user["name"], "Jane Doe");
        assert_eq!(user["org_id"], "org_456");

        let output = orgs
            .execute(OrgInfoParameters {
                org_id: "org_456".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&output).unwrap(),
            json!({
                "name": "Acme Travel Ltd.",
                "industry": "Business travel",
                "country": "USA"
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (users, orgs) = tools();

        let err = users
            .execute(UserInfoParameters {
                user_id: "user_999".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "no user with id `user_999`");

        let err = orgs
            .execute(OrgInfoParameters {
                org_id: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "no organization with id ``");
    }

    #[test]
    fn test_register() {
        let mut toolset = Toolset::default();
        AccountToolkit::new().register(&mut toolset);
        assert_eq!(toolset.len(), 2);

        let (users, _) = tools();
        assert_eq!(users.parameter_schema()["required"], json!(["user_id"]));
    }
}
