//! The tools and instructions the assistant is configured with.
//!
//! Nothing here talks to the service; the functions only build values.

use taxagent_core::AgentConfig;
use taxagent_core::tool::{RagTool, SqlTool};
use taxagent_model::{InputLocation, ModelSize, SqlDialect};

use crate::settings::{Settings, SettingsError};

/// Name of the SQL tool on the agent.
pub const FLIGHT_SQL_TOOL_NAME: &str = "Flight SQL Tool - Inline Schema";

/// Description of the SQL tool.
pub const FLIGHT_SQL_TOOL_DESCRIPTION: &str =
    "A NL2SQL tool that retrieves flight data";

/// Name of the RAG tool on the agent.
pub const POLICY_RAG_TOOL_NAME: &str = "Tax Policy RAG Tool";

/// Database tools connection used when `SQL_DB_TOOL_CONNECTION_ID` is
/// unset.
pub const DEFAULT_SQL_CONNECTION_ID: &str = "ocid1.databasetoolsconnection.oc1.us-chicago-1.amaaaaaayanwdzaauwk7ghmrkwojxspv2tcodt43geihocpe4yrendkxtyja";

/// DDL of the `FLIGHT_DATA` table.
pub const FLIGHT_DATA_SCHEMA: &str = r#"CREATE TABLE "ADMIN"."FLIGHT_DATA"
(   "FLIGHT_ID" NUMBER,
    "AIRLINE" VARCHAR2(4000 BYTE) COLLATE "USING_NLS_COMP",
    "FROM_LOCATION" VARCHAR2(4000 BYTE) COLLATE "USING_NLS_COMP",
    "TO_LOCATION" VARCHAR2(4000 BYTE) COLLATE "USING_NLS_COMP",
    "Date" TIMESTAMP (6),
    "TIME_DEPARTURE" TIMESTAMP (6),
    "TIME_ARRIVAL" TIMESTAMP (6),
    "PRICE" NUMBER
)  DEFAULT COLLATION "USING_NLS_COMP" ;
"#;

/// Natural-language description of the `FLIGHT_DATA` columns.
pub const FLIGHT_DATA_DESCRIPTION: &str = r#"FLIGHTS table
- Each row in this table represents a flight

Columns:
"FLIGHT_ID" - The ID of the flight
"AIRLINE" - The airline company of the flight
"FROM_LOCATION" - The location where the flight is coming from in format City, Country (AIRPORT). i.e " New York, USA (JFK)"
"TO_LOCATION"- The destination of the flight in format City, Country (AIRPORT). i.e " New York, USA (JFK)"
"Date" - the date of the flight
"TIME_DEPARTURE" - the time the flight departs
"TIME_ARRIVAL" - the time the flight arrives
"PRICE"- the price of the flight
"#;

const TAX_AUDITOR_INSTRUCTIONS: &str = "\
You are a tax auditor assistant. You audit and explain the tax amounts \
applied to business transactions. Ground every answer in the tax policy \
documents, use the flight data to check travel expenses, and say so when \
the documents don't cover a question.";

/// Routing instructions of the agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum InstructionPreset {
    /// Answer from the policy documents and the flight data.
    #[default]
    PolicyAndFlights,
    /// Same as `PolicyAndFlights`, leaning on the policy documents.
    PreferPolicyDocuments,
    /// Act as a tax auditor.
    TaxAuditor,
}

impl InstructionPreset {
    /// Returns the instruction text.
    pub fn text(self) -> &'static str {
        match self {
            InstructionPreset::PolicyAndFlights => {
                "You are an agent that retrieves answers from the policy \
                 documents and flight data"
            }
            InstructionPreset::PreferPolicyDocuments => {
                "You are an agent that retrieves answers from the policy \
                 documents and flight data. Also try to get answers from the \
                 policy document"
            }
            InstructionPreset::TaxAuditor => TAX_AUDITOR_INSTRUCTIONS,
        }
    }
}

/// Description of the RAG tool, telling the agent when to use it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RagInstructionPreset {
    /// A plain hint to use retrieval.
    #[default]
    RagSearch,
    /// Names both tax knowledge bases. Requires `TAX_AGENT_KB_BUS_ID`.
    TaxKnowledgeBases,
    /// Short answers without personal health information.
    ConciseRedacted,
}

impl RagInstructionPreset {
    /// Returns the description text and the knowledge bases to search.
    pub fn resolve(
        self,
        settings: &Settings,
    ) -> Result<(String, Vec<String>), SettingsError> {
        let meals = settings.kb_meals_id.clone();
        match self {
            RagInstructionPreset::RagSearch => Ok((
                "Use the tools to execute RAG search".to_owned(),
                vec![meals],
            )),
            RagInstructionPreset::TaxKnowledgeBases => {
                let business = settings.kb_business_id.clone().ok_or(
                    SettingsError::Missing {
                        key: "TAX_AGENT_KB_BUS_ID",
                    },
                )?;
                let text = format!(
                    "The RAG Tool with Tax knowledge about Meals and \
                     Entertainment can be found under the knowledge base at \
                     {meals} and Tax knowledge about Business can be found \
                     under the knowledge base at {business}"
                );
                Ok((text, vec![meals, business]))
            }
            RagInstructionPreset::ConciseRedacted => Ok((
                "Respond with not more than 10 words. Hide any PHI \
                 information from sending back to the user"
                    .to_owned(),
                vec![meals],
            )),
        }
    }
}

/// Choices made when building the agent config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresetOptions {
    /// Routing instructions.
    pub instructions: InstructionPreset,
    /// RAG tool description.
    pub rag_instructions: RagInstructionPreset,
}

/// Builds the SQL tool over `FLIGHT_DATA`.
///
/// The dialect and the model size are fixed.
pub fn flight_sql_tool(connection_id: &str) -> SqlTool {
    SqlTool::builder(
        FLIGHT_SQL_TOOL_NAME,
        InputLocation::inline(FLIGHT_DATA_SCHEMA),
    )
    .with_description(FLIGHT_SQL_TOOL_DESCRIPTION)
    .with_table_and_column_description(InputLocation::inline(
        FLIGHT_DATA_DESCRIPTION,
    ))
    .with_model_size(ModelSize::Large)
    .with_dialect(SqlDialect::OracleSql)
    .with_connection_id(connection_id)
    .with_sql_execution(true)
    .with_self_correction(true)
    .build()
}

/// Builds the RAG tool over the policy knowledge bases.
pub fn policy_rag_tool<I>(knowledge_base_ids: I, description: &str) -> RagTool
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    RagTool::new(POLICY_RAG_TOOL_NAME, knowledge_base_ids)
        .with_description(description)
}

/// Builds the agent config from the settings.
///
/// Fails only when a preset needs a setting that is absent.
pub fn build_agent_config(
    settings: &Settings,
    options: &PresetOptions,
) -> Result<AgentConfig, SettingsError> {
    let (rag_description, knowledge_base_ids) =
        options.rag_instructions.resolve(settings)?;
    let connection_id = settings
        .sql_connection_id
        .as_deref()
        .unwrap_or(DEFAULT_SQL_CONNECTION_ID);

    Ok(AgentConfig::new(
        settings.agent_endpoint_id.clone(),
        options.instructions.text(),
    )
    .with_tool(policy_rag_tool(knowledge_base_ids, &rag_description))
    .with_tool(flight_sql_tool(connection_id)))
}
