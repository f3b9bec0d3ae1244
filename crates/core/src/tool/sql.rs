use taxagent_model::{
    DatabaseConnection, InputLocation, LlmCustomization, ModelSize,
    SqlDialect, SqlToolConfig,
};

/// A natural-language-to-SQL tool executed by the service.
///
/// The tool doesn't check that the schema and the descriptions agree;
/// mismatches only show up in the generated statements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqlTool {
    name: String,
    description: String,
    config: SqlToolConfig,
}

impl SqlTool {
    /// Creates a builder for a tool with the given name and schema.
    #[inline]
    pub fn builder<S: Into<String>>(
        name: S,
        database_schema: InputLocation,
    ) -> SqlToolBuilder {
        SqlToolBuilder {
            name: name.into(),
            description: String::new(),
            config: SqlToolConfig {
                dialect: SqlDialect::OracleSql,
                model_size: ModelSize::Small,
                should_enable_sql_execution: false,
                should_enable_self_correction: false,
                database_schema,
                table_and_column_description: None,
                icl_examples: None,
                database_connection: None,
                generation_llm_customization: None,
            },
        }
    }

    /// Returns the name of the tool.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description of the tool.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the SQL dialect.
    #[inline]
    pub fn dialect(&self) -> SqlDialect {
        self.config.dialect
    }

    /// Returns the generation model size.
    #[inline]
    pub fn model_size(&self) -> ModelSize {
        self.config.model_size
    }

    /// Returns the database schema location.
    #[inline]
    pub fn database_schema(&self) -> &InputLocation {
        &self.config.database_schema
    }

    /// Returns the id of the database tools connection, if any.
    pub fn connection_id(&self) -> Option<&str> {
        match &self.config.database_connection {
            Some(DatabaseConnection::DatabaseToolConnection {
                connection_id,
            }) => Some(connection_id),
            None => None,
        }
    }

    pub(crate) fn to_config(&self) -> SqlToolConfig {
        self.config.clone()
    }
}

/// [`SqlTool`] builder.
#[derive(Clone, Debug)]
pub struct SqlToolBuilder {
    name: String,
    description: String,
    config: SqlToolConfig,
}

impl SqlToolBuilder {
    /// Sets the description the routing model reads.
    #[inline]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the natural-language description of tables and columns.
    #[inline]
    pub fn with_table_and_column_description(
        mut self,
        location: InputLocation,
    ) -> Self {
        self.config.table_and_column_description = Some(location);
        self
    }

    /// Sets the in-context learning examples.
    #[inline]
    pub fn with_icl_examples(mut self, location: InputLocation) -> Self {
        self.config.icl_examples = Some(location);
        self
    }

    /// Sets the SQL dialect. Defaults to [`SqlDialect::OracleSql`].
    #[inline]
    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.config.dialect = dialect;
        self
    }

    /// Sets the generation model size. Defaults to [`ModelSize::Small`].
    #[inline]
    pub fn with_model_size(mut self, model_size: ModelSize) -> Self {
        self.config.model_size = model_size;
        self
    }

    /// Sets the database tools connection used to execute statements.
    #[inline]
    pub fn with_connection_id<S: Into<String>>(mut self, id: S) -> Self {
        self.config.database_connection =
            Some(DatabaseConnection::DatabaseToolConnection {
                connection_id: id.into(),
            });
        self
    }

    /// Enables or disables execution of generated statements.
    #[inline]
    pub fn with_sql_execution(mut self, enabled: bool) -> Self {
        self.config.should_enable_sql_execution = enabled;
        self
    }

    /// Enables or disables self correction of failed statements.
    #[inline]
    pub fn with_self_correction(mut self, enabled: bool) -> Self {
        self.config.should_enable_self_correction = enabled;
        self
    }

    /// Sets a custom instruction for the generation model.
    #[inline]
    pub fn with_instruction<S: Into<String>>(mut self, instruction: S) -> Self {
        self.config.generation_llm_customization =
            Some(LlmCustomization::with_instruction(instruction));
        self
    }

    /// Builds the tool.
    #[inline]
    pub fn build(self) -> SqlTool {
        SqlTool {
            name: self.name,
            description: self.description,
            config: self.config,
        }
    }
}
