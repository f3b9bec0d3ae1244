use taxagent_model::{KnowledgeBaseConfig, LlmCustomization, RagToolConfig};

/// A retrieval tool searching knowledge bases hosted by the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RagTool {
    name: String,
    description: String,
    knowledge_base_ids: Vec<String>,
    instruction: Option<String>,
}

impl RagTool {
    /// Creates a tool with the given name and knowledge bases.
    pub fn new<S, I>(name: S, knowledge_base_ids: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            name: name.into(),
            description: String::new(),
            knowledge_base_ids: knowledge_base_ids
                .into_iter()
                .map(Into::into)
                .collect(),
            instruction: None,
        }
    }

    /// Sets the description telling the routing model when to use the
    /// tool.
    #[inline]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Sets a custom instruction for the answer generation.
    #[inline]
    pub fn with_instruction<S: Into<String>>(mut self, instruction: S) -> Self {
        self.instruction = Some(instruction.into());
        self
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

    /// Returns the ids of the searched knowledge bases.
    #[inline]
    pub fn knowledge_base_ids(&self) -> &[String] {
        &self.knowledge_base_ids
    }

    pub(crate) fn to_config(&self) -> RagToolConfig {
        RagToolConfig {
            knowledge_base_configs: self
                .knowledge_base_ids
                .iter()
                .map(|id| KnowledgeBaseConfig {
                    knowledge_base_id: id.clone(),
                })
                .collect(),
            generation_llm_customization: self
                .instruction
                .as_ref()
                .map(LlmCustomization::with_instruction),
        }
    }
}
