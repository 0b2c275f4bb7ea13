//! Workflow definition resolution boundary.
//!
//! Parsing definitions out of documents is a collaborator concern; the
//! engine only depends on the `load` call shape. [`StaticRegistry`] is the
//! in-memory implementation used for embedding and tests.

use std::collections::HashMap;

use roundtable_sdk::async_trait;

use crate::error::EngineError;
use crate::models::WorkflowDefinition;

#[async_trait]
pub trait DefinitionRegistry: Send + Sync {
    /// Resolve a workflow by name.
    async fn load(&self, name: &str) -> Result<WorkflowDefinition, EngineError>;
}

/// Registry over a fixed set of definitions.
#[derive(Default)]
pub struct StaticRegistry {
    workflows: HashMap<String, WorkflowDefinition>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: WorkflowDefinition) {
        self.workflows.insert(definition.name.clone(), definition);
    }

    pub fn with_workflow(mut self, definition: WorkflowDefinition) -> Self {
        self.insert(definition);
        self
    }
}

#[async_trait]
impl DefinitionRegistry for StaticRegistry {
    async fn load(&self, name: &str) -> Result<WorkflowDefinition, EngineError> {
        self.workflows
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::DefinitionNotFound(name.to_string()))
    }
}
