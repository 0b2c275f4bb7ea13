//! Sequential, resumable workflow execution.
//!
//! The engine sequences a workflow's steps, persisting progress after every
//! completion so an interrupted or failed run resumes at exactly the step
//! that did not finish. Failure never propagates as an error: `execute`
//! always returns a [`WorkflowResult`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use roundtable_sdk::{
    log_step_complete, log_step_failed, log_step_start, log_warning, log_workflow_complete,
    log_workflow_failed, AgentInvoker,
};

use crate::executor::{ExecutionContext, StepExecutor};
use crate::models::{OutputInfo, WorkflowDefinition, WorkflowResult};
use crate::registry::DefinitionRegistry;
use crate::state::StateStore;

/// Progress callbacks. All methods are optional, fire-and-forget; return
/// values are never consumed.
pub trait ExecutionObserver: Send + Sync {
    fn on_step_start(&self, _step_num: usize, _name: &str) {}
    fn on_step_complete(&self, _step_num: usize, _output: Option<&str>) {}
    fn on_workflow_complete(&self, _outputs: &HashMap<String, OutputInfo>) {}
    fn on_error(&self, _message: &str) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// Orchestrates workflow execution.
///
/// One engine per project: the registry resolves definitions, the state
/// store tracks progress, and every step runs through the shared invocation
/// boundary. Concurrent `execute` calls against the same workflow name are
/// not supported; the caller is the single writer per key.
pub struct WorkflowEngine {
    registry: Arc<dyn DefinitionRegistry>,
    executor: StepExecutor,
    state: StateStore,
    project_path: PathBuf,
}

impl WorkflowEngine {
    pub fn new(
        registry: Arc<dyn DefinitionRegistry>,
        invoker: Arc<dyn AgentInvoker>,
        project_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let project_path = project_path.into();
        let state = StateStore::new(&project_path)?;
        let executor = StepExecutor::new(invoker, project_path.clone());

        Ok(Self {
            registry,
            executor,
            state,
            project_path,
        })
    }

    /// The engine's state store, for resume queries and resets.
    pub fn state_store(&self) -> &StateStore {
        &self.state
    }

    /// Execute a workflow from its current resume point.
    ///
    /// Resumes at `len(stepsCompleted)`; a definition that is already fully
    /// completed re-succeeds vacuously without invoking any step. A step
    /// failure is persisted (status, error, 1-based failed step number) and
    /// reported through the result; completed steps are never cleared, so
    /// the next call re-attempts exactly the failed step.
    pub async fn execute(
        &self,
        workflow_name: &str,
        context: &ExecutionContext,
        observer: &dyn ExecutionObserver,
    ) -> WorkflowResult {
        let workflow = match self.registry.load(workflow_name).await {
            Ok(workflow) => workflow,
            Err(e) => {
                let message = e.to_string();
                log_workflow_failed!(workflow_name, message);
                observer.on_error(&message);
                return WorkflowResult::failed(message);
            }
        };

        let state = self.state.get_state(workflow_name);
        let resume_index = state.steps_completed.len();
        let total_steps = workflow.steps.len();

        for (i, step) in workflow.steps.iter().enumerate().skip(resume_index) {
            let step_num = i + 1;

            log_step_start!(step_num, step.name, total_steps);
            observer.on_step_start(step_num, &step.name);

            let step_result = self.executor.execute(&workflow, step, context).await;

            if !step_result.is_success() {
                let error = step_result
                    .error
                    .unwrap_or_else(|| "Unknown step failure".to_string());

                if !self
                    .state
                    .mark_workflow_failed(workflow_name, &error, Some(step_num))
                {
                    log_warning!("Failed to persist failure state for '{}'", workflow_name);
                }

                log_step_failed!(step_num, step.name, error);
                observer.on_error(&format!("Step {} failed: {}", step_num, error));

                return WorkflowResult::failed_at(step_num, error);
            }

            if !self.state.mark_step_complete(workflow_name, &step.name) {
                log_warning!("Failed to persist progress for '{}'", workflow_name);
            }

            log_step_complete!(step_num, step.name);
            observer.on_step_complete(step_num, step_result.output.as_deref());
        }

        if !self.state.mark_workflow_complete(workflow_name) {
            log_warning!("Failed to persist completion for '{}'", workflow_name);
        }

        let outputs = self.collect_outputs(&workflow).await;

        log_workflow_complete!(workflow_name);
        observer.on_workflow_complete(&outputs);

        WorkflowResult::success(outputs)
    }

    /// Check each declared output path under the project root.
    ///
    /// Best-effort and post-hoc: a missing path is simply not reported,
    /// never treated as a failure.
    async fn collect_outputs(&self, workflow: &WorkflowDefinition) -> HashMap<String, OutputInfo> {
        let mut outputs = HashMap::new();

        for spec in &workflow.outputs {
            let output_path = self.project_path.join(&spec.path);
            if let Ok(metadata) = tokio::fs::metadata(&output_path).await {
                outputs.insert(
                    spec.path.clone(),
                    OutputInfo {
                        exists: true,
                        size: metadata.len(),
                        description: spec.description.clone(),
                    },
                );
            }
        }

        outputs
    }

    /// Project root this engine operates on.
    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}
