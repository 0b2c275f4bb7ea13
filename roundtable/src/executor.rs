//! Single-step execution against the agent invocation boundary.
//!
//! The executor resolves a step's methodology role to an invocation
//! capability, assembles the step message, and performs exactly one
//! invocation. It never returns an error: any boundary failure or rejected
//! status tag is converted into a failed [`StepResult`].

use std::path::PathBuf;
use std::sync::Arc;

use roundtable_sdk::{AgentInvoker, Capability, InvocationContext};

use crate::models::{StepResult, WorkflowDefinition, WorkflowStep};

/// Status tags from the invocation boundary that count as step success.
const ACCEPTED_STATUS_TAGS: &[&str] = &["complete", "continue"];

/// Caller-supplied execution parameters.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Project root; defaults to the engine's project path
    pub project_dir: Option<PathBuf>,

    /// Model override passed through to the invoker
    pub model: Option<String>,

    /// Show detailed output
    pub verbose: bool,
}

/// Map a methodology role to its invocation capability.
///
/// Unmapped roles default to `Coder`.
pub fn capability_for_step_role(role: &str) -> Capability {
    match role {
        "pm" | "architect" | "analyst" | "ux-designer" => Capability::Planner,
        "dev" => Capability::Coder,
        "tea" => Capability::QaReviewer,
        _ => Capability::Coder,
    }
}

/// Executes individual workflow steps.
pub struct StepExecutor {
    invoker: Arc<dyn AgentInvoker>,
    project_path: PathBuf,
}

impl StepExecutor {
    pub fn new(invoker: Arc<dyn AgentInvoker>, project_path: impl Into<PathBuf>) -> Self {
        Self {
            invoker,
            project_path: project_path.into(),
        }
    }

    /// Execute one step and report the outcome.
    ///
    /// Reads the step's instructional content (unless pre-loaded), builds
    /// the step message, and invokes the boundary once. Missing content
    /// files, boundary errors, and rejected status tags all become failed
    /// results.
    pub async fn execute(
        &self,
        workflow: &WorkflowDefinition,
        step: &WorkflowStep,
        context: &ExecutionContext,
    ) -> StepResult {
        let step_content = match &step.content {
            Some(content) => content.clone(),
            None => {
                let step_file = workflow.path.join(&step.file);
                match tokio::fs::read_to_string(&step_file).await {
                    Ok(content) => content,
                    Err(_) => {
                        return StepResult::failure(format!(
                            "Step file not found: {}",
                            step.file
                        ));
                    }
                }
            }
        };

        let project_dir = context
            .project_dir
            .clone()
            .unwrap_or_else(|| self.project_path.clone());
        let workspace_dir = project_dir
            .join(".roundtable")
            .join("workspace")
            .join(&workflow.name);
        let _ = tokio::fs::create_dir_all(&workspace_dir).await;

        let invocation_context = InvocationContext {
            project_dir,
            workspace_dir,
            model: context.model.clone(),
            verbose: context.verbose,
        };

        let capability = capability_for_step_role(&step.role);
        let message = build_step_message(workflow, step, &step_content);

        match self
            .invoker
            .invoke(capability, &message, &invocation_context)
            .await
        {
            Ok(outcome) => {
                if ACCEPTED_STATUS_TAGS.contains(&outcome.status_tag.as_str()) {
                    StepResult::success(outcome.text)
                } else {
                    StepResult::failure_with_output(
                        format!("Agent session ended with status: {}", outcome.status_tag),
                        outcome.text,
                    )
                }
            }
            Err(e) => StepResult::failure(format!("Error executing step: {}", e)),
        }
    }
}

/// One message combining workflow identity, step identity, assigned role,
/// and the step's instructional content.
fn build_step_message(workflow: &WorkflowDefinition, step: &WorkflowStep, content: &str) -> String {
    format!(
        "You are executing a collaborative workflow step.\n\n\
         **Workflow:** {}\n\
         **Step:** {}\n\
         **Your Role:** {}\n\n\
         {}\n\n\
         Please follow the instructions in the step carefully. This is a \
         collaborative workflow - ask questions, gather user input, and work \
         interactively to complete this step.",
        workflow.name, step.name, step.role, content
    )
}
