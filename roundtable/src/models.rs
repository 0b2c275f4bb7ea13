//! Data types for workflow execution and party-mode discussions.
//!
//! This module defines the structures flowing through the engine:
//!
//! 1. **Workflow definitions** - Named step sequences loaded from a registry
//! 2. **Step results** - Per-step success/failure, transient
//! 3. **Workflow results** - Final outcome returned to the caller
//! 4. **Contributions** - Per-participant discussion entries in party mode

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// Workflow Definition Types
// ============================================================================

/// A single workflow step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Content source, relative to the workflow directory
    pub file: String,

    /// Display name
    pub name: String,

    /// Methodology role executing this step ("pm", "dev", "tea", ...)
    pub role: String,

    /// Pre-loaded instructional content; when `None` the executor reads
    /// `file` from the workflow directory
    #[serde(default)]
    pub content: Option<String>,
}

/// Declared workflow output artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Path relative to the project root
    pub path: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

/// A named, ordered sequence of steps. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Phase tag ("planning", "solutioning", ...)
    #[serde(default)]
    pub phase: String,

    /// Directory holding the workflow's step files
    pub path: PathBuf,

    pub steps: Vec<WorkflowStep>,

    /// Default agent role when steps omit one
    #[serde(default)]
    pub agent: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    /// Names of workflows this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Artifacts the workflow is expected to produce
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

// ============================================================================
// Execution Results
// ============================================================================

/// Result of a single step execution. Transient, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub status: StepStatus,
    pub output: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Success,
    Failure,
}

impl StepResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Success,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Failure,
            output: None,
            error: Some(error.into()),
        }
    }

    pub fn failure_with_output(error: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Failure,
            output: Some(output.into()),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// Post-hoc information about one declared output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputInfo {
    pub exists: bool,
    pub size: u64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Success,
    Failed,
    Interrupted,
}

/// Result of a full workflow execution, returned to the caller.
///
/// `execute` never errors; all failure is represented here.
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub status: WorkflowOutcome,

    /// Declared outputs found on disk after completion (path -> info)
    pub outputs: HashMap<String, OutputInfo>,

    /// 1-based number of the step that failed
    pub failed_step: Option<usize>,

    pub error: Option<String>,
}

impl WorkflowResult {
    pub fn success(outputs: HashMap<String, OutputInfo>) -> Self {
        Self {
            status: WorkflowOutcome::Success,
            outputs,
            failed_step: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: WorkflowOutcome::Failed,
            outputs: HashMap::new(),
            failed_step: None,
            error: Some(error.into()),
        }
    }

    pub fn failed_at(step: usize, error: impl Into<String>) -> Self {
        Self {
            status: WorkflowOutcome::Failed,
            outputs: HashMap::new(),
            failed_step: Some(step),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == WorkflowOutcome::Success
    }
}

// ============================================================================
// Party Mode Types
// ============================================================================

/// Single participant contribution to a discussion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentContribution {
    /// Role id ("pm", "architect", ...)
    pub role: String,

    /// Persona display name ("John", "Winston", ...)
    pub agent_name: String,

    /// 1-based round number
    pub round: usize,

    /// Contribution text, capped at 500 characters
    pub content: String,

    /// ISO timestamp of submission
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Success,
    Failed,
}

/// Result of a multi-participant session.
#[derive(Debug, Clone)]
pub struct PartyModeResult {
    /// Full discussion history: round ascending, submission order within round
    pub discussion_history: Vec<AgentContribution>,
    pub synthesis: String,
    pub status: SessionStatus,
}
