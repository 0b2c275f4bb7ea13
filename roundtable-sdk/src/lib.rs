// Shared vocabulary for roundtable workflows: execution status, the agent
// invocation boundary, and structured logging events consumed by hosts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// Re-export async trait for convenience
pub use async_trait::async_trait;

/// Workflow execution status, as persisted in workflow state records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        WorkflowStatus::NotStarted
    }
}

/// Behavior profile handling an invocation.
///
/// Methodology role strings ("pm", "dev", "tea", ...) are resolved to one of
/// these capabilities before reaching the invocation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Planner,
    Coder,
    QaReviewer,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Planner => "planner",
            Capability::Coder => "coder",
            Capability::QaReviewer => "qa_reviewer",
        }
    }
}

/// Parameters carried alongside every invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Project root the invocation operates on
    pub project_dir: PathBuf,
    /// Scratch directory for invocation-local state
    pub workspace_dir: PathBuf,
    /// Model override; `None` uses the invoker's default
    pub model: Option<String>,
    /// Show detailed output
    pub verbose: bool,
}

/// Outcome of a single agent invocation.
///
/// `status_tag` is the invoker's own session status ("complete", "continue",
/// ...); callers decide which tags count as success.
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    pub status_tag: String,
    pub text: String,
}

/// The agent invocation boundary.
///
/// Implementations are opaque to the engine: one capability, one message, one
/// response. Errors are allowed; the engine contains them and never lets them
/// propagate past the executing step or contribution.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(
        &self,
        capability: Capability,
        message: &str,
        context: &InvocationContext,
    ) -> anyhow::Result<InvocationOutcome>;
}

/// Structured logging events emitted by workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowLog {
    /// Step started
    StepStarted {
        step: usize,
        name: String,
        total_steps: usize,
    },
    /// Step completed
    StepCompleted {
        step: usize,
        name: String,
    },
    /// Step failed
    StepFailed {
        step: usize,
        name: String,
        error: String,
    },
    /// Workflow completed
    WorkflowCompleted {
        workflow: String,
    },
    /// Workflow failed
    WorkflowFailed {
        workflow: String,
        error: String,
    },
    /// Discussion round started
    RoundStarted {
        round: usize,
        total_rounds: usize,
        mode: String,
    },
    /// Discussion round completed
    RoundCompleted {
        round: usize,
    },
    /// Contribution recorded for a round
    ContributionAdded {
        round: usize,
        agent_name: String,
        role: String,
    },
    /// Synthesis invocation failed, fallback text used
    SynthesisFailed {
        error: String,
    },
}

impl WorkflowLog {
    /// Emit this log event to stderr for host parsing
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            use std::io::Write;
            eprintln!("__RT_EVENT__:{}", json);
            // Force flush stderr in async/concurrent contexts
            let _ = std::io::stderr().flush();
        }
    }
}

/// Helper macros for workflow logging
#[macro_export]
macro_rules! log_step_start {
    ($step:expr, $name:expr, $total:expr) => {
        $crate::WorkflowLog::StepStarted {
            step: $step,
            name: $name.to_string(),
            total_steps: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_step_complete {
    ($step:expr, $name:expr) => {
        $crate::WorkflowLog::StepCompleted {
            step: $step,
            name: $name.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_step_failed {
    ($step:expr, $name:expr, $error:expr) => {
        $crate::WorkflowLog::StepFailed {
            step: $step,
            name: $name.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_workflow_complete {
    ($workflow:expr) => {
        $crate::WorkflowLog::WorkflowCompleted {
            workflow: $workflow.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_workflow_failed {
    ($workflow:expr, $error:expr) => {
        $crate::WorkflowLog::WorkflowFailed {
            workflow: $workflow.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_round_start {
    ($round:expr, $total:expr, $mode:expr) => {
        $crate::WorkflowLog::RoundStarted {
            round: $round,
            total_rounds: $total,
            mode: $mode.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_round_complete {
    ($round:expr) => {
        $crate::WorkflowLog::RoundCompleted { round: $round }.emit();
    };
}

#[macro_export]
macro_rules! log_contribution {
    ($round:expr, $agent:expr, $role:expr) => {
        $crate::WorkflowLog::ContributionAdded {
            round: $round,
            agent_name: $agent.to_string(),
            role: $role.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_synthesis_failed {
    ($error:expr) => {
        $crate::WorkflowLog::SynthesisFailed {
            error: $error.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Colored console output for human-readable logs, complementing the
// structured WorkflowLog events parsed by hosts.
// ============================================================================

/// Logs an informational message.
///
/// # Example
/// ```
/// use roundtable_sdk::log_info;
/// log_info!("Resuming from step 3");
/// ```
///
/// Outputs:
/// ```text
/// ℹ Resuming from step 3
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use roundtable_sdk::log_warning;
/// log_warning!("Output path missing");
/// ```
///
/// Outputs:
/// ```text
/// ⚠ Warning: Output path missing
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}
