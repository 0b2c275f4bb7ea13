//! Workflow execution state persistence.
//!
//! One JSON record per workflow name under
//! `<project>/.roundtable/workflow-state/`, enabling resumption across
//! sessions. Records are written via temp-file-then-rename so a crash
//! mid-write never leaves a truncated record behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use roundtable_sdk::WorkflowStatus;

/// Persisted execution progress for one workflow.
///
/// Field names follow the on-disk JSON shape (`stepsCompleted`,
/// `currentStep`, ...). `current_step` always equals `steps_completed.len()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    #[serde(default)]
    pub status: WorkflowStatus,

    /// Names of completed steps, in completion order. Append-only except on
    /// explicit reset; a name is never recorded twice.
    #[serde(default)]
    pub steps_completed: Vec<String>,

    /// Count of completed steps; the index execution resumes from
    #[serde(default)]
    pub current_step: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// 1-based number of the step that failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at_step: Option<usize>,
}

/// Manages workflow execution state persistence.
///
/// No locking is applied; concurrent writers against the same workflow name
/// race on read-modify-write. Single writer per key is assumed.
pub struct StateStore {
    state_dir: PathBuf,
}

impl StateStore {
    /// Create a store rooted at the given project directory.
    pub fn new(project_path: impl AsRef<Path>) -> Result<Self> {
        let state_dir = project_path
            .as_ref()
            .join(".roundtable")
            .join("workflow-state");
        fs::create_dir_all(&state_dir)
            .with_context(|| format!("Failed to create state dir: {}", state_dir.display()))?;
        Ok(Self { state_dir })
    }

    /// Path to the state file for a workflow.
    pub fn state_file(&self, workflow_name: &str) -> PathBuf {
        self.state_dir.join(format!("{}.json", workflow_name))
    }

    /// Read the state record for a workflow.
    ///
    /// A missing or unreadable record degrades to the default NotStarted
    /// record rather than erroring: corrupted progress means "start over".
    pub fn get_state(&self, workflow_name: &str) -> ExecutionState {
        let state_file = self.state_file(workflow_name);

        match fs::read_to_string(&state_file) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => ExecutionState::default(),
        }
    }

    /// Overwrite the state record. Returns `true` on success.
    ///
    /// Writes to a temp file in the same directory and renames it into
    /// place, so readers never observe a half-written record.
    pub fn save_state(&self, workflow_name: &str, state: &ExecutionState) -> bool {
        let state_file = self.state_file(workflow_name);
        let tmp_file = self.state_dir.join(format!("{}.json.tmp", workflow_name));

        let json = match serde_json::to_string_pretty(state) {
            Ok(json) => json,
            Err(_) => return false,
        };

        if fs::write(&tmp_file, json).is_err() {
            return false;
        }

        fs::rename(&tmp_file, &state_file).is_ok()
    }

    /// Record a completed step.
    ///
    /// Appends `step_name` only if absent, moves NotStarted to InProgress
    /// with `started_at` on first completion, and recomputes `current_step`.
    pub fn mark_step_complete(&self, workflow_name: &str, step_name: &str) -> bool {
        let mut state = self.get_state(workflow_name);

        if !state.steps_completed.iter().any(|s| s == step_name) {
            state.steps_completed.push(step_name.to_string());
        }

        if state.status == WorkflowStatus::NotStarted {
            state.status = WorkflowStatus::InProgress;
            state.started_at = Some(now_iso());
        }

        state.current_step = state.steps_completed.len();
        state.last_updated = Some(now_iso());

        self.save_state(workflow_name, &state)
    }

    /// Mark a workflow as completed.
    pub fn mark_workflow_complete(&self, workflow_name: &str) -> bool {
        let mut state = self.get_state(workflow_name);

        state.status = WorkflowStatus::Completed;
        state.completed_at = Some(now_iso());
        state.last_updated = Some(now_iso());

        self.save_state(workflow_name, &state)
    }

    /// Mark a workflow as failed, recording the error and (1-based) step
    /// number where the failure occurred.
    pub fn mark_workflow_failed(
        &self,
        workflow_name: &str,
        error: &str,
        step_num: Option<usize>,
    ) -> bool {
        let mut state = self.get_state(workflow_name);

        state.status = WorkflowStatus::Failed;
        state.last_error = Some(error.to_string());
        if step_num.is_some() {
            state.failed_at_step = step_num;
        }
        state.failed_at = Some(now_iso());
        state.last_updated = Some(now_iso());

        self.save_state(workflow_name, &state)
    }

    /// Delete the state record. Idempotent no-op if absent.
    pub fn reset(&self, workflow_name: &str) -> bool {
        let state_file = self.state_file(workflow_name);

        if state_file.exists() {
            fs::remove_file(&state_file).is_ok()
        } else {
            true
        }
    }

    /// All persisted workflow states, sorted by workflow name.
    pub fn list_workflows(&self) -> Vec<(String, ExecutionState)> {
        let mut workflows = Vec::new();

        let entries = match fs::read_dir(&self.state_dir) {
            Ok(entries) => entries,
            Err(_) => return workflows,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(state) = serde_json::from_str::<ExecutionState>(&content) {
                    workflows.push((name.to_string(), state));
                }
            }
        }

        workflows.sort_by(|a, b| a.0.cmp(&b.0));
        workflows
    }

    /// True iff the workflow is InProgress and can be resumed.
    pub fn can_resume(&self, workflow_name: &str) -> bool {
        self.get_state(workflow_name).status == WorkflowStatus::InProgress
    }

    /// Step index (0-based) to resume from, or `None` if already completed.
    pub fn get_resume_point(&self, workflow_name: &str) -> Option<usize> {
        let state = self.get_state(workflow_name);

        if state.status == WorkflowStatus::Completed {
            return None;
        }

        Some(state.current_step)
    }
}

fn now_iso() -> String {
    Local::now().to_rfc3339()
}
