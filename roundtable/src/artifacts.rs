//! Framework artifact adapters.
//!
//! Workflows produce planning artifacts (tasks, epics, PRDs) whose on-disk
//! layout depends on the methodology backing the project. The adapter trait
//! fixes the capability set; which variant to use is decided once per
//! project by the caller - the scheduling core never detects anything.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Unified Artifact Models
// ============================================================================

/// Unified task/story model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub description: String,

    #[serde(default)]
    pub acceptance_criteria: Vec<String>,

    #[serde(default)]
    pub epic_id: Option<String>,

    #[serde(default)]
    pub technical_notes: Option<String>,
}

/// Unified epic model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epic {
    pub title: String,
    pub description: String,
    pub user_value: String,

    #[serde(default)]
    pub stories: Vec<Task>,

    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Unified artifact model (PRD, architecture document, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Kind tag ("prd", "architecture", ...); used for the default filename
    pub kind: String,
    pub title: String,
    pub content: String,

    /// Explicit path relative to the artifacts directory
    #[serde(default)]
    pub path: Option<String>,
}

// ============================================================================
// Adapter Trait
// ============================================================================

/// Framework-specific artifact creation and management.
pub trait FrameworkAdapter: Send + Sync {
    /// Create a task; returns its identifier.
    fn create_task(&self, task: &Task) -> Result<String>;

    /// Update an existing task. Returns `false` if the task is unknown.
    fn update_task(&self, task_id: &str, updates: &HashMap<String, String>) -> bool;

    /// Create an epic; returns its identifier.
    fn create_epic(&self, epic: &Epic) -> Result<String>;

    /// Update an existing epic. Returns `false` if the epic is unknown.
    fn update_epic(&self, epic_id: &str, updates: &HashMap<String, String>) -> bool;

    /// Create a standalone artifact; returns its file path.
    fn create_artifact(&self, artifact: &Artifact) -> Result<PathBuf>;

    /// Directory where this framework stores artifacts.
    fn artifacts_directory(&self) -> PathBuf;
}

fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

// ============================================================================
// Epic-file Variant
// ============================================================================

/// Stores stories embedded in per-epic markdown files under
/// `<project>/roundtable-output/`.
pub struct EpicFileAdapter {
    project_path: PathBuf,
}

impl EpicFileAdapter {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
        }
    }

    fn epic_markdown(epic: &Epic) -> String {
        let mut lines = vec![
            format!("# Epic: {}", epic.title),
            String::new(),
            "## Description".to_string(),
            String::new(),
            epic.description.clone(),
            String::new(),
            "## User Value".to_string(),
            String::new(),
            epic.user_value.clone(),
            String::new(),
        ];

        if !epic.dependencies.is_empty() {
            lines.push("## Dependencies".to_string());
            lines.push(String::new());
            for dep in &epic.dependencies {
                lines.push(format!("- {}", dep));
            }
            lines.push(String::new());
        }

        lines.push("## Stories".to_string());
        lines.push(String::new());

        for (i, story) in epic.stories.iter().enumerate() {
            lines.push(format!("### Story {}: {}", i + 1, story.title));
            lines.push(String::new());
            lines.push(story.description.clone());
            lines.push(String::new());
            lines.push("**Acceptance Criteria:**".to_string());
            lines.push(String::new());
            for ac in &story.acceptance_criteria {
                lines.push(format!("- {}", ac));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

impl FrameworkAdapter for EpicFileAdapter {
    fn artifacts_directory(&self) -> PathBuf {
        self.project_path.join("roundtable-output")
    }

    fn create_task(&self, task: &Task) -> Result<String> {
        // Stories live inside their epic's file; a free-floating task has
        // nowhere to go in this layout.
        let Some(epic_id) = &task.epic_id else {
            bail!("Task must have epic_id for the epic-file adapter");
        };

        Ok(format!("{}-{}", epic_id, slugify(&task.title)))
    }

    fn update_task(&self, task_id: &str, _updates: &HashMap<String, String>) -> bool {
        // Task ids are "<epic_id>-<task-slug>" and epic ids may themselves
        // contain '-', so match against the existing epic files.
        let Ok(entries) = fs::read_dir(self.artifacts_directory()) else {
            return false;
        };

        entries.flatten().any(|entry| {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                return false;
            };
            name.strip_prefix("epic-")
                .and_then(|rest| rest.strip_suffix(".md"))
                .is_some_and(|epic_id| task_id.starts_with(&format!("{}-", epic_id)))
        })
    }

    fn create_epic(&self, epic: &Epic) -> Result<String> {
        let output_dir = self.artifacts_directory();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let epic_id = slugify(&epic.title);
        let epic_file = output_dir.join(format!("epic-{}.md", epic_id));

        fs::write(&epic_file, Self::epic_markdown(epic))
            .with_context(|| format!("Failed to write {}", epic_file.display()))?;

        Ok(epic_id)
    }

    fn update_epic(&self, epic_id: &str, _updates: &HashMap<String, String>) -> bool {
        self.artifacts_directory()
            .join(format!("epic-{}.md", epic_id))
            .exists()
    }

    fn create_artifact(&self, artifact: &Artifact) -> Result<PathBuf> {
        let output_dir = self.artifacts_directory();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let artifact_file = match &artifact.path {
            Some(path) => output_dir.join(path),
            None => output_dir.join(format!("{}.md", artifact.kind)),
        };

        if let Some(parent) = artifact_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&artifact_file, &artifact.content)
            .with_context(|| format!("Failed to write {}", artifact_file.display()))?;

        Ok(artifact_file)
    }
}

// ============================================================================
// Spec-directory Variant
// ============================================================================

/// Stores one numbered spec directory per task under
/// `<project>/.roundtable/specs/`.
pub struct SpecDirAdapter {
    project_path: PathBuf,
}

impl SpecDirAdapter {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
        }
    }

    fn spec_markdown(task: &Task) -> String {
        let mut lines = vec![
            format!("# {}", task.title),
            String::new(),
            task.description.clone(),
            String::new(),
            "## Acceptance Criteria".to_string(),
            String::new(),
        ];

        for ac in &task.acceptance_criteria {
            lines.push(format!("- {}", ac));
        }
        lines.push(String::new());

        if let Some(notes) = &task.technical_notes {
            lines.push("## Technical Notes".to_string());
            lines.push(String::new());
            lines.push(notes.clone());
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

impl FrameworkAdapter for SpecDirAdapter {
    fn artifacts_directory(&self) -> PathBuf {
        self.project_path.join(".roundtable").join("specs")
    }

    fn create_task(&self, task: &Task) -> Result<String> {
        let specs_dir = self.artifacts_directory();
        fs::create_dir_all(&specs_dir)
            .with_context(|| format!("Failed to create {}", specs_dir.display()))?;

        let spec_num = fs::read_dir(&specs_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
            + 1;

        let task_id = format!("{:03}-{}", spec_num, slugify(&task.title));
        let spec_dir = specs_dir.join(&task_id);
        fs::create_dir_all(&spec_dir)
            .with_context(|| format!("Failed to create {}", spec_dir.display()))?;

        let spec_file = spec_dir.join("spec.md");
        fs::write(&spec_file, Self::spec_markdown(task))
            .with_context(|| format!("Failed to write {}", spec_file.display()))?;

        Ok(task_id)
    }

    fn update_task(&self, task_id: &str, _updates: &HashMap<String, String>) -> bool {
        self.artifacts_directory()
            .join(task_id)
            .join("spec.md")
            .exists()
    }

    fn create_epic(&self, epic: &Epic) -> Result<String> {
        // Epics have no file of their own here; each story becomes a spec.
        let epic_id = slugify(&epic.title);

        for story in &epic.stories {
            let mut story = story.clone();
            story.epic_id = Some(epic_id.clone());
            self.create_task(&story)?;
        }

        Ok(epic_id)
    }

    fn update_epic(&self, _epic_id: &str, _updates: &HashMap<String, String>) -> bool {
        true
    }

    fn create_artifact(&self, artifact: &Artifact) -> Result<PathBuf> {
        let output_dir = match self.artifacts_directory().parent() {
            Some(parent) => parent.to_path_buf(),
            None => self.artifacts_directory(),
        };
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let artifact_file = match &artifact.path {
            Some(path) => output_dir.join(path),
            None => output_dir.join(format!("{}.md", artifact.kind)),
        };

        if let Some(parent) = artifact_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&artifact_file, &artifact.content)
            .with_context(|| format!("Failed to write {}", artifact_file.display()))?;

        Ok(artifact_file)
    }
}
