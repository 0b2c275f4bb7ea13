//! Multi-participant discussion scheduling ("party mode").
//!
//! Runs several role-played participants across discussion rounds against
//! the same invocation boundary the step executor uses. Two disciplines:
//!
//! - **Round-robin**: strict input order, fully sequential; a participant
//!   sees every contribution made earlier in its own round.
//! - **Free-form**: all participants of a round invoked concurrently over an
//!   identical snapshot of the history taken at the end of the previous
//!   round, joined before the next round starts.
//!
//! Participant failures degrade to placeholder contributions; the session
//! itself never fails.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use futures::future::join_all;
use roundtable_sdk::{
    log_contribution, log_round_complete, log_round_start, log_synthesis_failed, AgentInvoker,
    Capability, InvocationContext,
};

use crate::models::{AgentContribution, PartyModeResult, SessionStatus};

/// Rendered history passed to an invocation includes at most this many of
/// the most recent contributions.
const HISTORY_WINDOW: usize = 10;

/// Stored contribution content is capped at this many characters.
const CONTENT_CAP: usize = 500;

/// Discussion scheduling discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscussionMode {
    RoundRobin,
    FreeForm,
}

impl DiscussionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionMode::RoundRobin => "round-robin",
            DiscussionMode::FreeForm => "free-form",
        }
    }
}

/// Persona backing a discussion role.
struct Persona {
    name: String,
    role_title: String,
}

fn persona_for(role: &str) -> Persona {
    let (name, role_title) = match role {
        "pm" => ("John", "Product Manager"),
        "architect" => ("Winston", "Solutions Architect"),
        "dev" => ("Amelia", "Developer"),
        "tea" => ("Murat", "Test Engineer & Architect"),
        "sm" => ("Sarah", "Scrum Master"),
        other => {
            return Persona {
                name: capitalize(other),
                role_title: other.to_string(),
            }
        }
    };

    Persona {
        name: name.to_string(),
        role_title: role_title.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Map a discussion role to its invocation capability.
///
/// Mirrors the step executor's table but defaults to `Planner`: an unknown
/// voice in a discussion is still a planning voice.
fn capability_for_discussion_role(role: &str) -> Capability {
    match role {
        "dev" => Capability::Coder,
        "tea" => Capability::QaReviewer,
        _ => Capability::Planner,
    }
}

/// Orchestrates multi-participant collaboration sessions.
pub struct PartyOrchestrator {
    invoker: Arc<dyn AgentInvoker>,
    project_path: PathBuf,
}

impl PartyOrchestrator {
    pub fn new(invoker: Arc<dyn AgentInvoker>, project_path: impl Into<PathBuf>) -> Self {
        Self {
            invoker,
            project_path: project_path.into(),
        }
    }

    /// Run a discussion session and synthesize it.
    ///
    /// Roles are invoked in input order each round. After all rounds, one
    /// additional invocation produces the synthesis; if it fails, a fixed
    /// fallback section is used and the session still reports success.
    pub async fn run_party_mode(
        &self,
        roles: &[String],
        topic: &str,
        rounds: usize,
        mode: DiscussionMode,
    ) -> PartyModeResult {
        let mut history: Vec<AgentContribution> = Vec::new();

        for round in 1..=rounds {
            log_round_start!(round, rounds, mode.as_str());

            match mode {
                DiscussionMode::RoundRobin => {
                    // Sequential: each participant sees everything produced
                    // earlier in this round.
                    for role in roles {
                        let contribution =
                            self.get_contribution(role, topic, &history, round).await;
                        log_contribution!(round, contribution.agent_name, role);
                        history.push(contribution);
                    }
                }
                DiscussionMode::FreeForm => {
                    // Concurrent over a shared snapshot: siblings of the same
                    // round are causally independent. The join completes the
                    // round before the next one starts.
                    let snapshot = history.clone();
                    let tasks = roles
                        .iter()
                        .map(|role| self.get_contribution(role, topic, &snapshot, round));

                    let contributions = join_all(tasks).await;
                    for contribution in contributions {
                        log_contribution!(round, contribution.agent_name, contribution.role);
                        history.push(contribution);
                    }
                }
            }

            log_round_complete!(round);
        }

        let synthesis = self.synthesize_discussion(&history).await;

        PartyModeResult {
            discussion_history: history,
            synthesis,
            status: SessionStatus::Success,
        }
    }

    /// One participant's contribution for one round. Never fails: a boundary
    /// error becomes a placeholder contribution so the round keeps moving.
    async fn get_contribution(
        &self,
        role: &str,
        topic: &str,
        history: &[AgentContribution],
        round: usize,
    ) -> AgentContribution {
        let persona = persona_for(role);
        let message = build_contribution_context(topic, history, &persona);

        let workspace_dir = self
            .project_path
            .join(".roundtable")
            .join("party-mode")
            .join(format!("round-{}", round));
        let _ = tokio::fs::create_dir_all(&workspace_dir).await;

        let invocation_context = InvocationContext {
            project_dir: self.project_path.clone(),
            workspace_dir,
            model: None,
            verbose: false,
        };

        let capability = capability_for_discussion_role(role);

        let content = match self
            .invoker
            .invoke(capability, &message, &invocation_context)
            .await
        {
            Ok(outcome) => cap_content(outcome.text.trim()),
            Err(e) => format!(
                "{} ({}): Unable to contribute (error: {})",
                persona.name, persona.role_title, e
            ),
        };

        AgentContribution {
            role: role.to_string(),
            agent_name: persona.name,
            round,
            content,
            timestamp: Local::now().to_rfc3339(),
        }
    }

    /// Synthesize the finalized discussion.
    ///
    /// Builds a transcript grouped by round ascending, then issues exactly
    /// one synthesis invocation. On failure the fixed fallback section is
    /// appended instead; this path never fails.
    async fn synthesize_discussion(&self, history: &[AgentContribution]) -> String {
        let mut lines = build_transcript(history);

        let workspace_dir = self
            .project_path
            .join(".roundtable")
            .join("party-mode")
            .join("synthesis");
        let _ = tokio::fs::create_dir_all(&workspace_dir).await;

        let invocation_context = InvocationContext {
            project_dir: self.project_path.clone(),
            workspace_dir,
            model: None,
            verbose: false,
        };

        let prompt = format!(
            "Analyze this multi-agent discussion and provide:\n\
             1. Key insights (3-5 bullet points)\n\
             2. Consensus points (where agents agreed)\n\
             3. Conflicting perspectives (where agents disagreed)\n\
             4. Action items (specific next steps)\n\n\
             Discussion:\n{}\n\n\
             Please provide a concise synthesis in markdown format.",
            lines.join("\n")
        );

        match self
            .invoker
            .invoke(Capability::Planner, &prompt, &invocation_context)
            .await
        {
            Ok(outcome) => {
                lines.push(String::new());
                lines.push("## AI-Generated Synthesis".to_string());
                lines.push(String::new());
                lines.push(outcome.text);
            }
            Err(e) => {
                log_synthesis_failed!(e);
                lines.push(String::new());
                lines.push("## Synthesis (Basic)".to_string());
                lines.push(String::new());
                lines.push("- Discussion captured above".to_string());
                lines.push(format!("- Unable to generate AI synthesis: {}", e));
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }
}

/// Recommended role composition for a task type.
pub fn recommended_roles(task_type: &str) -> Vec<&'static str> {
    match task_type {
        "planning" => vec!["pm", "architect", "dev"],
        "architecture" => vec!["architect", "dev", "tea"],
        "epic_breakdown" => vec!["pm", "architect", "dev", "tea"],
        "retrospective" => vec!["pm", "dev", "tea", "sm"],
        "estimation" => vec!["architect", "dev", "tea"],
        _ => vec!["pm", "dev", "tea"],
    }
}

/// Render the message for one contribution: topic, the bounded history
/// window, and the persona instruction.
fn build_contribution_context(
    topic: &str,
    history: &[AgentContribution],
    persona: &Persona,
) -> String {
    let mut lines = vec![format!("Discussion Topic: {}", topic), String::new()];

    if !history.is_empty() {
        lines.push("Previous Discussion:".to_string());
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for contrib in &history[start..] {
            lines.push(format!(
                "[Round {}] {} ({}): {}",
                contrib.round, contrib.agent_name, contrib.role, contrib.content
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "You are {}, the {}. Provide a brief, focused contribution (2-3 \
         sentences) to this discussion from your perspective. Be specific and \
         add value based on your expertise.",
        persona.name, persona.role_title
    ));

    lines.join("\n")
}

/// Transcript grouped by round, ascending.
fn build_transcript(history: &[AgentContribution]) -> Vec<String> {
    let mut by_round: BTreeMap<usize, Vec<&AgentContribution>> = BTreeMap::new();
    for contrib in history {
        by_round.entry(contrib.round).or_default().push(contrib);
    }

    let mut lines = vec!["# Multi-Agent Discussion Synthesis".to_string(), String::new()];

    for (round, contributions) in by_round {
        lines.push(format!("## Round {}", round));
        lines.push(String::new());

        for contrib in contributions {
            lines.push(format!(
                "**{} ({}):** {}",
                contrib.agent_name, contrib.role, contrib.content
            ));
            lines.push(String::new());
        }
    }

    lines
}

/// Cap content at [`CONTENT_CAP`] characters, marking the truncation.
fn cap_content(content: &str) -> String {
    if content.chars().count() > CONTENT_CAP {
        let truncated: String = content.chars().take(CONTENT_CAP - 3).collect();
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}
