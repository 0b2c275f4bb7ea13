//! Common test utilities for execution core tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use roundtable::models::{WorkflowDefinition, WorkflowStep};
use roundtable_sdk::{async_trait, AgentInvoker, Capability, InvocationContext, InvocationOutcome};

/// Create a temporary directory for testing
pub fn create_temp_dir(name: &str) -> PathBuf {
    let temp_dir = std::env::temp_dir().join(format!("roundtable_test_{}", name));
    let _ = std::fs::remove_dir_all(&temp_dir);
    std::fs::create_dir_all(&temp_dir).unwrap();
    temp_dir
}

/// Clean up temporary directory
pub fn cleanup_temp_dir(path: &PathBuf) {
    if path.exists() {
        std::fs::remove_dir_all(path).ok();
    }
}

/// Build a workflow definition with pre-loaded step content
pub fn sample_definition(name: &str, steps: &[(&str, &str)]) -> WorkflowDefinition {
    WorkflowDefinition {
        name: name.to_string(),
        description: format!("{} test workflow", name),
        phase: "planning".to_string(),
        path: PathBuf::from("/nonexistent"),
        steps: steps
            .iter()
            .map(|(step_name, role)| WorkflowStep {
                file: format!("steps/{}.md", step_name.to_lowercase().replace(' ', "-")),
                name: step_name.to_string(),
                role: role.to_string(),
                content: Some(format!("Instructions for {}.", step_name)),
            })
            .collect(),
        agent: None,
        category: None,
        dependencies: vec![],
        outputs: vec![],
    }
}

/// Extract the persona name from a party-mode message ("You are John, ...")
fn persona_in(message: &str) -> Option<String> {
    let idx = message.find("You are ")?;
    let rest = &message[idx + "You are ".len()..];
    let name = rest.split(',').next()?;
    // Step messages read "You are executing a ..."; those are not personas
    if name.contains(' ') {
        return None;
    }
    Some(name.to_string())
}

/// Scriptable invoker recording every call.
///
/// Responses default to "contribution from <persona>" for party messages and
/// "step output" otherwise; `numbered_replies` switches to "msg-NN" for
/// history-window assertions. `fail_containing` makes matching messages
/// error; `delay_containing` slows them down. Start/end markers for every
/// call land in `events` for ordering assertions.
#[derive(Default)]
pub struct ScriptedInvoker {
    pub seen: Mutex<Vec<(Capability, String)>>,
    pub events: Mutex<Vec<String>>,
    counter: AtomicUsize,
    numbered_replies: bool,
    fail_containing: Option<String>,
    delay_containing: Option<(String, Duration)>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numbered_replies(mut self) -> Self {
        self.numbered_replies = true;
        self
    }

    pub fn with_failure_containing(mut self, needle: &str) -> Self {
        self.fail_containing = Some(needle.to_string());
        self
    }

    pub fn with_delay_containing(mut self, needle: &str, delay: Duration) -> Self {
        self.delay_containing = Some((needle.to_string(), delay));
        self
    }

    pub fn messages(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        capability: Capability,
        message: &str,
        _context: &InvocationContext,
    ) -> anyhow::Result<InvocationOutcome> {
        let who = persona_in(message).unwrap_or_else(|| "agent".to_string());

        self.seen
            .lock()
            .unwrap()
            .push((capability, message.to_string()));
        self.events.lock().unwrap().push(format!("start:{}", who));

        if let Some((needle, delay)) = &self.delay_containing {
            if message.contains(needle.as_str()) {
                tokio::time::sleep(*delay).await;
            }
        }

        if let Some(needle) = &self.fail_containing {
            if message.contains(needle.as_str()) {
                self.events.lock().unwrap().push(format!("end:{}", who));
                anyhow::bail!("scripted failure");
            }
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let text = if self.numbered_replies {
            format!("msg-{:02}", n)
        } else if persona_in(message).is_some() {
            format!("contribution from {}", who)
        } else {
            "step output".to_string()
        };

        self.events.lock().unwrap().push(format!("end:{}", who));

        Ok(InvocationOutcome {
            status_tag: "complete".to_string(),
            text,
        })
    }
}

/// Observer recording every callback as a string
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl roundtable::ExecutionObserver for RecordingObserver {
    fn on_step_start(&self, step_num: usize, name: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("step_start:{}:{}", step_num, name));
    }

    fn on_step_complete(&self, step_num: usize, _output: Option<&str>) {
        self.events
            .lock()
            .unwrap()
            .push(format!("step_complete:{}", step_num));
    }

    fn on_workflow_complete(
        &self,
        outputs: &std::collections::HashMap<String, roundtable::OutputInfo>,
    ) {
        self.events
            .lock()
            .unwrap()
            .push(format!("workflow_complete:{}", outputs.len()));
    }

    fn on_error(&self, message: &str) {
        self.events.lock().unwrap().push(format!("error:{}", message));
    }
}
