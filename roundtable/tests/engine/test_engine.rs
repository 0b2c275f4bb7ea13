//! Tests for the workflow execution engine
//!
//! Covers resumability, vacuous re-runs, definition resolution failure,
//! output collection, and observer callbacks.

use std::sync::Arc;

use super::common::*;
use roundtable::models::OutputSpec;
use roundtable::{
    ExecutionContext, NoopObserver, StaticRegistry, WorkflowEngine, WorkflowOutcome,
};
use roundtable_sdk::WorkflowStatus;

fn engine_with(
    dir: &std::path::Path,
    invoker: Arc<ScriptedInvoker>,
    definition: roundtable::WorkflowDefinition,
) -> WorkflowEngine {
    let registry = Arc::new(StaticRegistry::new().with_workflow(definition));
    WorkflowEngine::new(registry, invoker, dir).unwrap()
}

#[tokio::test]
async fn test_execute_runs_all_steps_in_order() {
    let dir = create_temp_dir("engine_happy");
    let invoker = Arc::new(ScriptedInvoker::new());
    let definition = sample_definition(
        "create-prd",
        &[("Step One", "pm"), ("Step Two", "dev"), ("Step Three", "tea")],
    );
    let engine = engine_with(&dir, invoker.clone(), definition);

    let observer = RecordingObserver::default();
    let result = engine
        .execute("create-prd", &ExecutionContext::default(), &observer)
        .await;

    assert!(result.is_success());
    assert_eq!(invoker.call_count(), 3);

    let messages = invoker.messages();
    assert!(messages[0].contains("**Step:** Step One"));
    assert!(messages[1].contains("**Step:** Step Two"));
    assert!(messages[2].contains("**Step:** Step Three"));

    let state = engine.state_store().get_state("create-prd");
    assert_eq!(state.status, WorkflowStatus::Completed);
    assert_eq!(
        state.steps_completed,
        vec!["Step One", "Step Two", "Step Three"]
    );
    assert_eq!(state.current_step, 3);
    assert!(state.completed_at.is_some());

    let events = observer.events.lock().unwrap();
    assert_eq!(events[0], "step_start:1:Step One");
    assert_eq!(events[1], "step_complete:1");
    assert_eq!(events.last().unwrap(), "workflow_complete:0");

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn test_failed_step_resumes_exactly_there() {
    let dir = create_temp_dir("engine_resume");
    let definition = sample_definition(
        "create-prd",
        &[("Step One", "pm"), ("Step Two", "dev"), ("Step Three", "tea")],
    );

    // First run: step two fails
    let failing = Arc::new(ScriptedInvoker::new().with_failure_containing("**Step:** Step Two"));
    let engine = engine_with(&dir, failing.clone(), definition.clone());

    let result = engine
        .execute("create-prd", &ExecutionContext::default(), &NoopObserver)
        .await;

    assert_eq!(result.status, WorkflowOutcome::Failed);
    assert_eq!(result.failed_step, Some(2));
    assert!(result.error.as_deref().unwrap().contains("scripted failure"));
    assert_eq!(failing.call_count(), 2);

    let state = engine.state_store().get_state("create-prd");
    assert_eq!(state.status, WorkflowStatus::Failed);
    assert_eq!(state.steps_completed, vec!["Step One"]);
    assert_eq!(state.failed_at_step, Some(2));
    assert!(state.last_error.is_some());

    // Second run with a healthy invoker re-attempts step two, not step one
    let healthy = Arc::new(ScriptedInvoker::new());
    let engine = engine_with(&dir, healthy.clone(), definition);

    let result = engine
        .execute("create-prd", &ExecutionContext::default(), &NoopObserver)
        .await;

    assert!(result.is_success());
    assert_eq!(healthy.call_count(), 2);
    let messages = healthy.messages();
    assert!(messages[0].contains("**Step:** Step Two"));
    assert!(messages[1].contains("**Step:** Step Three"));

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn test_completed_workflow_reruns_vacuously() {
    let dir = create_temp_dir("engine_vacuous");
    let definition = sample_definition("create-prd", &[("Step One", "pm")]);

    let invoker = Arc::new(ScriptedInvoker::new());
    let engine = engine_with(&dir, invoker.clone(), definition.clone());
    let result = engine
        .execute("create-prd", &ExecutionContext::default(), &NoopObserver)
        .await;
    assert!(result.is_success());
    assert_eq!(invoker.call_count(), 1);

    // Re-run: no step invocations, still success
    let result = engine
        .execute("create-prd", &ExecutionContext::default(), &NoopObserver)
        .await;
    assert!(result.is_success());
    assert_eq!(invoker.call_count(), 1);

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn test_unknown_workflow_fails_without_state_mutation() {
    let dir = create_temp_dir("engine_notfound");
    let invoker = Arc::new(ScriptedInvoker::new());
    let registry = Arc::new(StaticRegistry::new());
    let engine = WorkflowEngine::new(registry, invoker.clone(), &dir).unwrap();

    let observer = RecordingObserver::default();
    let result = engine
        .execute("missing", &ExecutionContext::default(), &observer)
        .await;

    assert_eq!(result.status, WorkflowOutcome::Failed);
    assert!(result.error.as_deref().unwrap().contains("not found"));
    assert_eq!(invoker.call_count(), 0);
    assert!(!engine.state_store().state_file("missing").exists());

    let events = observer.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].starts_with("error:"));

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn test_declared_outputs_are_collected_best_effort() {
    let dir = create_temp_dir("engine_outputs");
    let mut definition = sample_definition("create-prd", &[("Step One", "pm")]);
    definition.outputs = vec![
        OutputSpec {
            path: "prd.md".to_string(),
            description: "Product requirements".to_string(),
        },
        OutputSpec {
            path: "never-written.md".to_string(),
            description: "Absent artifact".to_string(),
        },
    ];

    std::fs::write(dir.join("prd.md"), "# PRD\ncontent").unwrap();

    let invoker = Arc::new(ScriptedInvoker::new());
    let engine = engine_with(&dir, invoker, definition);

    let result = engine
        .execute("create-prd", &ExecutionContext::default(), &NoopObserver)
        .await;

    assert!(result.is_success());
    assert_eq!(result.outputs.len(), 1);

    let info = result.outputs.get("prd.md").unwrap();
    assert!(info.exists);
    assert!(info.size > 0);
    assert_eq!(info.description, "Product requirements");
    assert!(!result.outputs.contains_key("never-written.md"));

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn test_failure_fires_error_callback() {
    let dir = create_temp_dir("engine_error_cb");
    let definition = sample_definition("create-prd", &[("Step One", "pm")]);
    let invoker = Arc::new(ScriptedInvoker::new().with_failure_containing("**Step:** Step One"));
    let engine = engine_with(&dir, invoker, definition);

    let observer = RecordingObserver::default();
    let result = engine
        .execute("create-prd", &ExecutionContext::default(), &observer)
        .await;

    assert_eq!(result.status, WorkflowOutcome::Failed);

    let events = observer.events.lock().unwrap();
    assert_eq!(events[0], "step_start:1:Step One");
    assert!(events[1].starts_with("error:Step 1 failed:"));

    cleanup_temp_dir(&dir);
}
