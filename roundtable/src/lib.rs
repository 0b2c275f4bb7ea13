// Collaborative workflow execution core: resumable step sequencing plus
// multi-participant discussion scheduling over an opaque agent invocation
// boundary.

// Error taxonomy
pub mod error;

// Data models
pub mod models;

// Workflow state persistence
pub mod state;

// Single-step execution
pub mod executor;

// Workflow execution engine
pub mod engine;

// Definition resolution boundary
pub mod registry;

// Party mode round scheduling
pub mod party;

// Framework artifact adapters
pub mod artifacts;

pub use artifacts::{
    Artifact, Epic, EpicFileAdapter, FrameworkAdapter, SpecDirAdapter, Task,
};
pub use engine::{ExecutionObserver, NoopObserver, WorkflowEngine};
pub use error::EngineError;
pub use executor::{capability_for_step_role, ExecutionContext, StepExecutor};
pub use models::{
    AgentContribution, OutputInfo, OutputSpec, PartyModeResult, SessionStatus, StepResult,
    StepStatus, WorkflowDefinition, WorkflowOutcome, WorkflowResult, WorkflowStep,
};
pub use party::{recommended_roles, DiscussionMode, PartyOrchestrator};
pub use registry::{DefinitionRegistry, StaticRegistry};
pub use state::{ExecutionState, StateStore};
