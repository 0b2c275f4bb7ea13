//! Error type for the definition resolution boundary.
//!
//! Step failures, invocation errors, and state persistence problems are
//! rendered into result values (`StepResult`, `WorkflowResult`) rather than
//! raised, so the only typed error left is the one registries return. Public
//! entry points (`WorkflowEngine::execute`,
//! `PartyOrchestrator::run_party_mode`) never surface it; the engine folds
//! it into the returned `WorkflowResult`.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The registry has no workflow under the requested name. Terminal for
    /// the call; no state is mutated.
    #[error("Workflow '{0}' not found")]
    DefinitionNotFound(String),
}
