//! Agent Runtime - collaborator seams and the intent-fulfillment pipeline
//!
//! This crate owns the impure half of salesdesk:
//! - **Collaborator traits** (`llm`, `store`) - the completion endpoint,
//!   object store, and knowledge index behind pluggable seams
//! - **Action Invoker** (`actions`) - prompt construction and the single
//!   bounded external call per turn
//! - **Intent Router** (`router`) - dispatch from a dialog event to one of
//!   the supported actions, or the benign fallback
//!
//! # Architecture
//!
//! Every turn runs the same constrained pipeline:
//! 1. **Validation** - required slots present? otherwise elicit
//! 2. **Extraction** - resolve values, apply the sentinel override
//! 3. **Invocation** - one deadline-bounded collaborator call, no retries
//! 4. **Response** - fulfillment, elicitation, or user-safe failure
//!
//! # Injection Principle
//!
//! No collaborator is a process-wide singleton. The router owns an invoker
//! built from injected trait objects, so tests swap in fakes without any
//! shared state.

pub mod actions;
pub mod llm;
pub mod router;
pub mod store;
