//! Domain core for the change-request desk.
//!
//! Pure validation and state-transition rules for change requests, the
//! Assigner/Department-Head conversation thread, attachments, pagination
//! and role checks, plus the [`workflow::Workflow`] orchestrator that drives
//! them over an injected [`session::SessionCapability`].

pub mod attachment;
pub mod conversation;
pub mod error;
pub mod pagination;
pub mod request;
pub mod roles;
pub mod search;
pub mod session;
pub mod stats;
pub mod types;
pub mod voice_note;
pub mod workflow;
