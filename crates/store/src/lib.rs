//! In-process authoritative store for change requests and conversation turns.
//!
//! Implements [`changedesk_core::session::SessionCapability`] with the same
//! write-time re-validation a remote backend performs.

pub mod memory;
pub mod state;

pub use memory::{MemorySession, MemoryStore};
