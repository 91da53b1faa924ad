//! Pre-match waiting and readiness coordination
//!
//! This module owns the waiting list and the ready set, and decides when
//! enough ready participants exist to hand off to the session registry.

pub mod queue;

// Re-export commonly used types
pub use queue::WaitingLobby;
