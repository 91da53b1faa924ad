//! Match sessions and the live-session registry
//!
//! A session is a two-party, multi-round contest; the registry owns every
//! live session and maps participants to their active match.

pub mod instance;
pub mod registry;

// Re-export commonly used types
pub use instance::{MatchSession, SessionStatus};
pub use registry::SessionRegistry;
