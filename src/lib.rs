//! Duel Room - Matchmaking and match-state engine for rock-paper-scissors
//!
//! This crate matches pairs of remote participants into turn-based
//! rock-paper-scissors sessions, collects simultaneous moves, resolves
//! rounds, and tracks multi-round scores until a winner emerges. Transport,
//! identity, and persistence are external collaborators: the engine is pure
//! state plus transitions, driven by commands and answering with
//! notification payloads for the transport to deliver.

pub mod config;
pub mod engine;
pub mod error;
pub mod lobby;
pub mod notify;
pub mod rules;
pub mod service;
pub mod session;
pub mod settings;
pub mod types;

// Re-export commonly used types and traits
pub use error::{EngineError, Result};
pub use types::*;

// Re-export key components
pub use engine::{MatchEngine, Reply};
pub use notify::{Notification, NotificationSink};
pub use service::{Command, EngineService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
