//! Conversation context engine.
//!
//! Owns the data model of an interactive assistant session: the message
//! history, attached file snapshots, the active model profile, and the
//! token-budget truncation policy that keeps every mutation inside the
//! model's context window. Token counts are heuristic estimates; the engine
//! performs no network I/O and reads the filesystem only to snapshot files.

mod config;
mod error;
mod message;
mod models;
mod session;
mod tokens;
mod truncation;

pub use config::EngineConfig;
pub use error::EngineError;
pub use message::{Message, Role};
pub use models::{ModelProfile, ModelRegistry, ModelRole};
pub use session::{AddOutcome, ContextFile, ContextInfo, Session, SessionSnapshot};
pub use tokens::{estimate, CHARS_PER_TOKEN};
pub use truncation::TruncationReport;
