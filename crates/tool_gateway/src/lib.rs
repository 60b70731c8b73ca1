//! Tool execution gateway.
//!
//! Accepts raw `(name, arguments)` tool-call envelopes, validates them into a
//! closed [`ToolCall`] set, and executes them inside a canonical project
//! root. Shell commands pass through a [`ConfirmationGate`] before anything
//! spawns; file writes are atomic (temp file + rename); edits locate their
//! anchor exactly or by fuzzy window matching. Every call ends in exactly one
//! [`ToolOutcome`].

mod call;
mod edit;
mod error;
mod gateway;

pub use call::ToolCall;
pub use error::{ErrorKind, ToolError};
pub use gateway::{AutoApprove, ConfirmationGate, ToolGateway, ToolLimits, ToolOutcome};
