//! Interactive coding-assistant CLI.
//!
//! ## Transport bootstrap
//!
//! `engineer_cli` requires explicit transport selection:
//!
//! - `ENGINEER_TRANSPORT=mock` for a deterministic offline transport
//!
//! Provider HTTP transports plug in behind the `model_transport` seam and are
//! selected the same way.
//!
//! ## Configuration
//!
//! Engine settings load from `config.json` in the project root, overridable
//! with `ENGINEER_CONFIG=<path>`. Missing files fall back to built-in
//! defaults; malformed files abort startup.
//!
//! Conversation memory contract: the session engine owns model-facing history
//! and replays it on every completion call as provider-neutral wire messages.

pub mod commands;
pub mod confirm;
pub mod export;
pub mod logging;
pub mod tools;
pub mod transports;
pub mod turn;
