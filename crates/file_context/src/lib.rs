//! File-context resolution for the conversation engine.
//!
//! Turns user-supplied patterns into concrete files under a project root:
//! exact paths first, then glob expansion, then an optional fuzzy-similarity
//! walk. Also provides size-limited snapshot reads with binary detection and
//! the shared [0, 100] similarity score used elsewhere for anchor matching.

mod error;
mod filter;
mod resolve;
mod score;
mod snapshot;

pub use error::ResolveError;
pub use filter::WalkFilter;
pub use resolve::{resolve, FileCandidate, ResolverOptions};
pub use score::{content_similarity, pattern_score, similarity};
pub use snapshot::{looks_binary, read_snapshot, Snapshot};
