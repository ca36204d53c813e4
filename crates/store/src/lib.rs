//! Session-keyed storage backends for Wayfinder.
//!
//! Two implementations of the core store traits:
//! - [`InMemoryStore`]: ephemeral, for tests and single-run sessions.
//! - [`FileStore`]: one JSON document per session, human-inspectable,
//!   best-effort durability.
//!
//! Both key every operation by [`wayfinder_core::SessionId`] and apply
//! merges atomically per session, so overlapping turns cannot interleave
//! half-applied fact updates.

mod state;

pub mod file;
pub mod in_memory;

pub use file::FileStore;
pub use in_memory::InMemoryStore;
