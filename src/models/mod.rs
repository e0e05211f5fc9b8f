//! Data models for the brand sync engine.
//!
//! Local shapes are what the cache stores and the UI reads; remote shapes are
//! the fixed per-collection schemas of the remote store.

mod document;
mod remote;
mod workspace;

pub use document::*;
pub use remote::*;
pub use workspace::*;
