//! Synchronization engine between the local cache and the remote store.
//!
//! Every coordinator follows the same protocol:
//! - reads ask the oracle, mirror a successful remote listing into the cache
//!   wholesale, and fall back to the cache on any failure;
//! - writes land in the cache first, then are pushed remotely when the
//!   oracle allows it; remote failures leave the local write in place.
//!
//! There is no retry queue and no background task; each sync attempt runs
//! once, inline with the call that triggered it.

mod brands;
mod context;
mod documents;
mod identity;
mod oracle;
mod outcome;
mod push;
mod workspace;

pub use brands::BrandSync;
pub use context::StorageContext;
pub use documents::DocumentSync;
pub use identity::{is_placeholder, placeholder_id};
pub use oracle::ConnectivityOracle;
pub use outcome::{LocalOnlyReason, SyncOutcome, SyncReport};
pub use push::{campaign_delta, keyword_delta, PushReconciler, PushSummary};
pub use workspace::{WorkspaceMap, WorkspaceSync};

use crate::errors::RemoteResult;
use crate::remote::RemoteCollection;

/// How a collection removes records remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Flip the record's active flag
    Soft,
    /// Remove the record
    Hard,
}

impl DeletePolicy {
    pub(crate) async fn apply<C>(self, collection: &C, id: &str) -> RemoteResult<()>
    where
        C: RemoteCollection + ?Sized,
    {
        match self {
            DeletePolicy::Soft => collection.archive(id).await,
            DeletePolicy::Hard => collection.delete(id).await,
        }
    }
}
