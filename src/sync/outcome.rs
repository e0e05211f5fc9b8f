//! Typed result of a coordinator operation.
//!
//! Operations never fail from the caller's point of view. The outcome says
//! whether the remote store took part, and if not, why.

use std::fmt;

use crate::errors::RemoteError;

/// Why an operation stayed local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalOnlyReason {
    /// Remote endpoint or key is missing
    NotConfigured,
    /// The session probe found no signed-in user
    Unauthenticated,
    /// The session probe itself failed
    ProbeFailed(String),
    /// A remote call failed part way through
    RemoteFailed {
        operation: &'static str,
        message: String,
    },
    /// The parent brand has no remote counterpart yet
    NoRemoteParent(String),
    /// The request was ignored before touching either store
    InvalidInput(String),
}

impl fmt::Display for LocalOnlyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalOnlyReason::NotConfigured => write!(f, "remote store not configured"),
            LocalOnlyReason::Unauthenticated => write!(f, "no authenticated session"),
            LocalOnlyReason::ProbeFailed(msg) => write!(f, "session probe failed: {}", msg),
            LocalOnlyReason::RemoteFailed { operation, message } => {
                write!(f, "{} failed: {}", operation, message)
            }
            LocalOnlyReason::NoRemoteParent(brand) => {
                write!(f, "brand {} has no remote counterpart", brand)
            }
            LocalOnlyReason::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

/// Whether the remote store was part of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    LocalOnly(LocalOnlyReason),
}

/// Value produced by a coordinator operation plus how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport<T> {
    pub value: T,
    pub outcome: SyncOutcome,
}

impl<T> SyncReport<T> {
    pub fn synced(value: T) -> Self {
        Self {
            value,
            outcome: SyncOutcome::Synced,
        }
    }

    pub fn local_only(value: T, reason: LocalOnlyReason) -> Self {
        Self {
            value,
            outcome: SyncOutcome::LocalOnly(reason),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.outcome == SyncOutcome::Synced
    }

    /// The reason the operation stayed local, if it did.
    pub fn local_only_reason(&self) -> Option<&LocalOnlyReason> {
        match &self.outcome {
            SyncOutcome::Synced => None,
            SyncOutcome::LocalOnly(reason) => Some(reason),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SyncReport<U> {
        SyncReport {
            value: f(self.value),
            outcome: self.outcome,
        }
    }
}

/// Log a failed remote call and describe it as a local-only reason.
pub(crate) fn remote_failed(operation: &'static str, err: &RemoteError) -> LocalOnlyReason {
    tracing::warn!(
        operation,
        code = err.error_code(),
        "Remote call failed, keeping local state: {}",
        err
    );
    LocalOnlyReason::RemoteFailed {
        operation,
        message: err.to_string(),
    }
}
