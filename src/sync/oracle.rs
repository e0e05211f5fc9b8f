//! Decides whether the remote store may be used right now.

use std::sync::Arc;

use crate::remote::SessionProbe;

use super::LocalOnlyReason;

/// Connectivity check consulted once per coordinator call.
///
/// Nothing is memoized: every check re-runs the session probe.
#[derive(Clone)]
pub struct ConnectivityOracle {
    probe: Option<Arc<dyn SessionProbe>>,
}

impl ConnectivityOracle {
    /// `probe` is `None` when the remote store is not configured.
    pub fn new(probe: Option<Arc<dyn SessionProbe>>) -> Self {
        Self { probe }
    }

    /// An oracle that always reports local-only mode.
    pub fn offline() -> Self {
        Self { probe: None }
    }

    /// Whether the remote store is configured at all.
    pub fn configured(&self) -> bool {
        self.probe.is_some()
    }

    /// `Ok` when a signed-in session exists; otherwise why not.
    ///
    /// Probe errors fail closed and are never propagated.
    pub async fn check(&self) -> Result<(), LocalOnlyReason> {
        let Some(probe) = &self.probe else {
            tracing::debug!("Remote store not configured, using local cache only");
            return Err(LocalOnlyReason::NotConfigured);
        };

        match probe.current_user().await {
            Ok(Some(user)) => {
                tracing::debug!(user = %user.id, "Remote session available");
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("No signed-in user, using local cache only");
                Err(LocalOnlyReason::Unauthenticated)
            }
            Err(err) => {
                tracing::warn!("Session probe failed, using local cache only: {}", err);
                Err(LocalOnlyReason::ProbeFailed(err.to_string()))
            }
        }
    }

    pub async fn available(&self) -> bool {
        self.check().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::MemoryRemote;

    #[tokio::test]
    async fn test_unconfigured_is_unavailable() {
        let oracle = ConnectivityOracle::offline();
        assert!(!oracle.configured());
        assert_eq!(oracle.check().await, Err(LocalOnlyReason::NotConfigured));
    }

    #[tokio::test]
    async fn test_follows_session_state() {
        let remote = MemoryRemote::new();
        let oracle = ConnectivityOracle::new(Some(remote.session.clone()));
        assert!(oracle.available().await);

        remote.session.sign_out();
        assert_eq!(oracle.check().await, Err(LocalOnlyReason::Unauthenticated));

        remote.session.set_failing(true);
        assert!(matches!(
            oracle.check().await,
            Err(LocalOnlyReason::ProbeFailed(_))
        ));
    }
}
