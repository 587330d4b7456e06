//! Single-flight gate in front of a control plane.
//!
//! Every caller takes a ticket before queueing. The holder of the gate waits
//! for the batching window, notes the newest ticket issued so far, and runs one
//! reload on behalf of all of them. Callers whose ticket is already covered when
//! they reach the gate return that reload's outcome without signaling again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::reload::{ProxyControlPlane, ReloadError};

struct Completed {
    /// Highest ticket covered by a finished reload.
    ticket: u64,
    outcome: Result<(), ReloadError>,
}

pub struct CoalescingControlPlane {
    inner: Arc<dyn ProxyControlPlane>,
    window: Duration,
    wait_limit: Duration,
    issued: AtomicU64,
    gate: Mutex<Completed>,
}

impl CoalescingControlPlane {
    pub fn new(inner: Arc<dyn ProxyControlPlane>, window: Duration, wait_limit: Duration) -> Self {
        Self {
            inner,
            window,
            wait_limit,
            issued: AtomicU64::new(0),
            gate: Mutex::new(Completed {
                ticket: 0,
                outcome: Ok(()),
            }),
        }
    }
}

#[async_trait]
impl ProxyControlPlane for CoalescingControlPlane {
    async fn reload(&self) -> Result<(), ReloadError> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let mut completed = tokio::time::timeout(self.wait_limit, self.gate.lock())
            .await
            .map_err(|_| ReloadError::Timeout(self.wait_limit))?;

        if completed.ticket >= ticket {
            tracing::debug!(ticket, covered = completed.ticket, "Reload shared with earlier caller");
            metrics::record_reload_shared();
            return completed.outcome.clone();
        }

        if !self.window.is_zero() {
            tokio::time::sleep(self.window).await;
        }

        let covered = self.issued.load(Ordering::SeqCst);
        let outcome = self.inner.reload().await;

        tracing::debug!(
            ticket,
            covered,
            ok = outcome.is_ok(),
            "Reload finished"
        );
        completed.ticket = covered;
        completed.outcome = outcome.clone();
        outcome
    }

    fn strategy(&self) -> &'static str {
        self.inner.strategy()
    }
}
