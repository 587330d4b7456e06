//! Shutdown coordination for the registrar.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The HTTP server and tests subscribe; `trigger` or an OS signal stops them.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Resolve when either `trigger` is called or an OS shutdown signal arrives.
    pub async fn wait(mut rx: broadcast::Receiver<()>) {
        tokio::select! {
            _ = rx.recv() => tracing::info!("Shutdown triggered"),
            _ = super::signals::shutdown_signal() => {}
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
