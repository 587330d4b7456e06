//! Passive reload: Traefik's file provider (`watch = true`) picks up renamed
//! documents on its own, so there is nothing to signal.

use async_trait::async_trait;

use crate::reload::{ProxyControlPlane, ReloadError};

#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveReload;

#[async_trait]
impl ProxyControlPlane for PassiveReload {
    async fn reload(&self) -> Result<(), ReloadError> {
        tracing::debug!("Passive reload: relying on proxy file watch");
        Ok(())
    }

    fn strategy(&self) -> &'static str {
        "passive"
    }
}
