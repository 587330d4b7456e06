//! Atomic persistence of routing descriptors.
//!
//! # Responsibilities
//! - Encode a descriptor and store it as `{directory}/{domain}.{ext}`
//! - Never expose a partially written document to the watching proxy
//! - Serialize concurrent writes for the same domain
//!
//! # Design Decisions
//! - Content is staged in a hidden temp file in the target directory, flushed,
//!   then renamed over the target (rename is atomic within one filesystem)
//! - The temp name has no `.yaml`/`.yml` suffix so the file provider ignores it
//! - Blocking filesystem work runs on the blocking pool

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::DynamicConfigDir;
use crate::routing::descriptor::RoutingDescriptor;

/// Failure to persist a descriptor.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to encode descriptor: {0}")]
    Encode(#[from] serde_yaml::Error),

    #[error("failed to stage {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move descriptor into place at {path}: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Writes one document per domain into the dynamic configuration directory.
#[derive(Debug)]
pub struct ConfigWriter {
    directory: PathBuf,
    extension: String,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ConfigWriter {
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
            locks: DashMap::new(),
        }
    }

    pub fn from_config(config: &DynamicConfigDir) -> Self {
        Self::new(&config.directory, &config.extension)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the document owned by `domain`.
    pub fn path_for(&self, domain: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", domain, self.extension))
    }

    /// Persist `descriptor` as the document for `domain`, replacing any previous one.
    ///
    /// `domain` must already be validated; it becomes part of the file name.
    pub async fn write(
        &self,
        domain: &str,
        descriptor: &RoutingDescriptor,
    ) -> Result<PathBuf, WriteError> {
        let contents = descriptor.to_yaml()?;
        let target = self.path_for(domain);

        let lock = self
            .locks
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let directory = self.directory.clone();
        let staged_target = target.clone();
        let prefix = format!(".{}.", domain);
        let outcome = {
            let _guard = lock.lock().await;
            tokio::task::spawn_blocking(move || {
                write_atomically(&directory, &prefix, &staged_target, contents.as_bytes())
            })
            .await
        };

        // Only the map holds the lock once no other writer waits on it.
        drop(lock);
        self.locks.remove_if(domain, |_, lock| Arc::strong_count(lock) == 1);

        outcome??;

        tracing::debug!(domain = %domain, path = ?target, "Descriptor committed");
        Ok(target)
    }
}

fn write_atomically(
    directory: &Path,
    prefix: &str,
    target: &Path,
    contents: &[u8],
) -> Result<(), WriteError> {
    let stage_err = |source| WriteError::Stage {
        path: directory.to_path_buf(),
        source,
    };

    let mut staged = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tmp")
        .tempfile_in(directory)
        .map_err(stage_err)?;

    staged.write_all(contents).map_err(stage_err)?;
    staged.as_file().sync_all().map_err(stage_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(stage_err)?;
    }

    // On failure the returned NamedTempFile is dropped, removing the staged file.
    staged.persist(target).map_err(|e| WriteError::Commit {
        path: target.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
