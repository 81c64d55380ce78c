use std::path::PathBuf;

use crate::archive::ArchiveStore;
use crate::registry::FileRegistry;

/// Shared handle passed into the router and held by the embedding
/// application (GUI, CLI). Cloning is cheap; all clones see the same
/// registry and archive cache.
#[derive(Clone)]
pub struct AppState {
    pub registry: FileRegistry,
    pub archive: ArchiveStore,
}

impl AppState {
    /// `archive_path` is where `/download_all` materializes its ZIP.
    pub fn new(archive_path: PathBuf) -> Self {
        Self {
            registry: FileRegistry::new(),
            archive: ArchiveStore::new(archive_path),
        }
    }

    /// Registers `paths` for sharing; returns how many were added.
    pub fn share<I>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.registry.share(paths)
    }

    /// Unshares everything and deletes any previously built archive artifact.
    pub async fn clear(&self) -> anyhow::Result<()> {
        self.registry.clear();
        self.archive.remove().await
    }
}
