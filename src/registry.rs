use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::ShareError;

/// Ordered list of paths currently shared over the network.
///
/// Insertion order matters: clients address files by their position, and the
/// index page hands those positions out as links. Entries are only ever
/// appended ([`share`](Self::share)) or wiped wholesale
/// ([`clear`](Self::clear)), so an index stays valid until the next clear.
///
/// The registry is mutated from whatever thread the embedding application
/// runs on (a GUI event loop, a CLI) while the HTTP handlers read it
/// concurrently, so all access goes through one lock.
#[derive(Clone, Default)]
pub struct FileRegistry {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    paths: Vec<PathBuf>,
    generation: u64,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `paths` in order and returns how many were added.
    ///
    /// Paths are not checked for existence or readability, and duplicates are
    /// kept. Bumps the generation when anything was appended.
    pub fn share<I>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut inner = self.write();
        let before = inner.paths.len();
        inner.paths.extend(paths);
        let added = inner.paths.len() - before;
        if added > 0 {
            inner.generation += 1;
        }
        added
    }

    /// Empties the registry and bumps the generation.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.paths.clear();
        inner.generation += 1;
    }

    /// Snapshot of the shared paths, in registration order.
    pub fn list(&self) -> Vec<PathBuf> {
        self.read().paths.clone()
    }

    /// The path at `index`, or [`ShareError::IndexOutOfRange`].
    pub fn get(&self, index: usize) -> Result<PathBuf, ShareError> {
        let inner = self.read();
        inner
            .paths
            .get(index)
            .cloned()
            .ok_or(ShareError::IndexOutOfRange {
                index,
                len: inner.paths.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.read().paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().paths.is_empty()
    }

    /// Version counter, bumped on every content change. Two equal generations
    /// imply identical contents, which is what the archive cache keys on.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Paths and generation read under the same lock acquisition, so the
    /// generation really describes the returned contents.
    pub fn snapshot(&self) -> (Vec<PathBuf>, u64) {
        let inner = self.read();
        (inner.paths.clone(), inner.generation)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("registry lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("registry lock poisoned")
    }
}

/// Display name of a shared path: its final component, or the whole path when
/// there is none (e.g. `/`).
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
