use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ShareError;
use crate::registry::base_name;

/// File name of the on-disk ZIP artifact and of the download attachment.
pub const ARCHIVE_NAME: &str = "shared_files.zip";

/// Builds and caches the "download everything" ZIP.
///
/// The archive is keyed on the registry generation: as long as the registry
/// has not changed, repeated `/download_all` requests reuse the bytes built by
/// the first one instead of re-reading every shared file. Any share or clear
/// bumps the generation and invalidates the cache.
#[derive(Clone)]
pub struct ArchiveStore {
    path: Arc<PathBuf>,
    cached: Arc<Mutex<Option<CachedArchive>>>,
}

struct CachedArchive {
    generation: u64,
    bytes: Bytes,
}

impl ArchiveStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Where the ZIP artifact is written on disk.
    pub fn artifact_path(&self) -> &Path {
        &self.path
    }

    /// Returns the archive for `paths`, rebuilding only when `generation`
    /// differs from the cached one. The fresh archive is also written to
    /// [`artifact_path`](Self::artifact_path).
    pub async fn get_or_build(
        &self,
        generation: u64,
        paths: &[PathBuf],
    ) -> Result<Bytes, ShareError> {
        let mut cached = self.cached.lock().await;
        if let Some(archive) = cached.as_ref()
            && archive.generation == generation
        {
            debug!(generation, "reusing cached archive");
            return Ok(archive.bytes.clone());
        }

        let bytes = build_zip(paths).await.map_err(ShareError::Archive)?;
        tokio::fs::write(self.path.as_ref(), &bytes)
            .await
            .with_context(|| format!("writing {}", self.path.display()))
            .map_err(ShareError::Archive)?;

        info!(generation, files = paths.len(), size = bytes.len(), "built archive");
        *cached = Some(CachedArchive {
            generation,
            bytes: bytes.clone(),
        });
        Ok(bytes)
    }

    /// Drops the cached bytes and deletes the on-disk artifact. A missing
    /// artifact is not an error.
    pub async fn remove(&self) -> anyhow::Result<()> {
        self.cached.lock().await.take();
        match tokio::fs::remove_file(self.path.as_ref()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(anyhow::Error::new(e).context(format!("removing {}", self.path.display())))
            }
        }
    }
}

/// Assembles a ZIP with one entry per unique base name among `paths`.
///
/// Entries are named by base file name only, so two shared paths with the
/// same final component collide; the later registration wins.
async fn build_zip(paths: &[PathBuf]) -> anyhow::Result<Bytes> {
    let mut entries: Vec<(String, &PathBuf)> = Vec::new();
    for path in paths {
        let name = base_name(path);
        match entries.iter().position(|(existing, _)| *existing == name) {
            Some(i) => entries[i].1 = path,
            None => entries.push((name, path)),
        }
    }

    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for (name, path) in &entries {
            let contents = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&contents)?;
        }

        zip.finish()?;
    }

    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;

    fn read_entry(bytes: &Bytes, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut contents = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        contents
    }

    fn entry_count(bytes: &Bytes) -> usize {
        zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap().len()
    }

    #[tokio::test]
    async fn builds_one_entry_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "alpha").unwrap();
        fs::write(&b, "beta").unwrap();

        let bytes = build_zip(&[a, b]).await.unwrap();
        assert_eq!(entry_count(&bytes), 2);
        assert_eq!(read_entry(&bytes, "a.txt"), "alpha");
        assert_eq!(read_entry(&bytes, "b.txt"), "beta");
    }

    #[tokio::test]
    async fn duplicate_base_names_keep_the_last_registration() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("one").join("report.txt");
        let second = dir.path().join("two").join("report.txt");
        fs::create_dir_all(first.parent().unwrap()).unwrap();
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&first, "from one").unwrap();
        fs::write(&second, "from two").unwrap();

        let bytes = build_zip(&[first, second]).await.unwrap();
        assert_eq!(entry_count(&bytes), 1);
        assert_eq!(read_entry(&bytes, "report.txt"), "from two");
    }

    #[tokio::test]
    async fn missing_source_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.txt");

        assert!(build_zip(&[gone]).await.is_err());
    }

    #[tokio::test]
    async fn cache_is_reused_for_an_unchanged_generation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "v1").unwrap();

        let store = ArchiveStore::new(dir.path().join(ARCHIVE_NAME));
        let paths = vec![file.clone()];

        let first = store.get_or_build(1, &paths).await.unwrap();

        // Same generation: the changed bytes on disk must not show through.
        fs::write(&file, "v2").unwrap();
        let second = store.get_or_build(1, &paths).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(read_entry(&second, "a.txt"), "v1");

        // New generation: rebuilt from disk.
        let third = store.get_or_build(2, &paths).await.unwrap();
        assert_eq!(read_entry(&third, "a.txt"), "v2");
    }

    #[tokio::test]
    async fn build_writes_the_artifact_and_remove_deletes_it() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "alpha").unwrap();

        let store = ArchiveStore::new(dir.path().join(ARCHIVE_NAME));
        store.get_or_build(1, &[file]).await.unwrap();
        assert!(store.artifact_path().exists());

        store.remove().await.unwrap();
        assert!(!store.artifact_path().exists());

        // Removing again is fine.
        store.remove().await.unwrap();
    }
}
