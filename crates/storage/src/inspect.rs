use crate::error::{ErrorKind, Result};
use std::path::Path;
use time::UtcDateTime;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024;

/// What the catalog needs to know about a file before importing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: UtcDateTime,
    /// Hex-encoded BLAKE3 hash of the contents.
    pub hash: String,
}

/// Read size, modification time and content hash of the file at `path`.
///
/// The contents are streamed through the hasher, never held in memory whole.
pub async fn inspect(path: impl AsRef<Path>) -> Result<FileStat> {
    let path = path.as_ref();
    let mut file = File::open(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
    let metadata = file.metadata().await.map_err(|e| ErrorKind::from_io(e, path))?;
    if !metadata.is_file() {
        exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
    }
    let modified = metadata.modified().map_err(ErrorKind::Io)?;

    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf).await.map_err(|e| ErrorKind::from_io(e, path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    tracing::trace!(path = %path.display(), size = metadata.len(), "Inspected file");
    Ok(FileStat { size: metadata.len(), modified: UtcDateTime::from(modified), hash: hasher.finalize().to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inspect_hashes_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dune.epub");
        // Larger than one chunk, so the streaming path is exercised.
        let contents = "spice must flow ".repeat(10_000);
        std::fs::write(&path, &contents).unwrap();

        let stat = inspect(&path).await.unwrap();
        assert_eq!(stat.size, contents.len() as u64);
        assert_eq!(stat.hash, blake3::hash(contents.as_bytes()).to_string());
        assert_eq!(stat.hash.len(), 64);
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(stat.modified, UtcDateTime::from(modified));
    }

    #[tokio::test]
    async fn test_inspect_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();
        let stat = inspect(&path).await.unwrap();
        assert_eq!(stat.size, 0);
        assert_eq!(stat.hash, blake3::hash(b"").to_string());
    }

    #[tokio::test]
    async fn test_inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.epub");
        let err = inspect(&path).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(p) if p == &path));
    }
}
