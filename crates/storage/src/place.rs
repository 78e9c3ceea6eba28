//! Moving and copying files into place.

use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// Whether imported files are copied into the library or moved there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Copy,
    Move,
}

/// How a file ended up at its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Moved with a single rename.
    Renamed,
    /// Copied; the source was left alone as requested.
    Copied,
    /// Moved across filesystems: copied, then the source was deleted.
    CopiedAndRemoved,
    /// Moved across filesystems, but the source could not be deleted
    /// afterwards. The destination is complete.
    CopiedSourceRetained,
}

/// Move or copy `src` to `dst`, creating any missing parent directories of
/// `dst`.
///
/// A move is attempted as a rename first and falls back to copy-then-delete
/// (e.g. across devices). Once the copy has succeeded, failing to delete the
/// source is logged and reported as [`Placement::CopiedSourceRetained`], not
/// as an error. Copies carry the source's modification time over.
///
/// An existing file at `dst` is replaced, unless it is `src` itself: that is
/// rejected as [`ErrorKind::InvalidPath`] and both are left untouched.
#[instrument(skip_all, fields(src = %src.as_ref().display(), dst = %dst.as_ref().display(), ?mode))]
pub async fn move_or_copy(src: impl AsRef<Path>, dst: impl AsRef<Path>, mode: Mode) -> Result<Placement> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    if same_file(src, dst).await? {
        exn::bail!(ErrorKind::InvalidPath(dst.to_path_buf()));
    }
    if let Some(parent) = dst.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.map_err(|e| ErrorKind::from_io(e, parent))?;
    }

    if mode == Mode::Copy {
        copy(src, dst).await?;
        tracing::info!("Copied file");
        return Ok(Placement::Copied);
    }

    match fs::rename(src, dst).await {
        Ok(()) => {
            tracing::info!("Moved file");
            return Ok(Placement::Renamed);
        },
        Err(e) => tracing::debug!(error = %e, "Rename failed; falling back to copy and delete"),
    }
    copy(src, dst).await?;
    match fs::remove_file(src).await {
        Ok(()) => {
            tracing::info!("Moved file (copy/delete)");
            Ok(Placement::CopiedAndRemoved)
        },
        Err(e) => {
            tracing::warn!(error = %e, "Copied file but could not remove the original");
            Ok(Placement::CopiedSourceRetained)
        },
    }
}

/// Whether `dst` already exists and resolves to the same file as `src`.
async fn same_file(src: &Path, dst: &Path) -> Result<bool> {
    if !fs::try_exists(dst).await.map_err(|e| ErrorKind::from_io(e, dst))? {
        return Ok(false);
    }
    let src = fs::canonicalize(src).await.map_err(|e| ErrorKind::from_io(e, src))?;
    let dst = fs::canonicalize(dst).await.map_err(|e| ErrorKind::from_io(e, dst))?;
    Ok(src == dst)
}

/// Copy `src` to `dst` and set the modification time of `dst` to that of `src`.
async fn copy(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::metadata(src).await.map_err(|e| ErrorKind::from_io(e, src))?;
    fs::copy(src, dst).await.map_err(|e| ErrorKind::from_io(e, dst))?;
    // The bytes are already in place; losing the mtime doesn't fail the copy.
    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(e) => {
            tracing::warn!(error = %e, "Modification time unavailable; not preserved");
            return Ok(());
        },
    };
    let file = fs::OpenOptions::new().write(true).open(dst).await.map_err(|e| ErrorKind::from_io(e, dst))?;
    if let Err(e) = file.into_std().await.set_modified(modified) {
        tracing::warn!(error = %e, path = %dst.display(), "Could not preserve modification time");
    }
    Ok(())
}

/// Find a path that doesn't exist yet, starting from `path` itself.
///
/// Appends ` (1)`, ` (2)`, ... before the extension until a free name is
/// found: `book.epub` becomes `book (1).epub`. Nothing is reserved, so a
/// concurrent writer could still take the returned name first.
pub async fn unique_name(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let exists = |candidate: PathBuf| async move {
        let found = fs::try_exists(&candidate).await.map_err(|e| ErrorKind::from_io(e, &candidate))?;
        Result::Ok((found, candidate))
    };
    let (found, candidate) = exists(path.to_path_buf()).await?;
    if !found {
        return Ok(candidate);
    }
    let Some(stem) = path.file_stem() else {
        exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
    };
    for i in 1u64.. {
        let mut name = OsString::from(stem);
        name.push(format!(" ({i})"));
        if let Some(extension) = path.extension() {
            name.push(".");
            name.push(extension);
        }
        let (found, candidate) = exists(path.with_file_name(name)).await?;
        if !found {
            return Ok(candidate);
        }
    }
    unreachable!("ran out of u64 suffixes")
}
