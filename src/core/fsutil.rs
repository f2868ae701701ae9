// ─── Filesystem helpers ───
// Copy, move and remove that treat files and directory trees alike.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::core::error::{CoreError, CoreResult};

pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

pub async fn ensure_dir(path: &Path) -> CoreResult<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| CoreError::io(path, e))
}

/// Copy the file or directory tree at `source` to `destination`,
/// overwriting existing files. Returns `false` when `source` is missing.
pub async fn copy_path(source: &Path, destination: &Path) -> CoreResult<bool> {
    let meta = match fs::metadata(source).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(CoreError::io(source, e)),
    };

    if meta.is_file() {
        copy_file(source, destination).await?;
        return Ok(true);
    }

    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), destination.to_path_buf())];
    while let Some((src_dir, dst_dir)) = pending.pop() {
        fs::create_dir_all(&dst_dir)
            .await
            .map_err(|e| CoreError::io(&dst_dir, e))?;

        let mut entries = fs::read_dir(&src_dir)
            .await
            .map_err(|e| CoreError::io(&src_dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoreError::io(&src_dir, e))?
        {
            let src_path = entry.path();
            let dst_path = dst_dir.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| CoreError::io(&src_path, e))?;

            if file_type.is_dir() {
                pending.push((src_path, dst_path));
            } else if file_type.is_file() {
                copy_file(&src_path, &dst_path).await?;
            }
        }
    }

    Ok(true)
}

async fn copy_file(source: &Path, destination: &Path) -> CoreResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::io(parent, e))?;
    }
    if exists(destination).await {
        fs::remove_file(destination)
            .await
            .map_err(|e| CoreError::io(destination, e))?;
    }
    fs::copy(source, destination)
        .await
        .map_err(|e| CoreError::io(source, e))?;
    Ok(())
}

/// Remove a file or directory tree. Missing paths are fine.
pub async fn remove_path(path: &Path) -> CoreResult<()> {
    let meta = match fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(CoreError::io(path, e)),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };
    result.map_err(|e| CoreError::io(path, e))
}

/// Rename `source` to `destination`, replacing it.
pub async fn move_path(source: &Path, destination: &Path) -> CoreResult<()> {
    remove_path(destination).await?;
    if fs::rename(source, destination).await.is_ok() {
        return Ok(());
    }
    // Cross-device moves fall back to copy + remove
    if !copy_path(source, destination).await? {
        return Err(CoreError::io(
            source,
            std::io::Error::new(std::io::ErrorKind::NotFound, "nothing to move"),
        ));
    }
    remove_path(source).await
}
