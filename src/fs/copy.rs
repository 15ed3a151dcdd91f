//! Metadata-preserving copies.

use crate::error::{Result, SyncError};
use std::fs::{self, File};
use std::path::Path;
use walkdir::WalkDir;

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SyncError::fs("create directory", dir, e))
}

/// Copy a file's bytes, permissions and modification time.
///
/// A symlink already at `dst` is replaced, never written through. A `dst`
/// that resolves to `src` itself (e.g. through a linked parent directory)
/// is refused.
pub fn copy_preserving(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    if fs::symlink_metadata(dst).is_ok_and(|m| m.file_type().is_symlink()) {
        super::remove_existing(dst)?;
    }
    ensure_distinct(src, dst)?;

    fs::copy(src, dst).map_err(|e| {
        SyncError::FsError(format!(
            "failed to copy '{}' to '{}': {}",
            src.display(),
            dst.display(),
            e
        ))
    })?;

    // Read-only copies cannot be reopened for writing; the content is what matters.
    if let Err(e) = copy_mtime(src, dst) {
        tracing::debug!("keeping fresh mtime for '{}': {}", dst.display(), e);
    }
    Ok(())
}

/// Fail if `dst` already exists and is the same file as `src`.
pub fn ensure_distinct(src: &Path, dst: &Path) -> Result<()> {
    if let (Ok(a), Ok(b)) = (fs::canonicalize(src), fs::canonicalize(dst))
        && a == b
    {
        return Err(SyncError::FsError(format!(
            "refusing to copy '{}' onto itself via '{}'",
            src.display(),
            dst.display()
        )));
    }
    Ok(())
}

/// Carry the modification time of `src` over to `dst`.
pub(crate) fn copy_mtime(src: &Path, dst: &Path) -> Result<()> {
    let modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .map_err(|e| SyncError::fs("read metadata of", src, e))?;

    File::options()
        .write(true)
        .open(dst)
        .and_then(|f| f.set_modified(modified))
        .map_err(|e| SyncError::fs("set modification time of", dst, e))
}

/// Recursively copy `src` into `dst`, merging with existing content.
///
/// Symlinks are recreated as symlinks rather than followed. Neither `dst`
/// nor `skip` is walked when it lies inside `src`. Returns the number of
/// files copied.
pub fn copy_dir_all(src: &Path, dst: &Path, skip: Option<&Path>) -> Result<usize> {
    let mut copied = 0;

    let walker = WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.path() != dst && skip.is_none_or(|s| e.path() != s));

    for entry in walker {
        let entry = entry.map_err(|e| {
            SyncError::FsError(format!("failed to walk '{}': {}", src.display(), e))
        })?;

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| SyncError::FsError(format!("unexpected walk path: {}", e)))?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            ensure_dir(&target)?;
        } else if file_type.is_symlink() {
            let link_target = fs::read_link(entry.path())
                .map_err(|e| SyncError::fs("read link", entry.path(), e))?;
            super::remove_existing(&target)?;
            super::create_symlink(&link_target, &target)?;
        } else {
            copy_preserving(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn copy_preserving_keeps_content_and_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, b"hello").unwrap();
        let past = SystemTime::now() - Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let dst = temp.path().join("out/deep/a.txt");
        copy_preserving(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"hello");
        let src_mtime = fs::metadata(&src).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }

    #[test]
    fn copy_dir_all_merges_trees() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("one.txt"), "1").unwrap();
        fs::write(src.join("sub/two.txt"), "2").unwrap();

        let dst = temp.path().join("dst");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("keep.txt"), "k").unwrap();

        let copied = copy_dir_all(&src, &dst, None).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("sub/two.txt")).unwrap(), "2");
        assert!(dst.join("keep.txt").exists());
    }

    #[test]
    fn copy_dir_all_skips_excluded_subtree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("old/inner")).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        fs::write(src.join("old/inner/b.txt"), "b").unwrap();

        let dst = temp.path().join("dst");
        let copied = copy_dir_all(&src, &dst, Some(&src.join("old"))).unwrap();

        assert_eq!(copied, 1);
        assert!(dst.join("a.txt").exists());
        assert!(!dst.join("old").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_preserving_refuses_same_file_through_linked_dir() {
        let temp = TempDir::new().unwrap();
        let src_dir = temp.path().join("src");
        fs::create_dir_all(&src_dir).unwrap();
        fs::write(src_dir.join("x.txt"), "precious\n").unwrap();
        let alias = temp.path().join("alias");
        std::os::unix::fs::symlink(&src_dir, &alias).unwrap();

        let err = copy_preserving(&src_dir.join("x.txt"), &alias.join("x.txt")).unwrap_err();

        assert!(matches!(err, SyncError::FsError(_)));
        assert_eq!(
            fs::read_to_string(src_dir.join("x.txt")).unwrap(),
            "precious\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_all_preserves_symlinks() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", src.join("link")).unwrap();

        let dst = temp.path().join("dst");
        copy_dir_all(&src, &dst, None).unwrap();

        assert_eq!(
            fs::read_link(dst.join("link")).unwrap(),
            Path::new("/nonexistent/target")
        );
    }
}
