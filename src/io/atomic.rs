use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `content` to `path` atomically using a temp file + rename.
///
/// The temp file lives in the target's directory so the rename never
/// crosses filesystems. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = staged(path, content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like [`atomic_write`], but fails with `AlreadyExists` instead of
/// replacing a file that is already at `path`.
pub fn atomic_create(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = staged(path, content)?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}

fn staged(path: &Path, content: &[u8]) -> io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    Ok(tmp)
}
