//! Durable writes: data reaches disk before the call returns

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Write `data` to `path` via a sibling temp file, fsync, then rename.
pub fn write_durable(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension("partial");
    {
        let mut file = File::create(&tmp)
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        file.write_all(data)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("failed to sync {}", tmp.display()))?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to rename {} → {}", tmp.display(), path.display()))?;
    if let Some(parent) = path.parent() {
        sync_dir(parent);
    }
    Ok(())
}

/// Copy `src` to `dst` and fsync the copy.
pub fn copy_durable(src: &Path, dst: &Path) -> Result<u64> {
    let bytes = fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} → {}", src.display(), dst.display()))?;
    File::open(dst)
        .and_then(|f| f.sync_all())
        .with_context(|| format!("failed to sync {}", dst.display()))?;
    Ok(bytes)
}

/// Best effort: directories cannot be opened for sync on every platform.
pub fn sync_dir(dir: &Path) {
    if let Ok(d) = File::open(dir) {
        let _ = d.sync_all();
    }
}
