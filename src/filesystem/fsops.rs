use anyhow::{Context, Result};
use filetime::FileTime;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically replace `path` by writing a temporary sibling and renaming it in.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path: PathBuf = path.with_extension("tmp");
    {
        let mut tmp = File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        tmp.write_all(bytes)?;
        let _ = tmp.sync_data();
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Copy `src` to `dst`, carrying the source modification time across where
/// the platform allows. Returns the number of bytes copied.
pub fn copy_with_mtime(src: &Path, dst: &Path) -> Result<u64> {
    let written = fs::copy(src, dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    if let Ok(meta) = fs::metadata(src) {
        let mtime = FileTime::from_last_modification_time(&meta);
        let _ = filetime::set_file_mtime(dst, mtime);
    }
    Ok(written)
}
