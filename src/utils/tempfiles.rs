use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result};

/// Sibling temp path used while rewriting `path` (`<name>.tmp`).
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.tmp"))
}

/// Replace `path` with `contents`: write and fsync a sibling temp file, then rename over the target.
/// A crash leaves either the old file or the new one, never a torn write.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);
    {
        let mut file = fs::File::create(&temp_path).at_path(&temp_path)?;
        file.write_all(contents).at_path(&temp_path)?;
        file.sync_all().at_path(&temp_path)?;
    }
    rename_temp_to_final(&temp_path, path)
}

pub fn rename_temp_to_final(temp_path: &Path, final_path: &Path) -> Result<()> {
    if let Err(e) = fs::rename(temp_path, final_path) {
        let _ = fs::remove_file(temp_path);
        return Err(e).at_path(final_path);
    }
    Ok(())
}
