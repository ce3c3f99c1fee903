use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Write a `/bin/sh` script into `dir` with mode `0o755`.
pub fn write_executable(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    write_file_with_mode(dir, name, &format!("#!/bin/sh\n{body}\n"), 0o755)
}

/// Write `contents` into `dir/name` and set its permission bits.
pub fn write_file_with_mode(dir: &Path, name: &str, contents: &str, mode: u32) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating file {:?}", path))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("writing to file {:?}", path))?;
    file.sync_all()?;
    drop(file);

    fs::set_permissions(&path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("setting mode {:o} on {:?}", mode, path))?;
    Ok(path)
}

/// Create `dir/name` as a directory with the given permission bits.
pub fn make_dir_with_mode(dir: &Path, name: &str, mode: u32) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::create_dir(&path).with_context(|| format!("creating dir {:?}", path))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("setting mode {:o} on {:?}", mode, path))?;
    Ok(path)
}
