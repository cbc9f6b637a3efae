//! Command implementations. Each returns what it produced so `main` can
//! print it and tests can inspect it.

pub mod analyze;
pub mod compare;
pub mod generate;
pub mod mutate;
pub mod validate;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use std::path::{Path, PathBuf};

/// `*.json` files directly under `dir`, sorted by name
pub(crate) fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(dir).wrap_err_with(|| format!("cannot list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Final path component as text
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File name without its extension
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
