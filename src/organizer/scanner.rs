//! Input resolution: a single file or the files of one directory

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{OrganizerError, OrganizerResult};

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// List the files under `path` with the given extension (no leading dot).
///
/// A matching file yields a one-element list. A directory yields its matching
/// files in lexicographic order; subdirectories are not descended into.
pub fn list_files(path: &Path, extension: &str) -> OrganizerResult<Vec<PathBuf>> {
    if path.is_file() {
        if has_extension(path, extension) {
            return Ok(vec![path.to_path_buf()]);
        }
        return Err(OrganizerError::UnsupportedPath(
            path.to_path_buf(),
            extension.to_string(),
        ));
    }

    if !path.is_dir() {
        return Err(OrganizerError::UnsupportedPath(
            path.to_path_buf(),
            extension.to_string(),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("[Scanner] Skipping unreadable entry: {}", e);
                continue;
            }
        };
        // Symlinks to files count as files
        if entry.path().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    tracing::info!(
        "[Scanner] Found {} .{} files in {}",
        files.len(),
        extension,
        path.display()
    );
    Ok(files)
}
