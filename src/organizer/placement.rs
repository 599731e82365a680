//! File placement under the output root
//!
//! Nothing already on disk is overwritten: a taken name gets a `_1`, `_2`, ...
//! suffix on its stem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{OrganizerError, OrganizerResult};

/// Directory under the output root for files that could not be classified
pub const UNCLASSIFIED_DIR: &str = "unclassified";

/// Byte limit on a file name for ext4, APFS and NTFS
const MAX_FILE_NAME_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Copy,
    Move,
}

impl PlacementMode {
    pub fn from_move_flag(move_instead_of_copy: bool) -> Self {
        if move_instead_of_copy {
            Self::Move
        } else {
            Self::Copy
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Copy => "Copied",
            Self::Move => "Moved",
        }
    }
}

/// Create the output root if needed and check the run precondition
pub fn prepare_output_root(root: &Path, require_empty: bool) -> OrganizerResult<()> {
    if root.exists() {
        if !root.is_dir() {
            return Err(OrganizerError::OutputNotDirectory(root.to_path_buf()));
        }
        if require_empty && fs::read_dir(root)?.next().is_some() {
            return Err(OrganizerError::OutputNotEmpty(root.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(root)?;
    tracing::info!("[Placement] Created output folder {}", root.display());
    Ok(())
}

/// First free path for `file_name` in `dir`
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let suffix = format!("_{}{}", counter, ext);
        let stem = truncate_at_boundary(&stem, MAX_FILE_NAME_LEN.saturating_sub(suffix.len()));
        let candidate = dir.join(format!("{}{}", stem, suffix));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn truncate_at_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Copy or move `source` into `dest_dir` as `file_name`, creating the
/// directory first. Returns where the file ended up.
///
/// On failure the source is left where it was.
pub fn place_file(
    source: &Path,
    dest_dir: &Path,
    file_name: &str,
    mode: PlacementMode,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dest_dir)?;
    let destination = unique_destination(dest_dir, file_name);

    match mode {
        PlacementMode::Copy => {
            copy_or_discard(&destination, || fs::copy(source, &destination))?;
        }
        PlacementMode::Move => {
            // Try rename first (same filesystem), fall back to copy+delete
            if fs::rename(source, &destination).is_err() {
                copy_or_discard(&destination, || fs::copy(source, &destination))?;
                if let Err(e) = fs::remove_file(source) {
                    // Keep a single copy: undo ours rather than leave a duplicate
                    let _ = fs::remove_file(&destination);
                    return Err(e);
                }
            }
        }
    }

    tracing::debug!(
        "[Placement] {} {} -> {}",
        mode.verb(),
        source.display(),
        destination.display()
    );
    Ok(destination)
}

/// Run `copy`; if it fails, remove whatever it left at `destination`
fn copy_or_discard<F>(destination: &Path, copy: F) -> io::Result<()>
where
    F: FnOnce() -> io::Result<u64>,
{
    if let Err(e) = copy() {
        if destination.exists() {
            let _ = fs::remove_file(destination);
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out").join("nested");
        prepare_output_root(&root, true).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_prepare_rejects_file_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");
        fs::write(&root, b"x").unwrap();
        assert!(matches!(
            prepare_output_root(&root, false),
            Err(OrganizerError::OutputNotDirectory(_))
        ));
    }

    #[test]
    fn test_prepare_non_empty_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("existing.pdf"), b"x").unwrap();

        assert!(prepare_output_root(dir.path(), false).is_ok());
        assert!(matches!(
            prepare_output_root(dir.path(), true),
            Err(OrganizerError::OutputNotEmpty(_))
        ));
    }

    #[test]
    fn test_unique_destination_suffixes() {
        let dir = TempDir::new().unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a.pdf"));

        fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        fs::write(dir.path().join("a_1.pdf"), b"x").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a_2.pdf"));
    }

    #[test]
    fn test_collision_suffix_keeps_name_within_limit() {
        let dir = TempDir::new().unwrap();
        let name = format!("a{}.pdf", "é".repeat(125));
        assert_eq!(name.len(), MAX_FILE_NAME_LEN);
        fs::write(dir.path().join(&name), b"x").unwrap();

        let next = unique_destination(dir.path(), &name);
        let next_name = next.file_name().unwrap().to_string_lossy().into_owned();
        assert!(next_name.len() <= MAX_FILE_NAME_LEN);
        assert!(next_name.ends_with("_1.pdf"));
    }

    #[test]
    fn test_copy_keeps_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.pdf");
        fs::write(&source, b"content").unwrap();

        let dest_dir = dir.path().join("out").join("book");
        let placed = place_file(&source, &dest_dir, "dune.pdf", PlacementMode::Copy).unwrap();

        assert_eq!(placed, dest_dir.join("dune.pdf"));
        assert!(source.exists());
        assert_eq!(fs::read(&placed).unwrap(), b"content");
    }

    #[test]
    fn test_move_removes_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.pdf");
        fs::write(&source, b"content").unwrap();

        let placed = place_file(&source, &dir.path().join("out"), "in.pdf", PlacementMode::Move).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&placed).unwrap(), b"content");
    }

    #[test]
    fn test_place_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("dune.pdf"), b"first").unwrap();

        let source = dir.path().join("second.pdf");
        fs::write(&source, b"second").unwrap();
        let placed = place_file(&source, &out, "dune.pdf", PlacementMode::Copy).unwrap();

        assert_eq!(placed, out.join("dune_1.pdf"));
        assert_eq!(fs::read(out.join("dune.pdf")).unwrap(), b"first");
    }

    #[test]
    fn test_failed_copy_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("dune.pdf");

        let result = copy_or_discard(&destination, || {
            fs::write(&destination, b"%PDF-1.4 trunc")?;
            Err(io::Error::other("No space left on device"))
        });

        assert!(result.is_err());
        assert!(!destination.exists());
        assert_eq!(unique_destination(dir.path(), "dune.pdf"), destination);
    }

    #[test]
    fn test_successful_copy_is_kept() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("dune.pdf");

        copy_or_discard(&destination, || {
            fs::write(&destination, b"%PDF")?;
            Ok(4)
        })
        .unwrap();
        assert!(destination.exists());
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let result = place_file(
            &dir.path().join("gone.pdf"),
            &dir.path().join("out"),
            "gone.pdf",
            PlacementMode::Move,
        );
        assert!(result.is_err());
        assert!(!dir.path().join("out").join("gone.pdf").exists());
    }
}
