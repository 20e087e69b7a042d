//! Collision-safe file relocation.
//!
//! A move never overwrites: when the destination name is taken, a numeric
//! suffix is inserted before the extension (`photo.png` becomes `photo_1.png`,
//! then `photo_2.png`, ...) until a free name is found.

use crate::file_organizer::{OrganizeError, OrganizeResult};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a call to [`move_without_overwrite`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file now lives at the contained path, which may carry a suffix.
    Moved(PathBuf),
    /// Source and destination were the same path; nothing happened.
    Unchanged,
}

/// Returns the first path derived from `destination` that does not exist yet.
///
/// `destination` itself is returned when it is free.
///
/// # Examples
///
/// ```no_run
/// use filesorter::mover::unique_destination;
/// use std::path::Path;
///
/// // With Images/a.png already present this yields Images/a_1.png.
/// let free = unique_destination(Path::new("/tmp/root/Images/a.png"));
/// println!("{}", free.display());
/// ```
pub fn unique_destination(destination: &Path) -> PathBuf {
    if !is_taken(destination) {
        return destination.to_path_buf();
    }

    let parent = destination.parent().unwrap_or(Path::new(""));
    let stem = destination.file_stem().unwrap_or_default();
    let extension = destination.extension();

    // Each attempt strictly increases the suffix, so this terminates once the
    // directory runs out of colliding names.
    let mut suffix: u64 = 1;
    loop {
        let mut candidate_name = OsString::from(stem);
        candidate_name.push(format!("_{}", suffix));
        if let Some(ext) = extension {
            candidate_name.push(".");
            candidate_name.push(ext);
        }
        let candidate = parent.join(candidate_name);
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// A name is taken by anything at all, including a symlink whose target is gone.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Moves `source` to `destination`, renaming on collision instead of overwriting.
///
/// Returns [`MoveOutcome::Unchanged`] without touching the filesystem when the
/// two paths are identical.
///
/// # Errors
///
/// Returns [`OrganizeError::FileMoveFailure`] if the source vanished, the
/// destination directory is not writable, or the copy fallback for a
/// cross-device move fails.
pub fn move_without_overwrite(source: &Path, destination: &Path) -> OrganizeResult<MoveOutcome> {
    if source == destination {
        return Ok(MoveOutcome::Unchanged);
    }

    let final_path = unique_destination(destination);

    relocate(source, &final_path).map_err(|e| OrganizeError::FileMoveFailure {
        source: source.to_path_buf(),
        destination: final_path.clone(),
        source_error: e,
    })?;

    Ok(MoveOutcome::Moved(final_path))
}

/// Renames a file, falling back to copy and delete across filesystems.
fn relocate(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination)?;
            if let Err(remove_error) = fs::remove_file(source) {
                // Leave exactly one copy behind.
                let _ = fs::remove_file(destination);
                return Err(remove_error);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_to_free_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.png");
        let destination = temp_dir.path().join("b.png");
        fs::write(&source, "image").expect("Failed to write source");

        let outcome = move_without_overwrite(&source, &destination).expect("Move failed");

        assert_eq!(outcome, MoveOutcome::Moved(destination.clone()));
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "image");
    }

    #[test]
    fn test_collision_gets_suffix_before_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("incoming").join("a.png");
        fs::create_dir(temp_dir.path().join("incoming")).unwrap();
        fs::write(&source, "new").unwrap();
        let destination = temp_dir.path().join("a.png");
        fs::write(&destination, "old").unwrap();

        let outcome = move_without_overwrite(&source, &destination).expect("Move failed");

        let expected = temp_dir.path().join("a_1.png");
        assert_eq!(outcome, MoveOutcome::Moved(expected.clone()));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "old");
        assert_eq!(fs::read_to_string(&expected).unwrap(), "new");
    }

    #[test]
    fn test_collision_picks_smallest_free_suffix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        for name in ["report.pdf", "report_1.pdf", "report_2.pdf", "report_4.pdf"] {
            fs::write(dir.join(name), name).unwrap();
        }

        assert_eq!(unique_destination(&dir.join("report.pdf")), dir.join("report_3.pdf"));
        assert_eq!(unique_destination(&dir.join("other.pdf")), dir.join("other.pdf"));
    }

    #[test]
    fn test_collision_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::write(dir.join("notes"), "").unwrap();

        assert_eq!(unique_destination(&dir.join("notes")), dir.join("notes_1"));
    }

    #[test]
    fn test_same_path_is_unchanged() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("clip.mp4");
        fs::write(&path, "video").unwrap();

        let outcome = move_without_overwrite(&path, &path).expect("Move failed");

        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert!(path.exists());
        assert!(!temp_dir.path().join("clip_1.mp4").exists());
    }

    #[test]
    fn test_missing_source_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("gone.txt");
        let destination = temp_dir.path().join("dest.txt");

        let result = move_without_overwrite(&source, &destination);

        assert!(matches!(result, Err(OrganizeError::FileMoveFailure { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_not_overwritten() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        symlink(dir.join("nowhere.png"), dir.join("a.png")).unwrap();

        assert_eq!(unique_destination(&dir.join("a.png")), dir.join("a_1.png"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_collision_keeps_non_utf8_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        let taken = dir.join(OsStr::from_bytes(b"f\xff.png"));
        fs::write(&taken, "").unwrap();

        assert_eq!(
            unique_destination(&taken),
            dir.join(OsStr::from_bytes(b"f\xff_1.png"))
        );
    }
}
