//! Reset: flattening category directories back into the root.
//!
//! No record of individual moves is kept, so a reset walks every known
//! category folder under the root and moves its files up one level. Files that
//! collide with a name already in the root get a numeric suffix.

use crate::file_category::Category;
use crate::file_organizer::{FileFailure, OrganizeError, OrganizeResult};
use crate::mover::{MoveOutcome, move_without_overwrite};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A file moved out of a category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoredFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Represents the result of a reset.
#[derive(Debug, Default, Serialize)]
pub struct ResetReport {
    /// Files moved back to the root.
    pub restored: Vec<RestoredFile>,
    /// Category directories removed after being emptied.
    pub removed_dirs: Vec<PathBuf>,
    /// Category directories left behind because something remained inside.
    pub kept_dirs: Vec<PathBuf>,
    /// Files or directories that could not be handled.
    pub failed: Vec<FileFailure>,
}

impl ResetReport {
    /// Returns true if the reset had no failures.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Moves category contents back into a previously organized root.
pub struct UndoManager;

impl UndoManager {
    /// Flattens every category directory directly under `root`.
    ///
    /// Categories are visited in table order. Only files directly inside a category directory are moved; nested directories stay where
    /// they are, which keeps their parent category directory alive too.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidBasePath`] if `root` is missing or not
    /// a directory. Problems with individual files or category directories
    /// are collected in the report instead.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filesorter::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::reset(Path::new("/path/to/directory")) {
    ///     Ok(report) => println!("Restored {} files", report.restored.len()),
    ///     Err(e) => eprintln!("Reset failed: {}", e),
    /// }
    /// ```
    pub fn reset(root: &Path) -> OrganizeResult<ResetReport> {
        crate::file_organizer::validate_base_path(root)?;

        let mut report = ResetReport::default();
        for category in Category::ALL {
            let category_path = root.join(category.dir_name());
            if !category_path.is_dir() {
                continue;
            }
            if let Err(e) = Self::flatten_category(root, &category_path, &mut report) {
                report.failed.push(FileFailure {
                    path: category_path,
                    reason: e.to_string(),
                });
            }
        }

        Ok(report)
    }

    /// Moves the files of one category directory into `root`, then removes
    /// the directory if it ended up empty.
    fn flatten_category(
        root: &Path,
        category_path: &Path,
        report: &mut ResetReport,
    ) -> OrganizeResult<()> {
        let files = Self::list_files(category_path)?;

        for file in files {
            let Some(name) = file.file_name() else {
                continue;
            };
            match move_without_overwrite(&file, &root.join(name)) {
                Ok(MoveOutcome::Moved(to)) => report.restored.push(RestoredFile { from: file, to }),
                Ok(MoveOutcome::Unchanged) => {}
                Err(e) => report.failed.push(FileFailure {
                    path: file,
                    reason: e.to_string(),
                }),
            }
        }

        if Self::is_empty_dir(category_path)? {
            fs::remove_dir(category_path).map_err(|e| OrganizeError::DirectoryRemovalFailed {
                path: category_path.to_path_buf(),
                source: e,
            })?;
            report.removed_dirs.push(category_path.to_path_buf());
        } else {
            report.kept_dirs.push(category_path.to_path_buf());
        }

        Ok(())
    }

    /// Files directly inside `dir`, sorted by name. Symlinks to files count
    /// as files.
    fn list_files(dir: &Path) -> OrganizeResult<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| OrganizeError::DirectoryReadFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| {
                entry
                    .file_type()
                    .is_ok_and(|t| t.is_file() || (t.is_symlink() && entry.path().is_file()))
            })
            .map(|entry| entry.path())
            .collect();
        files.sort();
        Ok(files)
    }

    fn is_empty_dir(dir: &Path) -> OrganizeResult<bool> {
        let mut entries = fs::read_dir(dir).map_err(|e| OrganizeError::DirectoryReadFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(entries.next().is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_organizer::FileOrganizer;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reset_empty_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let report = UndoManager::reset(temp_dir.path()).expect("Reset failed");

        assert!(report.restored.is_empty());
        assert!(report.removed_dirs.is_empty());
        assert!(report.is_complete_success());
    }

    #[test]
    fn test_reset_single_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");
        FileOrganizer::move_to_category_with_record(base_path, &file_path, Category::Documents)
            .expect("Failed to move file");
        assert!(!file_path.exists());

        let report = UndoManager::reset(base_path).expect("Reset failed");

        assert_eq!(report.restored.len(), 1);
        assert_eq!(report.restored[0].to, file_path);
        assert!(file_path.exists());
        assert!(!base_path.join("Documents").exists());
        assert_eq!(report.removed_dirs, vec![base_path.join("Documents")]);
    }

    #[test]
    fn test_reset_name_conflict_gets_suffix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("Images")).unwrap();
        fs::write(base_path.join("Images").join("a.png"), "organized").unwrap();
        fs::write(base_path.join("a.png"), "newer").unwrap();

        let report = UndoManager::reset(base_path).expect("Reset failed");

        assert_eq!(report.restored.len(), 1);
        assert_eq!(fs::read_to_string(base_path.join("a.png")).unwrap(), "newer");
        assert_eq!(
            fs::read_to_string(base_path.join("a_1.png")).unwrap(),
            "organized"
        );
    }

    #[test]
    fn test_reset_keeps_directory_with_subfolder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let nested = base_path.join("Videos").join("Trips");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("beach.mp4"), "").unwrap();
        fs::write(base_path.join("Videos").join("clip.mov"), "").unwrap();

        let report = UndoManager::reset(base_path).expect("Reset failed");

        assert!(base_path.join("clip.mov").exists());
        assert!(nested.join("beach.mp4").exists());
        assert_eq!(report.kept_dirs, vec![base_path.join("Videos")]);
    }

    #[test]
    fn test_reset_ignores_unknown_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("Screenshots")).unwrap();
        fs::write(base_path.join("Screenshots").join("a.png"), "").unwrap();

        let report = UndoManager::reset(base_path).expect("Reset failed");

        assert!(report.restored.is_empty());
        assert!(base_path.join("Screenshots").join("a.png").exists());
    }

    #[test]
    fn test_reset_invalid_base_path() {
        let result = UndoManager::reset(Path::new("/non/existent/path"));
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_records_unremovable_directory_and_continues() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path().join("root");
        let outside = temp_dir.path().join("outside");
        fs::create_dir_all(&base_path).unwrap();
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("a.png"), "").unwrap();
        // A linked category folder can be emptied but not removed with rmdir.
        symlink(&outside, base_path.join("Images")).unwrap();
        fs::create_dir(base_path.join("Documents")).unwrap();
        fs::write(base_path.join("Documents").join("b.txt"), "").unwrap();

        let report = UndoManager::reset(&base_path).expect("Reset failed");

        assert!(!report.is_complete_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, base_path.join("Images"));
        assert!(report.failed[0].reason.starts_with("Failed to remove directory"));
        assert!(base_path.join("a.png").exists());
        assert!(base_path.join("b.txt").exists());
        assert_eq!(report.removed_dirs, vec![base_path.join("Documents")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_moves_symlinked_files() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path().join("root");
        fs::create_dir_all(base_path.join("Audios")).unwrap();
        fs::write(temp_dir.path().join("song.mp3"), "").unwrap();
        symlink(
            temp_dir.path().join("song.mp3"),
            base_path.join("Audios").join("song.mp3"),
        )
        .unwrap();

        let report = UndoManager::reset(&base_path).expect("Reset failed");

        assert_eq!(report.restored.len(), 1);
        assert!(fs::symlink_metadata(base_path.join("song.mp3"))
            .unwrap()
            .file_type()
            .is_symlink());
        assert!(!base_path.join("Audios").exists());
    }
}
