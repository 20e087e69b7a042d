//! Sorting files into category directories.
//!
//! Organizing happens in two phases. [`FileOrganizer::plan`] walks the root
//! once and snapshots every file it finds, deciding where each recognized file
//! should go. [`FileOrganizer::execute`] then works through that snapshot, so
//! category folders created during the run are never rescanned.

use crate::config::CompiledFilters;
use crate::file_category::{Category, FileMapper};
use crate::mover::{MoveOutcome, move_without_overwrite};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single file that was moved into a category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// The path of the file before it was moved.
    pub original_path: PathBuf,
    /// The path the file ended up at, including any collision suffix.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: Category,
}

/// A file that could not be processed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Errors that can occur while organizing or resetting a directory.
#[derive(Debug)]
pub enum OrganizeError {
    /// The root contains no file with a recognized extension.
    NoMatchingFiles { path: PathBuf },
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A directory could not be listed.
    DirectoryReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to remove an emptied category directory.
    DirectoryRemovalFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatchingFiles { path } => {
                write!(f, "No supported files found in {}", path.display())
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::DirectoryReadFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DirectoryRemovalFailed { path, source } => {
                write!(
                    f,
                    "Failed to remove directory {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoMatchingFiles { .. } => None,
            Self::InvalidBasePath { source, .. }
            | Self::DirectoryReadFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::DirectoryRemovalFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Checks that `path` exists and is a directory.
pub(crate) fn validate_base_path(path: &Path) -> OrganizeResult<()> {
    let metadata = fs::metadata(path).map_err(|e| OrganizeError::InvalidBasePath {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(OrganizeError::InvalidBasePath {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    Ok(())
}

/// A snapshot of progress through an organize run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Files successfully moved so far.
    pub moved: usize,
    /// Files attempted so far, moved or failed.
    pub processed: usize,
    /// Files the run intends to move.
    pub total: usize,
}

impl Progress {
    /// Whole percentage of the run that has been processed.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.processed * 100 / self.total
        }
    }
}

/// Receives progress updates after every file an organize run touches.
pub trait ProgressSink {
    fn on_progress(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn on_progress(&mut self, progress: Progress) {
        self(progress)
    }
}

/// A sink that ignores every update.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _progress: Progress) {}
}

/// A file discovered while scanning the root.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// The name of the file.
    pub name: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// The category, or `None` if the file is unclassified.
    pub category: Option<Category>,
}

/// One file the plan intends to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    /// `root/<Category>/<name>`, before collision handling.
    pub destination: PathBuf,
    pub category: Category,
}

/// What an organize run is going to do, computed from a single scan.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizePlan {
    pub root: PathBuf,
    /// Recognized files that are not yet in their category directory.
    pub moves: Vec<PlannedMove>,
    /// Recognized files already sitting at their destination.
    pub already_in_place: Vec<PathBuf>,
    /// Number of scanned files with no recognized extension.
    pub unclassified: usize,
}

impl OrganizePlan {
    /// Number of files with a recognized extension.
    pub fn recognized(&self) -> usize {
        self.moves.len() + self.already_in_place.len()
    }

    /// Planned moves per category, in table order.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for planned in &self.moves {
            *counts.entry(planned.category).or_insert(0) += 1;
        }
        counts
    }
}

/// The outcome of executing an [`OrganizePlan`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeReport {
    /// Files that were moved.
    pub moved: Vec<Operation>,
    /// Files skipped because they were already in place.
    pub skipped: Vec<PathBuf>,
    /// Files that could not be moved.
    pub failed: Vec<FileFailure>,
}

impl OrganizeReport {
    /// Moved files per category, in table order.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.moved {
            *counts.entry(op.category).or_insert(0) += 1;
        }
        counts
    }

    /// Returns true if no file failed to move.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A regular file, or a symlink whose target is a regular file.
fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// Organizes files by moving them into category subdirectories.
///
/// Holds the extension table and the compiled filter rules that decide which
/// files are considered at all.
pub struct FileOrganizer {
    mapper: FileMapper,
    filters: CompiledFilters,
}

impl FileOrganizer {
    pub fn new(filters: CompiledFilters) -> Self {
        Self {
            mapper: FileMapper::default(),
            filters,
        }
    }

    /// Recursively lists every file under `root` that passes the filters.
    ///
    /// Symlinks are not followed into directories, but a symlink pointing at a
    /// file is listed like a file and moving it moves the link itself. Entries
    /// that cannot be read during the walk are skipped. Only a root that cannot
    /// be listed at all is an error.
    pub fn scan(&self, root: &Path) -> OrganizeResult<Vec<FileInfo>> {
        validate_base_path(root)?;
        fs::read_dir(root).map_err(|e| OrganizeError::DirectoryReadFailed {
            path: root.to_path_buf(),
            source: e,
        })?;

        let files = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(is_file_entry)
            .filter(|entry| {
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                self.filters.should_include(relative)
            })
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let category = self.mapper.categorize(&name);
                FileInfo {
                    name,
                    path: entry.into_path(),
                    category,
                }
            })
            .collect();

        Ok(files)
    }

    /// Scans `root` and decides where each recognized file goes.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::NoMatchingFiles`] when nothing under the root
    /// has a recognized extension, plus any error from [`Self::scan`].
    pub fn plan(&self, root: &Path) -> OrganizeResult<OrganizePlan> {
        let files = self.scan(root)?;

        let mut plan = OrganizePlan {
            root: root.to_path_buf(),
            moves: Vec::new(),
            already_in_place: Vec::new(),
            unclassified: 0,
        };

        for info in files {
            let Some(category) = info.category else {
                plan.unclassified += 1;
                continue;
            };
            let Some(file_name) = info.path.file_name() else {
                plan.unclassified += 1;
                continue;
            };
            let destination = root.join(category.dir_name()).join(file_name);
            if destination == info.path {
                plan.already_in_place.push(info.path);
            } else {
                plan.moves.push(PlannedMove {
                    source: info.path,
                    destination,
                    category,
                });
            }
        }

        if plan.recognized() == 0 {
            return Err(OrganizeError::NoMatchingFiles {
                path: root.to_path_buf(),
            });
        }

        Ok(plan)
    }

    /// Carries out a plan, reporting progress after every file.
    ///
    /// A file that fails to move is recorded in the report and the run
    /// continues with the next one.
    pub fn execute(&self, plan: &OrganizePlan, progress: &mut dyn ProgressSink) -> OrganizeReport {
        let mut report = OrganizeReport {
            skipped: plan.already_in_place.clone(),
            ..Default::default()
        };
        let mut state = Progress {
            moved: 0,
            processed: 0,
            total: plan.moves.len(),
        };

        for planned in &plan.moves {
            match Self::move_to_category_with_record(&plan.root, &planned.source, planned.category)
            {
                Ok(Some(operation)) => {
                    state.moved += 1;
                    report.moved.push(operation);
                }
                Ok(None) => report.skipped.push(planned.source.clone()),
                Err(e) => report.failed.push(FileFailure {
                    path: planned.source.clone(),
                    reason: e.to_string(),
                }),
            }
            state.processed += 1;
            progress.on_progress(state);
        }

        report
    }

    /// Moves a file into its category directory within the base path and records the operation.
    ///
    /// If the category directory doesn't exist, it is created. A name collision
    /// inside the category directory is resolved with a numeric suffix.
    /// Returns `Ok(None)` when the file already sits at its destination.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filesorter::file_category::Category;
    /// use filesorter::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::move_to_category_with_record(
    ///     Path::new("/path/to/base"),
    ///     Path::new("/path/to/base/image.png"),
    ///     Category::Images,
    /// );
    ///
    /// match result {
    ///     Ok(Some(op)) => println!("Moved {} to {}", op.original_path.display(), op.new_path.display()),
    ///     Ok(None) => println!("Already in place"),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn move_to_category_with_record(
        base_path: &Path,
        file_path: &Path,
        category: Category,
    ) -> OrganizeResult<Option<Operation>> {
        validate_base_path(base_path)?;

        let category_path = base_path.join(category.dir_name());
        if !category_path.is_dir() {
            fs::create_dir_all(&category_path).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: category_path.clone(),
                    source: e,
                }
            })?;
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                source: file_path.to_path_buf(),
                destination: category_path.clone(),
                source_error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        match move_without_overwrite(file_path, &category_path.join(file_name))? {
            MoveOutcome::Moved(new_path) => Ok(Some(Operation {
                original_path: file_path.to_path_buf(),
                new_path,
                category,
            })),
            MoveOutcome::Unchanged => Ok(None),
        }
    }
}
