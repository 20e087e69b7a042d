//! In-memory state tying an organize run to a later reset.
//!
//! A [`Session`] remembers the last organized root and how many files went
//! into each category. Nothing is persisted: a new process starts with an
//! empty session.

use crate::config::CompiledFilters;
use crate::file_category::Category;
use crate::file_organizer::{
    FileOrganizer, OrganizePlan, OrganizeReport, OrganizeResult, ProgressSink,
};
use crate::undo::{ResetReport, UndoManager};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Files moved into each category since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounters {
    counts: BTreeMap<Category, usize>,
}

impl CategoryCounters {
    pub fn get(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, category: Category) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    /// Zeroes every category.
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Every category in table order with its count, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

/// Organizer and resetter sharing one set of counters and one remembered root.
pub struct Session {
    organizer: FileOrganizer,
    last_root: Option<PathBuf>,
    last_organized_at: Option<DateTime<Local>>,
    counters: CategoryCounters,
}

impl Session {
    pub fn new(filters: CompiledFilters) -> Self {
        Self {
            organizer: FileOrganizer::new(filters),
            last_root: None,
            last_organized_at: None,
            counters: CategoryCounters::default(),
        }
    }

    pub fn last_root(&self) -> Option<&Path> {
        self.last_root.as_deref()
    }

    pub fn last_organized_at(&self) -> Option<DateTime<Local>> {
        self.last_organized_at
    }

    pub fn counters(&self) -> &CategoryCounters {
        &self.counters
    }

    /// Computes what organizing `root` would do, without changing anything.
    pub fn plan(&self, root: &Path) -> OrganizeResult<OrganizePlan> {
        self.organizer.plan(root)
    }

    /// Organizes `root` and remembers it for a later reset.
    ///
    /// The root is remembered even when the run fails, including when no
    /// supported files are found.
    pub fn organize(
        &mut self,
        root: &Path,
        progress: &mut dyn ProgressSink,
    ) -> OrganizeResult<OrganizeReport> {
        self.last_root = Some(root.to_path_buf());
        self.last_organized_at = Some(Local::now());

        let plan = self.organizer.plan(root)?;
        let report = self.organizer.execute(&plan, progress);
        for operation in &report.moved {
            self.counters.increment(operation.category);
        }
        Ok(report)
    }

    /// Flattens the last organized root and zeroes the counters.
    ///
    /// Returns `Ok(None)` when there is nothing to reset: no organize has
    /// happened yet, or the remembered root no longer exists. The root stays
    /// remembered afterwards, so a second reset finds nothing left to move.
    pub fn reset(&mut self) -> OrganizeResult<Option<ResetReport>> {
        let Some(root) = self.last_root.as_deref() else {
            return Ok(None);
        };
        if !root.is_dir() {
            return Ok(None);
        }

        let report = UndoManager::reset(root)?;
        self.counters.clear();
        Ok(Some(report))
    }
}
