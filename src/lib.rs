//! filesorter - sort a directory's files into category folders and back
//!
//! Files are classified by extension into Images, Documents, Audios and
//! Videos, then moved into folders of those names directly under the chosen
//! root. A reset moves them back up. Moves never overwrite: colliding names
//! get a numeric suffix.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod mover;
pub mod output;
pub mod session;
pub mod undo;

pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use file_category::{Category, FileMapper};
pub use file_organizer::{FileOrganizer, OrganizeError, OrganizeReport, Progress, ProgressSink};
pub use session::{CategoryCounters, Session};
pub use undo::{ResetReport, UndoManager};

pub use cli::{OrganizeCommand, run_cli_with_config};
