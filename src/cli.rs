//! Command-line interface module for filesorter.
//!
//! This module handles:
//! - Argument parsing (`clap`)
//! - Running organize and dry-run against a directory
//! - The interactive shell, which keeps one session across commands so a
//!   `reset` undoes the preceding `organize`. Reset exists only there.

use crate::config::{CompiledFilters, FilterConfig};
use crate::file_category::Category;
use crate::file_organizer::{OrganizeError, OrganizePlan, OrganizeReport};
use crate::output::{OutputFormatter, ProgressBarSink};
use crate::session::Session;
use crate::undo::ResetReport;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "filesorter",
    version,
    about = "Sort files into Images, Documents, Audios and Videos folders"
)]
pub struct Cli {
    /// Filter configuration file (TOML)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Move recognized files under DIR into category folders
    Organize {
        #[arg(value_hint = clap::ValueHint::DirPath)]
        path: PathBuf,

        /// Only print what would be moved
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive session: organize, then reset the same folder
    Shell,
}

/// Represents a single operation on a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize {
        /// If true, simulate the operation without making changes.
        dry_run: bool,
        /// If true, print the report as JSON instead of text.
        json: bool,
    },
}

/// Entry point for a parsed command line.
pub fn run(cli: Cli) -> Result<(), String> {
    let config_path = cli.config.as_deref();
    match cli.command {
        CliCommand::Organize {
            path,
            dry_run,
            json,
        } => run_cli_with_config(
            OrganizeCommand::Organize { dry_run, json },
            &path,
            config_path,
        ),
        CliCommand::Shell => {
            let stdin = io::stdin();
            run_shell(config_path, stdin.lock())
        }
    }
}

/// Runs one command against `dir_path`.
///
/// # Examples
///
/// ```no_run
/// use filesorter::cli::{OrganizeCommand, run_cli_with_config};
/// use std::path::Path;
///
/// let command = OrganizeCommand::Organize { dry_run: false, json: false };
/// if let Err(e) = run_cli_with_config(command, Path::new("/path/to/directory"), None) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let filters = load_filters(config_path)?;
    match command {
        OrganizeCommand::Organize { dry_run: true, json } => {
            dry_run(&Session::new(filters), dir_path, json)
        }
        OrganizeCommand::Organize {
            dry_run: false,
            json,
        } => organize(&mut Session::new(filters), dir_path, json),
    }
}

fn load_filters(config_path: Option<&Path>) -> Result<CompiledFilters, String> {
    FilterConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Error serializing report: {}", e))
}

/// Organizes `dir_path` through `session` and prints the outcome.
///
/// Finding no supported files is reported but is not an error.
fn organize(session: &mut Session, dir_path: &Path, json_output: bool) -> Result<(), String> {
    if !json_output {
        OutputFormatter::info(&format!("Organizing contents of: {}", dir_path.display()));
    }

    let mut progress = ProgressBarSink::new();
    let result = session.organize(dir_path, &mut progress);
    progress.finish();

    let report = match result {
        Ok(report) => report,
        Err(OrganizeError::NoMatchingFiles { .. }) => {
            if json_output {
                let value = json!({ "root": dir_path, "status": "no_supported_files" });
                println!("{}", to_json(&value)?);
            } else {
                OutputFormatter::warning("No supported files found");
            }
            return Ok(());
        }
        Err(e) => return Err(e.to_string()),
    };

    if json_output {
        let value = json!({
            "root": dir_path,
            "status": "organized",
            "report": report,
            "counters": session.counters(),
        });
        println!("{}", to_json(&value)?);
        return Ok(());
    }

    print_organize_report(dir_path, &report);
    OutputFormatter::summary_table("SESSION TOTALS", session.counters().iter());
    Ok(())
}

fn print_organize_report(root: &Path, report: &OrganizeReport) {
    for op in &report.moved {
        let from = op.original_path.strip_prefix(root).unwrap_or(&op.original_path);
        let to = op.new_path.strip_prefix(root).unwrap_or(&op.new_path);
        OutputFormatter::plain(&format!(" - {} → {}", from.display(), to.display()));
    }

    if report.moved.is_empty() {
        OutputFormatter::info("Everything is already in place.");
    } else {
        OutputFormatter::success(&format!("Moved {} file(s)", report.moved.len()));
    }
    if !report.skipped.is_empty() {
        OutputFormatter::plain(&format!(
            "  Already in place: {}",
            report.skipped.len()
        ));
    }
    if !report.is_complete_success() {
        OutputFormatter::warning(&format!("{} file(s) could not be moved:", report.failed.len()));
        for failure in &report.failed {
            OutputFormatter::error(&format!("{}: {}", failure.path.display(), failure.reason));
        }
    }
}

/// Prints what organizing `dir_path` would do, touching nothing.
fn dry_run(session: &Session, dir_path: &Path, json_output: bool) -> Result<(), String> {
    let plan = match session.plan(dir_path) {
        Ok(plan) => plan,
        Err(OrganizeError::NoMatchingFiles { .. }) => {
            if json_output {
                let value = json!({ "root": dir_path, "status": "no_supported_files" });
                println!("{}", to_json(&value)?);
            } else {
                OutputFormatter::dry_run_notice("No supported files found.");
            }
            return Ok(());
        }
        Err(e) => return Err(e.to_string()),
    };

    if json_output {
        println!("{}", to_json(&plan)?);
        return Ok(());
    }

    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &OrganizePlan) {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", plan.root.display()));
    for planned in &plan.moves {
        let from = planned
            .source
            .strip_prefix(&plan.root)
            .unwrap_or(&planned.source);
        OutputFormatter::plain(&format!(
            " - {}\n   → Would move to {}/",
            from.display(),
            planned.category.dir_name()
        ));
    }

    let counts = plan.category_counts();
    OutputFormatter::summary_table(
        "DRY RUN SUMMARY",
        Category::ALL
            .into_iter()
            .map(|c| (c, counts.get(&c).copied().unwrap_or(0))),
    );
    OutputFormatter::plain(&format!(
        "Already in place: {}, unclassified: {}",
        plan.already_in_place.len(),
        plan.unclassified
    ));
    OutputFormatter::dry_run_notice("No files were modified.");
}

/// Resets the session's last organized root and prints the outcome.
fn reset(session: &mut Session) -> Result<(), String> {
    match session.reset().map_err(|e| e.to_string())? {
        Some(report) => print_reset_report(&report),
        None => OutputFormatter::info("Nothing to reset."),
    }
    Ok(())
}

fn print_reset_report(report: &ResetReport) {
    OutputFormatter::success(&format!(
        "Reset complete: {} file(s) restored",
        report.restored.len()
    ));
    for dir in &report.kept_dirs {
        OutputFormatter::warning(&format!("Kept non-empty folder {}", dir.display()));
    }
    for failure in &report.failed {
        OutputFormatter::error(&format!("{}: {}", failure.path.display(), failure.reason));
    }
}

/// A command typed into the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Organize(PathBuf),
    Reset,
    Status,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    /// Parses one input line. The organize path may contain spaces.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "organize" | "start" if rest.is_empty() => {
                Err("organize needs a directory path".to_string())
            }
            "organize" | "start" => Ok(Self::Organize(PathBuf::from(rest))),
            "reset" => Ok(Self::Reset),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
        }
    }
}

const SHELL_HELP: &str = "\
Commands:
  organize <DIR>  sort files under DIR into category folders
  reset           move files back out of the last organized DIR
  status          show the last organized DIR and category counts
  help            show this message
  quit            leave the shell";

/// Reads commands from `input` until it ends or `quit` is entered.
///
/// Errors from individual commands are printed and the shell keeps going.
pub fn run_shell(config_path: Option<&Path>, input: impl BufRead) -> Result<(), String> {
    let mut session = Session::new(load_filters(config_path)?);
    OutputFormatter::info("filesorter shell. Type 'help' for commands.");

    prompt();
    for line in input.lines() {
        let line = line.map_err(|e| format!("Error reading input: {}", e))?;
        let keep_going = match ShellCommand::parse(&line) {
            Ok(command) => execute_shell_command(&mut session, command),
            Err(message) => {
                OutputFormatter::error(&message);
                true
            }
        };
        if !keep_going {
            break;
        }
        prompt();
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

/// Runs one shell command; returns false when the shell should exit.
pub fn execute_shell_command(session: &mut Session, command: ShellCommand) -> bool {
    let result = match command {
        ShellCommand::Organize(path) => organize(session, &path, false),
        ShellCommand::Reset => reset(session),
        ShellCommand::Status => {
            print_status(session);
            Ok(())
        }
        ShellCommand::Help => {
            OutputFormatter::plain(SHELL_HELP);
            Ok(())
        }
        ShellCommand::Quit => return false,
        ShellCommand::Empty => Ok(()),
    };
    if let Err(message) = result {
        OutputFormatter::error(&message);
    }
    true
}

fn print_status(session: &Session) {
    match (session.last_root(), session.last_organized_at()) {
        (Some(root), Some(at)) => OutputFormatter::plain(&format!(
            "Last organized: {} at {}",
            root.display(),
            at.format("%Y-%m-%d %H:%M:%S")
        )),
        (Some(root), None) => {
            OutputFormatter::plain(&format!("Last organized: {}", root.display()))
        }
        _ => OutputFormatter::plain("Nothing organized yet."),
    }
    OutputFormatter::summary_table("CATEGORIES", session.counters().iter());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_parse_shell_commands() {
        assert_eq!(
            ShellCommand::parse("organize /tmp/My Photos"),
            Ok(ShellCommand::Organize(PathBuf::from("/tmp/My Photos")))
        );
        assert_eq!(ShellCommand::parse("  RESET "), Ok(ShellCommand::Reset));
        assert_eq!(ShellCommand::parse("status"), Ok(ShellCommand::Status));
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse(""), Ok(ShellCommand::Empty));
        assert!(ShellCommand::parse("organize").is_err());
        assert!(ShellCommand::parse("undo everything").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["filesorter", "organize", "/data", "--dry-run"])
            .expect("Failed to parse");
        assert!(matches!(
            cli.command,
            CliCommand::Organize {
                dry_run: true,
                json: false,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["filesorter", "shell", "-c", "rules.toml"])
            .expect("Failed to parse");
        assert_eq!(cli.config, Some(PathBuf::from("rules.toml")));
        assert!(matches!(cli.command, CliCommand::Shell));

        assert!(Cli::try_parse_from(["filesorter", "organize"]).is_err());
        // Without a session there is nothing to reset.
        assert!(Cli::try_parse_from(["filesorter", "reset", "/data"]).is_err());
    }

    #[test]
    fn test_shell_commands_share_one_session() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("a.png"), "").unwrap();
        let mut session = Session::new(FilterConfig::default().compile().unwrap());

        assert!(execute_shell_command(
            &mut session,
            ShellCommand::Organize(root.to_path_buf())
        ));
        assert!(root.join("Images/a.png").exists());
        assert_eq!(session.counters().get(Category::Images), 1);

        assert!(execute_shell_command(&mut session, ShellCommand::Reset));
        assert!(root.join("a.png").exists());
        assert!(!root.join("Images").exists());

        assert!(!execute_shell_command(&mut session, ShellCommand::Quit));
    }

    #[test]
    fn test_run_shell_reads_until_quit() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("clip.mov"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = config_dir.path().join("filters.toml");
        fs::write(&config_path, "[filters.exclude]\nextensions = [\"txt\"]\n").unwrap();
        let script = format!(
            "organize {}\nbogus\nquit\norganize {}\n",
            root.display(),
            root.display()
        );

        run_shell(Some(&config_path), Cursor::new(script)).expect("Shell failed");

        assert!(root.join("Videos/clip.mov").exists());
        assert!(root.join("notes.txt").exists());
    }
}
