//! The invocation environment: search path, outputs, log groups and status.
//!
//! Inside a GitHub Actions runner this speaks the workflow command protocol
//! (`::group::`, `::error::`, the `GITHUB_PATH` and `GITHUB_OUTPUT` files).
//! Elsewhere it prints plain, colored text and keeps search path changes
//! in-process.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;
use log::Level;

use crate::error::{Error, Result};

const ENV_ACTIONS: &str = "GITHUB_ACTIONS";
const ENV_PATH_FILE: &str = "GITHUB_PATH";
const ENV_OUTPUT_FILE: &str = "GITHUB_OUTPUT";

/// Whether this process runs inside a GitHub Actions runner.
pub fn in_actions() -> bool {
    std::env::var(ENV_ACTIONS).is_ok_and(|v| v == "true")
}

/// Escapes a workflow command message.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Renders one log line, as a workflow command inside a runner.
pub fn format_log_line(level: Level, message: &str, actions: bool) -> String {
    if actions {
        return match level {
            Level::Error => format!("::error::{}", escape_data(message)),
            Level::Warn => format!("::warning::{}", escape_data(message)),
            Level::Info => message.to_string(),
            Level::Debug | Level::Trace => format!("::debug::{}", escape_data(message)),
        };
    }
    match level {
        Level::Error => format!("{} {}", "error:".red().bold(), message),
        Level::Warn => format!("{} {}", "warning:".yellow().bold(), message),
        Level::Info => message.to_string(),
        Level::Debug | Level::Trace => message.dimmed().to_string(),
    }
}

/// Marks the run as failed with `message`.
pub fn set_failed(message: &str) {
    if in_actions() {
        println!("::error::{}", escape_data(message));
    } else {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
}

/// Per-run view of the runner environment.
#[derive(Debug, Clone)]
pub struct Workflow {
    actions: bool,
    path_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    search_path: Vec<PathBuf>,
    outputs: Vec<(String, String)>,
}

impl Workflow {
    /// Reads the runner environment of the current process.
    pub fn from_env() -> Self {
        let file_var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        let search_path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();

        Self {
            actions: in_actions(),
            path_file: file_var(ENV_PATH_FILE),
            output_file: file_var(ENV_OUTPUT_FILE),
            search_path,
            outputs: Vec::new(),
        }
    }

    /// A workflow detached from the process environment.
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            actions: false,
            path_file: None,
            output_file: None,
            search_path,
            outputs: Vec::new(),
        }
    }

    /// Persists search path additions to `path` (the `GITHUB_PATH` file).
    pub fn with_path_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path_file = Some(path.into());
        self
    }

    /// Persists outputs to `path` (the `GITHUB_OUTPUT` file).
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// The search path joined into a `PATH` value.
    pub fn joined_search_path(&self) -> Result<OsString> {
        std::env::join_paths(&self.search_path)
            .map_err(|e| Error::io(PathBuf::new(), std::io::Error::other(e)))
    }

    /// Makes binaries in `dir` callable by name for the rest of the run.
    pub fn add_path(&mut self, dir: &Path) -> Result<()> {
        if let Some(file) = &self.path_file {
            append_line(file, &dir.display().to_string())?;
        }
        self.search_path.insert(0, dir.to_path_buf());
        log::debug!("Added {} to the search path", dir.display());
        Ok(())
    }

    /// Publishes an output value for later steps.
    pub fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        match &self.output_file {
            Some(file) if value.contains('\n') => {
                let delimiter = "ghadelimiter_setup_mmock";
                append_line(file, &format!("{name}<<{delimiter}\n{value}\n{delimiter}"))?;
            }
            Some(file) => append_line(file, &format!("{name}={value}"))?,
            None => println!("{name}={value}"),
        }
        self.outputs.push((name.to_string(), value.to_string()));
        Ok(())
    }

    /// Last value published for `name`.
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Runs `body` inside a collapsible log group. The group is closed even
    /// when `body` fails.
    pub fn group<T>(&mut self, title: &str, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.actions {
            println!("::group::{title}");
        } else {
            println!("{}", title.bold());
        }
        let result = body(self);
        if self.actions {
            println!("::endgroup::");
        }
        result
    }
}

fn append_line(file: &Path, line: &str) -> Result<()> {
    let mut handle = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .map_err(|e| Error::io(file, e))?;
    writeln!(handle, "{line}").map_err(|e| Error::io(file, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("50%\r\nmore"), "50%25%0D%0Amore");
    }

    #[test]
    fn test_actions_log_lines() {
        assert_eq!(
            format_log_line(Level::Warn, "cache down", true),
            "::warning::cache down"
        );
        assert_eq!(format_log_line(Level::Debug, "a\nb", true), "::debug::a%0Ab");
        assert_eq!(format_log_line(Level::Info, "done", true), "done");
        assert_eq!(format_log_line(Level::Error, "boom", true), "::error::boom");
    }

    #[test]
    fn test_add_path_prepends_and_persists() {
        let dir = tempdir().unwrap();
        let path_file = dir.path().join("github_path");
        let mut workflow =
            Workflow::new(vec![PathBuf::from("/usr/bin")]).with_path_file(&path_file);

        workflow.add_path(Path::new("/tmp/mmock-3.0.2")).unwrap();

        assert_eq!(workflow.search_path()[0], PathBuf::from("/tmp/mmock-3.0.2"));
        assert_eq!(workflow.search_path()[1], PathBuf::from("/usr/bin"));
        let content = std::fs::read_to_string(path_file).unwrap();
        assert_eq!(content, "/tmp/mmock-3.0.2\n");
    }

    #[test]
    fn test_set_output_writes_file() {
        let dir = tempdir().unwrap();
        let output_file = dir.path().join("github_output");
        let mut workflow = Workflow::new(Vec::new()).with_output_file(&output_file);

        workflow.set_output("mmock-bin", "/tmp/mmock-3.0.2/mmock").unwrap();
        workflow.set_output("notes", "a\nb").unwrap();

        assert_eq!(workflow.output("mmock-bin"), Some("/tmp/mmock-3.0.2/mmock"));
        let content = std::fs::read_to_string(output_file).unwrap();
        assert!(content.starts_with("mmock-bin=/tmp/mmock-3.0.2/mmock\n"));
        assert!(content.contains("notes<<ghadelimiter_setup_mmock\na\nb\nghadelimiter_setup_mmock\n"));
    }

    #[test]
    fn test_group_returns_body_error() {
        let mut workflow = Workflow::new(Vec::new());
        let result: Result<()> =
            workflow.group("check", |_| Err(Error::BinaryNotFound("mmock".into())));
        assert!(matches!(result, Err(Error::BinaryNotFound(_))));
    }
}
