//! Interactive shell commands and script loading.
//!
//! The binary only wires these to stdin/stdout; everything that can fail is
//! decided here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Options;
use crate::interpreter::{Interpreter, RunOutcome};

pub const HELP: &str = "\
commands:
  run <path>   run a CatScript file
  help         show this message
  exit, quit   leave the shell";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("path '{0}' does not exist")]
    Missing(String),
    #[error("path '{0}' is not a file")]
    NotAFile(String),
    #[error("file '{0}' is not a CatScript file")]
    WrongExtension(String),
    #[error("could not read script: {0}")]
    Io(#[from] std::io::Error),
}

/// One line typed at the shell prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,
    Help,
    Run(PathBuf),
    /// `run` without a path.
    MissingPath,
    Nothing,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (input, ""),
        };
        match word.to_lowercase().as_str() {
            "" => ShellCommand::Nothing,
            "exit" | "quit" => ShellCommand::Quit,
            "help" => ShellCommand::Help,
            "run" if rest.is_empty() => ShellCommand::MissingPath,
            "run" => ShellCommand::Run(PathBuf::from(rest)),
            _ => ShellCommand::Unknown(word.to_string()),
        }
    }
}

/// Resolve a user-supplied script path. A path without an extension gets
/// `extension`; any other extension is rejected.
pub fn resolve_script(path: &Path, extension: &str) -> Result<PathBuf, ShellError> {
    let wanted = extension.trim_start_matches('.');
    let path = match path.extension() {
        Some(_) => path.to_path_buf(),
        None => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(wanted);
            PathBuf::from(name)
        }
    };

    let shown = path.display().to_string();
    if !path.exists() {
        return Err(ShellError::Missing(shown));
    }
    if !path.is_file() {
        return Err(ShellError::NotAFile(shown));
    }
    if path.extension().and_then(|e| e.to_str()) != Some(wanted) {
        return Err(ShellError::WrongExtension(shown));
    }
    Ok(path)
}

/// Load and run one script in a fresh interpreter.
pub fn run_script(path: &Path, options: &Options) -> Result<(Interpreter, RunOutcome), ShellError> {
    let path = resolve_script(path, &options.extension)?;
    let source = fs::read_to_string(&path)?;
    tracing::debug!(path = %path.display(), "running script");
    let mut interp = Interpreter::new(options);
    let outcome = interp.run_source(&source);
    Ok((interp, outcome))
}
