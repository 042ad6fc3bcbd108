//! Helpers for invoking external command-line tools.

use std::path::Path;
use std::process::{Command, ExitStatus, Output};

use thiserror::Error;

/// Failure of an external tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} not found (install {package})")]
    NotFound { tool: String, package: &'static str },

    #[error("{tool} failed: {message}")]
    Failed { tool: String, message: String },

    #[error("IO error running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// An external binary plus the package that provides it.
#[derive(Debug, Clone)]
pub struct Tool<'a> {
    pub binary: &'a Path,
    pub package: &'static str,
}

impl<'a> Tool<'a> {
    pub fn new(binary: &'a Path, package: &'static str) -> Self {
        Self { binary, package }
    }

    pub fn command(&self) -> Command {
        Command::new(self.binary)
    }

    fn name(&self) -> String {
        self.binary.display().to_string()
    }

    fn spawn_error(&self, e: std::io::Error) -> ToolError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                tool: self.name(),
                package: self.package,
            }
        } else {
            ToolError::Io {
                tool: self.name(),
                source: e,
            }
        }
    }

    /// Handle command output, extracting stdout on success.
    pub fn stdout(&self, result: std::io::Result<Output>) -> Result<String, ToolError> {
        let output = result.map_err(|e| self.spawn_error(e))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(ToolError::Failed {
                tool: self.name(),
                message: failure_message(&output.status, &output.stderr),
            })
        }
    }

    /// Check command output for success, discarding stdout.
    pub fn check(&self, result: std::io::Result<Output>) -> Result<(), ToolError> {
        self.stdout(result).map(|_| ())
    }
}

fn failure_message(status: &ExitStatus, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", status)
    } else {
        stderr.to_string()
    }
}

/// Check if a binary is available in PATH (or exists, for explicit paths).
pub fn check_binary(binary: &Path) -> bool {
    which::which(binary).is_ok()
}
