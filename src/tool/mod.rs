//! External tool invocation.
//!
//! Every conversion and packaging step is an external program. Steps build a
//! [`ToolInvocation`], hand it to a [`ToolInvoker`], and get back the captured
//! output and exit status. [`run_checked`] turns a non-zero exit into
//! [`PackError::ToolInvocation`] carrying the tool's stderr as written.
//!
//! Invocations block until the child exits. There is no timeout.

mod list_literal;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{PackError, Result};

pub use list_literal::{encode_list, parse_list, ListSyntaxError};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument. Fails on paths that are not valid UTF-8.
    pub fn path_arg(self, path: &Path) -> Result<Self> {
        Ok(self.arg(path_str(path)?))
    }

    /// Short name used in messages: the program's file stem.
    pub fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Borrow a path as UTF-8 text for a tool argument.
///
/// Tools receive paths as text, including inside list literals, so a path
/// that cannot be written exactly is rejected rather than altered.
pub fn path_str(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| PackError::Io {
        path: path.to_path_buf(),
        message: "Path is not valid UTF-8 and cannot be passed to a tool".to_string(),
    })
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutcome {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Launches external tools.
///
/// Returns `Err` only when the process could not be started; a started
/// process that fails is reported through [`ToolOutcome::exit_code`].
pub trait ToolInvoker {
    fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolOutcome>;
}

/// Runs tools as child processes with captured stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
    fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolOutcome> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PackError::ToolLaunch {
                tool: invocation.program.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(ToolOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// Invoke a tool and fail unless it exits with status zero.
pub fn run_checked(invoker: &dyn ToolInvoker, invocation: &ToolInvocation) -> Result<ToolOutcome> {
    tracing::debug!(command = %invocation, "invoking tool");
    let outcome = invoker.invoke(invocation)?;
    tracing::debug!(
        tool = %invocation.tool_name(),
        exit_code = ?outcome.exit_code,
        stdout_bytes = outcome.stdout.len(),
        stderr_bytes = outcome.stderr.len(),
        "tool finished"
    );

    if !outcome.success() {
        return Err(PackError::ToolInvocation {
            tool: invocation.tool_name(),
            exit_code: outcome.exit_code,
            stderr: outcome.stderr,
        });
    }
    Ok(outcome)
}
