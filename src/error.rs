use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for loam-pack operations.
///
/// Every variant is fatal to a run; the driver never retries or continues
/// past one of these.
#[derive(Error, Diagnostic, Debug)]
pub enum PackError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(loam::io))]
    Io { path: PathBuf, message: String },

    #[error("Parse error: {message}")]
    #[diagnostic(code(loam::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A manifest field is missing or has the wrong JSON shape.
    #[error("Schema error: {message}")]
    #[diagnostic(code(loam::schema))]
    Schema {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A manifest value is out of range or breaks a cross-field rule.
    #[error("Invalid manifest: {message}")]
    #[diagnostic(code(loam::semantic))]
    Semantic {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Could not find {} raw asset(s): {}", .missing.len(), format_paths(.missing))]
    #[diagnostic(
        code(loam::missing_assets),
        help("Place the files under raw/<type>/ or fix the 'filename' entries")
    )]
    MissingAssets { missing: Vec<PathBuf> },

    #[error("Failed to launch '{tool}': {message}")]
    #[diagnostic(
        code(loam::tool),
        help("Check that the tool is installed and on PATH, or pass --bin-dir")
    )]
    ToolLaunch { tool: String, message: String },

    /// External tool exited unsuccessfully. `stderr` is the tool's own output.
    #[error("'{tool}' failed with {}: {stderr}", describe_exit(.exit_code))]
    #[diagnostic(code(loam::tool))]
    ToolInvocation {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("'{tool}' produced unreadable output: {message}")]
    #[diagnostic(code(loam::tool_output))]
    ToolOutput { tool: String, message: String },

    /// A pipeline invariant broke. This is a defect in loam-pack, not in the input.
    #[error("Internal consistency error: {message}")]
    #[diagnostic(
        code(loam::internal),
        help("This is a bug in loam-pack; please report it with the manifest used")
    )]
    InternalConsistency { message: String },
}

impl PackError {
    /// Stable machine-readable code, also used by the `--json` report.
    pub fn kind(&self) -> &'static str {
        match self {
            PackError::Io { .. } => "io",
            PackError::Parse { .. } => "parse",
            PackError::Schema { .. } => "schema",
            PackError::Semantic { .. } => "semantic",
            PackError::MissingAssets { .. } => "missing-assets",
            PackError::ToolLaunch { .. } | PackError::ToolInvocation { .. } => "tool",
            PackError::ToolOutput { .. } => "tool-output",
            PackError::InternalConsistency { .. } => "internal",
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        PackError::Schema {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn semantic(message: impl Into<String>) -> Self {
        PackError::Semantic {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PackError::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
