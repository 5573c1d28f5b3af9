//! Folder layout setup.
//!
//! Creates `raw/<type>/`, `inter/<type>/` and `packaged/` under the project
//! root. Existing folders are left alone, so running it twice is harmless.

use std::fs;
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::{PackError, Result};
use crate::manifest::AssetType;
use crate::output::{display_path, plural, Printer};

/// Folders touched by a setup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
}

pub fn run(config: &PipelineConfig, printer: &Printer) -> Result<()> {
    printer.status("Setting up", &display_path(config.root()));
    let report = setup_file_dir(config, printer)?;
    printer.success(
        "Finished",
        &format!(
            "{} created, {} already present",
            plural(report.created.len(), "folder", "folders"),
            report.existing.len()
        ),
    );
    Ok(())
}

/// Create every folder the pipeline reads from or writes to.
pub fn setup_file_dir(config: &PipelineConfig, printer: &Printer) -> Result<SetupReport> {
    let mut folders = Vec::new();
    folders.extend(AssetType::ALL.iter().map(|t| config.raw_type_dir(*t)));
    folders.extend(AssetType::ALL.iter().map(|t| config.inter_type_dir(*t)));
    folders.push(config.packaged_dir());

    let mut report = SetupReport::default();
    for folder in folders {
        if folder.is_dir() {
            printer.warning("Skipping", &format!("{} (already exists)", display_path(&folder)));
            report.existing.push(folder);
            continue;
        }

        fs::create_dir_all(&folder)
            .map_err(|e| PackError::io(&folder, format!("Failed to create folder: {}", e)))?;
        printer.success("Created", &display_path(&folder));
        report.created.push(folder);
    }

    Ok(report)
}
