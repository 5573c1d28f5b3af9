//! Raw asset presence checking.
//!
//! Unlike manifest validation, this stage does not stop at the first
//! problem: every asset is looked up and all missing files are reported
//! together.

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::{PackError, Result};
use crate::manifest::AssetEntry;
use crate::output::{display_path, plural, Printer};

/// A manifest asset paired with its raw file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset<'m> {
    pub entry: &'m AssetEntry,
    /// `raw/<type>/<filename>`.
    pub path: PathBuf,
}

/// Confirm every asset's raw file exists.
///
/// Returns the located assets in manifest order, or
/// [`PackError::MissingAssets`] listing every missing file.
pub fn check_presence<'m>(
    assets: &'m [AssetEntry],
    config: &PipelineConfig,
    printer: &Printer,
) -> Result<Vec<RawAsset<'m>>> {
    let mut located = Vec::with_capacity(assets.len());
    let mut missing = Vec::new();

    for entry in assets {
        let path = entry.raw_location(config);
        if path.is_file() {
            printer.status("Found", &display_path(&path));
            located.push(RawAsset { entry, path });
        } else {
            printer.error("Missing", &display_path(&path));
            missing.push(path);
        }
    }

    if !missing.is_empty() {
        tracing::debug!(missing = missing.len(), "raw assets missing");
        return Err(PackError::MissingAssets { missing });
    }

    printer.success(
        "Located",
        &format!("all {}", plural(located.len(), "raw asset", "raw assets")),
    );
    Ok(located)
}
