//! Build command implementation.
//!
//! Runs one manifest through the pipeline using the real external tools.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::PipelineConfig;
use crate::error::{PackError, Result};
use crate::output::{display_path, plural, Printer};
use crate::pipeline::{Pipeline, PipelineReport};
use crate::tool::{ProcessInvoker, ToolInvoker};

use super::GlobalOptions;

pub fn run(manifest: &Path, options: &GlobalOptions, printer: &Printer) -> Result<()> {
    let config = match PipelineConfig::load(options.config_overrides()) {
        Ok(config) => config,
        Err(err) => return fail(err, options.json),
    };
    run_with(manifest, &config, &ProcessInvoker, options.json, printer)
}

/// Run the build against an explicit configuration and tool invoker.
///
/// With `json` set, a machine-readable report goes to stdout for both
/// outcomes; a failure is still returned so the exit status is non-zero.
pub fn run_with(
    manifest: &Path,
    config: &PipelineConfig,
    invoker: &dyn ToolInvoker,
    json: bool,
    printer: &Printer,
) -> Result<()> {
    printer.info("Project", &display_path(config.root()));
    tracing::debug!(bin_dir = %config.bin_dir().display(), "tool folder");

    let mut pipeline = Pipeline::new(config, invoker, printer);
    let report = match pipeline.run(manifest) {
        Ok(report) => report,
        Err(err) => return fail(err, json),
    };

    printer.success(
        "Finished",
        &format!(
            "{} into {} ({} skipped)",
            plural(report.converted.len(), "asset", "assets"),
            plural(report.packages.len(), "package", "packages"),
            report.skipped.len()
        ),
    );

    if json {
        println!("{}", report_json(&report));
    }
    Ok(())
}

fn fail(err: PackError, json: bool) -> Result<()> {
    if json {
        println!("{}", error_json(&err));
    }
    Err(err)
}

/// The `--json` success report.
pub fn report_json(report: &PipelineReport) -> Value {
    json!({
        "status": "ok",
        "manifest": report.manifest_path,
        "gameCode": report.game_code,
        "packType": report.pack_type.name(),
        "packages": report.packages.files,
        "converted": report.converted,
        "skipped": report.skipped,
    })
}

/// The `--json` failure report.
pub fn error_json(err: &PackError) -> Value {
    json!({
        "status": "error",
        "code": err.kind(),
        "message": err.to_string(),
    })
}
