//! Package assembly.
//!
//! The package builder takes every intermediate artifact and writes one or
//! more numbered package (`.lp`) and map (`.lm`) files. Output names are
//! passed as templates containing [`INDEX_PLACEHOLDER`], which the builder
//! replaces with each package's number. The builder's last line of stdout
//! lists the files it actually wrote, alternating package and map.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{PipelineConfig, Tool};
use crate::convert::IntermediateArtifact;
use crate::error::{PackError, Result};
use crate::manifest::PackType;
use crate::output::{display_path, plural, Printer};
use crate::tool::{encode_list, parse_list, path_str, run_checked, ToolInvocation, ToolInvoker};

pub const PACKAGE_EXTENSION: &str = "lp";
pub const MAP_EXTENSION: &str = "lm";

/// Marker in output templates that the builder replaces with a package number.
pub const INDEX_PLACEHOLDER: &str = "{n}";

/// Everything the package builder needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub intermediates: Vec<PathBuf>,
    /// Asset names, index-aligned with `intermediates`.
    pub asset_names: Vec<String>,
    /// How many artifacts conversion was expected to produce.
    pub expected: usize,
    pub package_template: PathBuf,
    pub map_template: PathBuf,
}

impl PackageRequest {
    pub fn new(
        artifacts: &[IntermediateArtifact],
        expected: usize,
        game_code: &str,
        pack_type: PackType,
        config: &PipelineConfig,
    ) -> Self {
        let (package_template, map_template) = output_templates(config, game_code, pack_type);
        Self {
            intermediates: artifacts.iter().map(|a| a.path.clone()).collect(),
            asset_names: artifacts.iter().map(|a| a.asset_name.clone()).collect(),
            expected,
            package_template,
            map_template,
        }
    }
}

/// One package and its offset map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFiles {
    pub package: PathBuf,
    pub map: PathBuf,
}

/// Files written by the package builder, in the order it reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageResult {
    pub files: Vec<PackageFiles>,
}

impl PackageResult {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Package and map templates: `packaged/a_<gameCode>_<packType>_{n}.lp` / `.lm`.
pub fn output_templates(
    config: &PipelineConfig,
    game_code: &str,
    pack_type: PackType,
) -> (PathBuf, PathBuf) {
    let base = format!("a_{}_{}_{}", game_code, pack_type.name(), INDEX_PLACEHOLDER);
    let dir = config.packaged_dir();
    (
        dir.join(format!("{}.{}", base, PACKAGE_EXTENSION)),
        dir.join(format!("{}.{}", base, MAP_EXTENSION)),
    )
}

/// Run the package builder over every intermediate artifact.
///
/// The builder is not launched unless the request is internally consistent.
pub fn assemble(
    request: &PackageRequest,
    config: &PipelineConfig,
    invoker: &dyn ToolInvoker,
    printer: &Printer,
) -> Result<PackageResult> {
    check_consistency(request)?;

    let packaged_dir = config.packaged_dir();
    fs::create_dir_all(&packaged_dir).map_err(|e| {
        PackError::io(&packaged_dir, format!("Failed to create package folder: {}", e))
    })?;

    printer.status(
        "Packaging",
        &plural(request.intermediates.len(), "intermediate", "intermediates"),
    );

    let paths = request
        .intermediates
        .iter()
        .map(|p| path_str(p))
        .collect::<Result<Vec<&str>>>()?;
    let invocation = ToolInvocation::new(config.tool_program(Tool::Package))
        .path_arg(&request.package_template)?
        .path_arg(&request.map_template)?
        .arg(encode_list(&paths))
        .arg(encode_list(&request.asset_names));
    let outcome = run_checked(invoker, &invocation)?;

    let result = parse_package_output(&invocation.tool_name(), &outcome.stdout, printer)?;
    for files in &result.files {
        printer.success(
            "Packaged",
            &format!(
                "{} {}",
                display_path(&files.package),
                printer.dim(&format!("(map {})", display_path(&files.map)))
            ),
        );
    }
    Ok(result)
}

fn check_consistency(request: &PackageRequest) -> Result<()> {
    let produced = request.intermediates.len();
    if produced != request.asset_names.len() || produced != request.expected {
        return Err(PackError::InternalConsistency {
            message: format!(
                "{} intermediate file(s) and {} asset name(s) for {} convertible asset(s)",
                produced,
                request.asset_names.len(),
                request.expected
            ),
        });
    }
    if produced == 0 {
        return Err(PackError::InternalConsistency {
            message: "no intermediate files to package".to_string(),
        });
    }
    Ok(())
}

/// Read the builder's stdout.
///
/// The last non-blank line is the file list; earlier lines are echoed as
/// informational output.
pub fn parse_package_output(tool: &str, stdout: &str, printer: &Printer) -> Result<PackageResult> {
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    let Some((last, informational)) = lines.split_last() else {
        return Err(PackError::ToolOutput {
            tool: tool.to_string(),
            message: "no output, expected the list of written packages".to_string(),
        });
    };
    if !informational.is_empty() {
        printer.passthrough(&informational.join("\n"));
    }

    let items = parse_list(last).map_err(|e| PackError::ToolOutput {
        tool: tool.to_string(),
        message: format!("could not read package list '{}': {}", last.trim(), e),
    })?;

    if items.is_empty() || items.len() % 2 != 0 {
        return Err(PackError::ToolOutput {
            tool: tool.to_string(),
            message: format!(
                "expected package and map paths in pairs, found {} path(s)",
                items.len()
            ),
        });
    }

    let files = items
        .chunks_exact(2)
        .map(|pair| PackageFiles {
            package: PathBuf::from(&pair[0]),
            map: PathBuf::from(&pair[1]),
        })
        .collect();
    Ok(PackageResult { files })
}
