//! Conversion of raw assets into intermediate artifacts.
//!
//! Each asset is routed on its type. Images go through texture preparation
//! before being wrapped by the intermediate packer; audio, JSON and font
//! assets are handed to the packer directly. Video has no converter yet and
//! yields [`ConversionResult::Unsupported`].

mod image;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{PipelineConfig, Tool};
use crate::error::{PackError, Result};
use crate::manifest::AssetType;
use crate::output::{display_path, Printer};
use crate::presence::RawAsset;
use crate::tool::{encode_list, run_checked, ToolInvocation, ToolInvoker};

pub use image::{texture_output, texture_path, TexturePlan, TEXTURE_EXTENSION};

/// An engine-ready single-asset file awaiting packaging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntermediateArtifact {
    pub asset_name: String,
    pub path: PathBuf,
}

/// Outcome of converting one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    Produced(IntermediateArtifact),
    /// No converter exists for this type. Nothing was written.
    Unsupported(AssetType),
}

/// Operation tag and output extension understood by the intermediate packer.
struct PackerFormat {
    operation: &'static str,
    extension: &'static str,
}

fn packer_format(asset_type: AssetType) -> Option<PackerFormat> {
    let (operation, extension) = match asset_type {
        AssetType::Image => ("i", "ii"),
        AssetType::Audio => ("a", "ia"),
        AssetType::Json => ("j", "ij"),
        AssetType::Font => ("f", "if"),
        AssetType::Video => return None,
    };
    Some(PackerFormat {
        operation,
        extension,
    })
}

/// `inter/<type>/<stem>.<ext>`, where the packer writes its output for `input`.
fn intermediate_path(
    config: &PipelineConfig,
    asset_type: AssetType,
    input: &Path,
    format: &PackerFormat,
) -> PathBuf {
    let mut file = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    file.push(".");
    file.push(format.extension);
    config.inter_type_dir(asset_type).join(file)
}

/// Files converting an asset writes, worked out without running any tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannedOutputs {
    /// `.ktx2` texture written next to a raw image.
    pub texture: Option<PathBuf>,
    pub intermediate: Option<PathBuf>,
}

pub fn planned_outputs(asset: &RawAsset<'_>, config: &PipelineConfig) -> PlannedOutputs {
    let asset_type = asset.entry.asset_type;
    let Some(format) = packer_format(asset_type) else {
        return PlannedOutputs::default();
    };

    let texture = match asset_type {
        AssetType::Image => image::texture_output(&asset.path),
        _ => None,
    };
    let input = texture.as_deref().unwrap_or(&asset.path);
    let intermediate = intermediate_path(config, asset_type, input, &format);

    PlannedOutputs {
        texture,
        intermediate: Some(intermediate),
    }
}

/// Refuse a conversion run whose outputs clash.
///
/// Fails when a texture would be written over another asset's raw file, or
/// when two assets would be packed to the same intermediate file.
pub fn check_output_collisions(assets: &[RawAsset<'_>], config: &PipelineConfig) -> Result<()> {
    let raw_owners: HashMap<&Path, &str> = assets
        .iter()
        .map(|a| (a.path.as_path(), a.entry.name.as_str()))
        .collect();
    let mut intermediate_owners: HashMap<PathBuf, &str> = HashMap::new();

    for asset in assets {
        let name = asset.entry.name.as_str();
        let outputs = planned_outputs(asset, config);

        if let Some(texture) = &outputs.texture {
            if let Some(owner) = raw_owners.get(texture.as_path()).filter(|o| **o != name) {
                return Err(PackError::Semantic {
                    message: format!(
                        "Encoding asset '{}' would overwrite '{}', the raw file of asset '{}'",
                        name,
                        display_path(texture),
                        owner
                    ),
                    help: Some("Give the two files different names before the extension".to_string()),
                });
            }
        }

        if let Some(intermediate) = outputs.intermediate {
            if let Some(owner) = intermediate_owners.get(&intermediate) {
                return Err(PackError::Semantic {
                    message: format!(
                        "Assets '{}' and '{}' would both be packed to '{}'",
                        owner,
                        name,
                        display_path(&intermediate)
                    ),
                    help: Some("Each asset needs its own raw file with a distinct name".to_string()),
                });
            }
            intermediate_owners.insert(intermediate, name);
        }
    }

    Ok(())
}

/// Routes assets to their converter and runs it.
pub struct Converter<'a> {
    config: &'a PipelineConfig,
    invoker: &'a dyn ToolInvoker,
    printer: &'a Printer,
}

impl<'a> Converter<'a> {
    pub fn new(config: &'a PipelineConfig, invoker: &'a dyn ToolInvoker, printer: &'a Printer) -> Self {
        Self {
            config,
            invoker,
            printer,
        }
    }

    /// Convert one located asset.
    pub fn convert(&self, asset: &RawAsset<'_>) -> Result<ConversionResult> {
        let entry = asset.entry;
        self.printer.status(
            "Converting",
            &format!(
                "{} from {}",
                self.printer.cyan(&entry.name),
                display_path(&asset.path)
            ),
        );
        self.printer.info("Tags", &self.printer.tags(&entry.tags));

        let Some(format) = packer_format(entry.asset_type) else {
            return Ok(ConversionResult::Unsupported(entry.asset_type));
        };

        let packer_input = match entry.asset_type {
            AssetType::Image => image::prepare_texture(self, asset)?,
            _ => asset.path.clone(),
        };

        let artifact = self.pack_intermediate(asset, &packer_input, &format)?;
        Ok(ConversionResult::Produced(artifact))
    }

    /// Wrap a converted file, its asset name and tags into an intermediate file.
    fn pack_intermediate(
        &self,
        asset: &RawAsset<'_>,
        input: &Path,
        format: &PackerFormat,
    ) -> Result<IntermediateArtifact> {
        let entry = asset.entry;
        let output_dir = self.config.inter_type_dir(entry.asset_type);
        fs::create_dir_all(&output_dir).map_err(|e| {
            PackError::io(&output_dir, format!("Failed to create intermediate folder: {}", e))
        })?;

        let invocation = ToolInvocation::new(self.config.tool_program(Tool::Intermediate))
            .arg(format.operation)
            .path_arg(input)?
            .arg(entry.name.as_str())
            .arg(encode_list(&entry.tags));
        let outcome = run_checked(self.invoker, &invocation)?;
        if !outcome.stdout.trim().is_empty() {
            self.printer.passthrough(&outcome.stdout);
        }

        let path = intermediate_path(self.config, entry.asset_type, input, format);
        self.printer
            .success("Packed", &format!("{} -> {}", entry.name, display_path(&path)));

        Ok(IntermediateArtifact {
            asset_name: entry.name.clone(),
            path,
        })
    }

    fn run(&self, invocation: &ToolInvocation) -> Result<()> {
        run_checked(self.invoker, invocation).map(|_| ())
    }
}
