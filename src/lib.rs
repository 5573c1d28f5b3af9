//! loam-pack - asset pack builder for the Loam engine
//!
//! Reads a JSON manifest, checks every raw asset exists, converts each one
//! to an intermediate file with external tools, and bundles the results into
//! numbered `.lp` packages with `.lm` offset maps.

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod presence;
pub mod tool;

pub use config::{ConfigOverrides, PipelineConfig, Settings, Tool};
pub use convert::{ConversionResult, Converter, IntermediateArtifact};
pub use error::{PackError, Result};
pub use manifest::{validate, AssetEntry, AssetType, Manifest, PackType, ValidationRules};
pub use package::{assemble, PackageFiles, PackageRequest, PackageResult};
pub use pipeline::{Pipeline, PipelineReport, SkippedAsset, Stage};
pub use presence::{check_presence, RawAsset};
pub use tool::{ProcessInvoker, ToolInvocation, ToolInvoker, ToolOutcome};
