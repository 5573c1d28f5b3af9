//! Pipeline driver.
//!
//! Runs one manifest through every stage in order:
//!
//! ```text
//! Start -> Parsed -> Validated -> PresenceChecked -> Converting -> Packaging -> Done
//! ```
//!
//! Any error moves the pipeline to [`Stage::Failed`] and is returned to the
//! caller. Nothing is retried and no partial package is produced.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::convert::{check_output_collisions, ConversionResult, Converter, IntermediateArtifact};
use crate::error::{PackError, Result};
use crate::manifest::{validate, AssetType, Manifest, PackType, ValidationRules};
use crate::output::{plural, Printer};
use crate::package::{assemble, PackageRequest, PackageResult};
use crate::presence::check_presence;
use crate::tool::ToolInvoker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Parsed,
    Validated,
    PresenceChecked,
    Converting,
    Packaging,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Parsed => "parsed",
            Stage::Validated => "validated",
            Stage::PresenceChecked => "presence-checked",
            Stage::Converting => "converting",
            Stage::Packaging => "packaging",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// An asset left out of the package because its type has no converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
    pub asset_name: String,
    pub asset_type: AssetType,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub manifest_path: PathBuf,
    pub game_code: String,
    pub pack_type: PackType,
    pub converted: Vec<IntermediateArtifact>,
    pub skipped: Vec<SkippedAsset>,
    pub packages: PackageResult,
}

/// Drives a single run. One pipeline handles one manifest.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    invoker: &'a dyn ToolInvoker,
    printer: &'a Printer,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, invoker: &'a dyn ToolInvoker, printer: &'a Printer) -> Self {
        Self {
            config,
            invoker,
            printer,
            stage: Stage::Start,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage against the manifest at `manifest_path`.
    pub fn run(&mut self, manifest_path: &Path) -> Result<PipelineReport> {
        let result = self.run_stages(manifest_path);
        if let Err(err) = &result {
            tracing::debug!(stage = %self.stage, kind = err.kind(), "pipeline failed");
            self.stage = Stage::Failed;
        }
        result
    }

    fn advance(&mut self, next: Stage) {
        tracing::debug!(from = %self.stage, to = %next, "pipeline stage");
        self.stage = next;
    }

    fn run_stages(&mut self, manifest_path: &Path) -> Result<PipelineReport> {
        let printer = self.printer;

        printer.status("Reading", &manifest_path.display().to_string());
        let document = Manifest::read_document(manifest_path)?;
        self.advance(Stage::Parsed);

        let manifest = validate(&document, &ValidationRules::from_config(self.config))?;
        printer.success(
            "Validated",
            &format!(
                "{} pack '{}' with {}",
                manifest.pack_type,
                manifest.game_code,
                plural(manifest.assets.len(), "asset", "assets")
            ),
        );
        self.advance(Stage::Validated);

        let located = check_presence(&manifest.assets, self.config, printer)?;
        self.advance(Stage::PresenceChecked);

        if manifest.convertible_count() == 0 {
            return Err(PackError::Semantic {
                message: "None of the manifest's assets can be converted, nothing to package".to_string(),
                help: Some("Video assets are not supported yet".to_string()),
            });
        }
        check_output_collisions(&located, self.config)?;

        self.advance(Stage::Converting);
        let converter = Converter::new(self.config, self.invoker, printer);
        let mut converted = Vec::new();
        let mut skipped = Vec::new();
        for asset in &located {
            match converter.convert(asset)? {
                ConversionResult::Produced(artifact) => converted.push(artifact),
                ConversionResult::Unsupported(asset_type) => {
                    printer.warning(
                        "Skipping",
                        &format!("{} ({} assets are not supported yet)", asset.entry.name, asset_type),
                    );
                    skipped.push(SkippedAsset {
                        asset_name: asset.entry.name.clone(),
                        asset_type,
                    });
                }
            }
        }

        let packages = self.package(&manifest, &converted)?;
        self.advance(Stage::Done);

        Ok(PipelineReport {
            manifest_path: manifest_path.to_path_buf(),
            game_code: manifest.game_code,
            pack_type: manifest.pack_type,
            converted,
            skipped,
            packages,
        })
    }

    /// Package the artifacts, which must cover every convertible asset in the manifest.
    fn package(&mut self, manifest: &Manifest, converted: &[IntermediateArtifact]) -> Result<PackageResult> {
        self.advance(Stage::Packaging);
        let request = PackageRequest::new(
            converted,
            manifest.convertible_count(),
            &manifest.game_code,
            manifest.pack_type,
            self.config,
        );
        assemble(&request, self.config, self.invoker, self.printer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ToolInvocation, ToolOutcome};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Script {
        calls: RefCell<Vec<String>>,
    }

    impl ToolInvoker for Script {
        fn invoke(&self, invocation: &ToolInvocation) -> Result<ToolOutcome> {
            let tool = invocation.tool_name();
            self.calls.borrow_mut().push(tool.clone());
            let stdout = if tool == "package_builder" {
                "['packaged/a_TEST_game_0.lp', 'packaged/a_TEST_game_0.lm']\n".to_string()
            } else {
                String::new()
            };
            Ok(ToolOutcome {
                stdout,
                stderr: String::new(),
                exit_code: Some(0),
            })
        }
    }

    #[test]
    fn test_schema_error_before_any_io() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::with_root(dir.path());
        let manifest = dir.path().join("pack.json");
        fs::write(&manifest, r#"{ "gameCode": "TEST", "assets": {} }"#).unwrap();
        let script = Script::default();
        let printer = Printer::plain();

        let mut pipeline = Pipeline::new(&config, &script, &printer);
        let err = pipeline.run(&manifest).unwrap_err();

        assert!(matches!(err, PackError::Schema { .. }));
        assert_eq!(pipeline.stage(), Stage::Failed);
        assert!(script.calls.borrow().is_empty());
        assert!(!dir.path().join("inter").exists());
    }

    #[test]
    fn test_only_video_assets_is_an_error() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::with_root(dir.path());
        fs::create_dir_all(dir.path().join("raw/video")).unwrap();
        fs::write(dir.path().join("raw/video/intro.mp4"), b"mp4").unwrap();
        let manifest = dir.path().join("pack.json");
        fs::write(
            &manifest,
            r#"{ "packType": "game", "gameCode": "TEST", "assets": {
                "intro": { "type": "video", "filename": "intro.mp4", "tags": [] } } }"#,
        )
        .unwrap();
        let script = Script::default();
        let printer = Printer::plain();

        let mut pipeline = Pipeline::new(&config, &script, &printer);
        let err = pipeline.run(&manifest).unwrap_err();

        assert!(matches!(err, PackError::Semantic { .. }));
        assert!(script.calls.borrow().is_empty());
    }

    #[test]
    fn test_reaches_done() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::with_root(dir.path());
        fs::create_dir_all(dir.path().join("raw/json")).unwrap();
        fs::write(dir.path().join("raw/json/levels.json"), b"{}").unwrap();
        let manifest = dir.path().join("pack.json");
        fs::write(
            &manifest,
            r#"{ "packType": "game", "gameCode": "TEST", "assets": {
                "levels": { "type": "json", "filename": "levels.json", "tags": ["data"] } } }"#,
        )
        .unwrap();
        let script = Script::default();
        let printer = Printer::plain();

        let mut pipeline = Pipeline::new(&config, &script, &printer);
        let report = pipeline.run(&manifest).unwrap();

        assert_eq!(pipeline.stage(), Stage::Done);
        assert_eq!(*script.calls.borrow(), vec!["inter_process", "package_builder"]);
        assert_eq!(report.converted.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.packages.len(), 1);
    }

    #[test]
    fn test_artifacts_missing_a_convertible_asset_never_reach_the_builder() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::with_root(dir.path());
        let manifest = Manifest::parse(
            r#"{ "packType": "game", "gameCode": "TEST", "assets": {
                "theme": { "type": "audio", "filename": "theme.wav", "tags": [] },
                "levels": { "type": "json", "filename": "levels.json", "tags": [] } } }"#,
            &ValidationRules::default(),
        )
        .unwrap();
        let converted = vec![IntermediateArtifact {
            asset_name: "levels".to_string(),
            path: dir.path().join("inter/json/levels.ij"),
        }];
        let script = Script::default();
        let printer = Printer::plain();

        let mut pipeline = Pipeline::new(&config, &script, &printer);
        let err = pipeline.package(&manifest, &converted).unwrap_err();

        assert!(matches!(err, PackError::InternalConsistency { .. }));
        assert!(script.calls.borrow().is_empty());
    }

    #[test]
    fn test_colliding_outputs_stop_before_any_tool() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::with_root(dir.path());
        fs::create_dir_all(dir.path().join("raw/image")).unwrap();
        fs::write(dir.path().join("raw/image/hero.png"), b"png").unwrap();
        fs::write(dir.path().join("raw/image/hero.ktx2"), b"ktx2").unwrap();
        let manifest = dir.path().join("pack.json");
        fs::write(
            &manifest,
            r#"{ "packType": "game", "gameCode": "TEST", "assets": {
                "hero_png": { "type": "image", "filename": "hero.png", "tags": [] },
                "hero_ktx": { "type": "image", "filename": "hero.ktx2", "tags": [] } } }"#,
        )
        .unwrap();
        let script = Script::default();
        let printer = Printer::plain();

        let mut pipeline = Pipeline::new(&config, &script, &printer);
        let err = pipeline.run(&manifest).unwrap_err();

        assert!(matches!(err, PackError::Semantic { .. }));
        assert_eq!(pipeline.stage(), Stage::Failed);
        assert!(script.calls.borrow().is_empty());
        assert_eq!(fs::read(dir.path().join("raw/image/hero.ktx2")).unwrap(), b"ktx2");
    }
}
