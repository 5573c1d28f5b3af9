//! Asset manifest model.
//!
//! A manifest is a JSON document naming the pack type, the game it belongs
//! to, and every asset to convert and package:
//!
//! ```json
//! {
//!     "packType": "game",
//!     "gameCode": "TEST",
//!     "assets": {
//!         "hero_idle": { "type": "image", "filename": "hero.png", "tags": ["player"] }
//!     }
//! }
//! ```
//!
//! Documents are decoded into [`Manifest`] by [`validate`], which either
//! yields a fully typed manifest or the first problem found.

mod validate;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{PackError, Result};

pub use validate::{validate, ValidationRules, MAX_ASSET_NAME_LEN, MAX_GAME_CODE_LEN};

/// The kind of raw asset. Each kind has its own raw and intermediate folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Image,
    Audio,
    Video,
    Json,
    Font,
}

impl AssetType {
    pub const ALL: [AssetType; 5] = [
        AssetType::Image,
        AssetType::Audio,
        AssetType::Video,
        AssetType::Json,
        AssetType::Font,
    ];

    /// Name as written in manifests.
    pub fn name(&self) -> &'static str {
        match self {
            AssetType::Image => "image",
            AssetType::Audio => "audio",
            AssetType::Video => "video",
            AssetType::Json => "json",
            AssetType::Font => "font",
        }
    }

    /// Folder segment under `raw/` and `inter/`.
    pub fn folder(&self) -> &'static str {
        self.name()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Whether assets of this type are converted and packaged. Video is not yet.
    pub fn convertible(&self) -> bool {
        !matches!(self, AssetType::Video)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Purpose of a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackType {
    /// First-party engine assets. Must use the reserved engine game code.
    Engine,
    Game,
    Mod,
    /// Expansion pack.
    Expac,
}

impl PackType {
    pub const ALL: [PackType; 4] = [PackType::Engine, PackType::Game, PackType::Mod, PackType::Expac];

    pub fn name(&self) -> &'static str {
        match self {
            PackType::Engine => "engine",
            PackType::Game => "game",
            PackType::Mod => "mod",
            PackType::Expac => "expac",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One requested asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Identifier the engine uses for the asset (the manifest key).
    pub name: String,
    pub asset_type: AssetType,
    /// File name inside the raw folder for this asset's type.
    pub filename: String,
    /// Free-form tags, kept in manifest order.
    pub tags: Vec<String>,
}

impl AssetEntry {
    /// Where the raw source file is expected: `raw/<type>/<filename>`.
    pub fn raw_location(&self, config: &PipelineConfig) -> PathBuf {
        config.raw_type_dir(self.asset_type).join(&self.filename)
    }
}

/// A validated manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub pack_type: PackType,
    pub game_code: String,
    /// Assets in document order. Names are unique.
    pub assets: Vec<AssetEntry>,
}

impl Manifest {
    /// Read and validate a manifest file. The file must have a `.json` extension.
    pub fn load(path: &Path, rules: &ValidationRules<'_>) -> Result<Self> {
        validate(&Self::read_document(path)?, rules)
    }

    /// Read a manifest file as untyped JSON, without validating it.
    pub fn read_document(path: &Path) -> Result<serde_json::Value> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(PackError::Parse {
                message: format!("'{}' is not a JSON file", path.display()),
                help: Some("Manifests must be .json files, see --create-json-example".to_string()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        parse_document(&content)
    }

    /// Parse and validate manifest text.
    pub fn parse(content: &str, rules: &ValidationRules<'_>) -> Result<Self> {
        validate(&parse_document(content)?, rules)
    }

    /// Number of assets conversion must turn into intermediate artifacts.
    pub fn convertible_count(&self) -> usize {
        self.assets.iter().filter(|a| a.asset_type.convertible()).count()
    }

    /// Number of assets of a given type.
    pub fn count_of(&self, asset_type: AssetType) -> usize {
        self.assets.iter().filter(|a| a.asset_type == asset_type).count()
    }
}

fn parse_document(content: &str) -> Result<serde_json::Value> {
    serde_json::from_str(content).map_err(|e| PackError::Parse {
        message: format!("Manifest is not valid JSON: {}", e),
        help: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"{
        "packType": "game",
        "gameCode": "TEST",
        "assets": {
            "b_second": { "type": "audio", "filename": "b.wav", "tags": [] },
            "a_first": { "type": "image", "filename": "a.png", "tags": ["x", "x"] }
        }
    }"#;

    #[test]
    fn test_asset_type_names_round_trip() {
        for asset_type in AssetType::ALL {
            assert_eq!(AssetType::from_name(asset_type.name()), Some(asset_type));
        }
        assert_eq!(AssetType::from_name("Image"), None);
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let manifest = Manifest::parse(MINIMAL, &ValidationRules::default()).unwrap();

        let names: Vec<&str> = manifest.assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["b_second", "a_first"]);
        assert_eq!(manifest.assets[1].tags, vec!["x", "x"]);
        assert_eq!(manifest.count_of(AssetType::Image), 1);
        assert_eq!(manifest.convertible_count(), 2);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = Manifest::parse("{ \"packType\": ", &ValidationRules::default()).unwrap_err();
        assert!(matches!(err, PackError::Parse { .. }));
    }

    #[test]
    fn test_load_requires_json_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assets.yaml");
        std::fs::write(&path, MINIMAL).unwrap();

        let err = Manifest::load(&path, &ValidationRules::default()).unwrap_err();
        assert!(matches!(err, PackError::Parse { .. }));
    }

    #[test]
    fn test_load_accepts_uppercase_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ASSETS.JSON");
        std::fs::write(&path, MINIMAL).unwrap();

        let manifest = Manifest::load(&path, &ValidationRules::default()).unwrap();
        assert_eq!(manifest.game_code, "TEST");
    }

    #[test]
    fn test_raw_location() {
        let config = PipelineConfig::with_root("proj");
        let manifest = Manifest::parse(MINIMAL, &ValidationRules::default()).unwrap();

        assert_eq!(
            manifest.assets[0].raw_location(&config),
            PathBuf::from("proj/raw/audio/b.wav")
        );
    }
}
