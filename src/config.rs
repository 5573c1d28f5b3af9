//! Pipeline configuration.
//!
//! Built once at startup from defaults, an optional `loam-pack.yaml` in the
//! project root, and command-line overrides. Every stage receives it by
//! reference; nothing reads folder names or tool locations from anywhere else.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};
use crate::manifest::AssetType;

/// The name of the optional project configuration file.
pub const CONFIG_FILENAME: &str = "loam-pack.yaml";

/// Game code reserved for first-party engine packs.
pub const ENGINE_GAME_CODE: &str = "LOAM";

/// Settings read from `loam-pack.yaml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder holding raw assets, one subfolder per asset type.
    pub raw_dir: PathBuf,

    /// Folder for intermediate artifacts, one subfolder per asset type.
    pub inter_dir: PathBuf,

    /// Folder receiving packages and maps.
    pub packaged_dir: PathBuf,

    /// Folder holding the intermediate packer and package builder.
    /// Defaults to `exe_bin/` next to the loam-pack executable.
    pub bin_dir: Option<PathBuf>,

    /// Game code that `engine` packs must use.
    pub engine_game_code: String,

    /// Asset types a manifest may reference.
    pub asset_types: Vec<AssetType>,

    pub tools: ToolNames,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw"),
            inter_dir: PathBuf::from("inter"),
            packaged_dir: PathBuf::from("packaged"),
            bin_dir: None,
            engine_game_code: ENGINE_GAME_CODE.to_string(),
            asset_types: AssetType::ALL.to_vec(),
            tools: ToolNames::default(),
        }
    }
}

impl Settings {
    /// Load settings from a `loam-pack.yaml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| PackError::Parse {
            message: format!("Invalid {}: {}", CONFIG_FILENAME, e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }
}

/// Executable names of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolNames {
    /// Upgrades legacy `.ktx` textures to `.ktx2` in place. Looked up on PATH.
    pub upgrade: String,
    /// Creates `.ktx2` textures from other image formats. Looked up on PATH.
    pub create: String,
    /// Wraps one converted asset into an intermediate file. Lives in the bin dir.
    pub intermediate: String,
    /// Bundles intermediates into packages and maps. Lives in the bin dir.
    pub package: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            upgrade: "ktx2ktx2".to_string(),
            create: "ktx".to_string(),
            intermediate: "inter_process".to_string(),
            package: "package_builder".to_string(),
        }
    }
}

/// The external tools the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Upgrade,
    Create,
    Intermediate,
    Package,
}

/// Values supplied on the command line, which win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub bin_dir: Option<PathBuf>,
}

/// Resolved, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    root: PathBuf,
    settings: Settings,
    bin_dir: PathBuf,
}

impl PipelineConfig {
    /// Resolve configuration for a run.
    ///
    /// Reads `loam-pack.yaml` from the project root when present.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let root = overrides.root.unwrap_or_default();
        let config_path = root.join(CONFIG_FILENAME);
        let settings = if config_path.is_file() {
            tracing::debug!(path = %config_path.display(), "loading project config");
            Settings::load(&config_path)?
        } else {
            Settings::default()
        };

        Ok(Self::from_settings(root, settings, overrides.bin_dir))
    }

    /// Build a configuration without touching the filesystem.
    pub fn from_settings(root: PathBuf, settings: Settings, bin_dir: Option<PathBuf>) -> Self {
        let bin_dir = bin_dir
            .or_else(|| settings.bin_dir.as_ref().map(|dir| root.join(dir)))
            .unwrap_or_else(|| default_bin_dir(&root));

        Self {
            root,
            settings,
            bin_dir,
        }
    }

    /// Defaults rooted at `root`, with tools expected in `root/exe_bin`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let bin_dir = root.join("exe_bin");
        Self::from_settings(root, Settings::default(), Some(bin_dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join(&self.settings.raw_dir)
    }

    pub fn inter_dir(&self) -> PathBuf {
        self.root.join(&self.settings.inter_dir)
    }

    /// Folder holding raw assets of one type, e.g. `raw/image`.
    pub fn raw_type_dir(&self, asset_type: AssetType) -> PathBuf {
        self.raw_dir().join(asset_type.folder())
    }

    /// Folder holding intermediates of one type, e.g. `inter/image`.
    pub fn inter_type_dir(&self, asset_type: AssetType) -> PathBuf {
        self.inter_dir().join(asset_type.folder())
    }

    pub fn packaged_dir(&self) -> PathBuf {
        self.root.join(&self.settings.packaged_dir)
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn engine_game_code(&self) -> &str {
        &self.settings.engine_game_code
    }

    pub fn asset_types(&self) -> &[AssetType] {
        &self.settings.asset_types
    }

    /// Program to launch for a tool.
    ///
    /// The texture tools come from PATH; the loam tools live in the bin dir.
    pub fn tool_program(&self, tool: Tool) -> PathBuf {
        let names = &self.settings.tools;
        match tool {
            Tool::Upgrade => PathBuf::from(&names.upgrade),
            Tool::Create => PathBuf::from(&names.create),
            Tool::Intermediate => self.bin_program(&names.intermediate),
            Tool::Package => self.bin_program(&names.package),
        }
    }

    fn bin_program(&self, name: &str) -> PathBuf {
        let file = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{}{}", name, std::env::consts::EXE_SUFFIX)
        };
        self.bin_dir.join(file)
    }
}

fn default_bin_dir(root: &Path) -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("exe_bin")))
        .unwrap_or_else(|| root.join("exe_bin"))
}
