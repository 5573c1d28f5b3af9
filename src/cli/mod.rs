pub mod build;
pub mod completions;
pub mod example;
pub mod setup;

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser};
use clap_complete::Shell;

use crate::config::ConfigOverrides;

/// loam-pack - build Loam asset packs from a JSON manifest
#[derive(Parser, Debug)]
#[command(name = "loam-pack")]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["manifest", "setup_file_dir", "create_json_example", "completions"])
))]
pub struct Cli {
    /// Manifest (.json) listing the assets to package
    pub manifest: Option<PathBuf>,

    /// Create the raw/, inter/ and packaged/ folder layout
    #[arg(long)]
    pub setup_file_dir: bool,

    /// Write a short example manifest to example.json
    #[arg(long)]
    pub create_json_example: bool,

    /// Print shell completions to stdout
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Project folder holding raw/, inter/ and packaged/ (default: current directory)
    #[arg(long, short = 'C', value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Folder holding inter_process and package_builder
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<PathBuf>,

    /// Print a JSON build report to stdout
    #[arg(long)]
    pub json: bool,

    /// Overwrite an existing example.json
    #[arg(long)]
    pub force: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalOptions {
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            bin_dir: self.bin_dir.clone(),
        }
    }
}

/// What a command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Build(PathBuf),
    SetupFileDir,
    CreateJsonExample,
    Completions(Shell),
}

impl Cli {
    /// The selected mode. Clap guarantees exactly one is present.
    pub fn mode(&self) -> Option<Mode> {
        if self.setup_file_dir {
            Some(Mode::SetupFileDir)
        } else if self.create_json_example {
            Some(Mode::CreateJsonExample)
        } else if let Some(shell) = self.completions {
            Some(Mode::Completions(shell))
        } else {
            self.manifest.clone().map(Mode::Build)
        }
    }
}
