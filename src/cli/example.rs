//! Example manifest generation.
//!
//! Prints a short reference of the manifest fields and writes a sample
//! `example.json`. The referenced raw files are not created.

use std::fs;

use crate::config::PipelineConfig;
use crate::error::{PackError, Result};
use crate::output::{display_path, Printer};

pub const EXAMPLE_FILENAME: &str = "example.json";

/// Sample manifest touching every asset type and both texture upgrade paths.
pub const EXAMPLE_MANIFEST: &str = r#"{
    "packType": "game",
    "gameCode": "TEST",
    "assets": {
        "my_asset_engine_name1": {
            "type": "image",
            "filename": "test.png",
            "tags": ["test", "tagged"]
        },
        "my_asset_engine_name2": {
            "type": "image",
            "filename": "test2.ktx2",
            "tags": []
        },
        "my_asset_engine_name3": {
            "type": "audio",
            "filename": "test_audio.wav",
            "tags": ["background"]
        },
        "my_asset_engine_name4": {
            "type": "image",
            "filename": "test3.ktx",
            "tags": ["upgraded"]
        },
        "my_asset_engine_name5": {
            "type": "json",
            "filename": "levels.json",
            "tags": ["data"]
        },
        "my_asset_engine_name6": {
            "type": "font",
            "filename": "body.ttf",
            "tags": []
        },
        "my_asset_engine_name7": {
            "type": "video",
            "filename": "intro.mp4",
            "tags": ["skipped"]
        }
    }
}
"#;

const BASE_FIELDS: [(&str, &str); 3] = [
    ("packType", "One of engine, game, mod or expac"),
    ("gameCode", "Up to 4 letters or digits naming the game, engine packs use LOAM"),
    ("assets", "Object holding one entry per asset, keyed by the engine name"),
];

const ASSET_FIELDS: [(&str, &str); 3] = [
    ("type", "Which raw/ folder holds the file: image, audio, video, json or font"),
    ("filename", "File name and extension inside that folder"),
    ("tags", "List of strings stored with the asset"),
];

pub fn run(config: &PipelineConfig, force: bool, printer: &Printer) -> Result<()> {
    let path = config.root().join(EXAMPLE_FILENAME);

    if path.exists() && !force {
        return Err(PackError::Io {
            path,
            message: format!("{} already exists, use --force to overwrite", EXAMPLE_FILENAME),
        });
    }

    print_reference(printer);

    fs::write(&path, EXAMPLE_MANIFEST)
        .map_err(|e| PackError::io(&path, format!("Failed to write example: {}", e)))?;

    printer.success("Wrote", &display_path(&path));
    printer.info(
        "Note",
        "the listed raw files are not created, add your own before building",
    );
    Ok(())
}

fn print_reference(printer: &Printer) {
    printer.info("Fields", &printer.bold("required base fields"));
    for (field, description) in BASE_FIELDS {
        printer.passthrough(&format!("{}: {}", printer.cyan(field), description));
    }
    printer.info("Fields", &printer.bold("required asset fields"));
    for (field, description) in ASSET_FIELDS {
        printer.passthrough(&format!("{}: {}", printer.cyan(field), description));
    }
}
