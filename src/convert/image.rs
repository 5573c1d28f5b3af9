//! Texture preparation for image assets.
//!
//! The intermediate packer only accepts `.ktx2` textures. Legacy `.ktx`
//! files are upgraded in place, other formats are encoded to a `.ktx2` file
//! next to the source, and `.ktx2` files are used as they are.

use std::path::{Path, PathBuf};

use crate::config::Tool;
use crate::error::Result;
use crate::output::display_path;
use crate::presence::RawAsset;
use crate::tool::ToolInvocation;

use super::Converter;

/// Extension of the texture container the packer consumes.
pub const TEXTURE_EXTENSION: &str = "ktx2";

const LEGACY_EXTENSION: &str = "ktx";

/// Encode parameters for `ktx create`.
const CREATE_ARGS: [&str; 7] = [
    "--format",
    "R8G8B8A8_SRGB",
    "--assign-tf",
    "KHR_DF_TRANSFER_SRGB",
    "--generate-mipmap",
    "--encode",
    "basis-lz",
];

/// What has to happen to a raw image before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexturePlan {
    /// Legacy `.ktx`: upgrade in place.
    Upgrade,
    /// Any other format: encode a new `.ktx2`.
    Create,
    /// Already `.ktx2`.
    Ready,
}

impl TexturePlan {
    /// Decide from the file's extension, ignoring case.
    pub fn for_file(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            LEGACY_EXTENSION => TexturePlan::Upgrade,
            TEXTURE_EXTENSION => TexturePlan::Ready,
            _ => TexturePlan::Create,
        }
    }
}

/// The `.ktx2` file that stands for a raw image: same folder and stem.
pub fn texture_path(raw: &Path) -> PathBuf {
    raw.with_extension(TEXTURE_EXTENSION)
}

/// The `.ktx2` file preparing this image writes, or `None` when the raw
/// file is already a `.ktx2` texture and nothing is written.
pub fn texture_output(raw: &Path) -> Option<PathBuf> {
    match TexturePlan::for_file(raw) {
        TexturePlan::Ready => None,
        TexturePlan::Upgrade | TexturePlan::Create => Some(texture_path(raw)),
    }
}

/// Make sure a `.ktx2` texture exists for the asset and return its path.
pub(super) fn prepare_texture(converter: &Converter<'_>, asset: &RawAsset<'_>) -> Result<PathBuf> {
    let printer = converter.printer;
    let config = converter.config;

    let Some(texture) = texture_output(&asset.path) else {
        tracing::debug!(path = %asset.path.display(), "texture already ktx2");
        return Ok(asset.path.clone());
    };

    if TexturePlan::for_file(&asset.path) == TexturePlan::Upgrade {
        printer.warning("Upgrading", "legacy ktx texture to ktx2");
        let invocation = ToolInvocation::new(config.tool_program(Tool::Upgrade))
            .arg("-f")
            .path_arg(&asset.path)?;
        converter.run(&invocation)?;
        printer.success("Upgraded", &display_path(&texture));
    } else {
        printer.warning("Encoding", &format!("{} to ktx2", display_path(&asset.path)));
        let invocation = CREATE_ARGS.iter().fold(
            ToolInvocation::new(config.tool_program(Tool::Create)).arg("create"),
            |invocation, arg| invocation.arg(*arg),
        );
        let invocation = invocation.path_arg(&asset.path)?.path_arg(&texture)?;
        converter.run(&invocation)?;
        printer.success("Encoded", &display_path(&texture));
    }

    Ok(texture)
}
