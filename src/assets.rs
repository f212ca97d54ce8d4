//! Flag sprite loading
//!
//! Every `*.png` in the flags directory becomes one contender. Its name is
//! the file stem up to the first `.`, uppercased.

use std::path::Path;

use image::RgbaImage;
use image::imageops::FilterType;

use crate::error::{AssetError, ConfigError, RoyaleError};

/// A decoded flag, resized to the token size
#[derive(Debug, Clone)]
pub struct FlagSprite {
    pub name: String,
    pub image: RgbaImage,
}

/// Load and resize every PNG flag in `dir`, sorted by name
///
/// Fewer than two flags is a configuration error.
pub fn load_flags(dir: &Path, token_size: u32) -> Result<Vec<FlagSprite>, RoyaleError> {
    let entries = std::fs::read_dir(dir).map_err(|source| AssetError::Dir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut flags = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| AssetError::Dir {
                path: dir.to_path_buf(),
                source,
            })?
            .path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !file_name.to_lowercase().ends_with(".png") {
            continue;
        }

        let image = image::open(&path).map_err(|source| AssetError::Decode {
            path: path.clone(),
            source,
        })?;
        let image = image::imageops::resize(
            &image.to_rgba8(),
            token_size,
            token_size,
            FilterType::Triangle,
        );

        let name = flag_name(file_name);
        log::debug!("Loaded flag {} from {}", name, path.display());
        flags.push(FlagSprite { name, image });
    }

    flags.sort_by(|a, b| a.name.cmp(&b.name));
    log::info!("Loaded {} flags from {}", flags.len(), dir.display());

    if flags.len() < 2 {
        return Err(ConfigError::NotEnoughAssets { found: flags.len() }.into());
    }
    Ok(flags)
}

/// Display name for a flag file: stem before the first `.`, uppercased
pub fn flag_name(file_name: &str) -> String {
    file_name
        .split('.')
        .next()
        .unwrap_or(file_name)
        .to_uppercase()
}
