//! Asset Loading
//!
//! All textures and the UI font are loaded up front before the first frame.
//! A missing file is a hard error: entities reference textures by path and
//! rendering has no fallback art.

use std::collections::HashMap;
use std::fmt;

use macroquad::prelude::{load_texture, FilterMode, Texture2D};
use macroquad::text::{load_ttf_font, Font};

/// Errors that can occur while loading assets
#[derive(Debug)]
pub enum AssetError {
    Texture { path: String, source: macroquad::Error },
    Font { path: String, source: macroquad::Error },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Texture { path, source } => {
                write!(f, "Failed to load texture '{}': {:?}", path, source)
            }
            AssetError::Font { path, source } => {
                write!(f, "Failed to load font '{}': {:?}", path, source)
            }
        }
    }
}

impl std::error::Error for AssetError {}

/// Loaded textures keyed by their load path, plus the UI font.
pub struct Assets {
    textures: HashMap<String, Texture2D>,
    pub font: Option<Font>,
}

impl Assets {
    /// Load every texture in `texture_paths` and the font at `font_path`.
    pub async fn load(texture_paths: &[&str], font_path: &str) -> Result<Self, AssetError> {
        let mut textures = HashMap::new();
        for &path in texture_paths {
            let texture = load_texture(path).await.map_err(|source| AssetError::Texture {
                path: path.to_string(),
                source,
            })?;
            // Pixel-art sprites look muddy with linear filtering
            texture.set_filter(FilterMode::Nearest);
            textures.insert(path.to_string(), texture);
        }

        let font = load_ttf_font(font_path).await.map_err(|source| AssetError::Font {
            path: font_path.to_string(),
            source,
        })?;

        Ok(Self {
            textures,
            font: Some(font),
        })
    }

    /// Empty asset set for headless tests: no textures, no font.
    pub fn empty() -> Self {
        Self {
            textures: HashMap::new(),
            font: None,
        }
    }

    pub fn has_texture(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    pub fn texture(&self, path: &str) -> Option<&Texture2D> {
        self.textures.get(path)
    }
}
