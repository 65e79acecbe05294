//! Texture table and shared animation sets.
//!
//! Entities never own textures. They carry a [`TextureId`], an index into the
//! table kept here, and the backend behind [`TextureProvider`] owns the pixels.
//! Every loaded texture is handed back to the provider when [`Resources`] is
//! dropped, so teardown happens on every exit path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animation::Animation;
use crate::level::AssetConfig;

pub const ANIM_BLOCK_IDLE: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextureId(usize);

impl TextureId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub id: TextureId,
    pub path: PathBuf,
    pub size: TextureSize,
}

/// Backend that turns image paths into drawable textures.
pub trait TextureProvider {
    fn load(&mut self, id: TextureId, path: &Path) -> Result<TextureSize>;
    fn release(&mut self, id: TextureId);
}

/// Provider for runs without a graphics backend: every texture reports the
/// configured size and nothing is decoded.
#[derive(Debug, Clone)]
pub struct HeadlessTextures {
    size: TextureSize,
}

impl HeadlessTextures {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: TextureSize { width, height },
        }
    }
}

impl TextureProvider for HeadlessTextures {
    fn load(&mut self, id: TextureId, path: &Path) -> Result<TextureSize> {
        debug!(texture = id.index(), path = %path.display(), "headless texture registered");
        Ok(self.size)
    }

    fn release(&mut self, id: TextureId) {
        debug!(texture = id.index(), "headless texture released");
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextureSet {
    pub block: TextureId,
    pub stone: TextureId,
    pub background: TextureId,
}

pub struct Resources {
    provider: Box<dyn TextureProvider>,
    textures: Vec<TextureInfo>,
    pub set: TextureSet,
    pub block_animations: Vec<Animation>,
    decorations: BTreeMap<u8, TextureId>,
}

impl Resources {
    pub fn load(provider: impl TextureProvider + 'static, assets: &AssetConfig) -> Result<Self> {
        // Built empty first so an early return still releases what loaded.
        let mut resources = Self {
            provider: Box::new(provider),
            textures: Vec::new(),
            set: TextureSet {
                block: TextureId(0),
                stone: TextureId(0),
                background: TextureId(0),
            },
            block_animations: vec![Animation::new(
                assets.block_idle.frames,
                assets.block_idle.duration_secs,
            )],
            decorations: BTreeMap::new(),
        };
        resources.set = TextureSet {
            block: resources.load_texture(&assets.block_texture)?,
            stone: resources.load_texture(&assets.stone_texture)?,
            background: resources.load_texture(&assets.background_texture)?,
        };

        for (code, path) in &assets.decorations {
            let id = resources.load_texture(path)?;
            resources.decorations.insert(*code, id);
        }

        info!(textures = resources.textures.len(), "resources loaded");
        Ok(resources)
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureInfo> {
        self.textures.get(id.index())
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Texture used for a decorative background/foreground code.
    pub fn decoration(&self, code: u8) -> Option<TextureId> {
        self.decorations.get(&code).copied()
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureId> {
        let id = TextureId(self.textures.len());
        let size = self
            .provider
            .load(id, path)
            .with_context(|| format!("Failed to load texture {}", path.display()))?;
        self.textures.push(TextureInfo {
            id,
            path: path.to_path_buf(),
            size,
        });
        Ok(id)
    }
}

impl Drop for Resources {
    fn drop(&mut self) {
        for info in self.textures.iter().rev() {
            self.provider.release(info.id);
        }
        debug!(textures = self.textures.len(), "resources released");
    }
}
