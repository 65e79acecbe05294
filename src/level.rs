use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glam::Vec2;
use serde::Deserialize;

use crate::resources::Resources;
use crate::tilemap::{self, LoadError, TileGrid, MAP_COLS, MAP_ROWS, TILE_SIZE};
use crate::world::World;

fn default_logical_width() -> u32 {
    640
}

fn default_logical_height() -> u32 {
    480
}

fn default_window_width() -> u32 {
    1600
}

fn default_window_height() -> u32 {
    900
}

fn default_tile_size() -> f32 {
    TILE_SIZE
}

fn default_rows() -> usize {
    MAP_ROWS
}

fn default_cols() -> usize {
    MAP_COLS
}

fn default_block_acceleration() -> [f32; 2] {
    [300.0, 0.0]
}

fn default_block_max_speed() -> f32 {
    100.0
}

fn default_snapshot_interval_frames() -> u64 {
    0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_block_texture() -> PathBuf {
    PathBuf::from("data/block.png")
}

fn default_stone_texture() -> PathBuf {
    PathBuf::from("data/stone.png")
}

fn default_background_texture() -> PathBuf {
    PathBuf::from("data/bg.png")
}

/// A playable level: grids plus everything needed to turn them into a world.
#[derive(Debug, Clone, Deserialize)]
pub struct Level {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub block: BlockTuning,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub frames: Option<u64>,
    #[serde(default = "default_snapshot_interval_frames")]
    pub snapshot_interval_frames: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub grids: LevelGrids,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_logical_width")]
    pub logical_width: u32,
    #[serde(default = "default_logical_height")]
    pub logical_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            logical_width: default_logical_width(),
            logical_height: default_logical_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            rows: default_rows(),
            cols: default_cols(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockTuning {
    #[serde(default = "default_block_acceleration")]
    pub acceleration: [f32; 2],
    #[serde(default = "default_block_max_speed")]
    pub max_speed_x: f32,
}

impl BlockTuning {
    pub fn acceleration(&self) -> Vec2 {
        Vec2::from_array(self.acceleration)
    }
}

impl Default for BlockTuning {
    fn default() -> Self {
        Self {
            acceleration: default_block_acceleration(),
            max_speed_x: default_block_max_speed(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    pub frames: u32,
    pub duration_secs: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 1,
            duration_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "default_block_texture")]
    pub block_texture: PathBuf,
    #[serde(default = "default_stone_texture")]
    pub stone_texture: PathBuf,
    #[serde(default = "default_background_texture")]
    pub background_texture: PathBuf,
    #[serde(default)]
    pub block_idle: AnimationConfig,
    /// Texture per decorative background/foreground code.
    #[serde(default)]
    pub decorations: BTreeMap<u8, PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            block_texture: default_block_texture(),
            stone_texture: default_stone_texture(),
            background_texture: default_background_texture(),
            block_idle: AnimationConfig::default(),
            decorations: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Grids as rows of digit strings, one character per cell.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelGrids {
    pub main: Vec<String>,
    #[serde(default)]
    pub background: Vec<String>,
    #[serde(default)]
    pub foreground: Vec<String>,
}

pub struct LevelLoader {
    base_dir: PathBuf,
}

impl LevelLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Level> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read level file {}", path.display()))?;
        let level: Level = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(level)
    }
}

impl Level {
    /// The single-screen stage the prototype ships with: one block hovering
    /// two rows above a single stone tile.
    pub fn first_level() -> Self {
        let mut main = vec!["0".repeat(MAP_COLS); MAP_ROWS];
        main[2] = format!("01{}", "0".repeat(MAP_COLS - 2));
        main[4] = format!("02{}", "0".repeat(MAP_COLS - 2));
        Self {
            name: "first_level".into(),
            description: None,
            display: DisplayConfig::default(),
            map: MapConfig::default(),
            block: BlockTuning::default(),
            assets: AssetConfig::default(),
            frames: None,
            snapshot_interval_frames: default_snapshot_interval_frames(),
            logging: LoggingConfig::default(),
            grids: LevelGrids {
                main,
                background: Vec::new(),
                foreground: Vec::new(),
            },
        }
    }

    pub fn main_grid(&self) -> Result<TileGrid, LoadError> {
        self.parse_grid("main", &self.grids.main)
    }

    /// Background and foreground are optional; an omitted grid is all zeros.
    pub fn background_grid(&self) -> Result<TileGrid, LoadError> {
        self.parse_optional_grid("background", &self.grids.background)
    }

    pub fn foreground_grid(&self) -> Result<TileGrid, LoadError> {
        self.parse_optional_grid("foreground", &self.grids.foreground)
    }

    pub fn build_world(&self, resources: &Resources) -> Result<World, LoadError> {
        tilemap::load_level(self, resources)
    }

    pub fn frames(&self, override_frames: Option<u64>) -> u64 {
        override_frames.or(self.frames).unwrap_or(600)
    }

    pub fn screen_height(&self) -> f32 {
        self.display.logical_height as f32
    }

    fn parse_grid(&self, name: &'static str, rows: &[String]) -> Result<TileGrid, LoadError> {
        TileGrid::parse(name, rows, self.map.rows, self.map.cols)
    }

    fn parse_optional_grid(
        &self,
        name: &'static str,
        rows: &[String],
    ) -> Result<TileGrid, LoadError> {
        if rows.is_empty() {
            Ok(TileGrid::empty(self.map.rows, self.map.cols))
        } else {
            self.parse_grid(name, rows)
        }
    }
}
