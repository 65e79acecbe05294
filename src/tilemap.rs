//! Grid-to-entity loading.
//!
//! A map is a fixed-size grid of small integer codes drawn bottom-up, flush
//! with the bottom of the viewport. The main grid populates the gameplay
//! layers; background and foreground grids only produce decorative tiles.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::geometry::Rect;
use crate::level::Level;
use crate::resources::{Resources, TextureId, ANIM_BLOCK_IDLE};
use crate::world::{BlockData, Entity, LayerId, TileData, World};

pub const MAP_ROWS: usize = 5;
pub const MAP_COLS: usize = 50;
pub const TILE_SIZE: f32 = 16.0;

pub const CODE_EMPTY: u8 = 0;
pub const CODE_BLOCK: u8 = 1;
pub const CODE_STONE: u8 = 2;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("map has no controllable block (no cell with code 1)")]
    MissingControllableBlock,
    #[error("{grid} grid has {found} rows, expected {expected}")]
    RowCount {
        grid: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{grid} grid row {row} has {found} columns, expected {expected}")]
    ColumnCount {
        grid: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{grid} grid cell ({row}, {col}) holds '{found}', expected a digit")]
    InvalidCode {
        grid: &'static str,
        row: usize,
        col: usize,
        found: char,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl TileGrid {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CODE_EMPTY; rows * cols],
        }
    }

    /// Parses rows of digit strings, checking the grid is exactly
    /// `rows` × `cols`.
    pub fn parse(
        grid: &'static str,
        lines: &[String],
        rows: usize,
        cols: usize,
    ) -> Result<Self, LoadError> {
        if lines.len() != rows {
            return Err(LoadError::RowCount {
                grid,
                expected: rows,
                found: lines.len(),
            });
        }
        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate() {
            let line = line.trim();
            let found = line.chars().count();
            if found != cols {
                return Err(LoadError::ColumnCount {
                    grid,
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let code = ch.to_digit(10).ok_or(LoadError::InvalidCode {
                    grid,
                    row,
                    col,
                    found: ch,
                })?;
                cells.push(code as u8);
            }
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Cells in row-major order, top row first.
    pub fn cells(&self) -> impl Iterator<Item = (TilePos, u8)> + '_ {
        let cols = self.cols;
        self.cells.iter().enumerate().map(move |(i, &code)| {
            (
                TilePos {
                    row: i / cols,
                    col: i % cols,
                },
                code,
            )
        })
    }
}

/// Maps grid cells to world pixels for a given viewport height.
#[derive(Debug, Clone, Copy)]
pub struct GridLayout {
    pub tile_size: f32,
    pub rows: usize,
    pub screen_height: f32,
}

impl GridLayout {
    pub fn origin(&self, pos: TilePos) -> Vec2 {
        Vec2::new(
            pos.col as f32 * self.tile_size,
            self.screen_height - (self.rows - pos.row) as f32 * self.tile_size,
        )
    }
}

/// Builds the world for `level`. Fails when the main grid has no block, since
/// every later stage addresses the controllable block directly.
pub fn load_level(level: &Level, resources: &Resources) -> Result<World, LoadError> {
    let main = level.main_grid()?;
    let background = level.background_grid()?;
    let foreground = level.foreground_grid()?;
    let layout = GridLayout {
        tile_size: level.map.tile_size,
        rows: level.map.rows,
        screen_height: level.screen_height(),
    };
    let viewport = Rect::new(
        0.0,
        0.0,
        level.display.logical_width as f32,
        level.display.logical_height as f32,
    );

    let mut world = World::new(viewport, layout.tile_size);
    load_main_grid(&mut world, &main, &layout, level, resources);
    world.background = decorations(&background, &layout, resources);
    world.foreground = decorations(&foreground, &layout, resources);

    if world.block_index().is_none() {
        return Err(LoadError::MissingControllableBlock);
    }

    info!(
        level = %level.name,
        level_tiles = world.layer(LayerId::Level).len(),
        characters = world.layer(LayerId::Characters).len(),
        decorations = world.background().len() + world.foreground().len(),
        "level loaded"
    );
    Ok(world)
}

fn load_main_grid(
    world: &mut World,
    grid: &TileGrid,
    layout: &GridLayout,
    level: &Level,
    resources: &Resources,
) {
    for (pos, code) in grid.cells() {
        let origin = layout.origin(pos);
        match code {
            CODE_BLOCK => {
                let data = BlockData { spawn_cell: pos };
                let mut block = Entity::block(data, origin, resources.set.block, layout.tile_size);
                block.animations = resources.block_animations.clone();
                block.current_animation = Some(ANIM_BLOCK_IDLE);
                block.acceleration = level.block.acceleration();
                block.max_speed_x = level.block.max_speed_x;
                let spawned = world.spawn(LayerId::Characters, block);
                world.set_block_index(spawned.index);
            }
            CODE_STONE => {
                let tile = static_tile(pos, code, origin, resources.set.stone, layout);
                world.spawn(LayerId::Level, tile);
            }
            CODE_EMPTY => {}
            other => debug!(row = pos.row, col = pos.col, code = other, "ignoring tile code"),
        }
    }
}

fn decorations(grid: &TileGrid, layout: &GridLayout, resources: &Resources) -> Vec<Entity> {
    grid.cells()
        .filter(|(_, code)| *code != CODE_EMPTY)
        .filter_map(|(pos, code)| {
            resources
                .decoration(code)
                .map(|texture| static_tile(pos, code, layout.origin(pos), texture, layout))
        })
        .collect()
}

fn static_tile(
    cell: TilePos,
    code: u8,
    origin: Vec2,
    texture: TextureId,
    layout: &GridLayout,
) -> Entity {
    Entity::static_tile(TileData { cell, code }, origin, texture, layout.tile_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn parse_reads_digits_row_major() {
        let grid = TileGrid::parse("main", &rows(&["012", "300"]), 2, 3).unwrap();
        let cells: Vec<_> = grid.cells().map(|(_, code)| code).collect();
        assert_eq!(cells, vec![0, 1, 2, 3, 0, 0]);
        assert_eq!(grid.get(1, 0), Some(3));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        let err = TileGrid::parse("main", &rows(&["000"]), 2, 3).unwrap_err();
        assert!(matches!(err, LoadError::RowCount { found: 1, .. }));

        let err = TileGrid::parse("main", &rows(&["000", "00"]), 2, 3).unwrap_err();
        assert!(matches!(err, LoadError::ColumnCount { row: 1, found: 2, .. }));
    }

    #[test]
    fn parse_rejects_non_digits() {
        let err = TileGrid::parse("background", &rows(&["0x0"]), 1, 3).unwrap_err();
        match err {
            LoadError::InvalidCode { row, col, found, .. } => {
                assert_eq!((row, col, found), (0, 1, 'x'));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn layout_places_grid_flush_with_bottom() {
        let layout = GridLayout {
            tile_size: 16.0,
            rows: 5,
            screen_height: 480.0,
        };
        assert_eq!(layout.origin(TilePos { row: 4, col: 1 }), Vec2::new(16.0, 464.0));
        assert_eq!(layout.origin(TilePos { row: 0, col: 0 }), Vec2::new(0.0, 400.0));
    }
}
