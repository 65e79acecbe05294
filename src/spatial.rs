//! Grid bucketing of static tiles so ground queries only look at nearby cells.

use std::collections::HashMap;

use crate::geometry::Rect;
use crate::world::{EntityRef, World};

/// Integer cell coordinate in world space (may be negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

/// Static tiles bucketed by every cell their world collider touches.
pub struct TileIndex {
    cell_size: f32,
    buckets: HashMap<CellPos, Vec<EntityRef>>,
}

impl TileIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    pub fn build(world: &World) -> Self {
        let mut index = Self::new(world.tile_size());
        for entity_ref in world.entity_refs() {
            if let Some(entity) = world.entity(entity_ref) {
                if entity.is_static_tile() {
                    index.insert(entity_ref, &entity.world_collider());
                }
            }
        }
        index
    }

    pub fn insert(&mut self, entity: EntityRef, rect: &Rect) {
        for cell in self.covered_cells(rect) {
            self.buckets.entry(cell).or_default().push(entity);
        }
    }

    /// Entities whose cells overlap `rect`, in update order, no duplicates.
    /// Candidates still need an exact intersection test.
    pub fn query(&self, rect: &Rect) -> Vec<EntityRef> {
        let mut found: Vec<EntityRef> = self
            .covered_cells(rect)
            .filter_map(|cell| self.buckets.get(&cell))
            .flatten()
            .copied()
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn cell_of(&self, x: f32, y: f32) -> CellPos {
        CellPos {
            x: (x / self.cell_size).floor() as i32,
            y: (y / self.cell_size).floor() as i32,
        }
    }

    fn covered_cells(&self, rect: &Rect) -> impl Iterator<Item = CellPos> {
        let min = self.cell_of(rect.x, rect.y);
        // Right/bottom edges are exclusive: a tile ending on a cell boundary
        // does not spill into the next cell.
        let max = CellPos {
            x: ((rect.right() / self.cell_size).ceil() as i32 - 1).max(min.x),
            y: ((rect.bottom() / self.cell_size).ceil() as i32 - 1).max(min.y),
        };
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellPos { x, y }))
    }
}
