use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::geometry::Rect;
use crate::resources::TextureId;
use crate::tilemap::TilePos;

/// Which ordered collection an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LayerId {
    /// Immovable collidable tiles.
    Level,
    /// Dynamic entities; currently the controllable block.
    Characters,
}

impl LayerId {
    pub const ALL: [LayerId; 2] = [LayerId::Level, LayerId::Characters];

    fn slot(self) -> usize {
        match self {
            LayerId::Level => 0,
            LayerId::Characters => 1,
        }
    }
}

/// Identity of an entity inside the world. Two entities can share a position,
/// so self-exclusion in collision scans compares these, never positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub layer: LayerId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    pub cell: TilePos,
    pub code: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    pub spawn_cell: TilePos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    StaticTile(TileData),
    Block(BlockData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// +1 faces right, -1 faces left (sprite drawn flipped).
    pub facing: f32,
    pub max_speed_x: f32,
    /// Relative to `position`.
    pub collider: Rect,
    pub animations: Vec<Animation>,
    pub current_animation: Option<usize>,
    /// 1-based sprite cell shown while no animation is active.
    pub sprite_frame: u32,
    pub texture: TextureId,
    pub dynamic: bool,
    pub grounded: bool,
}

impl Entity {
    fn with_kind(kind: EntityKind, position: Vec2, texture: TextureId, tile_size: f32) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            facing: 1.0,
            max_speed_x: 0.0,
            collider: Rect::square(tile_size),
            animations: Vec::new(),
            current_animation: None,
            sprite_frame: 1,
            texture,
            dynamic: false,
            grounded: false,
        }
    }

    pub fn static_tile(data: TileData, position: Vec2, texture: TextureId, tile_size: f32) -> Self {
        Self::with_kind(EntityKind::StaticTile(data), position, texture, tile_size)
    }

    pub fn block(data: BlockData, position: Vec2, texture: TextureId, tile_size: f32) -> Self {
        let mut entity = Self::with_kind(EntityKind::Block(data), position, texture, tile_size);
        entity.dynamic = true;
        entity
    }

    pub fn is_static_tile(&self) -> bool {
        matches!(self.kind, EntityKind::StaticTile(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, EntityKind::Block(_))
    }

    /// Collider in world coordinates.
    pub fn world_collider(&self) -> Rect {
        self.collider.translated(self.position)
    }

    pub fn active_animation(&self) -> Option<&Animation> {
        self.current_animation.and_then(|i| self.animations.get(i))
    }

    pub fn active_animation_mut(&mut self) -> Option<&mut Animation> {
        self.current_animation
            .and_then(move |i| self.animations.get_mut(i))
    }

    /// Zero-based sprite-sheet cell to draw this frame.
    pub fn sprite_cell(&self) -> u32 {
        match self.active_animation() {
            Some(animation) => animation.current_frame(),
            None => self.sprite_frame.saturating_sub(1),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub layer: LayerId,
    pub index: usize,
    pub kind: EntityKind,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub facing: f32,
    pub collider: Rect,
    pub grounded: bool,
    pub sprite_cell: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub level: String,
    pub frame: u64,
    pub elapsed_secs: f64,
    pub block_index: Option<usize>,
    pub camera_x: f32,
    pub entities: Vec<EntitySnapshot>,
}

pub struct World {
    frame: u64,
    elapsed_secs: f64,
    tile_size: f32,
    block_index: Option<usize>,
    pub(crate) layers: [Vec<Entity>; 2],
    pub(crate) background: Vec<Entity>,
    pub(crate) foreground: Vec<Entity>,
    pub viewport: Rect,
}

impl World {
    pub fn new(viewport: Rect, tile_size: f32) -> Self {
        Self {
            frame: 0,
            elapsed_secs: 0.0,
            tile_size,
            block_index: None,
            layers: [Vec::new(), Vec::new()],
            background: Vec::new(),
            foreground: Vec::new(),
            viewport,
        }
    }

    pub fn spawn(&mut self, layer: LayerId, entity: Entity) -> EntityRef {
        let entities = &mut self.layers[layer.slot()];
        entities.push(entity);
        EntityRef {
            layer,
            index: entities.len() - 1,
        }
    }

    pub fn layer(&self, layer: LayerId) -> &[Entity] {
        &self.layers[layer.slot()]
    }

    pub fn layer_mut(&mut self, layer: LayerId) -> &mut [Entity] {
        &mut self.layers[layer.slot()]
    }

    pub fn entity(&self, entity: EntityRef) -> Option<&Entity> {
        self.layer(entity.layer).get(entity.index)
    }

    pub fn entity_mut(&mut self, entity: EntityRef) -> Option<&mut Entity> {
        self.layer_mut(entity.layer).get_mut(entity.index)
    }

    /// Every entity in update order: level layer first, then characters.
    pub fn entity_refs(&self) -> Vec<EntityRef> {
        LayerId::ALL
            .iter()
            .flat_map(|&layer| {
                (0..self.layer(layer).len()).map(move |index| EntityRef { layer, index })
            })
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn background(&self) -> &[Entity] {
        &self.background
    }

    pub fn foreground(&self) -> &[Entity] {
        &self.foreground
    }

    pub fn block_index(&self) -> Option<usize> {
        self.block_index
    }

    pub(crate) fn set_block_index(&mut self, index: usize) {
        self.block_index = Some(index);
    }

    pub fn block_ref(&self) -> Option<EntityRef> {
        self.block_index.map(|index| EntityRef {
            layer: LayerId::Characters,
            index,
        })
    }

    pub fn block(&self) -> Option<&Entity> {
        self.block_ref().and_then(|r| self.entity(r))
    }

    pub fn block_mut(&mut self) -> Option<&mut Entity> {
        self.block_ref().and_then(move |r| self.entity_mut(r))
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.frame += 1;
        self.elapsed_secs += dt as f64;
    }

    pub fn snapshot(&self, level: &str) -> WorldSnapshot {
        let entities = self
            .entity_refs()
            .into_iter()
            .filter_map(|r| self.entity(r).map(|entity| (r, entity)))
            .map(|(r, entity)| EntitySnapshot {
                layer: r.layer,
                index: r.index,
                kind: entity.kind,
                position: entity.position.to_array(),
                velocity: entity.velocity.to_array(),
                facing: entity.facing,
                collider: entity.collider,
                grounded: entity.grounded,
                sprite_cell: entity.sprite_cell(),
            })
            .collect();
        WorldSnapshot {
            level: level.to_string(),
            frame: self.frame,
            elapsed_secs: self.elapsed_secs,
            block_index: self.block_index,
            camera_x: self.viewport.x,
            entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::TextureId;

    fn texture() -> TextureId {
        TextureId::new(0)
    }

    fn tile_at(x: f32, y: f32) -> Entity {
        let data = TileData {
            cell: TilePos { row: 0, col: 0 },
            code: 2,
        };
        Entity::static_tile(data, Vec2::new(x, y), texture(), 16.0)
    }

    #[test]
    fn spawn_returns_stable_refs() {
        let mut world = World::new(Rect::new(0.0, 0.0, 640.0, 480.0), 16.0);
        let a = world.spawn(LayerId::Level, tile_at(0.0, 464.0));
        let b = world.spawn(LayerId::Level, tile_at(16.0, 464.0));
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 1);
        assert_eq!(world.entity(b).unwrap().position, Vec2::new(16.0, 464.0));
        assert_eq!(world.entity_count(), 2);
        assert!(world.block().is_none());
    }

    #[test]
    fn block_defaults() {
        let data = BlockData {
            spawn_cell: TilePos { row: 2, col: 1 },
        };
        let block = Entity::block(data, Vec2::new(16.0, 432.0), texture(), 16.0);
        assert!(block.dynamic);
        assert!(block.is_block());
        assert_eq!(block.facing, 1.0);
        assert_eq!(block.collider, Rect::square(16.0));
        assert_eq!(block.world_collider(), Rect::new(16.0, 432.0, 16.0, 16.0));
        assert_eq!(block.sprite_cell(), 0);
    }

    #[test]
    fn advance_time_counts_frames() {
        let mut world = World::new(Rect::new(0.0, 0.0, 640.0, 480.0), 16.0);
        world.advance_time(0.5);
        world.advance_time(0.25);
        assert_eq!(world.frame(), 2);
        assert_eq!(world.elapsed_secs(), 0.75);
    }
}
