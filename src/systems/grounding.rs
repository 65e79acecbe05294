use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    geometry::Rect,
    spatial::TileIndex,
    world::{Entity, EntityRef, World},
};

/// Total horizontal shrink of the ground sensor, split evenly between both
/// sides so a tile flush against the entity's side does not count as ground.
pub const SENSOR_INSET: f32 = 2.0;

/// One-pixel strip directly beneath the entity's collider, in world space.
pub fn ground_sensor(entity: &Entity) -> Rect {
    let collider = entity.world_collider();
    Rect::new(
        collider.x + SENSOR_INSET / 2.0,
        collider.bottom(),
        collider.w - SENSOR_INSET,
        1.0,
    )
}

fn touches_tile(world: &World, other: EntityRef, sensor: &Rect) -> bool {
    world
        .entity(other)
        .is_some_and(|tile| tile.is_static_tile() && tile.world_collider().intersects(sensor))
}

/// Grounded test against every static tile in the world, no index.
pub fn is_grounded_scan(world: &World, me: EntityRef) -> bool {
    let Some(entity) = world.entity(me) else {
        return false;
    };
    let sensor = ground_sensor(entity);
    world
        .entity_refs()
        .into_iter()
        .filter(|&other| other != me)
        .any(|other| touches_tile(world, other, &sensor))
}

/// Recomputes `grounded` for every entity. Static tiles are bucketed once per
/// frame and each sensor only tests tiles in the cells it covers.
pub struct GroundingSystem;

impl GroundingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GroundingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GroundingSystem {
    fn name(&self) -> &str {
        "grounding"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        // Read phase: no entity is written until every sensor is resolved.
        let view: &World = world;
        let index = TileIndex::build(view);
        let results: Vec<(EntityRef, bool)> = view
            .entity_refs()
            .into_iter()
            .filter_map(|me| view.entity(me).map(|entity| (me, ground_sensor(entity))))
            .map(|(me, sensor)| {
                let grounded = index
                    .query(&sensor)
                    .into_iter()
                    .filter(|&other| other != me)
                    .any(|other| touches_tile(view, other, &sensor));
                (me, grounded)
            })
            .collect();

        for (me, grounded) in results {
            if let Some(entity) = world.entity_mut(me) {
                entity.grounded = grounded;
            }
        }
        Ok(())
    }
}
