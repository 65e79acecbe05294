use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    input::direction_input,
    world::{Entity, LayerId, World},
};

/// Applies one frame of directional input to `entity`.
///
/// Velocity integrates `input * acceleration`; when the horizontal speed then
/// exceeds `max_speed_x` it is clamped to `input * max_speed_x`, i.e. toward
/// the commanded direction rather than toward zero. Position is a plain Euler
/// step on the resulting velocity.
pub fn integrate(entity: &mut Entity, input: f32, dt: f32) {
    if input != 0.0 {
        entity.facing = input;
    }
    entity.velocity += input * entity.acceleration * dt;
    if entity.velocity.x.abs() > entity.max_speed_x {
        entity.velocity.x = input * entity.max_speed_x;
    }
    entity.position += entity.velocity * dt;
}

pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        let input = direction_input(ctx.keys);
        for layer in LayerId::ALL {
            for entity in world.layer_mut(layer) {
                // Only blocks take keyboard input.
                let entity_input = if entity.is_block() { input } else { 0.0 };
                integrate(entity, entity_input, ctx.dt);
            }
        }
        Ok(())
    }
}
