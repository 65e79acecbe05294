use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    world::{LayerId, World},
};

pub struct AnimationSystem;

impl AnimationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AnimationSystem {
    fn name(&self) -> &str {
        "animation"
    }

    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()> {
        for layer in LayerId::ALL {
            for entity in world.layer_mut(layer) {
                if let Some(animation) = entity.active_animation_mut() {
                    animation.step(ctx.dt);
                }
            }
        }
        Ok(())
    }
}
