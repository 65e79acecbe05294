use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    world::World,
};

/// Keeps the viewport horizontally centred on the controllable block.
pub struct CameraSystem;

impl CameraSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CameraSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CameraSystem {
    fn name(&self) -> &str {
        "camera"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        let half_tile = world.tile_size() / 2.0;
        if let Some(block_x) = world.block().map(|block| block.position.x) {
            world.viewport.x = (block_x + half_tile) - world.viewport.w / 2.0;
        }
        Ok(())
    }
}
