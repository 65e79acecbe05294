use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::{
    input::KeyboardState,
    snapshot::SnapshotWriter,
    systems::{AnimationSystem, CameraSystem, GroundingSystem, MovementSystem},
    world::{World, WorldSnapshot},
};

pub struct EngineSettings {
    pub level_name: String,
    pub snapshot_interval_frames: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Animation, movement, grounding, camera: the per-frame entity update.
    pub fn with_standard_systems(self) -> Self {
        self.with_system(AnimationSystem::new())
            .with_system(MovementSystem::new())
            .with_system(GroundingSystem::new())
            .with_system(CameraSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_frames,
            ),
            settings: self.settings,
        }
    }
}

pub struct Engine {
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    /// Runs every system once over `world`, then advances the frame counter.
    pub fn step(&mut self, world: &mut World, dt: f32, keys: &dyn KeyboardState) -> Result<()> {
        let ctx = SystemContext {
            frame: world.frame(),
            dt,
            level_name: &self.settings.level_name,
            keys,
        };
        for system in &mut self.systems {
            system.run(&ctx, world)?;
        }
        world.advance_time(dt);
        if let Some(path) = self
            .snapshot_writer
            .maybe_write(world, &self.settings.level_name)?
        {
            debug!(frame = world.frame(), path = %path.display(), "snapshot written");
        }
        Ok(())
    }

    pub fn run(
        &mut self,
        world: &mut World,
        frames: u64,
        dt: f32,
        keys: &dyn KeyboardState,
    ) -> Result<()> {
        self.run_with_hook(world, frames, dt, keys, |_| {})
    }

    pub fn run_with_hook<F>(
        &mut self,
        world: &mut World,
        frames: u64,
        dt: f32,
        keys: &dyn KeyboardState,
        mut hook: F,
    ) -> Result<()>
    where
        F: FnMut(WorldSnapshot),
    {
        for _ in 0..frames {
            self.step(world, dt, keys)?;
            hook(world.snapshot(&self.settings.level_name));
        }
        Ok(())
    }

    pub fn level_name(&self) -> &str {
        &self.settings.level_name
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }
}

pub struct SystemContext<'a> {
    pub frame: u64,
    pub dt: f32,
    pub level_name: &'a str,
    pub keys: &'a dyn KeyboardState,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World) -> Result<()>;
}
