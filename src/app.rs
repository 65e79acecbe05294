//! Application context and frame loop.
//!
//! [`App`] owns everything the loop touches: textures, world, engine, and the
//! debug flag. Nothing is global; dropping the app releases the textures.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    engine::{Engine, EngineBuilder, EngineSettings},
    input::{Clock, Event, EventSource, FrameTimer, Key, KeyboardState},
    level::Level,
    render::{draw_world, RenderSurface},
    resources::{Resources, TextureProvider},
    world::World,
};

pub struct App {
    // Drop order: textures are released after the world that references them.
    world: World,
    engine: Engine,
    resources: Resources,
    debug_mode: bool,
    window_size: (u32, u32),
    running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed_secs: f64,
}

impl App {
    pub fn new(
        level: &Level,
        provider: impl TextureProvider + 'static,
        settings: EngineSettings,
    ) -> Result<Self> {
        let resources = Resources::load(provider, &level.assets)
            .with_context(|| format!("Failed to load assets for level '{}'", level.name))?;
        let world = level
            .build_world(&resources)
            .with_context(|| format!("Failed to build level '{}'", level.name))?;
        let engine = EngineBuilder::new(settings).with_standard_systems().build();
        Ok(Self {
            world,
            engine,
            resources,
            debug_mode: false,
            window_size: (level.display.window_width, level.display.window_height),
            running: true,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("quit requested");
                self.running = false;
            }
            Event::Resized { width, height } => {
                self.window_size = (width, height);
            }
            Event::KeyUp(Key::ToggleDebug) => {
                self.debug_mode = !self.debug_mode;
                debug!(debug_mode = self.debug_mode, "debug overlay toggled");
            }
            Event::KeyDown(_) | Event::KeyUp(_) => {}
        }
    }

    /// Update and draw one frame with the given delta time.
    pub fn frame(
        &mut self,
        dt: f32,
        keys: &dyn KeyboardState,
        surface: &mut dyn RenderSurface,
    ) -> Result<()> {
        self.engine.step(&mut self.world, dt, keys)?;
        draw_world(surface, &self.world, &self.resources, self.debug_mode);
        Ok(())
    }

    /// Poll events, update, render, until a quit event arrives.
    /// `before_poll` runs at the top of each iteration, before events are
    /// drained; headless drivers use it to advance scripted sources.
    pub fn run<E, F>(
        &mut self,
        clock: &dyn Clock,
        events: &mut E,
        keys: &dyn KeyboardState,
        surface: &mut dyn RenderSurface,
        mut before_poll: F,
    ) -> Result<RunSummary>
    where
        E: EventSource,
        F: FnMut(&mut E),
    {
        let mut timer = FrameTimer::start(clock);
        let start_frame = self.world.frame();
        info!(level = self.engine.level_name(), "frame loop started");
        while self.running {
            before_poll(events);
            let dt = timer.tick(clock);
            while let Some(event) = events.poll() {
                self.handle_event(event);
            }
            if !self.running {
                break;
            }
            self.frame(dt, keys, surface)?;
        }
        let summary = RunSummary {
            frames: self.world.frame() - start_frame,
            elapsed_secs: self.world.elapsed_secs(),
        };
        info!(
            frames = summary.frames,
            elapsed_secs = summary.elapsed_secs,
            "frame loop finished"
        );
        Ok(summary)
    }
}
