pub mod animation;
pub mod app;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod level;
pub mod render;
pub mod resources;
pub mod snapshot;
pub mod spatial;
pub mod systems;
pub mod tilemap;
pub mod world;

pub use app::{App, RunSummary};
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use level::{Level, LevelLoader};
pub use tilemap::LoadError;
pub use world::{Entity, EntityKind, World};
