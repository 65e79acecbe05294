mod animation;
mod camera;
mod grounding;
mod movement;

pub use animation::AnimationSystem;
pub use camera::CameraSystem;
pub use grounding::{ground_sensor, is_grounded_scan, GroundingSystem, SENSOR_INSET};
pub use movement::{integrate, MovementSystem};
