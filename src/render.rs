//! Turns world state into draw calls on a [`RenderSurface`].
//!
//! No graphics backend lives here. A windowing layer implements the trait;
//! [`RecordingSurface`] keeps the calls for tests and [`NullSurface`] drops
//! them for headless runs.

use crate::geometry::Rect;
use crate::resources::{Resources, TextureId};
use crate::world::{Entity, LayerId, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    None,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

pub const CLEAR_COLOR: Color = Color::rgba(20, 10, 30, 255);
pub const COLLIDER_COLOR: Color = Color::rgba(255, 0, 0, 150);
pub const SENSOR_COLOR: Color = Color::rgba(0, 0, 255, 150);

pub trait RenderSurface {
    fn clear(&mut self, color: Color);
    /// `src` slices the sprite sheet, `dst` is in screen space. `None` means
    /// the whole texture or the whole target respectively.
    fn draw_texture(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Option<Rect>,
        flip: Flip,
    );
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn present(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Texture {
        texture: TextureId,
        src: Option<Rect>,
        dst: Option<Rect>,
        flip: Flip,
    },
    Fill(Rect, Color),
    Present,
}

/// Surface that records calls; `frames_presented` counts `present` calls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    pub frames_presented: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands since the last `present`, or the whole last frame if the
    /// buffer ends with one.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let end = match self.commands.last() {
            Some(DrawCommand::Present) => self.commands.len() - 1,
            _ => self.commands.len(),
        };
        let start = self.commands[..end]
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Present))
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.commands[start..end]
    }
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_texture(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Option<Rect>,
        flip: Flip,
    ) {
        self.commands.push(DrawCommand::Texture {
            texture,
            src,
            dst,
            flip,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Fill(rect, color));
    }

    fn present(&mut self) {
        self.commands.push(DrawCommand::Present);
        self.frames_presented += 1;
    }
}

/// Surface that drops every draw and only counts frames. Used by headless
/// runs where nothing reads the output back.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub frames_presented: u64,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for NullSurface {
    fn clear(&mut self, _color: Color) {}

    fn draw_texture(
        &mut self,
        _texture: TextureId,
        _src: Option<Rect>,
        _dst: Option<Rect>,
        _flip: Flip,
    ) {
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Color) {}

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}

/// Strip under the collider shown by the debug overlay. Spans the full
/// collider width; the grounding test itself uses the inset sensor.
pub fn debug_sensor_rect(entity: &Entity) -> Rect {
    let collider = entity.world_collider();
    Rect::new(collider.x, collider.bottom(), collider.w, 1.0)
}

/// Draws one frame: backdrop, background decorations, gameplay layers,
/// foreground decorations, then debug overlays when enabled.
pub fn draw_world(
    surface: &mut dyn RenderSurface,
    world: &World,
    resources: &Resources,
    debug: bool,
) {
    surface.clear(CLEAR_COLOR);
    surface.draw_texture(resources.set.background, None, None, Flip::None);

    for tile in world.background() {
        draw_decoration(surface, world, resources, tile);
    }
    for layer in LayerId::ALL {
        for entity in world.layer(layer) {
            draw_entity(surface, world, entity, debug);
        }
    }
    for tile in world.foreground() {
        draw_decoration(surface, world, resources, tile);
    }

    surface.present();
}

fn draw_decoration(
    surface: &mut dyn RenderSurface,
    world: &World,
    resources: &Resources,
    tile: &Entity,
) {
    let (w, h) = resources
        .texture(tile.texture)
        .map(|info| (info.size.width as f32, info.size.height as f32))
        .unwrap_or((world.tile_size(), world.tile_size()));
    let dst = Rect::new(tile.position.x - world.viewport.x, tile.position.y, w, h);
    surface.draw_texture(tile.texture, None, Some(dst), Flip::None);
}

fn draw_entity(surface: &mut dyn RenderSurface, world: &World, entity: &Entity, debug: bool) {
    let size = world.tile_size();
    let camera_x = world.viewport.x;
    let src = Rect::new(entity.sprite_cell() as f32 * size, 0.0, size, size);
    let dst = Rect::new(entity.position.x - camera_x, entity.position.y, size, size);
    let flip = if entity.facing < 0.0 {
        Flip::Horizontal
    } else {
        Flip::None
    };
    surface.draw_texture(entity.texture, Some(src), Some(dst), flip);

    if debug {
        let collider = entity.world_collider();
        surface.fill_rect(
            Rect::new(collider.x - camera_x, collider.y, collider.w, collider.h),
            COLLIDER_COLOR,
        );
        let sensor = debug_sensor_rect(entity);
        surface.fill_rect(
            Rect::new(sensor.x - camera_x, sensor.y, sensor.w, sensor.h),
            SENSOR_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::resources::HeadlessTextures;

    fn fixture() -> (Resources, World) {
        let level = Level::first_level();
        let resources = Resources::load(HeadlessTextures::new(16, 16), &level.assets).unwrap();
        let world = level.build_world(&resources).unwrap();
        (resources, world)
    }

    #[test]
    fn debug_overlay_sensor_spans_collider_width() {
        let (resources, world) = fixture();
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &world, &resources, true);

        let block = world.block().unwrap();
        let sensor = debug_sensor_rect(block);
        assert_eq!(sensor, Rect::new(16.0, 448.0, 16.0, 1.0));
        let camera_x = world.viewport.x;
        let expected = Rect::new(sensor.x - camera_x, sensor.y, sensor.w, sensor.h);
        assert!(surface
            .last_frame()
            .contains(&DrawCommand::Fill(expected, SENSOR_COLOR)));
    }

    #[test]
    fn no_overlays_without_debug() {
        let (resources, world) = fixture();
        let mut surface = RecordingSurface::new();
        draw_world(&mut surface, &world, &resources, false);
        assert!(!surface
            .last_frame()
            .iter()
            .any(|c| matches!(c, DrawCommand::Fill(..))));
        assert_eq!(surface.frames_presented, 1);
    }

    #[test]
    fn null_surface_only_counts_frames() {
        let (resources, world) = fixture();
        let mut surface = NullSurface::new();
        for _ in 0..1_000 {
            draw_world(&mut surface, &world, &resources, true);
        }
        assert_eq!(surface.frames_presented, 1_000);
        assert_eq!(std::mem::size_of::<NullSurface>(), std::mem::size_of::<u64>());
    }
}
