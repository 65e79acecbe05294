use std::path::PathBuf;

use tetrisdl::{
    engine::{Engine, EngineBuilder, EngineSettings},
    input::{Event, Key, ManualClock, ScriptedEvents, ScriptedKeyboard},
    level::Level,
    render::{DrawCommand, Flip, NullSurface, RecordingSurface, COLLIDER_COLOR, SENSOR_COLOR},
    resources::{HeadlessTextures, Resources},
    snapshot::read_snapshot,
    world::{LayerId, World},
    App,
};

fn settings(level: &Level, interval: u64, dir: PathBuf) -> EngineSettings {
    EngineSettings {
        level_name: level.name.clone(),
        snapshot_interval_frames: interval,
        snapshot_dir: dir,
    }
}

fn setup(level: &Level) -> (Resources, World, Engine) {
    let resources = Resources::load(HeadlessTextures::new(16, 16), &level.assets).unwrap();
    let world = level.build_world(&resources).unwrap();
    let engine = EngineBuilder::new(settings(level, 0, PathBuf::from("unused")))
        .with_standard_systems()
        .build();
    (resources, world, engine)
}

/// Block at row 3 directly on the stone at row 4.
fn resting_level() -> Level {
    let mut level = Level::first_level();
    level.grids.main[2] = "0".repeat(level.map.cols);
    level.grids.main[3] = format!("01{}", "0".repeat(level.map.cols - 2));
    level
}

#[test]
fn standard_systems_run_in_update_order() {
    let level = Level::first_level();
    let (_resources, _world, engine) = setup(&level);
    assert_eq!(
        engine.system_names(),
        vec!["animation", "movement", "grounding", "camera"]
    );
}

#[test]
fn holding_right_accelerates_then_clamps() {
    let level = Level::first_level();
    let (_resources, mut world, mut engine) = setup(&level);
    let keys = ScriptedKeyboard::holding([Key::Right]);

    engine.step(&mut world, 0.25, &keys).unwrap();
    let block = world.block().unwrap();
    assert_eq!(block.velocity.x, 75.0);
    assert_eq!(block.position.x, 16.0 + 75.0 * 0.25);
    assert_eq!(block.facing, 1.0);

    engine.step(&mut world, 0.25, &keys).unwrap();
    let block = world.block().unwrap();
    assert_eq!(block.velocity.x, 100.0);
    assert_eq!(block.position.x, 34.75 + 25.0);
    assert_eq!(block.position.y, 432.0);
    assert_eq!(world.frame(), 2);
}

#[test]
fn reversing_input_flips_facing_and_clamps_to_new_direction() {
    let level = Level::first_level();
    let (_resources, mut world, mut engine) = setup(&level);
    world.block_mut().unwrap().velocity.x = 100.0;

    let keys = ScriptedKeyboard::holding([Key::Left]);
    engine.step(&mut world, 0.25, &keys).unwrap();
    let block = world.block().unwrap();
    assert_eq!(block.facing, -1.0);
    assert_eq!(block.velocity.x, 25.0);

    let idle = ScriptedKeyboard::new();
    engine.step(&mut world, 0.25, &idle).unwrap();
    assert_eq!(world.block().unwrap().facing, -1.0);
}

#[test]
fn camera_centres_on_block() {
    let level = Level::first_level();
    let (_resources, mut world, mut engine) = setup(&level);
    engine
        .step(&mut world, 0.25, &ScriptedKeyboard::holding([Key::Right]))
        .unwrap();
    assert_eq!(world.viewport.x, (34.75 + 8.0) - 320.0);
}

#[test]
fn grounded_flag_tracks_resting_block() {
    let level = resting_level();
    let (_resources, mut world, mut engine) = setup(&level);
    engine.step(&mut world, 0.016, &ScriptedKeyboard::new()).unwrap();
    assert!(world.block().unwrap().grounded);
    assert!(!world.layer(LayerId::Level)[0].grounded);

    let level = Level::first_level();
    let (_resources, mut world, mut engine) = setup(&level);
    engine.step(&mut world, 0.016, &ScriptedKeyboard::new()).unwrap();
    assert!(!world.block().unwrap().grounded);
}

#[test]
fn static_tiles_never_move() {
    let level = Level::first_level();
    let (_resources, mut world, mut engine) = setup(&level);
    engine
        .run(&mut world, 30, 0.016, &ScriptedKeyboard::holding([Key::Left]))
        .unwrap();
    let tile = &world.layer(LayerId::Level)[0];
    assert_eq!(tile.position.to_array(), [16.0, 464.0]);
    assert_eq!(tile.velocity.to_array(), [0.0, 0.0]);
}

#[test]
fn runs_are_deterministic() {
    let level = Level::first_level();
    let keys = ScriptedKeyboard::holding([Key::Right]);
    let mut runs = Vec::new();
    for _ in 0..2 {
        let (_resources, mut world, mut engine) = setup(&level);
        let mut frames = Vec::new();
        engine
            .run_with_hook(&mut world, 20, 0.016, &keys, |snapshot| {
                frames.push(serde_json::to_string(&snapshot).unwrap());
            })
            .unwrap();
        assert_eq!(frames.len(), 20);
        runs.push(frames);
    }
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn snapshots_are_written_on_interval() {
    let temp = tempfile::tempdir().unwrap();
    let level = Level::first_level();
    let resources = Resources::load(HeadlessTextures::new(16, 16), &level.assets).unwrap();
    let mut world = level.build_world(&resources).unwrap();
    let mut engine = EngineBuilder::new(settings(&level, 5, temp.path().to_path_buf()))
        .with_standard_systems()
        .build();
    engine
        .run(&mut world, 10, 0.016, &ScriptedKeyboard::new())
        .unwrap();

    let dir = temp.path().join(&level.name);
    let mut names: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["frame_000005.json", "frame_000010.json"]);

    let file = read_snapshot(dir.join("frame_000010.json")).unwrap();
    assert_eq!(file.world.frame, 10);
    assert_eq!(file.world.block_index, Some(0));
    assert_eq!(file.world.entities.len(), 2);
}

#[test]
fn app_loop_toggles_debug_overlay_and_flips_sprite() {
    let level = Level::first_level();
    let mut app = App::new(
        &level,
        HeadlessTextures::new(16, 16),
        settings(&level, 0, PathBuf::from("unused")),
    )
    .unwrap();
    let clock = ManualClock::new();
    let mut events = ScriptedEvents::quit_after(2).then(vec![Event::KeyUp(Key::ToggleDebug)]);
    let keys = ScriptedKeyboard::holding([Key::Left]);
    let mut surface = RecordingSurface::new();

    let summary = app
        .run(&clock, &mut events, &keys, &mut surface, |events| {
            clock.advance(16);
            events.begin_frame();
        })
        .unwrap();
    assert_eq!(summary.frames, 2);
    assert!(app.debug_mode());

    let frame = surface.last_frame();
    assert!(matches!(frame[0], DrawCommand::Clear(_)));
    assert!(frame
        .iter()
        .any(|c| matches!(c, DrawCommand::Fill(_, color) if *color == COLLIDER_COLOR)));
    assert!(frame
        .iter()
        .any(|c| matches!(c, DrawCommand::Fill(_, color) if *color == SENSOR_COLOR)));

    let block_texture = app.resources().set.block;
    let block_draw = frame.iter().find_map(|c| match c {
        DrawCommand::Texture { texture, flip, .. } if *texture == block_texture => Some(*flip),
        _ => None,
    });
    assert_eq!(block_draw, Some(Flip::Horizontal));
}

#[test]
fn headless_loop_keeps_no_per_frame_draw_state() {
    let level = Level::first_level();
    let mut app = App::new(
        &level,
        HeadlessTextures::new(16, 16),
        settings(&level, 0, PathBuf::from("unused")),
    )
    .unwrap();
    let clock = ManualClock::new();
    let mut events = ScriptedEvents::quit_after(5_000).then(vec![Event::KeyUp(Key::ToggleDebug)]);
    let keys = ScriptedKeyboard::holding([Key::Right]);
    let mut surface = NullSurface::new();

    let summary = app
        .run(&clock, &mut events, &keys, &mut surface, |events| {
            clock.advance(16);
            events.begin_frame();
        })
        .unwrap();
    assert_eq!(summary.frames, 5_000);
    assert_eq!(surface.frames_presented, 5_000);
    assert_eq!(std::mem::size_of_val(&surface), std::mem::size_of::<u64>());
}
