//! Platform-facing collaborators: keyboard state, window events, tick clock.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Key {
    Left,
    Right,
    ToggleDebug,
}

/// Polled keyboard query.
pub trait KeyboardState {
    fn is_down(&self, key: Key) -> bool;
}

/// Keyboard whose held keys are set by the caller.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeyboard {
    held: HashSet<Key>,
}

impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            held: keys.into_iter().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }
}

impl KeyboardState for ScriptedKeyboard {
    fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

/// Horizontal intent in {-1, 0, +1}; opposite keys cancel.
pub fn direction_input(keys: &dyn KeyboardState) -> f32 {
    let mut direction = 0.0;
    if keys.is_down(Key::Left) {
        direction -= 1.0;
    }
    if keys.is_down(Key::Right) {
        direction += 1.0;
    }
    direction
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Quit,
    Resized { width: u32, height: u32 },
    KeyDown(Key),
    KeyUp(Key),
}

pub trait EventSource {
    fn poll(&mut self) -> Option<Event>;
}

/// Replays queued events, one batch per frame, then asks to quit after a
/// fixed number of frames.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    frames: VecDeque<Vec<Event>>,
    pending: VecDeque<Event>,
    quit_after: Option<u64>,
    polled_frames: u64,
}

impl ScriptedEvents {
    pub fn quit_after(frames: u64) -> Self {
        Self {
            quit_after: Some(frames),
            ..Self::default()
        }
    }

    /// Events delivered on the next frame that has none queued yet.
    pub fn then(mut self, events: Vec<Event>) -> Self {
        self.frames.push_back(events);
        self
    }

    /// Marks the start of a frame. The app loop calls this once before it
    /// drains `poll`.
    pub fn begin_frame(&mut self) {
        if let Some(limit) = self.quit_after {
            if self.polled_frames >= limit {
                self.pending.push_back(Event::Quit);
            }
        }
        if let Some(batch) = self.frames.pop_front() {
            self.pending.extend(batch);
        }
        self.polled_frames += 1;
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }
}

/// Monotonic millisecond tick source.
pub trait Clock {
    fn ticks_ms(&self) -> u64;
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn ticks_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: std::cell::Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl Clock for ManualClock {
    fn ticks_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Turns clock ticks into per-frame delta seconds.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    previous_ms: u64,
}

impl FrameTimer {
    pub fn start(clock: &dyn Clock) -> Self {
        Self {
            previous_ms: clock.ticks_ms(),
        }
    }

    pub fn tick(&mut self, clock: &dyn Clock) -> f32 {
        let now = clock.ticks_ms();
        let dt = now.saturating_sub(self.previous_ms) as f32 / 1000.0;
        self.previous_ms = now;
        dt
    }
}
