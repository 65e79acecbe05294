//! Frame-timed sprite cycling.

use serde::{Deserialize, Serialize};

/// Repeating countdown. `step` reports when the length is reached and keeps
/// the overshoot so long frames do not drift the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    length: f32,
    time: f32,
    timed_out: bool,
}

impl Timer {
    pub fn new(length: f32) -> Self {
        Self {
            length,
            time: 0.0,
            timed_out: false,
        }
    }

    pub fn step(&mut self, dt: f32) -> bool {
        self.time += dt;
        if self.length > 0.0 && self.time >= self.length {
            self.time %= self.length;
            self.timed_out = true;
            return true;
        }
        false
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
        self.timed_out = false;
    }
}

/// Cycles through `frame_count` sprite cells once every `cycle_duration`
/// seconds. The frame index is derived lazily from elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    frame_count: u32,
    timer: Timer,
}

impl Animation {
    pub fn new(frame_count: u32, cycle_duration: f32) -> Self {
        Self {
            frame_count,
            timer: Timer::new(cycle_duration),
        }
    }

    pub fn step(&mut self, dt: f32) {
        self.timer.step(dt);
    }

    pub fn current_frame(&self) -> u32 {
        let length = self.timer.length();
        if self.frame_count == 0 || length <= 0.0 {
            return 0;
        }
        let frame_duration = length / self.frame_count as f32;
        let index = (self.timer.time() / frame_duration).floor() as u32;
        index % self.frame_count
    }

    /// True once at least one full cycle has played since the last reset.
    pub fn is_done(&self) -> bool {
        self.timer.is_timed_out()
    }

    pub fn reset(&mut self) {
        self.timer.reset();
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn cycle_duration(&self) -> f32 {
        self.timer.length()
    }

    pub fn elapsed(&self) -> f32 {
        self.timer.time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_first_frame() {
        let anim = Animation::new(4, 1.0);
        assert_eq!(anim.current_frame(), 0);
        assert!(!anim.is_done());
    }

    #[test]
    fn advances_one_frame_per_slice() {
        let mut anim = Animation::new(4, 1.0);
        let mut frames = Vec::new();
        for _ in 0..4 {
            frames.push(anim.current_frame());
            anim.step(0.25);
        }
        assert_eq!(frames, vec![0, 1, 2, 3]);
    }

    #[test]
    fn frame_sequence_repeats_every_cycle() {
        let mut anim = Animation::new(4, 1.0);
        let mut first = Vec::new();
        for _ in 0..8 {
            first.push(anim.current_frame());
            anim.step(0.125);
        }
        assert!(anim.is_done());
        let mut second = Vec::new();
        for _ in 0..8 {
            second.push(anim.current_frame());
            anim.step(0.125);
        }
        assert_eq!(first, second);
        assert_eq!(first[0], 0);
    }

    #[test]
    fn reset_restarts_cycle() {
        let mut anim = Animation::new(2, 0.5);
        anim.step(0.375);
        assert_eq!(anim.current_frame(), 1);
        anim.reset();
        assert_eq!(anim.current_frame(), 0);
        assert_eq!(anim.elapsed(), 0.0);
    }

    #[test]
    fn degenerate_animation_stays_on_frame_zero() {
        let mut anim = Animation::new(0, 1.0);
        anim.step(0.5);
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn timer_keeps_overshoot() {
        let mut timer = Timer::new(1.0);
        assert!(!timer.step(0.75));
        assert!(timer.step(0.5));
        assert_eq!(timer.time(), 0.25);
        assert!(timer.is_timed_out());
    }
}
