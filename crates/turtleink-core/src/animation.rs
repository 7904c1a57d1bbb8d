//! Animation stepping for segment draws.
//!
//! An animated segment is split into steps. Each step is drawn atomically
//! under the window lock; between steps the lock is released and the
//! window's [`FrameTicker`] runs, which is where repaints become visible and
//! where other implements get their turn.

use kurbo::Point;
use std::time::Duration;

/// Speeds at or above this draw every segment in a single step.
pub const MAX_SPEED: u32 = 10;

/// Default speed for new implements.
pub const DEFAULT_SPEED: u32 = MAX_SPEED;

/// Number of steps used to draw a segment of `length` at `speed`.
///
/// Speed 0 and speeds from [`MAX_SPEED`] up use one step. Speeds below that
/// advance `2^(speed - 1)` pixels per step, so the count never decreases as
/// the segment grows and never increases as the speed goes up.
pub fn step_count(length: f64, speed: u32) -> usize {
    if speed == 0 || speed >= MAX_SPEED || !length.is_finite() {
        return 1;
    }
    let per_step = 2f64.powi(speed as i32 - 1);
    let steps = (length.abs() / per_step).ceil();
    (steps as usize).max(1)
}

/// One step of an animated segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Start of this sub-segment.
    pub from: Point,
    /// End of this sub-segment.
    pub to: Point,
    /// Distance from the segment start to `from`.
    pub travelled: f64,
}

/// Iterator over the steps of a segment.
///
/// Steps are evenly spaced and the last one ends exactly at the target, so
/// no drift accumulates.
#[derive(Debug, Clone)]
pub struct SegmentSteps {
    start: Point,
    end: Point,
    steps: usize,
    index: usize,
}

impl SegmentSteps {
    /// Steps for a segment from `start` to `end` at the given speed.
    pub fn new(start: Point, end: Point, speed: u32) -> Self {
        Self {
            start,
            end,
            steps: step_count(start.distance(end), speed),
            index: 0,
        }
    }

    /// Total number of steps.
    pub fn len(&self) -> usize {
        self.steps
    }

    /// Always false; a segment has at least one step.
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    fn point_at(&self, index: usize) -> Point {
        if index >= self.steps {
            self.end
        } else if index == 0 {
            self.start
        } else {
            self.start.lerp(self.end, index as f64 / self.steps as f64)
        }
    }
}

impl Iterator for SegmentSteps {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.index >= self.steps {
            return None;
        }
        let from = self.point_at(self.index);
        let to = self.point_at(self.index + 1);
        self.index += 1;
        Some(Step {
            from,
            to,
            travelled: self.start.distance(from),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SegmentSteps {}

/// Drives the pause between animation steps.
///
/// Called with no lock held.
pub trait FrameTicker: Send + Sync {
    /// Wait for the next frame.
    fn tick(&self);
}

/// Ticker that sleeps for a fixed interval, or just yields when the
/// interval is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    interval: Duration,
}

impl FrameClock {
    /// Create a clock with the given frame interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl FrameTicker for FrameClock {
    fn tick(&self) {
        if self.interval.is_zero() {
            std::thread::yield_now();
        } else {
            std::thread::sleep(self.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_speeds_use_one_step() {
        assert_eq!(step_count(500.0, 0), 1);
        assert_eq!(step_count(500.0, MAX_SPEED), 1);
        assert_eq!(step_count(500.0, 42), 1);
    }

    #[test]
    fn test_step_count_per_speed() {
        assert_eq!(step_count(100.0, 1), 100);
        assert_eq!(step_count(100.0, 2), 50);
        assert_eq!(step_count(100.0, 4), 13);
        assert_eq!(step_count(0.0, 3), 1);
    }

    #[test]
    fn test_step_count_monotonic() {
        for speed in 0..=12 {
            let mut previous = 0;
            for length in [0.0, 0.5, 1.0, 7.0, 33.0, 100.0, 257.0, 1000.0] {
                let steps = step_count(length, speed);
                assert!(steps >= previous, "length {} speed {}", length, speed);
                previous = steps;
            }
        }
        for length in [1.0, 50.0, 300.0, 2000.0] {
            let mut previous = usize::MAX;
            for speed in 1..=12 {
                let steps = step_count(length, speed);
                assert!(steps <= previous, "length {} speed {}", length, speed);
                previous = steps;
            }
        }
    }

    #[test]
    fn test_steps_end_exactly_at_target() {
        let start = Point::new(0.3, -1.7);
        let end = Point::new(97.1, 13.9);
        let steps: Vec<Step> = SegmentSteps::new(start, end, 2).collect();
        assert!(steps.len() > 1);
        assert_eq!(steps.first().map(|s| s.from), Some(start));
        assert_eq!(steps.last().map(|s| s.to), Some(end));
    }

    #[test]
    fn test_steps_are_contiguous() {
        let steps: Vec<Step> = SegmentSteps::new(Point::ZERO, Point::new(40.0, 0.0), 3).collect();
        assert_eq!(steps.len(), 10);
        for pair in steps.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        assert!((steps[5].travelled - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_interval_clock_returns() {
        FrameClock::default().tick();
    }
}
