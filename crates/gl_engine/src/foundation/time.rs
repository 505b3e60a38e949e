//! Frame timing utilities

/// Time information handed to components on every update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the application clock started
    pub total: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameTime {
    /// Create a frame time from explicit values
    pub fn new(total: f32, delta: f32) -> Self {
        Self { total, delta }
    }
}

/// Frame timer driven by an external clock (seconds as `f64`)
///
/// The window system owns the clock, so the timer only differences the
/// samples it is given.
#[derive(Debug, Default)]
pub struct Timer {
    start: Option<f64>,
    last: Option<f64>,
    frame_count: u64,
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the timer to `now` and return the time of this frame
    pub fn tick(&mut self, now: f64) -> FrameTime {
        let start = *self.start.get_or_insert(now);
        let delta = self.last.map_or(0.0, |last| (now - last).max(0.0));
        self.last = Some(now);
        self.frame_count += 1;
        FrameTime {
            total: (now - start) as f32,
            delta: delta as f32,
        }
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Summary produced by [`FpsCounter`] at the end of each window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsReport {
    /// Average frames per second over the window
    pub average: f32,
    /// Lowest instantaneous FPS seen
    pub min: f32,
    /// Highest instantaneous FPS seen
    pub max: f32,
}

/// Aggregates per-frame FPS over a fixed number of frames
#[derive(Debug)]
pub struct FpsCounter {
    window: u32,
    frames: u32,
    elapsed: f32,
    min: f32,
    max: f32,
}

impl FpsCounter {
    /// Create a counter that reports every `window` frames
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            elapsed: 0.0,
            min: f32::MAX,
            max: 0.0,
        }
    }

    /// Record a frame; returns a report once the window is full
    pub fn record(&mut self, delta: f32) -> Option<FpsReport> {
        if delta > 0.0 {
            let fps = 1.0 / delta;
            self.min = self.min.min(fps);
            self.max = self.max.max(fps);
        }
        self.elapsed += delta;
        self.frames += 1;

        if self.frames < self.window {
            return None;
        }

        let report = FpsReport {
            average: if self.elapsed > 0.0 { self.frames as f32 / self.elapsed } else { 0.0 },
            min: if self.min == f32::MAX { 0.0 } else { self.min },
            max: self.max,
        };
        *self = Self::new(self.window);
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_timer_first_tick_has_zero_delta() {
        let mut timer = Timer::new();
        let first = timer.tick(10.0);
        assert_eq!(first.total, 0.0);
        assert_eq!(first.delta, 0.0);

        let second = timer.tick(10.5);
        assert_relative_eq!(second.total, 0.5);
        assert_relative_eq!(second.delta, 0.5);
        assert_eq!(timer.frame_count(), 2);
    }

    #[test]
    fn test_fps_counter_reports_after_window() {
        let mut counter = FpsCounter::new(3);
        assert!(counter.record(0.5).is_none());
        assert!(counter.record(0.25).is_none());
        let report = counter.record(0.25).expect("window full");
        assert_relative_eq!(report.average, 3.0);
        assert_relative_eq!(report.min, 2.0);
        assert_relative_eq!(report.max, 4.0);
        assert!(counter.record(0.1).is_none());
    }
}
