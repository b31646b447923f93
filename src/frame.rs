use std::time::Instant;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the clock started
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Produces one `FrameInfo` per display refresh.
///
/// Time is passed in rather than read so callers (and tests) own the clock.
#[derive(Debug)]
pub struct FrameClock {
    frame_number: u64,
    start_time: Instant,
    last_frame_time: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Advance to `now` and describe the frame
    pub fn tick(&mut self, now: Instant) -> FrameInfo {
        let delta = now.saturating_duration_since(self.last_frame_time).as_secs_f32();
        let time = now.saturating_duration_since(self.start_time).as_secs_f32();

        let info = FrameInfo::new(self.frame_number, time, delta);

        self.frame_number += 1;
        self.last_frame_time = now;

        info
    }

    /// Restart timing at `now`, e.g. after the redraw loop was paused
    pub fn reset(&mut self, now: Instant) {
        self.frame_number = 0;
        self.start_time = now;
        self.last_frame_time = now;
    }
}

/// Rolling frames-per-second estimate, refreshed once per interval
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    interval: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(interval: f32) -> Self {
        Self {
            frames: 0,
            elapsed: 0.0,
            interval,
            fps: 0.0,
        }
    }

    pub fn record(&mut self, delta: f32) -> f32 {
        self.frames += 1;
        self.elapsed += delta;

        if self.elapsed >= self.interval {
            self.fps = self.frames as f32 / self.elapsed;
            log::debug!("FPS: {:.1}", self.fps);
            self.frames = 0;
            self.elapsed = 0.0;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);

        let first = clock.tick(start + Duration::from_millis(10));
        assert_eq!(first.number, 0);
        assert!((first.delta - 0.010).abs() < 1e-4);

        let second = clock.tick(start + Duration::from_millis(30));
        assert_eq!(second.number, 1);
        assert!((second.delta - 0.020).abs() < 1e-4);
        assert!((second.time - 0.030).abs() < 1e-4);
    }

    #[test]
    fn clock_resets() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        clock.tick(start + Duration::from_millis(50));

        let later = start + Duration::from_secs(2);
        clock.reset(later);
        let info = clock.tick(later);
        assert_eq!(info.number, 0);
        assert_eq!(info.delta, 0.0);
    }

    #[test]
    fn fps_counter_updates_per_interval() {
        let mut fps = FpsCounter::new(1.0);
        for _ in 0..3 {
            fps.record(0.25);
        }
        assert_eq!(fps.fps(), 0.0);
        assert_eq!(fps.record(0.25), 4.0);
    }
}
