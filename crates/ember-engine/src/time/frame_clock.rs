use std::time::Duration;

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,

    /// Frames counted over the last full second.
    pub fps: f32,
}

/// Per-loop frame clock.
///
/// Timestamps are durations since an arbitrary fixed origin, so the clock can
/// be driven from any monotonic source. [`FrameClock::tick`] reads the
/// platform clock; [`FrameClock::tick_at`] takes the timestamp explicitly.
///
/// Delta time is clamped so a debugger pause or minimized window does not
/// hand downstream code a huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Duration>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,

    window_start: Option<Duration>,
    window_frames: u32,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
            window_start: None,
            window_frames: 0,
            fps: 0.0,
        }
    }

    /// Forgets the previous timestamp; the next tick reports the minimum dt.
    pub fn reset(&mut self) {
        self.last = None;
        self.window_start = None;
        self.window_frames = 0;
    }

    /// Advances the clock using the platform's monotonic time.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(platform_now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Duration) -> FrameTime {
        let dt = match self.last {
            Some(last) => now.saturating_sub(last).clamp(self.dt_min, self.dt_max),
            None => self.dt_min,
        };
        self.last = Some(now);

        let start = *self.window_start.get_or_insert(now);
        self.window_frames += 1;
        if now.saturating_sub(start) >= FPS_WINDOW {
            self.fps = self.window_frames as f32;
            self.window_frames = 0;
            self.window_start = Some(now);
        }

        let ft = FrameTime { dt: dt.as_secs_f32(), frame_index: self.frame_index, fps: self.fps };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    /// Latest once-per-second FPS sample; 0 until a second has passed.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Number of ticks so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn platform_now() -> Duration {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed()
}

#[cfg(target_arch = "wasm32")]
fn platform_now() -> Duration {
    Duration::from_secs_f64(js_sys::Date::now().max(0.0) / 1000.0)
}
