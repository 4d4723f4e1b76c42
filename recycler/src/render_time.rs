use crate::AverageWindow;

const RENDER_TIME_WINDOW_CAPACITY: usize = 5;
const MIN_RENDER_TIME_MS: f64 = 16.0;
const MAX_RENDER_TIME_MS: f64 = 32.0;

/// Tracks how long render passes take, averaged over a short window.
///
/// The engaged-indices tracker multiplies scroll velocity by this average to
/// project where the viewport will be once the next render pass lands. The
/// reported average is clamped to one or two frames at 60fps so a single
/// pathological pass cannot fling the projection off into the distance.
#[derive(Clone, Debug)]
pub struct RenderTimeTracker {
    render_times: AverageWindow,
    timer_started_at: Option<u64>,
}

impl Default for RenderTimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTimeTracker {
    pub fn new() -> Self {
        Self {
            render_times: AverageWindow::new(RENDER_TIME_WINDOW_CAPACITY),
            timer_started_at: None,
        }
    }

    /// Marks the start of a render pass. Calling this again before
    /// `mark_render_complete` restarts the measurement.
    pub fn start_tracking(&mut self, now_ms: u64) {
        self.timer_started_at = Some(now_ms);
    }

    /// Records the elapsed time since `start_tracking`, if one is pending.
    pub fn mark_render_complete(&mut self, now_ms: u64) {
        if let Some(started_at) = self.timer_started_at.take() {
            let elapsed = now_ms.saturating_sub(started_at) as f64;
            self.render_times.add_value(elapsed);
        }
    }

    /// Average render time in ms, clamped to `[16, 32]`. Returns the lower
    /// bound until at least one pass has been recorded.
    pub fn average_render_time_ms(&self) -> f64 {
        if self.render_times.sample_count() == 0 {
            return MIN_RENDER_TIME_MS;
        }
        self.render_times
            .current_value()
            .clamp(MIN_RENDER_TIME_MS, MAX_RENDER_TIME_MS)
    }
}
