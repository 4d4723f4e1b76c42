use recycler::Velocity;

/// How long without a scroll update before momentum is considered over.
pub const MOMENTUM_END_DELAY_MS: u64 = 100;

/// Derives scroll velocity from successive offsets.
///
/// Hosts that already get velocity from their scroll events don't need
/// this; it exists for hosts that only report positions. Velocity is
/// distance over elapsed time, and momentum end is detected by polling:
/// call `poll_momentum_end` from the host's frame loop and it reports true
/// once no update has arrived for `MOMENTUM_END_DELAY_MS`.
pub struct VelocityTracker {
    last_update_ms: u64,
    velocity: Velocity,
    momentum_deadline_ms: Option<u64>,
}

impl VelocityTracker {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_update_ms: now_ms,
            velocity: Velocity::default(),
            momentum_deadline_ms: None,
        }
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Updates velocity from a new scroll offset. Elapsed time is clamped
    /// to at least 1ms so same-timestamp updates don't divide by zero.
    pub fn compute_velocity(
        &mut self,
        new_offset: f64,
        old_offset: f64,
        horizontal: bool,
        now_ms: u64,
    ) -> Velocity {
        let elapsed = now_ms.saturating_sub(self.last_update_ms).max(1) as f64;
        let main = (new_offset - old_offset) / elapsed;
        self.last_update_ms = now_ms;

        self.velocity = if horizontal {
            Velocity::new(main, 0.0)
        } else {
            Velocity::new(0.0, main)
        };
        self.momentum_deadline_ms = Some(now_ms + MOMENTUM_END_DELAY_MS);
        self.velocity
    }

    /// True exactly once when momentum has ended; velocity is zeroed.
    pub fn poll_momentum_end(&mut self, now_ms: u64) -> bool {
        let due = self
            .momentum_deadline_ms
            .is_some_and(|deadline| now_ms >= deadline);
        if !due {
            return false;
        }
        self.momentum_deadline_ms = None;
        self.last_update_ms = now_ms;
        self.velocity = Velocity::default();
        true
    }
}
