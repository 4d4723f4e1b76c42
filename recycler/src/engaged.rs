use crate::ConsecutiveNumbers;
use crate::layout::LayoutManager;
use crate::render_time::RenderTimeTracker;

/// Extra distance, in pixels, rendered beyond the viewport on each side.
pub const DEFAULT_DRAW_DISTANCE: f64 = 250.0;

const VELOCITY_HISTORY_SIZE: usize = 5;

/// Fraction of the total buffer placed behind the viewport when scrolling
/// toward larger offsets; the remainder leads the scroll direction.
const TRAILING_BUFFER_RATIO: f64 = 0.3;

/// Scroll velocity in px/ms along both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Decides which item indices deserve to be mounted for the current scroll
/// position.
///
/// The engaged range is the visible range extended by `draw_distance` on
/// both sides, with the budget skewed toward the scroll direction: a
/// majority vote over recent velocity samples picks the direction, and the
/// leading side gets 70% of the total buffer. Buffer that cannot be spent at
/// a list boundary is redistributed to the opposite side. When projection is
/// enabled the viewport is first advanced by `velocity * average render
/// time` so the range is computed for where the list will be when the
/// render pass completes, not where it was when the scroll event fired.
pub struct EngagedIndicesTracker {
    scroll_offset: f64,
    draw_distance: f64,
    enable_offset_projection: bool,
    engaged_indices: ConsecutiveNumbers,
    velocity_history: [f64; VELOCITY_HISTORY_SIZE],
    velocity_index: usize,
    render_time_tracker: RenderTimeTracker,
}

impl Default for EngagedIndicesTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl EngagedIndicesTracker {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0.0,
            draw_distance: DEFAULT_DRAW_DISTANCE,
            enable_offset_projection: true,
            engaged_indices: ConsecutiveNumbers::EMPTY,
            velocity_history: [0.0; VELOCITY_HISTORY_SIZE],
            velocity_index: 0,
            render_time_tracker: RenderTimeTracker::new(),
        }
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    pub fn draw_distance(&self) -> f64 {
        self.draw_distance
    }

    pub fn set_draw_distance(&mut self, draw_distance: f64) {
        self.draw_distance = draw_distance.max(0.0);
    }

    pub fn set_enable_offset_projection(&mut self, enabled: bool) {
        self.enable_offset_projection = enabled;
    }

    /// The last range produced by `update_scroll_offset`.
    pub fn engaged_indices(&self) -> ConsecutiveNumbers {
        self.engaged_indices
    }

    pub fn render_time_tracker_mut(&mut self) -> &mut RenderTimeTracker {
        &mut self.render_time_tracker
    }

    /// Indices intersecting the raw viewport, with no buffer or projection.
    pub fn compute_visible_indices(&self, layout_manager: &dyn LayoutManager) -> ConsecutiveNumbers {
        let viewport = viewport_size(layout_manager);
        layout_manager.get_visible_layouts(self.scroll_offset, self.scroll_offset + viewport)
    }

    /// Recomputes the engaged range for a new scroll offset.
    ///
    /// Returns the new range when it differs from the previous one, `None`
    /// when the scroll did not change which indices are engaged.
    pub fn update_scroll_offset(
        &mut self,
        offset: f64,
        velocity: Option<Velocity>,
        layout_manager: &dyn LayoutManager,
    ) -> Option<ConsecutiveNumbers> {
        self.scroll_offset = offset;

        let horizontal = layout_manager.is_horizontal();
        if let Some(velocity) = velocity {
            let main = if horizontal { velocity.x } else { velocity.y };
            if main != 0.0 {
                self.velocity_history[self.velocity_index] = main;
                self.velocity_index = (self.velocity_index + 1) % VELOCITY_HISTORY_SIZE;
            }
        }

        let viewport = viewport_size(layout_manager);
        let content_size = if horizontal {
            layout_manager.get_layout_size().width
        } else {
            layout_manager.get_layout_size().height
        };

        let offset = if self.enable_offset_projection {
            let projected = offset
                + self.median_velocity() * self.render_time_tracker.average_render_time_ms();
            projected.clamp(0.0, (content_size - viewport).max(0.0))
        } else {
            offset
        };

        let viewport_start = offset;
        let viewport_end = offset + viewport;

        // Majority vote over recent samples; ties scroll forward.
        let mut forward_votes = 0usize;
        let mut backward_votes = 0usize;
        for &sample in &self.velocity_history {
            if sample > 0.0 {
                forward_votes += 1;
            } else if sample < 0.0 {
                backward_votes += 1;
            }
        }
        let scrolling_backward = backward_votes > forward_votes;

        let total_buffer = self.draw_distance * 2.0;
        let before_ratio = if scrolling_backward {
            1.0 - TRAILING_BUFFER_RATIO
        } else {
            TRAILING_BUFFER_RATIO
        };
        let buffer_before = (total_buffer * before_ratio).ceil();
        let buffer_after = (total_buffer * (1.0 - before_ratio)).ceil();

        // Buffer that runs off a boundary is spent on the other side.
        let mut extended_start = (viewport_start - buffer_before).max(0.0);
        let unspent_before = (buffer_before - viewport_start).max(0.0);
        let mut extended_end = viewport_end + buffer_after + unspent_before;
        if extended_end > content_size {
            let unspent_after = extended_end - content_size;
            extended_end = content_size;
            extended_start = (extended_start - unspent_after).max(0.0);
        }

        let indices = layout_manager.get_visible_layouts(extended_start, extended_end);
        if indices == self.engaged_indices {
            return None;
        }
        rtrace!(
            start = indices.start_index,
            end = indices.end_index,
            offset,
            "engaged range changed"
        );
        self.engaged_indices = indices;
        Some(indices)
    }

    fn median_velocity(&self) -> f64 {
        let mut samples = self.velocity_history;
        samples.sort_unstable_by(|a, b| a.total_cmp(b));
        samples[VELOCITY_HISTORY_SIZE / 2]
    }
}

fn viewport_size(layout_manager: &dyn LayoutManager) -> f64 {
    let window = layout_manager.get_window_size();
    if layout_manager.is_horizontal() {
        window.width
    } else {
        window.height
    }
}
