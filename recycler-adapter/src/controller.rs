use recycler::{
    ConfigError, ConsecutiveNumbers, Dimensions, EngagedIndicesTracker, Layout, LayoutManager,
    LayoutUpdate, RenderStackManager, ViewabilityConfig, ViewabilityManager,
    ViewableItemsChangedCallback,
};

use crate::velocity::VelocityTracker;

/// The items a controller renders. Indices are positions in the current
/// dataset; stable ids must be unique and survive reordering.
pub trait DataSource {
    fn item_count(&self) -> usize;
    fn stable_id(&self, index: usize) -> String;
    fn item_type(&self, index: usize) -> String;
}

/// What one scroll update changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollUpdate {
    /// The engaged range moved; the host should re-render from the stack.
    pub engaged_changed: bool,
    /// The last item is engaged; a paginating host should fetch more.
    pub reached_window_end: bool,
}

/// Wires the engine's pieces together for a scrolling session.
///
/// The host feeds it scroll offsets, measurements, and clock ticks; the
/// controller keeps layout, engaged range, render stack, and viewability in
/// agreement and tells the host when the render stack needs re-rendering.
pub struct Controller<D: DataSource> {
    data: D,
    layout: Box<dyn LayoutManager>,
    engaged: EngagedIndicesTracker,
    render_stack: RenderStackManager,
    viewability: ViewabilityManager,
    velocity: VelocityTracker,
    last_offset: f64,
}

impl<D: DataSource> Controller<D> {
    pub fn new(data: D, layout: Box<dyn LayoutManager>, now_ms: u64) -> Self {
        Self {
            data,
            layout,
            engaged: EngagedIndicesTracker::new(),
            render_stack: RenderStackManager::default(),
            viewability: ViewabilityManager::new(),
            velocity: VelocityTracker::new(now_ms),
            last_offset: 0.0,
        }
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Mutates the dataset. The caller must follow up with `refresh` so the
    /// render stack and viewability catch up with the new items.
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub fn engaged_indices(&self) -> ConsecutiveNumbers {
        self.engaged.engaged_indices()
    }

    pub fn visible_indices(&self) -> ConsecutiveNumbers {
        self.engaged.compute_visible_indices(self.layout.as_ref())
    }

    pub fn layout_size(&self) -> Dimensions {
        self.layout.get_layout_size()
    }

    pub fn get_layout(&mut self, index: usize) -> Option<Layout> {
        if index >= self.data.item_count() {
            return None;
        }
        Some(self.layout.get_layout(index))
    }

    /// The current render stack, keyed by slot in creation order.
    pub fn render_stack(
        &self,
    ) -> &std::collections::BTreeMap<recycler::RenderKey, recycler::KeyEntry> {
        self.render_stack.render_stack()
    }

    pub fn set_draw_distance(&mut self, draw_distance: f64) {
        self.engaged.set_draw_distance(draw_distance);
    }

    pub fn set_disable_recycling(&mut self, disable: bool) {
        self.render_stack.disable_recycling = disable;
    }

    pub fn add_viewability_config(
        &mut self,
        config: ViewabilityConfig,
        callback: ViewableItemsChangedCallback,
    ) -> Result<(), ConfigError> {
        self.viewability.add_config(config, callback)
    }

    /// Handles a scroll event from the host.
    pub fn on_scroll(&mut self, offset: f64, now_ms: u64) -> ScrollUpdate {
        let horizontal = self.layout.is_horizontal();
        let velocity =
            self.velocity
                .compute_velocity(offset, self.last_offset, horizontal, now_ms);
        self.last_offset = offset;
        self.viewability.record_interaction();

        let changed =
            self.engaged
                .update_scroll_offset(offset, Some(velocity), self.layout.as_ref());
        if changed.is_some() {
            self.sync_render_stack();
        }
        self.update_viewability(now_ms);

        ScrollUpdate {
            engaged_changed: changed.is_some(),
            reached_window_end: self.reached_window_end(),
        }
    }

    /// Applies item measurements reported by mounted views, then brings the
    /// engaged range and render stack up to date.
    pub fn apply_measurements(&mut self, updates: &[LayoutUpdate], now_ms: u64) -> bool {
        self.layout.modify_layout(updates, self.data.item_count());
        self.resync(now_ms)
    }

    /// Recomputes everything for the current dataset and offset. Call after
    /// construction and after mutating the dataset through `data_mut`;
    /// grows or shrinks the layout to the current item count.
    pub fn refresh(&mut self, now_ms: u64) -> bool {
        self.layout.modify_layout(&[], self.data.item_count());
        self.resync(now_ms)
    }

    /// Marks that a render pass is starting, for offset projection timing.
    pub fn on_render_start(&mut self, now_ms: u64) {
        self.engaged.render_time_tracker_mut().start_tracking(now_ms);
    }

    pub fn on_render_complete(&mut self, now_ms: u64) {
        self.engaged
            .render_time_tracker_mut()
            .mark_render_complete(now_ms);
    }

    /// Advances timing-driven state: momentum end and viewability dwell.
    /// Returns true when momentum ended on this tick.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.viewability.tick(now_ms);
        self.velocity.poll_momentum_end(now_ms)
    }

    fn resync(&mut self, now_ms: u64) -> bool {
        let changed = self
            .engaged
            .update_scroll_offset(self.last_offset, None, self.layout.as_ref())
            .is_some();
        self.sync_render_stack();
        self.update_viewability(now_ms);
        changed
    }

    fn sync_render_stack(&mut self) {
        let data = &self.data;
        self.render_stack.sync(
            &|index| data.stable_id(index),
            &|index| data.item_type(index),
            self.engaged.engaged_indices(),
            data.item_count(),
        );
    }

    fn update_viewability(&mut self, now_ms: u64) {
        let horizontal = self.layout.is_horizontal();
        let window = self.layout.get_window_size();
        let viewport = if horizontal {
            window.width
        } else {
            window.height
        };
        let candidates = self.engaged.engaged_indices();
        let item_count = self.data.item_count();
        let layout = &mut self.layout;
        self.viewability.update_viewable_items(
            horizontal,
            self.last_offset,
            viewport,
            &mut |index| {
                if index < item_count {
                    Some(layout.get_layout(index))
                } else {
                    None
                }
            },
            &candidates,
            now_ms,
        );
    }

    fn reached_window_end(&self) -> bool {
        let item_count = self.data.item_count();
        item_count > 0 && self.engaged.engaged_indices().last() == Some(item_count - 1)
    }
}
