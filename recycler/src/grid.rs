use crate::ConsecutiveNumbers;
use crate::layout::{
    Dimensions, Layout, LayoutManager, LayoutParams, LayoutStore, LayoutUpdate, ROW_FIT_EPSILON,
};

/// Packs items left-to-right into rows of total width at most the bounded
/// size; an item of span `s` occupies `s` column units of width
/// `bounded_size / max_columns`. With one column this degenerates to a
/// plain vertical list, and with `horizontal` set items run along the x
/// axis instead (single lane, measured widths).
pub struct GridLayoutManager {
    store: LayoutStore,
}

impl GridLayoutManager {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            store: LayoutStore::new(params),
        }
    }

    /// Walks back to the first item of the row containing `index`.
    fn locate_row_head(&self, index: usize) -> usize {
        let mut i = index.min(self.store.layouts.len().saturating_sub(1));
        while i > 0 && self.store.layouts[i].x != 0.0 {
            i -= 1;
        }
        i
    }

    /// Applies row-height matching to a completed row and returns the row's
    /// tallest intrinsic height, which is the y-advance to the next row.
    fn finish_row(&mut self, row_start: usize, row_end: usize) -> f64 {
        let mut row_max = 0.0f64;
        for i in row_start..=row_end {
            row_max = row_max.max(self.store.layouts[i].height);
        }

        if self.store.params.match_heights_with_neighbours {
            // Raise every member to the row max via min_height. The tallest
            // keeps no floor so a smaller re-measure can lower the row.
            let mut tallest_marked = false;
            for i in row_start..=row_end {
                let layout = &mut self.store.layouts[i];
                if !tallest_marked && layout.height >= row_max {
                    layout.min_height = 0.0;
                    tallest_marked = true;
                } else {
                    layout.min_height = row_max;
                }
            }
        } else {
            for i in row_start..=row_end {
                self.store.layouts[i].min_height = 0.0;
            }
        }
        row_max
    }

    fn recompute_horizontal(&mut self, start_index: usize) {
        let len = self.store.layouts.len();
        for i in start_index..len {
            let x = if i == 0 {
                0.0
            } else {
                let prev = &self.store.layouts[i - 1];
                prev.x + prev.width
            };
            let layout = &mut self.store.layouts[i];
            layout.x = x;
            layout.y = 0.0;
        }
    }

    /// Replays placement from the head of the row preceding `start_index`;
    /// rows before that point cannot be affected by the change.
    fn recompute_from(&mut self, start_index: usize) {
        let len = self.store.layouts.len();
        if len == 0 {
            return;
        }
        let start_index = start_index.min(len - 1);

        if self.store.params.horizontal {
            self.recompute_horizontal(start_index);
            return;
        }

        // The changed item may now fit the previous row, so replay from
        // that row's head.
        let replay_start = self.locate_row_head(start_index.saturating_sub(1));
        let bounded = self.store.bounded_size();
        let column_width = self.store.column_width();

        let (mut x, mut y) = if replay_start == 0 {
            (0.0, 0.0)
        } else {
            let head = &self.store.layouts[replay_start];
            (head.x, head.y)
        };
        let mut row_start = replay_start;

        for i in replay_start..len {
            let span = self.store.span_for(i);
            let layout = &mut self.store.layouts[i];
            if layout.span != span || !layout.is_width_measured || !layout.enforced_width {
                layout.span = span;
                layout.width = column_width * span as f64;
                layout.is_width_measured = true;
                layout.enforced_width = true;
            }
            let width = layout.width;

            if x + width > bounded + ROW_FIT_EPSILON && i > row_start {
                let row_max = self.finish_row(row_start, i - 1);
                y += row_max;
                x = 0.0;
                row_start = i;
            }

            let layout = &mut self.store.layouts[i];
            layout.x = x;
            layout.y = y;
            x += width;
        }
        self.finish_row(row_start, len - 1);
    }
}

impl LayoutManager for GridLayoutManager {
    fn get_layout(&mut self, index: usize) -> Layout {
        if let Some(first_new) = self.store.ensure_index(index) {
            self.recompute_from(first_new);
        }
        self.store.layouts[index]
    }

    fn modify_layout(&mut self, updates: &[LayoutUpdate], item_count: usize) {
        let mut min_recompute = item_count;
        let shrunk = self.store.layouts.len() > item_count;
        if shrunk {
            self.store.layouts.truncate(item_count);
        } else if self.store.layouts.len() < item_count {
            min_recompute = self.store.layouts.len();
            self.store.ensure_index(item_count - 1);
        }

        let horizontal = self.store.params.horizontal;
        for update in updates {
            if update.index >= item_count {
                rwarn!(index = update.index, "measurement for out-of-range index ignored");
                continue;
            }
            let first_measurement = {
                let layout = &self.store.layouts[update.index];
                if horizontal {
                    !layout.is_width_measured
                } else {
                    !layout.is_height_measured
                }
            };
            if first_measurement {
                let main = if horizontal {
                    update.dimensions.width
                } else {
                    update.dimensions.height
                };
                self.store.record_measured_size(main);
            }
            let layout = &mut self.store.layouts[update.index];
            if horizontal {
                layout.width = update.dimensions.width;
            }
            layout.height = update.dimensions.height;
            layout.is_height_measured = true;
            layout.is_width_measured = true;
            min_recompute = min_recompute.min(update.index);
        }

        if min_recompute < self.store.layouts.len() {
            self.recompute_from(min_recompute);
        } else if shrunk && !self.store.layouts.is_empty() {
            // Re-run row matching for the new final row.
            self.recompute_from(self.store.layouts.len() - 1);
        }
        rtrace!(
            updates = updates.len(),
            item_count,
            min_recompute,
            "grid modify_layout"
        );
    }

    fn delete_layout(&mut self, indices: &[usize]) {
        if indices.is_empty() || self.store.layouts.is_empty() {
            return;
        }
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        for &index in &sorted {
            if index < self.store.layouts.len() {
                self.store.layouts.remove(index);
            }
        }
        if !self.store.layouts.is_empty() {
            let min_affected = *sorted.last().unwrap_or(&0);
            self.recompute_from(min_affected);
        }
    }

    fn get_visible_layouts(&self, range_start: f64, range_end: f64) -> ConsecutiveNumbers {
        self.store.visible_range_sorted(range_start, range_end)
    }

    fn get_layout_size(&self) -> Dimensions {
        if self.store.layouts.is_empty() {
            return Dimensions::default();
        }
        let last_index = self.store.layouts.len() - 1;
        if self.store.params.horizontal {
            let last = &self.store.layouts[last_index];
            return Dimensions::new(last.x + last.width, self.store.params.window_size.height);
        }
        let row_start = self.locate_row_head(last_index);
        let row_y = self.store.layouts[row_start].y;
        let mut row_max = 0.0f64;
        for i in row_start..=last_index {
            row_max = row_max.max(self.store.layouts[i].effective_height());
        }
        Dimensions::new(self.store.bounded_size(), row_y + row_max)
    }

    fn get_window_size(&self) -> Dimensions {
        self.store.params.window_size
    }

    fn is_horizontal(&self) -> bool {
        self.store.params.horizontal
    }

    fn layout_count(&self) -> usize {
        self.store.layouts.len()
    }

    fn update_layout_params(&mut self, params: LayoutParams) {
        let regime_changed = self.store.params.window_size != params.window_size
            || self.store.max_columns() != params.max_columns.max(1)
            || self.store.params.horizontal != params.horizontal;
        let match_changed =
            self.store.params.match_heights_with_neighbours != params.match_heights_with_neighbours;
        self.store.params = params;

        if regime_changed {
            rdebug!("grid layout regime changed, resetting size estimates");
            self.store.reset_size_estimates();
            for layout in &mut self.store.layouts {
                layout.is_width_measured = false;
                layout.enforced_width = false;
            }
        }
        if (regime_changed || match_changed) && !self.store.layouts.is_empty() {
            self.recompute_from(0);
        }
    }
}
