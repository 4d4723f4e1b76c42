use crate::ConsecutiveNumbers;
use crate::layout::{Dimensions, Layout, LayoutManager, LayoutParams, LayoutStore, LayoutUpdate};

/// Places items into independent columns, each stacking downward from its
/// own running height. Columns are only vertical; `horizontal` is ignored.
///
/// Placement is sequential by default (a cursor walks the columns left to
/// right), or height-balancing when `optimize_item_arrangement` is set. An
/// item of span `s >= 2` straddles `s` adjacent columns and levels them; an
/// item of span 0 overlays the cursor column without advancing its height.
pub struct MasonryLayoutManager {
    store: LayoutStore,
    column_heights: Vec<f64>,
    /// Item indices per column, ascending by index and by y.
    column_items: Vec<Vec<usize>>,
    current_column: usize,
}

impl MasonryLayoutManager {
    pub fn new(params: LayoutParams) -> Self {
        let columns = params.max_columns.max(1) as usize;
        Self {
            store: LayoutStore::new(params),
            column_heights: vec![0.0; columns],
            column_items: vec![Vec::new(); columns],
            current_column: 0,
        }
    }

    fn column_count(&self) -> usize {
        self.store.max_columns() as usize
    }

    fn reset_columns(&mut self) {
        let columns = self.column_count();
        self.column_heights = vec![0.0; columns];
        self.column_items = vec![Vec::new(); columns];
        self.current_column = 0;
    }

    /// Rolls column state back to what it was before item `start` was
    /// placed, so placement can be replayed from there.
    fn rewind_columns_to(&mut self, start: usize) {
        for items in &mut self.column_items {
            while items.last().is_some_and(|&index| index >= start) {
                items.pop();
            }
        }
        for (column, items) in self.column_items.iter().enumerate() {
            let mut height = 0.0f64;
            for &index in items {
                let layout = &self.store.layouts[index];
                if layout.span >= 1 {
                    height = height.max(layout.y + layout.effective_height());
                }
            }
            self.column_heights[column] = height;
        }

        // The cursor after the last retained span-advancing item.
        let column_width = self.store.column_width();
        let columns = self.column_count();
        self.current_column = 0;
        for index in (0..start).rev() {
            let layout = &self.store.layouts[index];
            if layout.span >= 1 {
                let column = (layout.x / column_width).round() as usize;
                self.current_column = (column + layout.span as usize) % columns;
                break;
            }
        }
    }

    /// Start column minimizing the placement y for a `span`-wide item.
    fn best_start_column(&self, span: usize) -> usize {
        let columns = self.column_count();
        let mut best_column = 0;
        let mut best_y = f64::INFINITY;
        for start in 0..=columns - span {
            let y = self.column_heights[start..start + span]
                .iter()
                .fold(0.0f64, |acc, &h| acc.max(h));
            if y < best_y {
                best_y = y;
                best_column = start;
            }
        }
        best_column
    }

    fn place(&mut self, index: usize) {
        let columns = self.column_count();
        let column_width = self.store.column_width();
        let span = (self.store.span_for(index) as usize).min(columns);
        let optimize = self.store.params.optimize_item_arrangement;

        if span == 0 {
            let column = self.current_column.min(columns - 1);
            let layout = &mut self.store.layouts[index];
            layout.span = 0;
            layout.width = column_width;
            layout.x = column_width * column as f64;
            layout.y = self.column_heights[column];
            self.column_items[column].push(index);
            return;
        }

        let start_column = if optimize {
            self.best_start_column(span)
        } else {
            if self.current_column + span > columns {
                self.current_column = 0;
            }
            self.current_column
        };

        let y = self.column_heights[start_column..start_column + span]
            .iter()
            .fold(0.0f64, |acc, &h| acc.max(h));

        let layout = &mut self.store.layouts[index];
        layout.span = span as u32;
        layout.width = column_width * span as f64;
        layout.x = column_width * start_column as f64;
        layout.y = y;
        let advance = y + layout.effective_height();

        for column in start_column..start_column + span {
            self.column_heights[column] = advance;
            self.column_items[column].push(index);
        }
        if !optimize {
            self.current_column = (start_column + span) % columns;
        }
    }

    fn recompute_from(&mut self, start_index: usize) {
        let len = self.store.layouts.len();
        let start_index = start_index.min(len);
        if start_index == 0 || self.column_heights.len() != self.column_count() {
            self.reset_columns();
            for index in 0..len {
                self.place(index);
            }
            return;
        }
        self.rewind_columns_to(start_index);
        for index in start_index..len {
            self.place(index);
        }
    }
}

impl LayoutManager for MasonryLayoutManager {
    fn get_layout(&mut self, index: usize) -> Layout {
        if let Some(first_new) = self.store.ensure_index(index) {
            self.recompute_from(first_new);
        }
        self.store.layouts[index]
    }

    fn modify_layout(&mut self, updates: &[LayoutUpdate], item_count: usize) {
        let mut min_recompute = item_count;
        if self.store.layouts.len() > item_count {
            self.store.layouts.truncate(item_count);
            self.rewind_columns_to(item_count);
        } else if self.store.layouts.len() < item_count {
            min_recompute = self.store.layouts.len();
            self.store.ensure_index(item_count - 1);
        }

        for update in updates {
            if update.index >= item_count {
                continue;
            }
            if !self.store.layouts[update.index].is_height_measured {
                self.store.record_measured_size(update.dimensions.height);
            }
            let layout = &mut self.store.layouts[update.index];
            layout.height = update.dimensions.height;
            layout.is_height_measured = true;
            layout.is_width_measured = true;
            min_recompute = min_recompute.min(update.index);
        }

        if min_recompute < self.store.layouts.len() {
            self.recompute_from(min_recompute);
        }
        rtrace!(
            updates = updates.len(),
            item_count,
            min_recompute,
            "masonry modify_layout"
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
        let min_affected = *sorted.last().unwrap_or(&0);
        self.recompute_from(min_affected);
    }

    fn get_visible_layouts(&self, range_start: f64, range_end: f64) -> ConsecutiveNumbers {
        let mut first: Option<usize> = None;
        let mut last: Option<usize> = None;

        for items in &self.column_items {
            let column_first = first_at_or_after(&self.store.layouts, items, range_start);
            let column_last = last_at_or_before(&self.store.layouts, items, range_end);
            if let (Some(f), Some(l)) = (column_first, column_last) {
                if f <= l {
                    first = Some(first.map_or(f, |cur| cur.min(f)));
                    last = Some(last.map_or(l, |cur| cur.max(l)));
                }
            }
        }

        match (first, last) {
            (Some(first), Some(last)) => ConsecutiveNumbers::from_bounds(first, last),
            _ => ConsecutiveNumbers::EMPTY,
        }
    }

    fn get_layout_size(&self) -> Dimensions {
        let height = self
            .column_heights
            .iter()
            .fold(0.0f64, |acc, &h| acc.max(h));
        Dimensions::new(self.store.bounded_size(), height)
    }

    fn get_window_size(&self) -> Dimensions {
        self.store.params.window_size
    }

    fn is_horizontal(&self) -> bool {
        false
    }

    fn layout_count(&self) -> usize {
        self.store.layouts.len()
    }

    fn update_layout_params(&mut self, params: LayoutParams) {
        let regime_changed = self.store.params.window_size != params.window_size
            || self.store.max_columns() != params.max_columns.max(1);
        let arrangement_changed =
            self.store.params.optimize_item_arrangement != params.optimize_item_arrangement;
        self.store.params = params;

        if regime_changed {
            rdebug!("masonry layout regime changed, resetting size estimates");
            self.store.reset_size_estimates();
            for layout in &mut self.store.layouts {
                layout.is_width_measured = false;
                layout.enforced_width = false;
            }
        }
        if regime_changed || arrangement_changed {
            self.recompute_from(0);
        }
    }
}

/// First item in a column (items ascending by y) whose bottom edge reaches
/// `threshold`.
fn first_at_or_after(layouts: &[Layout], items: &[usize], threshold: f64) -> Option<usize> {
    let mut left = 0isize;
    let mut right = items.len() as isize - 1;
    let mut found = None;
    while left <= right {
        let mid = (left + right) / 2;
        let layout = &layouts[items[mid as usize]];
        if layout.y + layout.effective_height() >= threshold {
            found = Some(items[mid as usize]);
            right = mid - 1;
        } else {
            left = mid + 1;
        }
    }
    found
}

/// Last item in a column whose top edge is at or before `threshold`.
fn last_at_or_before(layouts: &[Layout], items: &[usize], threshold: f64) -> Option<usize> {
    let mut left = 0isize;
    let mut right = items.len() as isize - 1;
    let mut found = None;
    while left <= right {
        let mid = (left + right) / 2;
        let layout = &layouts[items[mid as usize]];
        if layout.y <= threshold {
            found = Some(items[mid as usize]);
            left = mid + 1;
        } else {
            right = mid - 1;
        }
    }
    found
}
