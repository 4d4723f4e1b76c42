use std::sync::Arc;

use crate::AverageWindow;
use crate::ConsecutiveNumbers;

/// Fallback main-axis size estimate used before any item has been measured.
pub const DEFAULT_ITEM_SIZE_ESTIMATE: f64 = 200.0;

/// Number of measurements the size estimator averages over.
const ESTIMATE_WINDOW_CAPACITY: usize = 20;

/// Small tolerance applied when checking whether an item fits a row, so
/// accumulated floating-point error in column widths never forces a
/// spurious row break.
pub(crate) const ROW_FIT_EPSILON: f64 = 0.9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-index layout record, owned exclusively by a layout manager.
///
/// `height` is the intrinsic (measured or estimated) size; `min_height`
/// carries the row-matching floor in grids. Consumers positioning content
/// should use [`Layout::effective_height`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Column units this item occupies. 0 is valid: the item renders but
    /// consumes no column width.
    pub span: u32,
    pub is_width_measured: bool,
    pub is_height_measured: bool,
    pub min_height: f64,
    pub enforced_width: bool,
}

impl Layout {
    /// Rendered height: the intrinsic height, raised to the row-matching
    /// floor when one applies.
    pub fn effective_height(&self) -> f64 {
        self.height.max(self.min_height)
    }

    pub(crate) fn main_start(&self, horizontal: bool) -> f64 {
        if horizontal { self.x } else { self.y }
    }

    pub(crate) fn main_size(&self, horizontal: bool) -> f64 {
        if horizontal {
            self.width
        } else {
            self.effective_height()
        }
    }
}

/// A measured item size reported back by the host after mount.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutUpdate {
    pub index: usize,
    pub dimensions: Dimensions,
}

impl LayoutUpdate {
    pub fn new(index: usize, width: f64, height: f64) -> Self {
        Self {
            index,
            dimensions: Dimensions::new(width, height),
        }
    }
}

/// Span/size override for a single item, returned by value from
/// [`LayoutParams::override_item_layout`] so no shared mutable state leaks
/// across the host boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpanSizeHint {
    /// Column units to occupy; `None` means the default of 1. `Some(0)` is
    /// honored as-is.
    pub span: Option<u32>,
    /// Main-axis size to assume until the item is measured.
    pub size: Option<f64>,
}

pub type OverrideItemLayout = Arc<dyn Fn(usize) -> SpanSizeHint + Send + Sync>;

/// Configuration shared by all layout managers.
pub struct LayoutParams {
    pub window_size: Dimensions,
    pub horizontal: bool,
    pub max_columns: u32,
    /// Masonry only: place items in the shortest column instead of strictly
    /// sequentially.
    pub optimize_item_arrangement: bool,
    pub override_item_layout: Option<OverrideItemLayout>,
    /// Grid only: force every item in a row to the tallest item's height.
    /// When disabled items keep their own height and only the y-advance of
    /// the next row uses the row maximum.
    pub match_heights_with_neighbours: bool,
}

impl LayoutParams {
    pub fn new(window_size: Dimensions) -> Self {
        Self {
            window_size,
            horizontal: false,
            max_columns: 1,
            optimize_item_arrangement: false,
            override_item_layout: None,
            match_heights_with_neighbours: true,
        }
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn with_max_columns(mut self, max_columns: u32) -> Self {
        self.max_columns = max_columns;
        self
    }

    pub fn with_optimize_item_arrangement(mut self, optimize: bool) -> Self {
        self.optimize_item_arrangement = optimize;
        self
    }

    pub fn with_override_item_layout(
        mut self,
        f: impl Fn(usize) -> SpanSizeHint + Send + Sync + 'static,
    ) -> Self {
        self.override_item_layout = Some(Arc::new(f));
        self
    }

    pub fn with_match_heights_with_neighbours(mut self, match_heights: bool) -> Self {
        self.match_heights_with_neighbours = match_heights;
        self
    }
}

impl Clone for LayoutParams {
    fn clone(&self) -> Self {
        Self {
            window_size: self.window_size,
            horizontal: self.horizontal,
            max_columns: self.max_columns,
            optimize_item_arrangement: self.optimize_item_arrangement,
            override_item_layout: self.override_item_layout.clone(),
            match_heights_with_neighbours: self.match_heights_with_neighbours,
        }
    }
}

impl core::fmt::Debug for LayoutParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutParams")
            .field("window_size", &self.window_size)
            .field("horizontal", &self.horizontal)
            .field("max_columns", &self.max_columns)
            .field("optimize_item_arrangement", &self.optimize_item_arrangement)
            .field(
                "match_heights_with_neighbours",
                &self.match_heights_with_neighbours,
            )
            .finish_non_exhaustive()
    }
}

/// Owns per-index layout rectangles and decides where each item goes.
///
/// Implementations must keep positions monotonically non-decreasing along
/// the scroll axis within each row/column group so windowing queries can
/// binary search, and must recompute incrementally: a size change at index
/// `i` may only touch layouts at `i`'s row/column and after.
pub trait LayoutManager {
    /// Layout for `index`, synthesized from the running size estimate if the
    /// item has never been measured. Indices at or past the current item
    /// count get a fresh estimated record, never a stale neighbor.
    fn get_layout(&mut self, index: usize) -> Layout;

    /// Applies measured sizes and grows/shrinks to `item_count`, then
    /// relayouts the affected suffix.
    fn modify_layout(&mut self, updates: &[LayoutUpdate], item_count: usize);

    /// Removes the given indices and relayouts from the smallest one.
    fn delete_layout(&mut self, indices: &[usize]);

    /// Indices whose rectangle intersects `[range_start, range_end]` along
    /// the scroll axis, ascending.
    fn get_visible_layouts(&self, range_start: f64, range_end: f64) -> ConsecutiveNumbers;

    /// Total content extent.
    fn get_layout_size(&self) -> Dimensions;

    fn get_window_size(&self) -> Dimensions;

    fn is_horizontal(&self) -> bool;

    fn layout_count(&self) -> usize;

    /// Applies new params; recomputes only when the bounded size or column
    /// count actually changed, and resets the size estimator when it did
    /// (the old sample population no longer represents the new regime).
    fn update_layout_params(&mut self, params: LayoutParams);
}

/// State common to the concrete layout managers.
pub(crate) struct LayoutStore {
    pub layouts: Vec<Layout>,
    pub params: LayoutParams,
    pub size_estimates: AverageWindow,
}

impl LayoutStore {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            layouts: Vec::new(),
            size_estimates: AverageWindow::with_start_value(
                ESTIMATE_WINDOW_CAPACITY,
                DEFAULT_ITEM_SIZE_ESTIMATE,
            ),
            params,
        }
    }

    pub fn reset_size_estimates(&mut self) {
        self.size_estimates =
            AverageWindow::with_start_value(ESTIMATE_WINDOW_CAPACITY, DEFAULT_ITEM_SIZE_ESTIMATE);
    }

    pub fn max_columns(&self) -> u32 {
        self.params.max_columns.max(1)
    }

    /// Width of the area rows/columns are packed into.
    pub fn bounded_size(&self) -> f64 {
        self.params.window_size.width
    }

    pub fn column_width(&self) -> f64 {
        self.bounded_size() / self.max_columns() as f64
    }

    pub fn span_hint(&self, index: usize) -> SpanSizeHint {
        match &self.params.override_item_layout {
            Some(f) => f(index),
            None => SpanSizeHint::default(),
        }
    }

    /// Span for `index`, clamped to the column count. 0 is passed through.
    pub fn span_for(&self, index: usize) -> u32 {
        self.span_hint(index)
            .span
            .unwrap_or(1)
            .min(self.max_columns())
    }

    /// Main-axis estimate for an unmeasured item: the override's size hint
    /// when present, otherwise the running average of measured sizes.
    pub fn estimated_main_size(&self, index: usize) -> f64 {
        self.span_hint(index)
            .size
            .unwrap_or_else(|| self.size_estimates.current_value())
    }

    pub fn record_measured_size(&mut self, main_size: f64) {
        self.size_estimates.add_value(main_size);
    }

    pub fn synthesize(&self, index: usize) -> Layout {
        let span = self.span_for(index);
        if self.params.horizontal {
            Layout {
                x: 0.0,
                y: 0.0,
                width: self.estimated_main_size(index),
                height: self.params.window_size.height,
                span,
                is_width_measured: false,
                is_height_measured: false,
                min_height: 0.0,
                enforced_width: false,
            }
        } else {
            Layout {
                x: 0.0,
                y: 0.0,
                width: self.column_width() * span as f64,
                height: self.estimated_main_size(index),
                span,
                is_width_measured: true,
                is_height_measured: false,
                min_height: 0.0,
                enforced_width: true,
            }
        }
    }

    /// Grows the store so `index` is addressable; returns the index layouts
    /// were appended from, if any.
    pub fn ensure_index(&mut self, index: usize) -> Option<usize> {
        if index < self.layouts.len() {
            return None;
        }
        let first_new = self.layouts.len();
        for i in first_new..=index {
            let synthesized = self.synthesize(i);
            self.layouts.push(synthesized);
        }
        Some(first_new)
    }

    /// Visible range over the full, main-axis-sorted layout array.
    pub fn visible_range_sorted(&self, range_start: f64, range_end: f64) -> ConsecutiveNumbers {
        let horizontal = self.params.horizontal;
        let first = find_first_visible_index(&self.layouts, range_start, horizontal);
        let last = find_last_visible_index(&self.layouts, range_end, horizontal);
        match (first, last) {
            (Some(first), Some(last)) if first <= last => {
                ConsecutiveNumbers::from_bounds(first, last)
            }
            _ => ConsecutiveNumbers::EMPTY,
        }
    }
}

/// Binary search over layouts sorted by main-axis position.
///
/// `find_first`: first layout whose end reaches `threshold`; otherwise the
/// last layout whose start is at or before `threshold`.
fn binary_search_visible_index(
    layouts: &[Layout],
    threshold: f64,
    horizontal: bool,
    find_first: bool,
) -> Option<usize> {
    let mut left = 0isize;
    let mut right = layouts.len() as isize - 1;
    let mut visible_index = None;

    while left <= right {
        let mid = (left + right) / 2;
        let layout = &layouts[mid as usize];
        let position = layout.main_start(horizontal);
        let size = layout.main_size(horizontal);

        if find_first {
            if position >= threshold || position + size >= threshold {
                visible_index = Some(mid as usize);
                right = mid - 1;
            } else {
                left = mid + 1;
            }
        } else if position <= threshold {
            visible_index = Some(mid as usize);
            left = mid + 1;
        } else {
            right = mid - 1;
        }
    }

    visible_index
}

pub(crate) fn find_first_visible_index(
    layouts: &[Layout],
    threshold: f64,
    horizontal: bool,
) -> Option<usize> {
    binary_search_visible_index(layouts, threshold, horizontal, true)
}

pub(crate) fn find_last_visible_index(
    layouts: &[Layout],
    threshold: f64,
    horizontal: bool,
) -> Option<usize> {
    binary_search_visible_index(layouts, threshold, horizontal, false)
}
