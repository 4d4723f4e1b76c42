//! A headless recycling and windowing engine for virtualized lists.
//!
//! For scroll-session utilities (velocity tracking, the orchestrating
//! controller), see the `recycler-adapter` crate.
//!
//! This crate focuses on the core algorithms needed to drive a recycling
//! list view at interactive frame rates: incremental grid and masonry
//! layout over estimated-then-measured item sizes, engaged index tracking
//! with velocity-skewed buffers and offset projection, render-key recycling
//! with stable-id affinity, and viewability evaluation with dwell timing.
//!
//! It is UI-agnostic. A host view layer is expected to provide:
//! - viewport size (width/height) and scroll offset
//! - item measurements as views mount and resize
//! - a monotonic clock, passed as `now_ms` where timing matters
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod average_window;
mod consecutive;
mod engaged;
mod error;
mod grid;
mod layout;
mod masonry;
mod render_stack;
mod render_time;
mod viewability;


pub use average_window::AverageWindow;
pub use consecutive::ConsecutiveNumbers;
pub use engaged::{DEFAULT_DRAW_DISTANCE, EngagedIndicesTracker, Velocity};
pub use error::ConfigError;
pub use grid::GridLayoutManager;
pub use layout::{
    DEFAULT_ITEM_SIZE_ESTIMATE, Dimensions, Layout, LayoutManager, LayoutParams, LayoutUpdate,
    OverrideItemLayout, SpanSizeHint,
};
pub use masonry::MasonryLayoutManager;
pub use render_stack::{KeyEntry, RenderKey, RenderStackManager};
pub use render_time::RenderTimeTracker;
pub use viewability::{
    DEFAULT_MINIMUM_VIEW_TIME_MS, ViewabilityConfig, ViewabilityHelper, ViewabilityManager,
    ViewableItemsChanged, ViewableItemsChangedCallback, is_item_viewable,
};
