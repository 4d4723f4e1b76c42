use std::sync::Arc;

use crate::ConsecutiveNumbers;
use crate::error::ConfigError;
use crate::layout::Layout;

/// Default dwell time before an item counts as viewed, in ms.
pub const DEFAULT_MINIMUM_VIEW_TIME_MS: u64 = 250;

/// Criteria for when an item counts as "viewed".
///
/// The two percent thresholds are mutually exclusive:
/// `item_visible_percent_threshold` measures the visible fraction of the
/// item itself, `view_area_coverage_percent_threshold` measures how much of
/// the viewport the item covers. With neither set, any visible pixel
/// qualifies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewabilityConfig {
    pub item_visible_percent_threshold: Option<f64>,
    pub view_area_coverage_percent_threshold: Option<f64>,
    /// Suppress all reports until the user has interacted with the list.
    pub wait_for_interaction: bool,
    /// How long an item must stay viewable before it is reported.
    pub minimum_view_time_ms: u64,
}

impl Default for ViewabilityConfig {
    fn default() -> Self {
        Self {
            item_visible_percent_threshold: None,
            view_area_coverage_percent_threshold: None,
            wait_for_interaction: false,
            minimum_view_time_ms: DEFAULT_MINIMUM_VIEW_TIME_MS,
        }
    }
}

impl ViewabilityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_visible_percent_threshold.is_some()
            && self.view_area_coverage_percent_threshold.is_some()
        {
            return Err(ConfigError::MultipleViewabilityThresholds);
        }
        Ok(())
    }
}

/// Delivered to a viewability callback whenever the reported set changes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewableItemsChanged {
    /// All currently viewable indices, ascending.
    pub viewable: Vec<usize>,
    pub newly_viewable: Vec<usize>,
    pub no_longer_viewable: Vec<usize>,
}

pub type ViewableItemsChangedCallback = Arc<dyn Fn(&ViewableItemsChanged) + Send + Sync>;

struct PendingReport {
    deadline_ms: u64,
    staged: Vec<usize>,
}

/// Evaluates one viewability config against scroll updates.
///
/// With a minimum view time, the viewable set is staged with a deadline
/// instead of being reported immediately; `tick` commits it once the
/// deadline passes. A newer update supersedes the staged report and
/// restarts the clock, so an item must hold its viewability across a quiet
/// dwell period before it is ever reported.
pub struct ViewabilityHelper {
    config: ViewabilityConfig,
    callback: ViewableItemsChangedCallback,
    has_interacted: bool,
    current_viewable: Vec<usize>,
    last_reported: Vec<usize>,
    pending: Option<PendingReport>,
}

impl ViewabilityHelper {
    pub fn new(
        config: ViewabilityConfig,
        callback: ViewableItemsChangedCallback,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            callback,
            has_interacted: false,
            current_viewable: Vec::new(),
            last_reported: Vec::new(),
            pending: None,
        })
    }

    pub fn config(&self) -> &ViewabilityConfig {
        &self.config
    }

    /// Indices that met the visibility criteria on the last update,
    /// regardless of dwell state.
    pub fn current_viewable(&self) -> &[usize] {
        &self.current_viewable
    }

    /// Marks that the user has interacted with the list, unblocking
    /// configs with `wait_for_interaction`.
    pub fn record_interaction(&mut self) {
        self.has_interacted = true;
    }

    /// Forgets what was last reported; the next update reports the full
    /// viewable set as newly viewable again.
    pub fn clear_last_reported(&mut self) {
        self.last_reported.clear();
        self.pending = None;
    }

    /// Re-evaluates viewability for the candidate indices.
    ///
    /// `get_layout` resolves an index to its layout; indices it cannot
    /// resolve are treated as not viewable.
    pub fn update_viewable_items(
        &mut self,
        horizontal: bool,
        scroll_offset: f64,
        viewport_size: f64,
        get_layout: &mut dyn FnMut(usize) -> Option<Layout>,
        candidates: &ConsecutiveNumbers,
        now_ms: u64,
    ) {
        if self.config.wait_for_interaction && !self.has_interacted {
            return;
        }

        let mut viewable = Vec::new();
        for index in candidates {
            let Some(layout) = get_layout(index) else {
                continue;
            };
            if is_item_viewable(&layout, horizontal, scroll_offset, viewport_size, &self.config) {
                viewable.push(index);
            }
        }
        self.current_viewable = viewable.clone();

        if self.config.minimum_view_time_ms > 0 {
            self.pending = Some(PendingReport {
                deadline_ms: now_ms + self.config.minimum_view_time_ms,
                staged: viewable,
            });
        } else {
            self.pending = None;
            self.report_changes(viewable);
        }
    }

    /// Commits a staged report once its dwell deadline has passed.
    pub fn tick(&mut self, now_ms: u64) {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now_ms >= pending.deadline_ms);
        if !due {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.report_changes(pending.staged);
    }

    fn report_changes(&mut self, viewable: Vec<usize>) {
        let newly_viewable: Vec<usize> = viewable
            .iter()
            .copied()
            .filter(|index| !self.last_reported.contains(index))
            .collect();
        let no_longer_viewable: Vec<usize> = self
            .last_reported
            .iter()
            .copied()
            .filter(|index| !viewable.contains(index))
            .collect();
        if newly_viewable.is_empty() && no_longer_viewable.is_empty() {
            return;
        }
        self.last_reported = viewable.clone();
        let changed = ViewableItemsChanged {
            viewable,
            newly_viewable,
            no_longer_viewable,
        };
        rtrace!(
            newly = changed.newly_viewable.len(),
            gone = changed.no_longer_viewable.len(),
            "viewable items changed"
        );
        (self.callback)(&changed);
    }
}

/// Whether one item meets the config's visibility criteria.
///
/// An item that is fully visible always qualifies, regardless of
/// thresholds; an item with no visible pixels never does. Thresholds
/// compare with `>=`, so an item exactly at the threshold qualifies.
pub fn is_item_viewable(
    layout: &Layout,
    horizontal: bool,
    scroll_offset: f64,
    viewport_size: f64,
    config: &ViewabilityConfig,
) -> bool {
    let item_top = layout.main_start(horizontal) - scroll_offset;
    let item_size = layout.main_size(horizontal);
    let pixels_visible = (item_top + item_size).min(viewport_size) - item_top.max(0.0);

    if pixels_visible >= item_size && item_size > 0.0 {
        return true;
    }
    if pixels_visible <= 0.0 {
        return false;
    }

    if let Some(coverage) = config.view_area_coverage_percent_threshold {
        pixels_visible / viewport_size >= coverage / 100.0
    } else {
        let threshold = config.item_visible_percent_threshold.unwrap_or(0.0);
        pixels_visible / item_size >= threshold / 100.0
    }
}

/// Fans scroll updates out to every registered viewability config.
///
/// Each config gets its own helper with independent dwell timing and
/// reporting state. The interaction latch is shared: one interaction
/// unblocks every `wait_for_interaction` config.
#[derive(Default)]
pub struct ViewabilityManager {
    helpers: Vec<ViewabilityHelper>,
    has_interacted: bool,
}

impl ViewabilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_config(
        &mut self,
        config: ViewabilityConfig,
        callback: ViewableItemsChangedCallback,
    ) -> Result<(), ConfigError> {
        let mut helper = ViewabilityHelper::new(config, callback)?;
        if self.has_interacted {
            helper.record_interaction();
        }
        self.helpers.push(helper);
        Ok(())
    }

    pub fn config_count(&self) -> usize {
        self.helpers.len()
    }

    pub fn record_interaction(&mut self) {
        if self.has_interacted {
            return;
        }
        self.has_interacted = true;
        for helper in &mut self.helpers {
            helper.record_interaction();
        }
    }

    /// Clears reporting state so every config re-reports on the next
    /// update. Used when the dataset is replaced wholesale.
    pub fn recompute_viewable_items(&mut self) {
        for helper in &mut self.helpers {
            helper.clear_last_reported();
        }
    }

    pub fn update_viewable_items(
        &mut self,
        horizontal: bool,
        scroll_offset: f64,
        viewport_size: f64,
        get_layout: &mut dyn FnMut(usize) -> Option<Layout>,
        candidates: &ConsecutiveNumbers,
        now_ms: u64,
    ) {
        for helper in &mut self.helpers {
            helper.update_viewable_items(
                horizontal,
                scroll_offset,
                viewport_size,
                get_layout,
                candidates,
                now_ms,
            );
        }
    }

    pub fn tick(&mut self, now_ms: u64) {
        for helper in &mut self.helpers {
            helper.tick(now_ms);
        }
    }
}
