/// Configuration errors.
///
/// These indicate programming mistakes and are raised synchronously when the
/// offending configuration is first handed to the engine. Degraded runtime
/// conditions (unmeasured items, buffer exhaustion at list boundaries,
/// projection outside content bounds) are handled by clamping and estimates
/// and never surface as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `item_visible_percent_threshold` and `view_area_coverage_percent_threshold`
    /// are mutually exclusive; a viewability config may set at most one.
    #[error(
        "multiple viewability threshold types are not supported: set either \
         item_visible_percent_threshold or view_area_coverage_percent_threshold, not both"
    )]
    MultipleViewabilityThresholds,
}
