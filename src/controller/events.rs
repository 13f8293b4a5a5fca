/// User interactions the dashboard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Click on `refresh-btn`.
    RefreshToggle,
    /// `timeRange` selection changed.
    TimeRangeChanged,
    /// `deviceSelect` selection changed.
    DeviceChanged,
    /// Explicit request to refresh charts and the current reading now.
    RefreshNow,
}
