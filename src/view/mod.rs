//! The dashboard surface the controller writes to.
//!
//! Elements are addressed by their page identifiers. Implementations must tolerate
//! missing elements: writes to an element the page does not have are dropped.

mod memory;
mod render;

pub use memory::{Element, MemoryView};
pub use render::render_dashboard;

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    RefreshBtn,
    RefreshIcon,
    RefreshText,
    TimeRange,
    DeviceSelect,
    CurrentTemp,
    CurrentHumidity,
    DeviceId,
    LastUpdate,
    TimeAgo,
    TempTimestamp,
    HumidityTimestamp,
    DeviceStatus,
    AvgTemp,
    MaxTemp,
    MinTemp,
    AvgHumidity,
    MaxHumidity,
    MinHumidity,
    TotalReadings,
    DataTableBody,
}

impl ElementId {
    pub const ALL: [Self; 21] = [
        Self::RefreshBtn,
        Self::RefreshIcon,
        Self::RefreshText,
        Self::TimeRange,
        Self::DeviceSelect,
        Self::CurrentTemp,
        Self::CurrentHumidity,
        Self::DeviceId,
        Self::LastUpdate,
        Self::TimeAgo,
        Self::TempTimestamp,
        Self::HumidityTimestamp,
        Self::DeviceStatus,
        Self::AvgTemp,
        Self::MaxTemp,
        Self::MinTemp,
        Self::AvgHumidity,
        Self::MaxHumidity,
        Self::MinHumidity,
        Self::TotalReadings,
        Self::DataTableBody,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RefreshBtn => "refresh-btn",
            Self::RefreshIcon => "refresh-icon",
            Self::RefreshText => "refresh-text",
            Self::TimeRange => "timeRange",
            Self::DeviceSelect => "deviceSelect",
            Self::CurrentTemp => "current-temp",
            Self::CurrentHumidity => "current-humidity",
            Self::DeviceId => "device-id",
            Self::LastUpdate => "last-update",
            Self::TimeAgo => "time-ago",
            Self::TempTimestamp => "temp-timestamp",
            Self::HumidityTimestamp => "humidity-timestamp",
            Self::DeviceStatus => "device-status",
            Self::AvgTemp => "avg-temp",
            Self::MaxTemp => "max-temp",
            Self::MinTemp => "min-temp",
            Self::AvgHumidity => "avg-humidity",
            Self::MaxHumidity => "max-humidity",
            Self::MinHumidity => "min-humidity",
            Self::TotalReadings => "total-readings",
            Self::DataTableBody => "dataTableBody",
        }
    }

    #[must_use]
    pub fn from_dom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|element| element.as_str() == id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the recent-readings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub timestamp: String,
    pub device_id: String,
    pub temperature: String,
    pub humidity: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub trait View: Send {
    fn has_element(&self, id: ElementId) -> bool;

    fn set_text(&mut self, id: ElementId, text: &str);

    /// Replace the element's whole class list.
    fn set_class_name(&mut self, id: ElementId, class_name: &str);

    fn add_class(&mut self, id: ElementId, class: &str);

    fn remove_class(&mut self, id: ElementId, class: &str);

    /// Current value of an input element (`timeRange`, `deviceSelect`).
    fn value(&self, id: ElementId) -> Option<String>;

    fn replace_rows(&mut self, id: ElementId, rows: Vec<TableRow>);

    fn replace_options(&mut self, id: ElementId, options: Vec<SelectOption>);

    /// Transient, non-blocking message to the user.
    fn show_notice(&mut self, notice: Notice);
}

pub type SharedView = Arc<Mutex<dyn View>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_ids_round_trip() {
        for element in ElementId::ALL {
            assert_eq!(ElementId::from_dom_id(element.as_str()), Some(element));
        }
        assert_eq!(ElementId::from_dom_id("missing"), None);
        assert_eq!(ElementId::DataTableBody.to_string(), "dataTableBody");
    }
}
