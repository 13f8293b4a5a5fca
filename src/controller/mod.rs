//! Refresh controller: fetches the sensor API and keeps the dashboard in sync.

mod auto_refresh;
mod events;

pub use auto_refresh::AutoRefresh;
pub use events::UiEvent;

use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Mutex};

use crate::api::models::{HealthStatus, Reading, ReadingsResponse, StatsSummary};
use crate::api::{self, Transport, LATEST_PATH};
use crate::chart::{HumidityHistogram, LineSeries, SharedChart, HUMIDITY_CHART, MAIN_CHART};
use crate::config::Config;
use crate::error::{MonitorError, MonitorResult};
use crate::format::{
    format_humidity, format_short_time, format_temperature, format_timestamp, time_ago,
    NO_DATA_HUMIDITY, NO_DATA_TEMPERATURE,
};
use crate::view::{ElementId, Notice, NoticeLevel, SelectOption, SharedView, TableRow};

pub const UPDATE_MARKER_CLASS: &str = "data-update";
pub const CONNECTION_ERROR: &str = "Erro de conexão";
pub const ALL_DEVICES_LABEL: &str = "Todos os dispositivos";

const PLAY_ICON: &str = "fas fa-play me-1";
const PAUSE_ICON: &str = "fas fa-pause me-1";
const PLAY_TEXT: &str = "Auto Refresh";
const PAUSE_TEXT: &str = "Pausar";

/// Per-endpoint request counter; the highest issued id is the latest request.
#[derive(Debug, Default)]
struct RequestSequence(AtomicU64);

impl RequestSequence {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, id: u64) -> bool {
        self.0.load(Ordering::SeqCst) == id
    }
}

struct Inner {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    view: SharedView,
    charts: Mutex<HashMap<String, SharedChart>>,
    auto_refresh: Mutex<Option<AutoRefresh>>,
    current_requests: RequestSequence,
    chart_requests: RequestSequence,
}

/// Owns the polling state of one dashboard. Clones share that state.
#[derive(Clone)]
pub struct RefreshController {
    inner: Arc<Inner>,
}

/// Non-owning reference held by the auto-refresh task.
#[derive(Clone)]
pub(crate) struct WeakController(Weak<Inner>);

impl WeakController {
    pub(crate) fn upgrade(&self) -> Option<RefreshController> {
        self.0.upgrade().map(|inner| RefreshController { inner })
    }
}

impl RefreshController {
    #[must_use]
    pub fn new(config: Config, transport: Arc<dyn Transport>, view: SharedView) -> Self {
        Self {
            inner: Arc::new(Inner {
                config: Arc::new(config),
                transport,
                view,
                charts: Mutex::new(HashMap::new()),
                auto_refresh: Mutex::new(None),
                current_requests: RequestSequence::default(),
                chart_requests: RequestSequence::default(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Register a chart widget under `name`; a later registration replaces it.
    pub async fn register_chart(&self, name: impl Into<String>, chart: SharedChart) {
        let name = name.into();
        tracing::debug!(chart = %name, "Registering chart");
        self.inner.charts.lock().await.insert(name, chart);
    }

    /// Initial load: current reading, stats, chart series and device list, in that
    /// order. Each step handles its own failure.
    pub async fn initialize(&self) {
        tracing::info!("Loading initial dashboard data");
        self.refresh_current_reading().await;
        self.refresh_stats().await;
        self.refresh_chart_data().await;
        self.refresh_devices().await;

        if self.inner.config.auto_refresh_on_start && !self.is_auto_refresh().await {
            self.toggle_auto_refresh().await;
        }
    }

    pub async fn handle_event(&self, event: UiEvent) {
        tracing::debug!(?event, "UI event");
        match event {
            UiEvent::RefreshToggle => {
                self.toggle_auto_refresh().await;
            }
            UiEvent::TimeRangeChanged | UiEvent::DeviceChanged => {
                self.refresh_chart_data().await;
            }
            UiEvent::RefreshNow => {
                self.refresh_chart_data().await;
                self.refresh_current_reading().await;
            }
        }
    }

    /// Initialize, dispatch events until the sender side closes, then shut down.
    pub async fn run(&self, mut events: mpsc::Receiver<UiEvent>) {
        self.initialize().await;
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        self.shutdown().await;
    }

    /// Fetch the latest reading and show it, or the no-data placeholder.
    pub async fn refresh_current_reading(&self) {
        let request_id = self.inner.current_requests.issue();
        let result = api::fetch_latest(self.inner.transport.as_ref()).await;
        if self.is_stale(&self.inner.current_requests, request_id, LATEST_PATH) {
            return;
        }

        match result.and_then(first_reading) {
            Ok(Some(reading)) => self.show_current(&reading).await,
            Ok(None) => {
                tracing::info!("No sensor data available");
                self.show_no_data().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh current reading");
                self.show_notice(NoticeLevel::Error, CONNECTION_ERROR).await;
            }
        }
    }

    /// Fetch the aggregates. Failures are logged and the previous values stay.
    pub async fn refresh_stats(&self) {
        let result = api::fetch_stats(self.inner.transport.as_ref())
            .await
            .and_then(|response| {
                if !response.is_success() {
                    return Ok(None);
                }
                response.stats.map(Some).ok_or_else(|| {
                    MonitorError::MalformedResponse("stats missing from response".to_string())
                })
            });

        match result {
            Ok(Some(stats)) => self.show_stats(&stats).await,
            Ok(None) => tracing::debug!("Stats request returned an unsuccessful status"),
            Err(e) => tracing::warn!(error = %e, "Failed to refresh stats"),
        }
    }

    /// Fetch the history for the selected time range and device, then rebuild both
    /// charts and the recent-readings table.
    pub async fn refresh_chart_data(&self) {
        let (hours, device_id) = self.chart_filters().await;
        let limit = u64::from(hours) * u64::from(self.inner.config.readings_per_hour);

        let request_id = self.inner.chart_requests.issue();
        let result =
            api::fetch_readings(self.inner.transport.as_ref(), limit, device_id.as_deref())
                .await;
        if self.is_stale(&self.inner.chart_requests, request_id, api::READINGS_PATH) {
            return;
        }

        match result {
            Ok(response) if response.is_success() => match response.data {
                Some(readings) => {
                    tracing::debug!(
                        count = readings.len(),
                        hours,
                        device_id = device_id.as_deref().unwrap_or("all"),
                        "Chart data refreshed"
                    );
                    self.update_main_chart(&readings).await;
                    self.update_humidity_chart(&readings).await;
                    self.update_data_table(&readings).await;
                }
                None => tracing::warn!("Chart data response has no data"),
            },
            Ok(_) => tracing::debug!("Chart data request returned an unsuccessful status"),
            Err(e) => tracing::warn!(error = %e, "Failed to refresh chart data"),
        }
    }

    /// Fill the device selector with the active devices.
    pub async fn refresh_devices(&self) {
        let response = match api::fetch_devices(self.inner.transport.as_ref()).await {
            Ok(response) if response.is_success() => response,
            Ok(_) => {
                tracing::debug!("Devices request returned an unsuccessful status");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh devices");
                return;
            }
        };

        let mut options = vec![SelectOption {
            value: String::new(),
            label: ALL_DEVICES_LABEL.to_string(),
        }];
        options.extend(
            response
                .data
                .unwrap_or_default()
                .iter()
                .filter(|device| device.is_active)
                .map(|device| SelectOption {
                    value: device.device_id.clone(),
                    label: device.display_name().to_string(),
                }),
        );

        tracing::debug!(count = options.len() - 1, "Device list refreshed");
        self.inner
            .view
            .lock()
            .await
            .replace_options(ElementId::DeviceSelect, options);
    }

    /// Query the API health endpoint.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Network` when the API is unreachable or reports itself
    /// unhealthy (HTTP 500).
    pub async fn check_health(&self) -> MonitorResult<HealthStatus> {
        api::fetch_health(self.inner.transport.as_ref()).await
    }

    /// Turn auto-refresh on or off. Returns the new state.
    pub async fn toggle_auto_refresh(&self) -> bool {
        let enabled = {
            let mut slot = self.inner.auto_refresh.lock().await;
            if slot.take().is_some() {
                false
            } else {
                *slot = Some(AutoRefresh::spawn(
                    WeakController(Arc::downgrade(&self.inner)),
                    self.inner.config.update_interval(),
                ));
                true
            }
        };

        self.show_refresh_affordance(enabled).await;
        enabled
    }

    pub async fn is_auto_refresh(&self) -> bool {
        self.inner.auto_refresh.lock().await.is_some()
    }

    /// Stop auto-refresh if it is running.
    pub async fn shutdown(&self) {
        let stopped = self.inner.auto_refresh.lock().await.take();
        if stopped.is_some() {
            drop(stopped);
            self.show_refresh_affordance(false).await;
        }
    }

    fn is_stale(&self, sequence: &RequestSequence, request_id: u64, endpoint: &str) -> bool {
        if self.inner.config.discard_stale_responses && !sequence.is_latest(request_id) {
            tracing::debug!(endpoint, request_id, "Discarding stale response");
            return true;
        }
        false
    }

    async fn chart_filters(&self) -> (u32, Option<String>) {
        let view = self.inner.view.lock().await;
        let hours = view
            .value(ElementId::TimeRange)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(self.inner.config.default_time_range_hours);
        let device_id = view
            .value(ElementId::DeviceSelect)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        (hours, device_id)
    }

    async fn show_current(&self, reading: &Reading) {
        let offset = self.inner.config.display_offset;
        let updated = format!("Atualizado: {}", format_timestamp(reading.timestamp, offset));

        {
            let mut view = self.inner.view.lock().await;
            view.set_text(ElementId::CurrentTemp, &format_temperature(reading.temperature));
            view.add_class(ElementId::CurrentTemp, UPDATE_MARKER_CLASS);
            view.set_text(ElementId::CurrentHumidity, &format_humidity(reading.humidity));
            view.add_class(ElementId::CurrentHumidity, UPDATE_MARKER_CLASS);
            view.set_text(ElementId::DeviceId, &reading.device_id);
            view.set_text(
                ElementId::LastUpdate,
                &format_short_time(reading.timestamp, offset),
            );
            view.set_text(ElementId::TimeAgo, &time_ago(reading.timestamp, Utc::now()));
            view.set_text(ElementId::TempTimestamp, &updated);
            view.set_text(ElementId::HumidityTimestamp, &updated);
            view.set_text(ElementId::DeviceStatus, "Online");
            view.set_class_name(ElementId::DeviceStatus, "text-success");
        }

        let view = Arc::clone(&self.inner.view);
        let delay = self.inner.config.update_marker_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut view = view.lock().await;
            view.remove_class(ElementId::CurrentTemp, UPDATE_MARKER_CLASS);
            view.remove_class(ElementId::CurrentHumidity, UPDATE_MARKER_CLASS);
        });
    }

    async fn show_no_data(&self) {
        let mut view = self.inner.view.lock().await;
        view.set_text(ElementId::CurrentTemp, NO_DATA_TEMPERATURE);
        view.set_text(ElementId::CurrentHumidity, NO_DATA_HUMIDITY);
        view.set_text(ElementId::DeviceStatus, "Sem dados");
        view.set_class_name(ElementId::DeviceStatus, "text-warning");
    }

    async fn show_stats(&self, stats: &StatsSummary) {
        let mut view = self.inner.view.lock().await;
        let temperature = stats.temperature;
        let humidity = stats.humidity;
        view.set_text(ElementId::AvgTemp, &format!("{}°C", temperature.average));
        view.set_text(ElementId::MaxTemp, &format!("{}°C", temperature.maximum));
        view.set_text(ElementId::MinTemp, &format!("{}°C", temperature.minimum));
        view.set_text(ElementId::AvgHumidity, &format!("{}%", humidity.average));
        view.set_text(ElementId::MaxHumidity, &format!("{}%", humidity.maximum));
        view.set_text(ElementId::MinHumidity, &format!("{}%", humidity.minimum));
        view.set_text(ElementId::TotalReadings, &stats.total_readings.to_string());
    }

    async fn show_notice(&self, level: NoticeLevel, message: &str) {
        self.inner.view.lock().await.show_notice(Notice {
            level,
            message: message.to_string(),
        });
    }

    async fn show_refresh_affordance(&self, auto_refresh: bool) {
        let (icon, text) = if auto_refresh {
            (PAUSE_ICON, PAUSE_TEXT)
        } else {
            (PLAY_ICON, PLAY_TEXT)
        };
        let mut view = self.inner.view.lock().await;
        view.set_class_name(ElementId::RefreshIcon, icon);
        view.set_text(ElementId::RefreshText, text);
    }

    async fn chart(&self, name: &str) -> Option<SharedChart> {
        self.inner.charts.lock().await.get(name).cloned()
    }

    async fn update_main_chart(&self, readings: &[Reading]) {
        let Some(chart) = self.chart(MAIN_CHART).await else {
            return;
        };
        let series = LineSeries::from_readings(readings, self.inner.config.display_offset);
        series.apply(&mut *chart.lock().await);
    }

    async fn update_humidity_chart(&self, readings: &[Reading]) {
        let Some(chart) = self.chart(HUMIDITY_CHART).await else {
            return;
        };
        HumidityHistogram::from_readings(readings).apply(&mut *chart.lock().await);
    }

    async fn update_data_table(&self, readings: &[Reading]) {
        let offset = self.inner.config.display_offset;
        let rows = readings
            .iter()
            .take(self.inner.config.table_row_limit)
            .map(|reading| TableRow {
                timestamp: format_timestamp(reading.timestamp, offset),
                device_id: reading.device_id.clone(),
                temperature: format_temperature(reading.temperature),
                humidity: format_humidity(reading.humidity),
                status: "OK".to_string(),
            })
            .collect();
        self.inner
            .view
            .lock()
            .await
            .replace_rows(ElementId::DataTableBody, rows);
    }
}

/// First reading of a successful envelope; `None` selects the no-data display.
fn first_reading(response: ReadingsResponse) -> MonitorResult<Option<Reading>> {
    if !response.is_success() {
        return Ok(None);
    }
    let readings = response
        .data
        .ok_or_else(|| MonitorError::MalformedResponse("data missing from response".into()))?;
    Ok(readings.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(device: &str) -> Reading {
        Reading {
            id: None,
            device_id: device.to_string(),
            device_name: None,
            temperature: 20.0,
            humidity: 50.0,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn first_reading_selects_head_of_success() {
        let response = ReadingsResponse {
            status: "success".into(),
            data: Some(vec![reading("a"), reading("b")]),
            message: None,
        };
        assert_eq!(
            first_reading(response).unwrap().map(|r| r.device_id),
            Some("a".to_string())
        );
    }

    #[test]
    fn first_reading_empty_or_unsuccessful_is_none() {
        let empty = ReadingsResponse {
            status: "success".into(),
            data: Some(vec![]),
            message: None,
        };
        assert!(first_reading(empty).unwrap().is_none());

        let failed = ReadingsResponse {
            status: "error".into(),
            data: None,
            message: Some("boom".into()),
        };
        assert!(first_reading(failed).unwrap().is_none());
    }

    #[test]
    fn first_reading_success_without_data_is_malformed() {
        let response = ReadingsResponse {
            status: "success".into(),
            data: None,
            message: None,
        };
        assert!(matches!(
            first_reading(response),
            Err(MonitorError::MalformedResponse(_))
        ));
    }

    #[test]
    fn request_sequence_tracks_latest() {
        let sequence = RequestSequence::default();
        let first = sequence.issue();
        let second = sequence.issue();
        assert!(!sequence.is_latest(first));
        assert!(sequence.is_latest(second));
    }
}
