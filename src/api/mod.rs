//! Sensor API access: transport seam, typed payloads, and endpoint helpers.

mod client;
pub mod models;

pub use client::{ApiClient, Transport};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{MonitorError, MonitorResult};
use models::{DevicesResponse, HealthStatus, ReadingsResponse, StatsResponse};

pub const LATEST_PATH: &str = "/api/sensor-data/latest";
pub const STATS_PATH: &str = "/api/sensor-data/stats";
pub const READINGS_PATH: &str = "/api/sensor-data";
pub const DEVICES_PATH: &str = "/api/devices";
pub const HEALTH_PATH: &str = "/api/health";

/// Build the history query: `/api/sensor-data?limit=<n>[&device_id=<id>]`.
#[must_use]
pub fn readings_path(limit: u64, device_id: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("limit", &limit.to_string());
    if let Some(id) = device_id.filter(|id| !id.is_empty()) {
        query.append_pair("device_id", id);
    }
    format!("{READINGS_PATH}?{}", query.finish())
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> MonitorResult<T> {
    serde_json::from_value(value)
        .map_err(|e| MonitorError::MalformedResponse(format!("{path}: {e}")))
}

/// Fetch the most recent reading of each device.
///
/// # Errors
///
/// Propagates transport errors and rejects payloads that are not a readings envelope.
pub async fn fetch_latest(transport: &dyn Transport) -> MonitorResult<ReadingsResponse> {
    let value = transport.fetch_json(LATEST_PATH).await?;
    decode(LATEST_PATH, value)
}

/// Fetch the server-side aggregates.
///
/// # Errors
///
/// Propagates transport errors and rejects payloads that are not a stats envelope.
pub async fn fetch_stats(transport: &dyn Transport) -> MonitorResult<StatsResponse> {
    let value = transport.fetch_json(STATS_PATH).await?;
    decode(STATS_PATH, value)
}

/// Fetch up to `limit` readings, optionally for a single device.
///
/// # Errors
///
/// Propagates transport errors and rejects payloads that are not a readings envelope.
pub async fn fetch_readings(
    transport: &dyn Transport,
    limit: u64,
    device_id: Option<&str>,
) -> MonitorResult<ReadingsResponse> {
    let path = readings_path(limit, device_id);
    let value = transport.fetch_json(&path).await?;
    decode(READINGS_PATH, value)
}

/// Fetch the registered devices.
///
/// # Errors
///
/// Propagates transport errors and rejects payloads that are not a devices envelope.
pub async fn fetch_devices(transport: &dyn Transport) -> MonitorResult<DevicesResponse> {
    let value = transport.fetch_json(DEVICES_PATH).await?;
    decode(DEVICES_PATH, value)
}

/// Query the API health endpoint.
///
/// # Errors
///
/// An unhealthy API answers 500, which surfaces as `MonitorError::Network`.
pub async fn fetch_health(transport: &dyn Transport) -> MonitorResult<HealthStatus> {
    let value = transport.fetch_json(HEALTH_PATH).await?;
    decode(HEALTH_PATH, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_path_builds_query() {
        assert_eq!(readings_path(1440, None), "/api/sensor-data?limit=1440");
        assert_eq!(readings_path(60, Some("")), "/api/sensor-data?limit=60");
        assert_eq!(
            readings_path(360, Some("ESP8266_001")),
            "/api/sensor-data?limit=360&device_id=ESP8266_001"
        );
    }

    #[test]
    fn readings_path_encodes_device_id() {
        assert_eq!(
            readings_path(60, Some("lab 1&2")),
            "/api/sensor-data?limit=60&device_id=lab+1%262"
        );
    }

    #[test]
    fn decode_reports_malformed_payload() {
        let err = decode::<StatsResponse>(STATS_PATH, serde_json::json!({"stats": 3}))
            .unwrap_err();
        assert!(matches!(err, MonitorError::MalformedResponse(msg) if msg.starts_with(STATS_PATH)));
    }
}
