use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope used by every sensor API endpoint: `{status, data, message}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> DataEnvelope<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Response from `/api/sensor-data/latest` and `/api/sensor-data`
pub type ReadingsResponse = DataEnvelope<Vec<Reading>>;

/// Response from `/api/devices`
pub type DevicesResponse = DataEnvelope<Vec<Device>>;

/// Response from `/api/sensor-data/stats`
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub status: String,
    #[serde(default)]
    pub stats: Option<StatsSummary>,
}

impl StatsResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// One sensor sample as sent by the device and stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub id: Option<i64>,
    pub device_id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub temperature: Aggregate,
    pub humidity: Aggregate,
    pub total_readings: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Device {
    /// Label shown in the device selector.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.device_id,
        }
    }
}

/// Response from `/api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

fn default_true() -> bool {
    true
}

/// The API writes `datetime.isoformat()` of a naive UTC value, so offsets are optional.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
}

/// Parse an ISO-8601 timestamp; values without an offset are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn naive_timestamps_are_utc() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 16, 12, 30, 5).unwrap();
        assert_eq!(parse_timestamp("2026-10-16T12:30:05"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-10-16T12:30:05.250000").map(|t| t.timestamp()),
            Some(expected.timestamp())
        );
        assert_eq!(parse_timestamp("2026-10-16T09:30:05-03:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-16T12:30:05Z"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn reading_deserializes_server_shape() {
        let reading: Reading = serde_json::from_value(json!({
            "id": 42,
            "temperature": 23.4,
            "humidity": 55.0,
            "device_id": "ESP8266_001",
            "timestamp": "2026-10-16T12:00:00.123456"
        }))
        .unwrap();
        assert_eq!(reading.id, Some(42));
        assert_eq!(reading.device_id, "ESP8266_001");
        assert!(reading.device_name.is_none());
        assert!((reading.humidity - 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reading_rejects_bad_timestamp() {
        let result: Result<Reading, _> = serde_json::from_value(json!({
            "temperature": 1.0,
            "humidity": 2.0,
            "device_id": "x",
            "timestamp": 1_700_000_000
        }));
        assert!(result.is_err());
    }

    #[test]
    fn envelope_without_data_is_still_parsed() {
        let envelope: ReadingsResponse = serde_json::from_value(json!({
            "status": "error",
            "message": "Erro interno do servidor"
        }))
        .unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Erro interno do servidor"));
    }

    #[test]
    fn device_display_name_falls_back_to_id() {
        let device: Device = serde_json::from_value(json!({
            "device_id": "ESP8266_002",
            "name": null
        }))
        .unwrap();
        assert!(device.is_active);
        assert_eq!(device.display_name(), "ESP8266_002");
    }
}
