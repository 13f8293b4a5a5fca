//! Display formatting shared by the current-reading panel, the charts and the table.
//!
//! Timestamps are rendered the way the dashboard's pt-BR locale does:
//! `HH:MM:SS` for short times and `DD/MM/YYYY, HH:MM:SS` for full ones.

use chrono::{DateTime, FixedOffset, Utc};

pub const NO_DATA_TEMPERATURE: &str = "--°C";
pub const NO_DATA_HUMIDITY: &str = "--%";

#[must_use]
pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius:.1}°C")
}

#[must_use]
pub fn format_humidity(percent: f64) -> String {
    format!("{percent:.1}%")
}

#[must_use]
pub fn format_short_time(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    ts.with_timezone(&offset).format("%H:%M:%S").to_string()
}

#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    ts.with_timezone(&offset)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string()
}

/// Relative age of `ts` as seen at `now`, in whole units rounded down.
#[must_use]
pub fn time_ago(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - ts).num_milliseconds().div_euclid(60_000);

    if minutes < 1 {
        return "agora".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min atrás");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h atrás");
    }

    format!("{}d atrás", hours / 24)
}
