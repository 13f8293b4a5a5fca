use std::fmt::Write;

use super::{ElementId, MemoryView, View};
use crate::chart::ChartData;

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the dashboard as plain text for the terminal.
#[must_use]
pub fn render_dashboard(view: &MemoryView, main: &ChartData, humidity: &ChartData) -> String {
    let text = |id| view.text(id).filter(|t| !t.is_empty()).unwrap_or("-");
    let mut out = String::new();

    let _ = writeln!(
        out,
        "== Sensor Monitor == [{}] device {} ({}) | last update {} ({})",
        text(ElementId::RefreshText),
        text(ElementId::DeviceId),
        text(ElementId::DeviceStatus),
        text(ElementId::LastUpdate),
        text(ElementId::TimeAgo),
    );
    let _ = writeln!(
        out,
        "Temperature {:>8}   Humidity {:>8}",
        text(ElementId::CurrentTemp),
        text(ElementId::CurrentHumidity),
    );
    let _ = writeln!(
        out,
        "24h temp   avg {} max {} min {}",
        text(ElementId::AvgTemp),
        text(ElementId::MaxTemp),
        text(ElementId::MinTemp),
    );
    let _ = writeln!(
        out,
        "24h humid  avg {} max {} min {}   readings {}",
        text(ElementId::AvgHumidity),
        text(ElementId::MaxHumidity),
        text(ElementId::MinHumidity),
        text(ElementId::TotalReadings),
    );

    let range = view.value(ElementId::TimeRange).unwrap_or_default();
    let device = view
        .value(ElementId::DeviceSelect)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "all".to_string());
    let _ = writeln!(out, "History: {range}h, device {device}");
    for dataset in &main.datasets {
        let _ = writeln!(out, "  {:<18} {}", dataset.label, sparkline(&dataset.data));
    }
    if let Some(dataset) = humidity.datasets.first() {
        let buckets: Vec<String> = humidity
            .labels
            .iter()
            .zip(&dataset.data)
            .map(|(label, count)| format!("{label}: {count}"))
            .collect();
        let _ = writeln!(out, "  {}", buckets.join("  "));
    }

    let rows = view.rows(ElementId::DataTableBody);
    if !rows.is_empty() {
        let _ = writeln!(out, "Recent readings:");
        for row in rows {
            let _ = writeln!(
                out,
                "  {:<22} {:<14} {:>8} {:>7}  [{}]",
                row.timestamp, row.device_id, row.temperature, row.humidity, row.status
            );
        }
    }

    for notice in view.notices() {
        let _ = writeln!(out, "! {}", notice.message);
    }

    out
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn sparkline(values: &[f64]) -> String {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return String::new();
    }
    let span = (max - min).max(f64::EPSILON);
    values
        .iter()
        .map(|v| {
            if v.is_finite() {
                let level = ((v - min) / span * (SPARK.len() - 1) as f64).round() as usize;
                SPARK[level.min(SPARK.len() - 1)]
            } else {
                ' '
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Chart, MemoryChart};

    #[test]
    fn sparkline_scales_between_min_and_max() {
        assert_eq!(sparkline(&[1.0, 2.0, 3.0]), "▁▅█");
        assert_eq!(sparkline(&[5.0, 5.0]), "▁▁");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn renders_fields_and_placeholders() {
        let mut view = MemoryView::dashboard();
        view.set_text(ElementId::CurrentTemp, "22.5°C");
        let mut humidity = MemoryChart::humidity();
        humidity.data_mut().datasets[0].data = vec![1.0, 2.0, 0.0];

        let out = render_dashboard(&view, MemoryChart::main().data(), humidity.data());
        assert!(out.contains("Temperature   22.5°C"));
        assert!(out.contains("Humidity        -"));
        assert!(out.contains("History: 24h, device all"));
        assert!(out.contains("Normal (30-70%): 2"));
        assert!(!out.contains("Recent readings"));
    }

    #[test]
    fn history_line_shows_selected_filters() {
        let mut view = MemoryView::dashboard();
        view.set_value(ElementId::TimeRange, "6");
        view.set_value(ElementId::DeviceSelect, "ESP8266_001");

        let out = render_dashboard(
            &view,
            MemoryChart::main().data(),
            MemoryChart::humidity().data(),
        );
        assert!(out.contains("History: 6h, device ESP8266_001"));
    }
}
