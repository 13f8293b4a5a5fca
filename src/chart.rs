//! Chart widgets and the series derived from a reading list.

use chrono::FixedOffset;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::models::Reading;
use crate::format::format_short_time;

pub const MAIN_CHART: &str = "main";
pub const HUMIDITY_CHART: &str = "humidity";

pub const HUMIDITY_LOW_BELOW: f64 = 30.0;
pub const HUMIDITY_HIGH_ABOVE: f64 = 70.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

impl Dataset {
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// Mutable access to dataset `index`, creating empty datasets up to it.
    pub fn dataset_mut(&mut self, index: usize) -> &mut Dataset {
        if self.datasets.len() <= index {
            self.datasets.resize_with(index + 1, Dataset::default);
        }
        &mut self.datasets[index]
    }
}

/// Update-data contract of a chart widget: mutate `data`, then call `update`.
pub trait Chart: Send {
    fn data_mut(&mut self) -> &mut ChartData;

    /// Redraw from the current data.
    fn update(&mut self);
}

pub type SharedChart = Arc<Mutex<dyn Chart>>;

/// Chart kept in memory; counts redraw requests.
#[derive(Debug, Clone, Default)]
pub struct MemoryChart {
    data: ChartData,
    updates: usize,
}

impl MemoryChart {
    /// Line chart with temperature and humidity datasets.
    #[must_use]
    pub fn main() -> Self {
        Self {
            data: ChartData {
                labels: Vec::new(),
                datasets: vec![Dataset::new("Temperatura (°C)"), Dataset::new("Umidade (%)")],
            },
            updates: 0,
        }
    }

    /// Distribution chart with one dataset over the low/normal/high buckets.
    #[must_use]
    pub fn humidity() -> Self {
        Self {
            data: ChartData {
                labels: vec![
                    "Baixa (<30%)".to_string(),
                    "Normal (30-70%)".to_string(),
                    "Alta (>70%)".to_string(),
                ],
                datasets: vec![Dataset::new("Leituras")],
            },
            updates: 0,
        }
    }

    #[must_use]
    pub fn data(&self) -> &ChartData {
        &self.data
    }

    #[must_use]
    pub fn update_count(&self) -> usize {
        self.updates
    }
}

impl Chart for MemoryChart {
    fn data_mut(&mut self) -> &mut ChartData {
        &mut self.data
    }

    fn update(&mut self) {
        self.updates += 1;
    }
}

/// Time-chart series in response order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSeries {
    pub labels: Vec<String>,
    pub temperatures: Vec<f64>,
    pub humidities: Vec<f64>,
}

impl LineSeries {
    #[must_use]
    pub fn from_readings(readings: &[Reading], offset: FixedOffset) -> Self {
        Self {
            labels: readings
                .iter()
                .map(|r| format_short_time(r.timestamp, offset))
                .collect(),
            temperatures: readings.iter().map(|r| r.temperature).collect(),
            humidities: readings.iter().map(|r| r.humidity).collect(),
        }
    }

    pub fn apply(self, chart: &mut dyn Chart) {
        let data = chart.data_mut();
        data.labels = self.labels;
        data.dataset_mut(0).data = self.temperatures;
        data.dataset_mut(1).data = self.humidities;
        chart.update();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HumidityHistogram {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
}

impl HumidityHistogram {
    #[must_use]
    pub fn from_values(humidities: impl IntoIterator<Item = f64>) -> Self {
        humidities
            .into_iter()
            .fold(Self::default(), |mut histogram, h| {
                if h < HUMIDITY_LOW_BELOW {
                    histogram.low += 1;
                } else if h <= HUMIDITY_HIGH_ABOVE {
                    histogram.normal += 1;
                } else if h > HUMIDITY_HIGH_ABOVE {
                    histogram.high += 1;
                }
                histogram
            })
    }

    #[must_use]
    pub fn from_readings(readings: &[Reading]) -> Self {
        Self::from_values(readings.iter().map(|r| r.humidity))
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn counts(&self) -> [f64; 3] {
        [self.low as f64, self.normal as f64, self.high as f64]
    }

    pub fn apply(self, chart: &mut dyn Chart) {
        chart.data_mut().dataset_mut(0).data = self.counts().to_vec();
        chart.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_buckets_are_inclusive_in_the_middle() {
        let histogram = HumidityHistogram::from_values([10.0, 35.0, 72.0, 29.0, 71.0, 30.0]);
        assert_eq!(
            histogram,
            HumidityHistogram {
                low: 2,
                normal: 2,
                high: 2
            }
        );
        let edges = HumidityHistogram::from_values([29.99, 30.0, 70.0, 70.01]);
        assert_eq!(edges.counts(), [1.0, 2.0, 1.0]);
    }

    #[test]
    fn histogram_skips_nan() {
        let histogram = HumidityHistogram::from_values([f64::NAN, 50.0]);
        assert_eq!(histogram.counts(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn line_series_fills_missing_datasets() {
        let mut chart = MemoryChart::default();
        LineSeries {
            labels: vec!["10:00:00".into()],
            temperatures: vec![21.0],
            humidities: vec![40.0],
        }
        .apply(&mut chart);
        assert_eq!(chart.data().datasets.len(), 2);
        assert_eq!(chart.data().datasets[1].data, vec![40.0]);
        assert_eq!(chart.update_count(), 1);
    }

    #[test]
    fn histogram_replaces_single_dataset() {
        let mut chart = MemoryChart::humidity();
        HumidityHistogram {
            low: 1,
            normal: 4,
            high: 0,
        }
        .apply(&mut chart);
        assert_eq!(chart.data().datasets[0].data, vec![1.0, 4.0, 0.0]);
        assert_eq!(chart.data().labels.len(), 3);
    }
}
