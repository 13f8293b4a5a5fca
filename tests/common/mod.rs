//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

use sensor_monitor::api::Transport;
use sensor_monitor::chart::{MemoryChart, HUMIDITY_CHART, MAIN_CHART};
use sensor_monitor::config::Config;
use sensor_monitor::controller::RefreshController;
use sensor_monitor::error::{MonitorResult, NetworkError};
use sensor_monitor::view::MemoryView;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Status(u16, &'static str),
    Delayed(Duration, Value),
}

/// Transport answering from canned responses keyed by path (query string ignored).
///
/// A path may hold a queue of responses; the last one repeats once the queue drains.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: StdMutex<HashMap<String, VecDeque<MockResponse>>>,
    calls: StdMutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), VecDeque::from([response]));
    }

    pub fn respond_sequence(&self, path: &str, responses: Vec<MockResponse>) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), VecDeque::from(responses));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split('?').next() == Some(path))
            .count()
    }

    fn next_response(&self, path: &str) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch_json(&self, path: &str) -> MonitorResult<Value> {
        self.calls.lock().unwrap().push(path.to_string());
        let key = path.split('?').next().unwrap_or(path);

        match self.next_response(key) {
            Some(MockResponse::Json(value)) => Ok(value),
            Some(MockResponse::Delayed(delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Some(MockResponse::Status(code, text)) => Err(NetworkError::Status {
                code,
                text: text.to_string(),
            }
            .into()),
            None => Err(NetworkError::Transport(format!("no route for {path}")).into()),
        }
    }
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        display_offset: utc(),
        ..Config::default()
    }
}

pub fn reading_json(device: &str, temperature: f64, humidity: f64, ts: DateTime<Utc>) -> Value {
    json!({
        "id": 1,
        "device_id": device,
        "temperature": temperature,
        "humidity": humidity,
        "timestamp": ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    })
}

pub fn success(data: Vec<Value>) -> Value {
    json!({ "status": "success", "count": data.len(), "data": data })
}

pub fn stats_json() -> Value {
    json!({
        "status": "success",
        "stats": {
            "temperature": { "average": 23.46, "maximum": 30, "minimum": 18.2 },
            "humidity": { "average": 55.13, "maximum": 71.5, "minimum": 40 },
            "total_readings": 144
        }
    })
}

pub struct Harness {
    pub controller: RefreshController,
    pub transport: Arc<MockTransport>,
    pub view: Arc<Mutex<MemoryView>>,
    pub main_chart: Arc<Mutex<MemoryChart>>,
    pub humidity_chart: Arc<Mutex<MemoryChart>>,
}

impl Harness {
    /// Controller over a full dashboard view, without charts registered.
    pub fn new(config: Config) -> Self {
        let transport = Arc::new(MockTransport::new());
        let view = Arc::new(Mutex::new(MemoryView::dashboard()));
        let controller = RefreshController::new(config, transport.clone(), view.clone());
        Self {
            controller,
            transport,
            view,
            main_chart: Arc::new(Mutex::new(MemoryChart::main())),
            humidity_chart: Arc::new(Mutex::new(MemoryChart::humidity())),
        }
    }

    pub async fn with_charts(config: Config) -> Self {
        let harness = Self::new(config);
        harness
            .controller
            .register_chart(MAIN_CHART, harness.main_chart.clone())
            .await;
        harness
            .controller
            .register_chart(HUMIDITY_CHART, harness.humidity_chart.clone())
            .await;
        harness
    }
}
