use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensor_monitor::api::ApiClient;
use sensor_monitor::chart::{MemoryChart, HUMIDITY_CHART, MAIN_CHART};
use sensor_monitor::config::{Config, LogFormat};
use sensor_monitor::controller::{RefreshController, UiEvent};
use sensor_monitor::view::{render_dashboard, ElementId, MemoryView};

const REDRAW_INTERVAL: Duration = Duration::from_secs(1);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        api = %config.api_base_url,
        interval_secs = config.update_interval_seconds,
        "Starting sensor-monitor..."
    );

    let client = ApiClient::new(&config)?;
    tracing::info!(base_url = %client.base_url(), "API client initialized");

    let view = Arc::new(Mutex::new(MemoryView::dashboard()));
    let main_chart = Arc::new(Mutex::new(MemoryChart::main()));
    let humidity_chart = Arc::new(Mutex::new(MemoryChart::humidity()));

    let controller = RefreshController::new(config, Arc::new(client), view.clone());
    controller.register_chart(MAIN_CHART, main_chart.clone()).await;
    controller
        .register_chart(HUMIDITY_CHART, humidity_chart.clone())
        .await;

    match controller.check_health().await {
        Ok(health) if health.is_healthy() => {
            tracing::info!(database = ?health.database, "Sensor API is healthy");
        }
        Ok(health) => tracing::warn!(status = %health.status, "Sensor API reports a problem"),
        Err(e) => tracing::warn!(error = %e, "Sensor API health check failed"),
    }

    let (events_tx, events_rx) = mpsc::channel(16);
    let runner = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.run(events_rx).await })
    };

    let redraw = tokio::spawn(redraw_loop(view.clone(), main_chart, humidity_chart));

    println!(
        "Commands: a = toggle auto-refresh, t <hours> = time range, \
         d [device] = device filter, r = refresh, q = quit"
    );

    tokio::select! {
        () = read_commands(spawn_stdin_reader(), view, events_tx) => {
            tracing::info!("Input closed, shutting down...");
        },
        () = shutdown_signal() => {},
    }

    // The sender is gone once `read_commands` returns or is cancelled, which ends `run`.
    controller.shutdown().await;
    join_controller(runner, SHUTDOWN_GRACE).await;
    redraw.abort();

    tracing::info!("Sensor monitor shut down gracefully");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,sensor_monitor=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    ToggleAutoRefresh,
    TimeRange(u32),
    Device(Option<String>),
    Refresh,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?;
        let arg = parts.next();
        match command {
            "a" | "auto" => Some(Self::ToggleAutoRefresh),
            "t" | "time" => arg?.parse::<u32>().ok().filter(|h| *h > 0).map(Self::TimeRange),
            "d" | "device" => Some(Self::Device(arg.map(str::to_string))),
            "r" | "refresh" => Some(Self::Refresh),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Read stdin lines on a plain thread. A blocked read there never holds up runtime
/// shutdown; the thread ends with the process.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read command");
                    return;
                }
            }
        }
    });
    rx
}

async fn read_commands(
    mut lines: mpsc::Receiver<String>,
    view: Arc<Mutex<MemoryView>>,
    events: mpsc::Sender<UiEvent>,
) {
    while let Some(line) = lines.recv().await {

        let Some(command) = Command::parse(&line) else {
            if !line.trim().is_empty() {
                println!("Unknown command: {}", line.trim());
            }
            continue;
        };

        let event = match command {
            Command::Quit => return,
            Command::ToggleAutoRefresh => UiEvent::RefreshToggle,
            Command::Refresh => UiEvent::RefreshNow,
            Command::TimeRange(hours) => {
                view.lock()
                    .await
                    .set_value(ElementId::TimeRange, &hours.to_string());
                UiEvent::TimeRangeChanged
            }
            Command::Device(device) => {
                view.lock()
                    .await
                    .set_value(ElementId::DeviceSelect, device.as_deref().unwrap_or(""));
                UiEvent::DeviceChanged
            }
        };

        if events.send(event).await.is_err() {
            return;
        }
    }
}

/// Wait for the controller task, aborting it if a refresh is still hanging after `grace`.
async fn join_controller(mut runner: JoinHandle<()>, grace: Duration) {
    match tokio::time::timeout(grace, &mut runner).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Controller task failed"),
        Err(_) => {
            tracing::warn!(grace_secs = grace.as_secs(), "Controller still busy, aborting");
            runner.abort();
        }
    }
}

async fn redraw_loop(
    view: Arc<Mutex<MemoryView>>,
    main_chart: Arc<Mutex<MemoryChart>>,
    humidity_chart: Arc<Mutex<MemoryChart>>,
) {
    let mut ticker = tokio::time::interval(REDRAW_INTERVAL);
    let mut last = String::new();

    loop {
        ticker.tick().await;

        let frame = {
            let mut view = view.lock().await;
            let main = main_chart.lock().await;
            let humidity = humidity_chart.lock().await;
            let frame = render_dashboard(&view, main.data(), humidity.data());
            view.take_notices();
            frame
        };

        if frame != last {
            println!("{frame}");
            last = frame;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
