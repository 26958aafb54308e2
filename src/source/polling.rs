//! Backend polling source.
//!
//! Three background tasks share one event channel:
//!
//! ```text
//! connectivity task ──(every connect interval)──▶ Connectivity
//!        │ watch: connected nodes
//!        ▼
//! statistics task  ──(every statistics interval)─▶ Statistics
//!        ▲ watch: interval
//!        │
//! set_statistics_interval()
//!
//! details task ◀── request_details()  ──▶ Details
//! ```
//!
//! A failed cycle is logged and recorded as the source error; the next tick
//! simply tries again. All tasks are aborted when the source is dropped.
//!
//! Each connectivity report is complete: a node that was connected and is
//! missing from the backend's answer is reported as disconnected.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::{clamp_statistics_interval, ClusterBackend, ConsoleEvent, EventSource};

/// Lowest allowed statistics polling interval.
pub const MIN_STATISTICS_INTERVAL: Duration = Duration::from_secs(5);

/// Connectivity interval used when none (a zero interval) is given.
pub const DEFAULT_CONNECT_INTERVAL: Duration = Duration::from_secs(5);

type ErrorHandle = Arc<Mutex<Option<String>>>;

/// A source that polls a [`ClusterBackend`] on fixed intervals.
///
/// # Example with the HTTP backend
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use clusterwatch::{EventSource, HttpBackend, PollingSource};
///
/// # tokio_test::block_on(async {
/// let backend = HttpBackend::builder()
///     .endpoint("http://localhost:1887")
///     .adapter("mixnet")
///     .build()
///     .unwrap();
/// let source = PollingSource::spawn(
///     Arc::new(backend),
///     "localhost:1887",
///     Duration::from_secs(5),
///     Duration::from_secs(10),
/// );
/// assert_eq!(source.description(), "polling: localhost:1887");
/// assert_eq!(source.statistics_interval(), Duration::from_secs(10));
/// # });
/// ```
#[derive(Debug)]
pub struct PollingSource {
    receiver: mpsc::Receiver<ConsoleEvent>,
    description: String,
    last_error: ErrorHandle,
    interval_tx: watch::Sender<Duration>,
    details_tx: mpsc::UnboundedSender<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl PollingSource {
    /// Start polling. Must be called from within a tokio runtime.
    ///
    /// The statistics interval is clamped to [`MIN_STATISTICS_INTERVAL`]. A zero
    /// connectivity interval is replaced by [`DEFAULT_CONNECT_INTERVAL`].
    pub fn spawn(
        backend: Arc<dyn ClusterBackend>,
        description: &str,
        connect_interval: Duration,
        statistics_interval: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(64);
        let last_error: ErrorHandle = Arc::new(Mutex::new(None));
        let (nodes_tx, nodes_rx) = watch::channel(Vec::new());
        let (interval_tx, interval_rx) =
            watch::channel(clamp_statistics_interval(statistics_interval));
        let (details_tx, details_rx) = mpsc::unbounded_channel();

        let connect_interval = if connect_interval.is_zero() {
            warn!("zero connectivity interval, using {:?}", DEFAULT_CONNECT_INTERVAL);
            DEFAULT_CONNECT_INTERVAL
        } else {
            connect_interval
        };

        let tasks = vec![
            tokio::spawn(poll_connectivity(
                backend.clone(),
                connect_interval,
                nodes_tx,
                tx.clone(),
                last_error.clone(),
            )),
            tokio::spawn(poll_statistics(
                backend.clone(),
                interval_rx,
                nodes_rx,
                tx.clone(),
                last_error.clone(),
            )),
            tokio::spawn(fetch_details(backend, details_rx, tx, last_error.clone())),
        ];

        Self {
            receiver: rx,
            description: format!("polling: {}", description),
            last_error,
            interval_tx,
            details_tx,
            tasks,
        }
    }
}

impl Drop for PollingSource {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl EventSource for PollingSource {
    fn poll(&mut self) -> Option<ConsoleEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                set_error(&self.last_error, Some("Polling stopped".to_string()));
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|e| e.clone())
    }

    fn request_details(&mut self, node: &str) {
        if self.details_tx.send(node.to_string()).is_err() {
            warn!(node, "details task is not running");
        }
    }

    fn set_statistics_interval(&mut self, interval: Duration) -> Duration {
        let applied = clamp_statistics_interval(interval);
        self.interval_tx.send_replace(applied);
        applied
    }

    fn statistics_interval(&self) -> Duration {
        *self.interval_tx.borrow()
    }
}

fn set_error(handle: &ErrorHandle, error: Option<String>) {
    if let Ok(mut last) = handle.lock() {
        *last = error;
    }
}

fn make_ticker(period: Duration, immediate: bool) -> Interval {
    let mut ticker = if immediate {
        interval(period)
    } else {
        interval_at(Instant::now() + period, period)
    };
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn poll_connectivity(
    backend: Arc<dyn ClusterBackend>,
    period: Duration,
    nodes_tx: watch::Sender<Vec<String>>,
    tx: mpsc::Sender<ConsoleEvent>,
    last_error: ErrorHandle,
) {
    let mut ticker = make_ticker(period, true);
    let mut connected: BTreeSet<String> = BTreeSet::new();
    loop {
        ticker.tick().await;
        match backend.fetch_connected().await {
            Ok(mut report) => {
                set_error(&last_error, None);
                for node in &connected {
                    if !report.contains_key(node) {
                        debug!(node, "node missing from connectivity report");
                        report.insert(node.clone(), false);
                    }
                }
                let nodes: Vec<String> = report
                    .iter()
                    .filter(|(_, connected)| **connected)
                    .map(|(node, _)| node.clone())
                    .collect();
                connected = nodes.iter().cloned().collect();
                nodes_tx.send_if_modified(|current| {
                    if *current != nodes {
                        *current = nodes;
                        true
                    } else {
                        false
                    }
                });
                if tx.send(ConsoleEvent::Connectivity(report)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "connectivity poll failed");
                set_error(&last_error, Some(format!("Connectivity: {}", e)));
            }
        }
    }
}

async fn poll_statistics(
    backend: Arc<dyn ClusterBackend>,
    mut interval_rx: watch::Receiver<Duration>,
    mut nodes_rx: watch::Receiver<Vec<String>>,
    tx: mpsc::Sender<ConsoleEvent>,
    last_error: ErrorHandle,
) {
    let mut ticker = make_ticker(*interval_rx.borrow_and_update(), true);
    let mut known: Vec<String> = Vec::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = *interval_rx.borrow_and_update();
                debug!(?period, "statistics interval changed");
                ticker = make_ticker(period, false);
                continue;
            }
            changed = nodes_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let nodes = nodes_rx.borrow_and_update().clone();
                let fresh = nodes.iter().any(|n| !known.contains(n));
                known = nodes;
                // Newly connected nodes are polled right away.
                if !fresh {
                    continue;
                }
            }
        }

        let nodes = nodes_rx.borrow().clone();
        if nodes.is_empty() {
            continue;
        }

        match backend.fetch_statistics(&nodes).await {
            Ok(report) => {
                set_error(&last_error, None);
                if tx.send(ConsoleEvent::Statistics(report)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "statistics poll failed");
                set_error(&last_error, Some(format!("Statistics: {}", e)));
            }
        }
    }
}

async fn fetch_details(
    backend: Arc<dyn ClusterBackend>,
    mut requests: mpsc::UnboundedReceiver<String>,
    tx: mpsc::Sender<ConsoleEvent>,
    last_error: ErrorHandle,
) {
    while let Some(node) = requests.recv().await {
        match backend.fetch_details(&node).await {
            Ok(details) => {
                if tx.send(ConsoleEvent::Details { node, details }).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(node, error = %e, "details request failed");
                set_error(&last_error, Some(format!("Details for {}: {}", node, e)));
            }
        }
    }
}
