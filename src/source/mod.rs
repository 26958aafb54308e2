//! Event source abstraction for receiving cluster updates.
//!
//! A source turns backend responses into [`ConsoleEvent`]s that the UI loop
//! drains without blocking and feeds to the [`Console`](crate::Console).
//!
//! - [`PollingSource`]: supervised tokio tasks polling a [`ClusterBackend`]
//! - [`ChannelSource`]: events pushed through an in-memory channel

mod backend;
mod channel;
mod polling;

pub use backend::{BackendError, ClusterBackend, HttpBackend, HttpBackendBuilder};
pub use channel::ChannelSource;
pub use polling::{PollingSource, DEFAULT_CONNECT_INTERVAL, MIN_STATISTICS_INTERVAL};

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

use serde_json::Value;

/// Connection state of every known node, by name.
pub type ConnectivityReport = BTreeMap<String, bool>;

/// Statistics per node; `None` when a node had nothing to report.
pub type StatisticsReport = BTreeMap<String, Option<Value>>;

/// An update for the console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    Connectivity(ConnectivityReport),
    Statistics(StatisticsReport),
    /// Descriptor for a node's info panel.
    Details { node: String, details: Value },
}

/// Clamp a requested statistics interval to the allowed floor.
pub fn clamp_statistics_interval(interval: Duration) -> Duration {
    interval.max(MIN_STATISTICS_INTERVAL)
}

/// Trait for receiving console events from various sources.
///
/// # Example
///
/// ```
/// use clusterwatch::{ChannelSource, EventSource};
///
/// let (_tx, mut source) = ChannelSource::create("test");
/// assert!(source.poll().is_none());
/// ```
pub trait EventSource: Send + Debug {
    /// Next pending event, if any. Never blocks.
    fn poll(&mut self) -> Option<ConsoleEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The most recent poll failure, cleared by the next success.
    fn error(&self) -> Option<String>;

    /// Ask for a node's details; the answer arrives as
    /// [`ConsoleEvent::Details`].
    fn request_details(&mut self, node: &str);

    /// Change the statistics polling interval, returning the interval
    /// actually applied.
    fn set_statistics_interval(&mut self, interval: Duration) -> Duration;

    fn statistics_interval(&self) -> Duration;
}
