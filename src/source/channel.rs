//! Channel-based event source.
//!
//! Receives console events via a tokio mpsc channel. This is useful for
//! embedding, where another component already talks to the cluster and
//! pushes updates, and for driving the console in tests.

use std::time::Duration;

use tokio::sync::mpsc;

use super::{clamp_statistics_interval, ConsoleEvent, EventSource, MIN_STATISTICS_INTERVAL};

/// A source that receives console events via a channel.
///
/// Details requests and interval changes are recorded so the producer can
/// act on them.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use clusterwatch::{ChannelSource, ConsoleEvent, EventSource};
///
/// let (tx, mut source) = ChannelSource::create("embedded");
/// tx.try_send(ConsoleEvent::Connectivity(BTreeMap::from([("n1".to_string(), true)])))
///     .unwrap();
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<ConsoleEvent>,
    description: String,
    requested: Vec<String>,
    interval: Duration,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an mpsc channel
    /// * `source_description` - A description of where events come from
    pub fn new(receiver: mpsc::Receiver<ConsoleEvent>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            requested: Vec::new(),
            interval: MIN_STATISTICS_INTERVAL,
            closed: false,
        }
    }

    /// Create a channel pair for sending events to a ChannelSource.
    pub fn create(source_description: &str) -> (mpsc::Sender<ConsoleEvent>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self::new(rx, source_description))
    }

    /// Nodes whose details have been requested, oldest first.
    pub fn take_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requested)
    }
}

impl EventSource for ChannelSource {
    fn poll(&mut self) -> Option<ConsoleEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.closed.then(|| "Channel closed".to_string())
    }

    fn request_details(&mut self, node: &str) {
        self.requested.push(node.to_string());
    }

    fn set_statistics_interval(&mut self, interval: Duration) -> Duration {
        self.interval = clamp_statistics_interval(interval);
        self.interval
    }

    fn statistics_interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        assert!(source.poll().is_none());

        let stats = BTreeMap::from([("n1".to_string(), Some(json!({"zeit": 1})))]);
        tx.try_send(ConsoleEvent::Statistics(stats.clone())).unwrap();

        assert_eq!(source.poll(), Some(ConsoleEvent::Statistics(stats)));
        assert!(source.poll().is_none());
        assert!(source.error().is_none());
    }

    #[test]
    fn test_closed_channel_reports_error() {
        let (tx, mut source) = ChannelSource::create("test");
        drop(tx);
        assert!(source.poll().is_none());
        assert_eq!(source.error().as_deref(), Some("Channel closed"));
    }

    #[test]
    fn test_requests_are_recorded() {
        let (_tx, mut source) = ChannelSource::create("test");
        source.request_details("n1");
        source.request_details("n2");
        assert_eq!(source.take_requests(), vec!["n1", "n2"]);
        assert!(source.take_requests().is_empty());
    }

    #[test]
    fn test_interval_is_clamped() {
        let (_tx, mut source) = ChannelSource::create("test");
        assert_eq!(source.set_statistics_interval(Duration::ZERO), MIN_STATISTICS_INTERVAL);
        assert_eq!(
            source.set_statistics_interval(Duration::from_secs(20)),
            Duration::from_secs(20)
        );
        assert_eq!(source.description(), "channel: test");
    }
}
