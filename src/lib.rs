//! # clusterwatch
//!
//! A terminal console and library for watching the statistics of cluster
//! nodes live.
//!
//! Nodes publish flat JSON statistics snapshots. The console polls them on an
//! interval, keeps a bounded history per node, renders the latest snapshot as
//! a formatted table and plots the statistics the user selects over time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│ console  │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (data)   │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── PollingSource (HTTP) | ChannelSource        │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, node navigation and user interaction
//! - **[`console`]**: Per-node history, table and chart state driven by
//!   [`ConsoleEvent`]s
//! - **[`source`]**: Event source abstraction ([`EventSource`] trait) with a
//!   backend poller and a channel-based source
//! - **[`data`]**: Statistic keys, formatting, the language pack, history and
//!   the table and chart models
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]**: Settings from a config file and the environment
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the nodes behind a cluster endpoint
//! clusterwatch --endpoint http://localhost:1887 --adapter mixnet
//!
//! # Poll every 10 seconds and keep 120 snapshots per node
//! clusterwatch --interval 10s --history 120
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use clusterwatch::{App, ChannelSource, Console, LanguagePack};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (labels, registry) = LanguagePack::builtin()?.into_parts();
//! let (tx, source) = ChannelSource::create("test");
//! let app = App::new(Box::new(source), Console::new(labels, registry, 60));
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod console;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use console::{Connectivity, Console, Ingest};
pub use data::{
    ChartSpec, DisplayValue, History, Labels, LanguagePack, PlotSelection, Snapshot, StatKey,
    StatRegistry, StatType, StatsTable,
};
pub use source::{
    BackendError, ChannelSource, ClusterBackend, ConsoleEvent, EventSource, HttpBackend,
    PollingSource,
};
