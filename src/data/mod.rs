//! Statistics model, history and render pipeline.
//!
//! Everything in here is independent of the terminal: it turns raw node
//! statistics into tables and chart specifications that the `ui` module
//! draws.
//!
//! ## Submodules
//!
//! - [`key`]: The `namespace!field[!suffix]` compound key codec ([`StatKey`])
//! - [`format`]: Display types and value formatting
//! - [`registry`]: Language pack, [`Labels`] and the [`StatRegistry`]
//! - [`snapshot`]: Decoding a node's statistics payload ([`Snapshot`])
//! - [`history`]: Bounded per-node snapshot buffer ([`History`])
//! - [`selection`]: Per-node plotted series ([`PlotSelection`])
//! - [`table`]: Stats table build and incremental repaint ([`StatsRenderer`])
//! - [`chart`]: Multi-axis chart assembly ([`ChartSpec`])
//! - [`duration`]: Parsing and formatting of durations ("5s", "1m 5s")
//!
//! ## Data Flow
//!
//! ```text
//! statistics JSON
//!        │
//!        ▼
//! Snapshot::from_json()  (keys decoded once)
//!        │
//!        ├──▶ History::append()
//!        │         │
//!        │         └──▶ chart::assemble()  ◀── PlotSelection
//!        │
//!        └──▶ StatsRenderer::repaint()  (build once, then patch values)
//! ```

pub mod chart;
pub mod duration;
pub mod format;
pub mod history;
pub mod key;
pub mod registry;
pub mod selection;
pub mod snapshot;
pub mod table;

pub use chart::{AxisPosition, ChartSpec, Series, YAxis};
pub use format::{DisplayValue, GroupType, StatType, TickFormatter};
pub use history::{History, Point, DEFAULT_HISTORY_SIZE};
pub use key::StatKey;
pub use registry::{LanguagePack, LanguagePackError, Labels, StatRegistry};
pub use selection::PlotSelection;
pub use snapshot::{Snapshot, SnapshotError};
pub use table::{PlotControl, RenderState, Repaint, StatRow, StatsRenderer, StatsTable, TableRow};
