//! Data types shared across the feed client
//!
//! Everything here mirrors the JSON shapes served by the SecMon backend.

mod analysis;
mod event;
mod process;
pub mod stats;

pub use analysis::{EventAnalysis, IpIntel, KnowledgeGraph, ThreatIntel};
pub use event::{Event, Severity};
pub use process::{ProcessLink, ProcessNode, ProcessTree};
pub use stats::AggregateStats;
