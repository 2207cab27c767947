//! Trace and replay tooling for wolfpack hunts.
//!
//! Engine events are flattened into [`TraceEvent`]s, scripted [`Scenario`]s are recorded into
//! [`GoldenTrace`]s with a snapshot digest per tick, and a stored trace can be replayed to find
//! the first tick where the engine's behaviour changed.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod golden;
pub mod scenario;
pub mod trace;

pub use error::TraceError;
pub use golden::{Divergence, GoldenTrace, TickRecord, FORMAT_VERSION};
pub use scenario::{scripted_target, Scenario, ScenarioRun, ScriptHost};
pub use trace::{
    emit, LogTraceSink, NullTraceSink, TraceEvent, TraceLog, TraceSink, VecTraceSink,
};
