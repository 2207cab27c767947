//! Golden traces: a recorded scenario plus per-tick snapshot digests, replayable bit for bit.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::scenario::Scenario;
use crate::trace::{NullTraceSink, TraceLog};

/// Bumped whenever the digest or event encoding changes.
pub const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    /// FNV-1a digest of the snapshot taken after the tick.
    pub digest: u64,
    /// Engine events emitted during the tick.
    pub events: u32,
}

/// First tick at which two traces disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub tick: u64,
    /// `None` when that trace ended before `tick`.
    pub expected: Option<TickRecord>,
    pub actual: Option<TickRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenTrace {
    pub format: u32,
    pub scenario: Scenario,
    pub ticks: Vec<TickRecord>,
    pub events: TraceLog,
}

impl GoldenTrace {
    pub fn new(scenario: Scenario, ticks: Vec<TickRecord>, events: TraceLog) -> Self {
        Self {
            format: FORMAT_VERSION,
            scenario,
            ticks,
            events,
        }
    }

    pub fn final_digest(&self) -> Option<u64> {
        self.ticks.last().map(|t| t.digest)
    }

    pub fn to_json(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let trace: Self = serde_json::from_str(json)?;
        if trace.format != FORMAT_VERSION {
            return Err(TraceError::Format {
                found: trace.format,
                expected: FORMAT_VERSION,
            });
        }
        Ok(trace)
    }

    pub fn save(&self, path: &Path) -> Result<(), TraceError> {
        fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), ticks = self.ticks.len(), "trace saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, TraceError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Compares tick records in order; event logs are only consulted where digests agree.
    pub fn first_divergence(&self, actual: &GoldenTrace) -> Option<Divergence> {
        let len = self.ticks.len().max(actual.ticks.len());
        for i in 0..len {
            let expected = self.ticks.get(i).copied();
            let got = actual.ticks.get(i).copied();
            if expected == got && self.events_match(actual, expected.map(|t| t.tick)) {
                continue;
            }
            let tick = expected.or(got).map_or(i as u64 + 1, |t| t.tick);
            return Some(Divergence {
                tick,
                expected,
                actual: got,
            });
        }
        None
    }

    fn events_match(&self, other: &GoldenTrace, tick: Option<u64>) -> bool {
        let Some(tick) = tick else {
            return true;
        };
        self.events.at_tick(tick).eq(other.events.at_tick(tick))
    }

    /// Re-runs the recorded scenario and compares it against this trace.
    pub fn replay(&self) -> Result<Option<Divergence>, TraceError> {
        let rerun = self.scenario.record(&mut NullTraceSink)?;
        Ok(self.first_divergence(&rerun))
    }

    /// Like [`GoldenTrace::replay`], but a divergence is an error.
    pub fn verify(&self) -> Result<(), TraceError> {
        match self.replay()? {
            None => Ok(()),
            Some(divergence) => {
                tracing::warn!(
                    tick = divergence.tick,
                    expected = ?divergence.expected.map(|t| t.digest),
                    actual = ?divergence.actual.map(|t| t.digest),
                    "replay diverged"
                );
                Err(TraceError::Diverged {
                    tick: divergence.tick,
                })
            }
        }
    }
}
