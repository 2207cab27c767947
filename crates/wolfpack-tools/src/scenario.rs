//! Scripted hunts: a seed, a roster size and a fixed target script fully determine every tick.

use serde::{Deserialize, Serialize};

use wolfpack_ai::host::{CombatSink, PhysicsBridge};
use wolfpack_ai::{
    AgentKey, BodyHandle, HuntConfig, PackCoordinator, TargetInput, TerrainFeature, TerrainKind,
    Vec2,
};
use wolfpack_core::rng::derive_seed;
use wolfpack_core::SimRng;

use crate::error::TraceError;
use crate::golden::{GoldenTrace, TickRecord};
use crate::trace::{emit, TraceEvent, TraceLog, TraceSink};

/// Fixed step used by every scripted run.
pub const DT: f32 = 1.0 / 60.0;

/// Stream tag for the terrain layout; kept apart from the hunt's own stream.
const LAYOUT_STREAM: u64 = 0x6c61_796f;
const LAYOUT_FEATURES: usize = 12;

/// Health points behind the target's `[0, 1]` health fraction.
const TARGET_HEALTH: f32 = 1000.0;

/// Ticks for one sweep of the target across the map and back.
const SWEEP_TICKS: u64 = 600;

const PACK_CENTERS: [Vec2; 8] = [
    Vec2::new(0.2, 0.2),
    Vec2::new(0.8, 0.8),
    Vec2::new(0.8, 0.2),
    Vec2::new(0.2, 0.8),
    Vec2::new(0.5, 0.15),
    Vec2::new(0.5, 0.85),
    Vec2::new(0.15, 0.5),
    Vec2::new(0.85, 0.5),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub seed: u64,
    pub packs: usize,
    pub agents: usize,
    pub ticks: u64,
    pub config: HuntConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            seed: 12345,
            packs: 1,
            agents: 5,
            ticks: 120,
            config: HuntConfig::default(),
        }
    }
}

impl Scenario {
    /// Terrain derived from the seed alone.
    pub fn terrain(&self) -> Vec<TerrainFeature> {
        let mut rng = SimRng::new(derive_seed(self.seed, 0, LAYOUT_STREAM));
        (0..LAYOUT_FEATURES)
            .map(|_| {
                let position = Vec2::new(rng.range(0.05, 0.95), rng.range(0.05, 0.95));
                let radius = rng.range(0.02, 0.08);
                let kind = TerrainKind::ALL[rng.index(TerrainKind::ALL.len())];
                TerrainFeature::new(position, radius, kind)
            })
            .collect()
    }

    /// Spawn positions for pack `pack`: a small grid around one of the fixed den sites.
    pub fn pack_positions(&self, pack: usize) -> Vec<Vec2> {
        let center = PACK_CENTERS[pack % PACK_CENTERS.len()];
        (0..self.agents)
            .map(|m| {
                let col = (m % 3) as f32 - 1.0;
                let row = (m / 3) as f32 - 1.0;
                center + Vec2::new(col, row) * 0.03
            })
            .collect()
    }

    /// Builds the coordinator and spawns every pack.
    pub fn start(&self) -> Result<ScenarioRun, TraceError> {
        let mut hunt = PackCoordinator::new(self.seed, self.config.clone(), self.terrain())?;
        let mut host = ScriptHost::default();
        for pack in 0..self.packs {
            hunt.spawn_pack(&self.pack_positions(pack), &mut host)?;
        }
        Ok(ScenarioRun {
            hunt,
            host,
            tick: 0,
        })
    }

    /// Runs the whole scenario, streaming events into `sink`, and returns the recorded trace.
    pub fn record(&self, sink: &mut dyn TraceSink) -> Result<GoldenTrace, TraceError> {
        self.record_run(sink).map(|(trace, _)| trace)
    }

    /// Like [`Scenario::record`], also handing back the finished run for inspection.
    pub fn record_run(
        &self,
        sink: &mut dyn TraceSink,
    ) -> Result<(GoldenTrace, ScenarioRun), TraceError> {
        let mut run = self.start()?;
        let mut events = TraceLog::default();
        // Spawn events belong to tick 0.
        for event in run.hunt.drain_events() {
            emit(&mut events, sink, TraceEvent::from_hunt(0, &event));
        }
        let mut ticks = Vec::with_capacity(self.ticks as usize);
        while run.tick < self.ticks {
            ticks.push(run.step(&mut events, sink));
        }
        tracing::info!(
            seed = self.seed,
            ticks = self.ticks,
            events = events.len(),
            "scenario recorded"
        );
        Ok((GoldenTrace::new(self.clone(), ticks, events), run))
    }
}

/// Target input for `tick`: a slow sweep across the middle of the map with short guard bursts.
pub fn scripted_target(tick: u64, health: f32) -> TargetInput {
    let half = SWEEP_TICKS / 2;
    let phase = tick % SWEEP_TICKS;
    let outbound = phase < half;
    let s = if outbound {
        phase as f32 / half as f32
    } else {
        (SWEEP_TICKS - phase) as f32 / half as f32
    };
    let speed = 0.4 / (half as f32 * DT);
    let heading = if outbound { 1.0 } else { -1.0 };

    let mut input = TargetInput::at(Vec2::new(0.3 + 0.4 * s, 0.5));
    input.velocity = Vec2::new(speed * heading, 0.0);
    input.facing = Vec2::new(heading, 0.0);
    input.health = health;
    input.blocking = tick % 90 < 8;
    input.rolling = (120..126).contains(&(tick % 240));
    input
}

/// An in-flight scripted hunt.
pub struct ScenarioRun {
    pub hunt: PackCoordinator,
    pub host: ScriptHost,
    pub tick: u64,
}

impl ScenarioRun {
    /// Advances one tick and records its digest and events.
    pub fn step(&mut self, events: &mut TraceLog, sink: &mut dyn TraceSink) -> TickRecord {
        self.tick += 1;
        let target = scripted_target(self.tick, self.host.target_health());
        self.hunt.update(DT, &target, &mut self.host);

        let drained = self.hunt.drain_events();
        for event in &drained {
            emit(events, sink, TraceEvent::from_hunt(self.tick, event));
        }
        TickRecord {
            tick: self.tick,
            digest: self.hunt.snapshot().digest(),
            events: drained.len() as u32,
        }
    }
}

/// Host for scripted runs: counts damage against the target and hands out body handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptHost {
    pub damage_dealt: f32,
    pub hits: u32,
    next_body: u64,
}

impl ScriptHost {
    pub fn target_health(&self) -> f32 {
        (1.0 - self.damage_dealt / TARGET_HEALTH).max(0.0)
    }
}

impl CombatSink for ScriptHost {
    fn apply_damage(&mut self, _at: Vec2, _direction: Vec2, amount: f32) {
        self.damage_dealt += amount;
        self.hits += 1;
    }
}

impl PhysicsBridge for ScriptHost {
    fn create_body(&mut self, _agent: AgentKey, _position: Vec2) -> BodyHandle {
        self.next_body += 1;
        BodyHandle(self.next_body)
    }

    fn destroy_body(&mut self, _body: BodyHandle) {}
}
