use crate::{rng, AgentId};

/// Per-update timing handed down from the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub frame: u64,
    pub dt_seconds: f32,
    /// Simulation time at the end of this tick.
    pub time: f32,
    pub seed: u64,
}

impl TickContext {
    /// [`rng::agent_phase`] under this tick's seed.
    pub fn agent_phase<A: AgentId>(&self, agent: A, stream: u64) -> f32 {
        rng::agent_phase(self.seed, agent, stream)
    }
}
