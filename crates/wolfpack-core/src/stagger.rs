use crate::AgentId;

/// Spreads expensive per-agent work across frames.
///
/// Whether work is due is a pure function of `(frame mod every, id mod every)`, so two replicas
/// running the same frames always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stagger {
    pub every: u32,
    pub offset: u32,
}

impl Default for Stagger {
    fn default() -> Self {
        Self {
            every: 1,
            offset: 0,
        }
    }
}

impl Stagger {
    pub fn for_agent(agent: impl AgentId, every: u32) -> Self {
        let every = every.max(1);
        let offset = (agent.stable_id() % (every as u64)) as u32;
        Self { every, offset }
    }

    pub fn is_due(&self, frame: u64) -> bool {
        let every = self.every.max(1) as u64;
        ((frame + (self.offset as u64)) % every) == 0
    }

    /// Same slot assignment with the period stretched by `factor` (level-of-detail).
    pub fn stretched(agent: impl AgentId, every: u32, factor: u32) -> Self {
        Self::for_agent(agent, every.max(1).saturating_mul(factor.max(1)))
    }
}
