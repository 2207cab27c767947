//! Deterministic pack-hunting AI: predators that perceive, coordinate and strike a single target
//! under a fixed, replayable tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod attack;
pub mod comms;
pub mod config;
pub mod coordinator;
pub mod difficulty;
pub mod emotion;
pub mod error;
pub mod events;
pub mod fairness;
pub mod host;
pub mod pack;
pub mod prediction;
pub mod snapshot;
pub mod state;
pub mod state_machine;
pub mod steering;
pub mod terrain;

pub use agent::{Agent, WolfKind};
pub use attack::{AttackKind, AttackOutcome};
pub use comms::{Message, MessageKind, Payload};
pub use config::{HuntConfig, Span};
pub use coordinator::PackCoordinator;
pub use difficulty::{AdaptiveDifficulty, DifficultyTuning};
pub use emotion::Emotion;
pub use error::HuntError;
pub use events::HuntEvent;
pub use fairness::{DirectiveReason, Pressure};
pub use host::{CombatSink, HuntHost, NullHost, PhysicsBridge, RecordingHost, TargetInput};
pub use pack::{LeaderAbility, PackPlan, Role};
pub use snapshot::{AgentSnapshot, HuntSnapshot, PackSnapshot};
pub use state::AgentState;
pub use terrain::{TerrainFeature, TerrainKind};

pub use wolfpack_core::{AgentKey, BodyHandle, PackKey, SimRng, Vec2};
