//! Deterministic simulation primitives shared by the wolfpack crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod ids;
pub mod math;
pub mod rng;
pub mod shuffle_bag;
pub mod stagger;
pub mod tick;

pub use ids::{AgentId, AgentKey, BodyHandle, PackKey};
pub use math::Vec2;
pub use rng::{DeterministicRng, RngState, SimRng, SplitMix64};
pub use shuffle_bag::ShuffleBag;
pub use stagger::Stagger;
pub use tick::TickContext;
