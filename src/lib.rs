//! Deterministic, tick-based football match simulation engine.
//!
//! Given two teams, a formation and tactic per side, and an RNG seed,
//! [`config::simulate`] produces a lazy sequence of [`model::tick::Tick`]
//! records — one per simulated minute by default, or one per simulated
//! second via [`config::simulate_with_resolution`]. The engine owns no
//! transport, persistence, or rendering concerns; it only turns inputs into
//! an ordered, reproducible stream of match state.

pub mod attributes;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod model;
pub mod rng;

pub use config::{simulate, simulate_with_resolution, MatchInputs, MatchInputsBuilder};
pub use engine::tick_loop::TickResolution;
pub use error::{EngineError, EngineResult};
pub use model::tick::Tick;
