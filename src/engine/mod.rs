//! Population engine core.
//!
//! The scaffold every population-based metaheuristic (PSO, GA, DE, ...)
//! shares: the generation loop, a single "larger is better" fitness
//! convention, best-so-far tracking with full history, boundary repair,
//! and surrogate-assisted fitness substitution. No search operator lives
//! here; algorithms plug in through [`SearchStrategy`].
//!
//! # Key Types
//!
//! - [`Engine`]: Owns the population and the run's bookkeeping
//! - [`EngineConfig`]: Dimensionality, sizes, bounds, objective sense
//! - [`Unit`] / [`Member`]: Candidate solutions and their trajectories
//! - [`Bounds`] / [`BoundaryRepair`]: Search space and repair policies
//! - [`RunReport`]: Result export with per-generation history
//!
//! # Lifecycle
//!
//! `Uninitialized → Initialized → Completed`. [`Engine::init`] resets run
//! state, [`Engine::iteration`] drives `step` + [`Engine::update`] once per
//! generation, and [`Engine::run`] does both and times the run.

mod bounds;
mod config;
mod error;
mod report;
mod runner;
mod types;
mod unit;

pub use bounds::{BoundaryRepair, Bounds};
pub use config::{EngineConfig, Objective};
pub use error::EngineError;
pub use report::{GenerationRecord, RunReport};
pub use runner::{Engine, RunState, Substitution};
pub use types::{FitnessFunction, SearchStrategy, Stationary, Surrogate};
pub use unit::{Member, Unit};
