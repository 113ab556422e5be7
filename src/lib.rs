//! Population engine core for metaheuristic optimization.
//!
//! Provides the scaffold shared by population-based algorithms such as
//! particle swarm, genetic, and differential evolution:
//!
//! - **Generation loop**: `init` → per-generation `step` + `update`,
//!   strictly sequential.
//! - **Fitness convention**: one "larger is better" internal rule,
//!   regardless of whether the user maximizes or minimizes.
//! - **Best tracking**: best-so-far fitness and position, with a full
//!   per-generation history.
//! - **Boundary repair**: clipping and randomized re-sampling.
//! - **Surrogate substitution**: score a candidate generation with a cheap
//!   predictor instead of the true fitness function.
//!
//! # Architecture
//!
//! Concrete search operators are not part of this crate. An algorithm
//! implements [`engine::SearchStrategy`] and calls the engine's evaluation
//! and repair primitives from its move step.

pub mod engine;
