//! Core traits for the engine.
//!
//! [`FitnessFunction`] and [`Surrogate`] are the black boxes the engine
//! consumes. [`SearchStrategy`] is the seam where a concrete algorithm
//! plugs in its move step.

use super::error::EngineError;
use super::runner::Engine;
use super::unit::{Member, Unit};

/// Objective function over a position.
///
/// Returns the raw fitness in the user's own sense; the engine applies
/// the sign convention. Any plain `Fn(&[f64]) -> f64` is a fitness
/// function. Implement the trait directly when evaluation can fail.
///
/// # Examples
///
/// ```
/// use u_popcore::engine::FitnessFunction;
///
/// fn sphere(x: &[f64]) -> f64 {
///     x.iter().map(|v| v * v).sum()
/// }
///
/// assert_eq!(sphere.evaluate(&[1.0, 2.0]).unwrap(), 5.0);
/// ```
pub trait FitnessFunction {
    /// Evaluates a position of length D.
    fn evaluate(&self, position: &[f64]) -> anyhow::Result<f64>;
}

impl<F> FitnessFunction for F
where
    F: Fn(&[f64]) -> f64,
{
    fn evaluate(&self, position: &[f64]) -> anyhow::Result<f64> {
        Ok(self(position))
    }
}

/// Cheap approximator substituted for the true fitness function.
///
/// Predictions are taken as internal-convention fitness (larger is
/// better) and must come back one per position, in input order.
pub trait Surrogate {
    fn predict(&self, positions: &[Vec<f64>]) -> anyhow::Result<Vec<f64>>;
}

impl<F> Surrogate for F
where
    F: Fn(&[Vec<f64>]) -> Vec<f64>,
{
    fn predict(&self, positions: &[Vec<f64>]) -> anyhow::Result<Vec<f64>> {
        Ok(self(positions))
    }
}

/// A concrete population-based algorithm.
///
/// The engine drives the generation loop; a strategy only decides how
/// positions move. Each generation the engine calls [`step`] and then
/// [`Engine::update`], so every move is recorded by the bookkeeping pass.
///
/// [`step`]: SearchStrategy::step
pub trait SearchStrategy<M: Member = Unit> {
    /// Algorithm name, used in reports.
    fn name(&self) -> &str {
        "base"
    }

    /// Prepares the population after `init`.
    ///
    /// The default fills an empty population with `population_size`
    /// units drawn uniformly within bounds and evaluates each one. A
    /// seeded population is kept, and any seeded unit that was never
    /// evaluated is evaluated now. Overrides that skip this must leave
    /// every unit scored before the first `update`.
    fn initialize<F: FitnessFunction>(
        &mut self,
        engine: &mut Engine<F, M>,
    ) -> Result<(), EngineError> {
        engine.fill_random_population()?;
        engine.evaluate_unscored()
    }

    /// Moves the population for `generation` (1-based).
    ///
    /// The default moves nothing.
    fn step<F: FitnessFunction>(
        &mut self,
        _engine: &mut Engine<F, M>,
        _generation: usize,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Strategy that never moves a unit.
///
/// Runs only the bookkeeping: best tracking, history, snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stationary;

impl<M: Member> SearchStrategy<M> for Stationary {
    fn name(&self) -> &str {
        "stationary"
    }
}
