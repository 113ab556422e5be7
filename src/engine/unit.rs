//! Population members.
//!
//! [`Unit`] is the basic candidate solution the engine reads: a position,
//! its internal-convention fitness, and the trajectory of past positions.
//! Algorithm-specific members (a particle with a velocity, say) wrap a
//! `Unit` and implement [`Member`] so the engine can build and inspect
//! them.

use super::error::EngineError;

/// A single candidate solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    position: Vec<f64>,
    fitness: f64,
    history: Vec<Vec<f64>>,
}

impl Unit {
    /// Creates an unevaluated unit at `position`.
    ///
    /// Its fitness starts at `f64::MIN`, the worst internal value.
    pub fn new(position: Vec<f64>) -> Self {
        Self::with_fitness(position, f64::MIN)
    }

    /// Creates a unit with a known internal-convention fitness.
    pub fn with_fitness(position: Vec<f64>, fitness: f64) -> Self {
        Self {
            position,
            fitness,
            history: Vec::new(),
        }
    }

    pub fn position(&self) -> &[f64] {
        &self.position
    }

    /// Mutable access to the components. The length cannot change.
    pub fn position_mut(&mut self) -> &mut [f64] {
        &mut self.position
    }

    /// Replaces the position wholesale.
    ///
    /// # Errors
    /// [`EngineError::DimensionMismatch`] if the new length differs.
    pub fn set_position(&mut self, position: Vec<f64>) -> Result<(), EngineError> {
        if position.len() != self.position.len() {
            return Err(EngineError::dimension_mismatch(
                0,
                self.position.len(),
                position.len(),
            ));
        }
        self.position = position;
        Ok(())
    }

    /// Current fitness, internal maximize convention.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Returns `false` while the fitness is still the `f64::MIN` sentinel
    /// set by [`Unit::new`].
    pub fn is_evaluated(&self) -> bool {
        self.fitness != f64::MIN
    }

    /// Records the current position as the next trajectory entry.
    pub fn save(&mut self) {
        self.history.push(self.position.clone());
    }

    /// Past positions, one per completed generation.
    pub fn history(&self) -> &[Vec<f64>] {
        &self.history
    }

    /// Dimensionality of this unit.
    pub fn dim(&self) -> usize {
        self.position.len()
    }
}

/// A population member the engine can construct and inspect.
///
/// The engine only ever touches the embedded [`Unit`]; everything else a
/// member carries belongs to its search strategy.
///
/// # Implementing
///
/// ```
/// use u_popcore::engine::{Member, Unit};
///
/// #[derive(Clone)]
/// struct Particle {
///     unit: Unit,
///     velocity: Vec<f64>,
/// }
///
/// impl Member for Particle {
///     fn from_unit(unit: Unit) -> Self {
///         let velocity = vec![0.0; unit.dim()];
///         Self { unit, velocity }
///     }
///     fn unit(&self) -> &Unit { &self.unit }
///     fn unit_mut(&mut self) -> &mut Unit { &mut self.unit }
/// }
/// ```
pub trait Member: Clone {
    /// Builds a member around a freshly created unit.
    fn from_unit(unit: Unit) -> Self;

    fn unit(&self) -> &Unit;

    fn unit_mut(&mut self) -> &mut Unit;
}

impl Member for Unit {
    fn from_unit(unit: Unit) -> Self {
        unit
    }

    fn unit(&self) -> &Unit {
        self
    }

    fn unit_mut(&mut self) -> &mut Unit {
        self
    }
}
