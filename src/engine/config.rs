//! Engine configuration.
//!
//! [`EngineConfig`] holds the static settings of a run. They are fixed
//! once the engine is constructed.

use super::bounds::Bounds;
use super::error::EngineError;
use std::fmt;

/// Objective sense chosen by the user.
///
/// Internally the engine always treats larger fitness as better. When
/// minimizing, raw values are negated on the way in and negated again on
/// the way out, so history and reports stay in the user's own sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Objective {
    /// Larger raw fitness is better.
    #[default]
    Maximize,
    /// Smaller raw fitness is better.
    Minimize,
}

impl Objective {
    /// Converts a raw fitness value to the internal maximize convention.
    pub fn to_internal(self, raw: f64) -> f64 {
        match self {
            Objective::Maximize => raw,
            Objective::Minimize => -raw,
        }
    }

    /// Converts an internal fitness value back to the user's sense.
    pub fn to_external(self, internal: f64) -> f64 {
        // Negation is its own inverse.
        self.to_internal(internal)
    }
}

/// Configuration for an [`Engine`](super::Engine) run.
///
/// # Examples
///
/// ```
/// use u_popcore::engine::{Bounds, EngineConfig, Objective};
///
/// let bounds = Bounds::uniform(2, -5.0, 5.0).unwrap();
/// let config = EngineConfig::new(2, bounds)
///     .with_population_size(3)
///     .with_max_generations(5)
///     .with_objective(Objective::Minimize)
///     .with_quiet(true)
///     .with_seed(42);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.population_size, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Dimensionality D of every position.
    pub dim: usize,

    /// Population size N.
    pub population_size: usize,

    /// Number of generations G driven by `iteration`.
    pub max_generations: usize,

    /// Search-space bounds. Must have exactly `dim` intervals.
    pub bounds: Bounds,

    /// Whether the fitness function is maximized or minimized.
    pub objective: Objective,

    /// Suppresses per-generation `info` logging.
    pub quiet: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a fresh seed on every `init`.
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Creates a configuration with default population (30) and
    /// generation count (100), maximizing.
    pub fn new(dim: usize, bounds: Bounds) -> Self {
        Self {
            dim,
            population_size: 30,
            max_generations: 100,
            bounds,
            objective: Objective::Maximize,
            quiet: false,
            seed: None,
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Shorthand for `with_objective(Objective::Minimize)`.
    pub fn minimize(self) -> Self {
        self.with_objective(Objective::Minimize)
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`EngineError::BoundsLength`] / [`EngineError::InvalidBound`] for
    /// malformed bounds, [`EngineError::InvalidConfig`] for zero
    /// dimensionality or population size.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.dim == 0 {
            return Err(EngineError::InvalidConfig("dim must be at least 1".into()));
        }
        if self.population_size == 0 {
            return Err(EngineError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        if self.bounds.min().len() != self.dim || self.bounds.max().len() != self.dim {
            return Err(EngineError::BoundsLength {
                expected: self.dim,
                lower: self.bounds.min().len(),
                upper: self.bounds.max().len(),
            });
        }
        self.bounds.validate()
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dim: {}", self.dim)?;
        writeln!(f, "population_size: {}", self.population_size)?;
        writeln!(f, "max_generations: {}", self.max_generations)?;
        writeln!(f, "bounds_min: {:?}", self.bounds.min())?;
        writeln!(f, "bounds_max: {:?}", self.bounds.max())?;
        writeln!(f, "objective: {:?}", self.objective)?;
        writeln!(f, "quiet: {}", self.quiet)?;
        match self.seed {
            Some(seed) => writeln!(f, "seed: {seed}"),
            None => writeln!(f, "seed: random"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::new(2, Bounds::uniform(2, -5.0, 5.0).unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.population_size, 30);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.objective, Objective::Maximize);
        assert!(!config.quiet);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = config()
            .with_population_size(3)
            .with_max_generations(5)
            .minimize()
            .with_quiet(true)
            .with_seed(7);

        assert_eq!(config.population_size, 3);
        assert_eq!(config.max_generations, 5);
        assert_eq!(config.objective, Objective::Minimize);
        assert!(config.quiet);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_validate_bounds_dimension() {
        let config = EngineConfig::new(3, Bounds::uniform(2, 0.0, 1.0).unwrap());
        assert!(matches!(
            config.validate(),
            Err(EngineError::BoundsLength { expected: 3, .. })
        ));
    }

    #[test]
    fn test_validate_zero_population() {
        assert!(config().with_population_size(0).validate().is_err());
    }

    #[test]
    fn test_validate_zero_dim() {
        let config = EngineConfig::new(0, Bounds::uniform(0, 0.0, 1.0).unwrap());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_generations_allowed() {
        assert!(config().with_max_generations(0).validate().is_ok());
    }

    // ---- Sign convention ----

    #[test]
    fn test_objective_round_trip() {
        for objective in [Objective::Maximize, Objective::Minimize] {
            let raw = 3.25;
            assert_eq!(objective.to_external(objective.to_internal(raw)), raw);
        }
        assert_eq!(Objective::Minimize.to_internal(2.0), -2.0);
        assert_eq!(Objective::Maximize.to_internal(2.0), 2.0);
    }

    #[test]
    fn test_display_lists_settings() {
        let text = config().with_seed(9).to_string();
        assert!(text.contains("dim: 2"));
        assert!(text.contains("objective: Maximize"));
        assert!(text.contains("seed: 9"));
    }
}
