//! Generation loop and run-state bookkeeping.
//!
//! [`Engine`] owns one run: the population, the best-so-far record with
//! its per-generation history, and the fitness-call counter. A
//! [`SearchStrategy`] moves units between generations; the engine
//! evaluates, compares, and records.

use super::bounds::{BoundaryRepair, Bounds};
use super::config::{EngineConfig, Objective};
use super::error::EngineError;
use super::report::{GenerationRecord, RunReport};
use super::types::{FitnessFunction, SearchStrategy, Surrogate};
use super::unit::{Member, Unit};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Lifecycle state of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Constructed, `init` not yet called.
    Uninitialized,
    /// Run state reset; generations may be driven.
    Initialized,
    /// All configured generations have been recorded. Read-only.
    Completed,
}

/// Outcome of [`Engine::adopt_surrogate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    /// Candidates installed as the new population.
    pub adopted: usize,
    /// Candidates beyond `population_size`, never sent to the predictor.
    pub dropped: usize,
}

/// Population engine for one optimization run.
///
/// # Usage
///
/// ```
/// use u_popcore::engine::{Bounds, Engine, EngineConfig, Stationary};
///
/// fn sphere(x: &[f64]) -> f64 {
///     x.iter().map(|v| v * v).sum()
/// }
///
/// let config = EngineConfig::new(2, Bounds::uniform(2, -5.0, 5.0).unwrap())
///     .with_population_size(10)
///     .with_max_generations(20)
///     .minimize()
///     .with_quiet(true)
///     .with_seed(42);
///
/// let mut engine: Engine<_> = Engine::new(config, sphere).unwrap();
/// engine.run(&mut Stationary, None).unwrap();
///
/// assert_eq!(engine.fitness_history().len(), 20);
/// assert_eq!(engine.evaluations(), 10);
/// ```
pub struct Engine<F, M = Unit> {
    config: EngineConfig,
    fitness: F,
    population: Vec<M>,
    best_position: Vec<f64>,
    best_fitness: f64,
    fitness_history: Vec<f64>,
    position_history: Vec<Vec<f64>>,
    evaluations: usize,
    state: RunState,
    rng: StdRng,
    elapsed: Option<Duration>,
}

impl<F: FitnessFunction, M: Member> Engine<F, M> {
    /// Creates an engine in the [`RunState::Uninitialized`] state.
    ///
    /// # Errors
    /// Any error from [`EngineConfig::validate`].
    pub fn new(config: EngineConfig, fitness: F) -> Result<Self, EngineError> {
        config.validate()?;
        let rng = create_rng(config.seed);
        Ok(Self {
            best_position: vec![0.0; config.dim],
            best_fitness: f64::MIN,
            config,
            fitness,
            population: Vec::new(),
            fitness_history: Vec::new(),
            position_history: Vec::new(),
            evaluations: 0,
            state: RunState::Uninitialized,
            rng,
            elapsed: None,
        })
    }

    // ---- Lifecycle ----

    /// Resets all run state and installs `population`, or an empty one.
    ///
    /// Best position becomes the origin, best fitness the lowest internal
    /// value, histories are cleared, and the random generator is reseeded.
    /// The fitness-call counter is kept: it counts every evaluation the
    /// engine has made, seed scoring included. Callable in any state.
    ///
    /// # Errors
    /// [`EngineError::DimensionMismatch`] if a seeded unit's position
    /// length differs from `dim`. The engine is left untouched.
    #[instrument(level = "debug", skip_all, fields(seeded = population.as_ref().map(Vec::len)))]
    pub fn init(&mut self, population: Option<Vec<M>>) -> Result<(), EngineError> {
        let population = population.unwrap_or_default();
        check_dimensions(&population, self.config.dim)?;
        if !population.is_empty() && population.len() != self.config.population_size {
            debug!(
                seeded = population.len(),
                configured = self.config.population_size,
                "seed population size differs from configuration"
            );
        }

        self.population = population;
        self.best_position = vec![0.0; self.config.dim];
        self.best_fitness = f64::MIN;
        self.fitness_history = Vec::with_capacity(self.config.max_generations);
        self.position_history = Vec::with_capacity(self.config.max_generations);
        self.rng = create_rng(self.config.seed);
        self.elapsed = None;
        self.state = RunState::Initialized;
        Ok(())
    }

    /// Drives the remaining generations up to `max_generations`.
    ///
    /// Each generation calls [`SearchStrategy::step`] and then
    /// [`update`](Self::update). A fresh run starts at generation 1.
    pub fn iteration<S: SearchStrategy<M>>(&mut self, strategy: &mut S) -> Result<(), EngineError> {
        self.iteration_with_cancel(strategy, None).map(|_| ())
    }

    /// Like [`iteration`](Self::iteration), with a cooperative cancel flag.
    ///
    /// The flag is checked between generations only, never inside one.
    /// Returns `true` if the run was cancelled; the engine then stays
    /// [`RunState::Initialized`] with its partial history intact.
    pub fn iteration_with_cancel<S: SearchStrategy<M>>(
        &mut self,
        strategy: &mut S,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<bool, EngineError> {
        self.ensure_running()?;

        let first = self.generations_completed() + 1;
        for generation in first..=self.config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    debug!(generation, "run cancelled");
                    return Ok(true);
                }
            }

            strategy.step(self, generation)?;
            self.update(generation)?;
        }

        self.state = RunState::Completed;
        Ok(false)
    }

    /// Bookkeeping pass for one generation.
    ///
    /// Scans the population in order and takes any unit whose fitness is
    /// strictly greater than the running best. Then appends the best
    /// fitness (user sense) and position to the histories and snapshots
    /// every unit. Moves nothing.
    ///
    /// # Errors
    /// [`EngineError::NotInitialized`] before `init`,
    /// [`EngineError::AlreadyCompleted`] once every generation is recorded,
    /// [`EngineError::GenerationOutOfOrder`] unless `generation` is
    /// `generations_completed() + 1`.
    pub fn update(&mut self, generation: usize) -> Result<(), EngineError> {
        self.ensure_running()?;
        let expected = self.generations_completed() + 1;
        if generation != expected {
            return Err(EngineError::GenerationOutOfOrder {
                expected,
                actual: generation,
            });
        }

        for member in &self.population {
            let unit = member.unit();
            if unit.fitness() > self.best_fitness {
                self.best_fitness = unit.fitness();
                self.best_position = unit.position().to_vec();
                debug!(generation, fitness = self.best_fitness, "new best");
            }
        }

        let best = self.config.objective.to_external(self.best_fitness);
        self.fitness_history.push(best);
        self.position_history.push(self.best_position.clone());

        for member in &mut self.population {
            member.unit_mut().save();
        }

        if !self.config.quiet {
            info!(
                generation,
                best_fitness = best,
                best_position = ?self.best_position,
                "generation complete"
            );
        }

        if self.generations_completed() >= self.config.max_generations {
            self.state = RunState::Completed;
        }
        Ok(())
    }

    /// Runs `init`, the strategy's initialization, and `iteration`.
    ///
    /// Wall-clock time is kept in [`elapsed`](Self::elapsed).
    pub fn run<S: SearchStrategy<M>>(
        &mut self,
        strategy: &mut S,
        population: Option<Vec<M>>,
    ) -> Result<(), EngineError> {
        self.run_with_cancel(strategy, population, None).map(|_| ())
    }

    /// Like [`run`](Self::run), with a cooperative cancel flag.
    ///
    /// Returns `true` if the run was cancelled.
    #[instrument(level = "debug", skip_all, fields(strategy = strategy.name()))]
    pub fn run_with_cancel<S: SearchStrategy<M>>(
        &mut self,
        strategy: &mut S,
        population: Option<Vec<M>>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<bool, EngineError> {
        let started = Instant::now();

        self.init(population)?;
        strategy.initialize(self)?;
        check_dimensions(&self.population, self.config.dim)?;
        let cancelled = self.iteration_with_cancel(strategy, cancel)?;

        let elapsed = started.elapsed();
        self.elapsed = Some(elapsed);
        if !self.config.quiet {
            info!(
                strategy = strategy.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                evaluations = self.evaluations,
                best_fitness = self.best_fitness(),
                cancelled,
                "run finished"
            );
        }
        Ok(cancelled)
    }

    // ---- Primitives for strategies ----

    /// Fitness evaluation primitive.
    ///
    /// Returns the internal-convention fitness of `position` and counts
    /// one fitness call.
    ///
    /// # Errors
    /// [`EngineError::DimensionMismatch`] for a wrong-length position,
    /// [`EngineError::Evaluation`] if the fitness function fails.
    pub fn evaluate(&mut self, position: &[f64]) -> Result<f64, EngineError> {
        if position.len() != self.config.dim {
            return Err(EngineError::dimension_mismatch(
                0,
                self.config.dim,
                position.len(),
            ));
        }
        let raw = self
            .fitness
            .evaluate(position)
            .map_err(EngineError::Evaluation)?;
        self.evaluations += 1;
        Ok(self.config.objective.to_internal(raw))
    }

    /// Evaluates every unit in place. Counts one call per unit.
    pub fn evaluate_population(&mut self) -> Result<(), EngineError> {
        let mut population = std::mem::take(&mut self.population);
        let result = population.iter_mut().try_for_each(|member| -> Result<(), EngineError> {
            let fitness = self.evaluate(member.unit().position())?;
            member.unit_mut().set_fitness(fitness);
            Ok(())
        });
        self.population = population;
        result
    }

    /// Evaluates every unit still at the unevaluated sentinel
    /// (see [`Unit::is_evaluated`]). Counts one call per unit scored.
    pub fn evaluate_unscored(&mut self) -> Result<(), EngineError> {
        let mut population = std::mem::take(&mut self.population);
        let result = population
            .iter_mut()
            .filter(|member| !member.unit().is_evaluated())
            .try_for_each(|member| -> Result<(), EngineError> {
                let fitness = self.evaluate(member.unit().position())?;
                member.unit_mut().set_fitness(fitness);
                Ok(())
            });
        self.population = population;
        result
    }

    /// Fills an empty population with `population_size` evaluated units
    /// drawn uniformly within bounds. A non-empty population is kept.
    pub fn fill_random_population(&mut self) -> Result<(), EngineError> {
        if !self.population.is_empty() {
            return Ok(());
        }

        let mut population = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            let position = self.config.bounds.sample(&mut self.rng);
            let fitness = self.evaluate(&position)?;
            population.push(M::from_unit(Unit::with_fitness(position, fitness)));
        }
        self.population = population;
        Ok(())
    }

    /// Clipping repair against `bounds`, or the configured bounds if `None`.
    ///
    /// # Errors
    /// [`EngineError::BoundsLength`] if override bounds do not have `dim`
    /// intervals, [`EngineError::DimensionMismatch`] if `position` does not
    /// have `dim` components.
    pub fn clip(
        &self,
        position: &[f64],
        bounds: Option<&Bounds>,
    ) -> Result<Vec<f64>, EngineError> {
        resolve_bounds(&self.config, bounds)?.clip(position)
    }

    /// Randomized repair against `bounds`, or the configured bounds if
    /// `None`. Draws from the engine's generator.
    ///
    /// # Errors
    /// As for [`clip`](Self::clip).
    pub fn repair_random(
        &mut self,
        position: &[f64],
        bounds: Option<&Bounds>,
    ) -> Result<Vec<f64>, EngineError> {
        resolve_bounds(&self.config, bounds)?.randomize(position, &mut self.rng)
    }

    /// Applies `policy` against `bounds`, or the configured bounds if `None`.
    ///
    /// # Errors
    /// As for [`clip`](Self::clip).
    pub fn repair(
        &mut self,
        policy: BoundaryRepair,
        position: &[f64],
        bounds: Option<&Bounds>,
    ) -> Result<Vec<f64>, EngineError> {
        policy.apply(resolve_bounds(&self.config, bounds)?, position, &mut self.rng)
    }

    /// Installs a surrogate-scored generation as the population.
    ///
    /// Only the first `population_size` candidates are kept; the rest are
    /// dropped before prediction and reported in the returned
    /// [`Substitution`]. Kept candidates retain everything they carry,
    /// trajectory included, and take the predicted fitness as-is. The
    /// counter grows by the number of predictions consumed.
    ///
    /// # Errors
    /// [`EngineError::DimensionMismatch`] for a kept candidate of the wrong
    /// length, [`EngineError::Surrogate`] if the predictor fails,
    /// [`EngineError::PredictionCount`] if it returns the wrong number of
    /// values. The population is unchanged on error.
    pub fn adopt_surrogate<S: Surrogate>(
        &mut self,
        mut candidates: Vec<M>,
        surrogate: &S,
    ) -> Result<Substitution, EngineError> {
        let adopted = candidates.len().min(self.config.population_size);
        let dropped = candidates.len() - adopted;
        candidates.truncate(adopted);
        check_dimensions(&candidates, self.config.dim)?;

        let positions: Vec<Vec<f64>> = candidates
            .iter()
            .map(|member| member.unit().position().to_vec())
            .collect();
        let predictions = surrogate
            .predict(&positions)
            .map_err(EngineError::Surrogate)?;
        if predictions.len() != positions.len() {
            return Err(EngineError::PredictionCount {
                expected: positions.len(),
                actual: predictions.len(),
            });
        }

        self.evaluations += predictions.len();
        for (member, predicted) in candidates.iter_mut().zip(predictions) {
            member.unit_mut().set_fitness(predicted);
        }
        self.population = candidates;

        if dropped > 0 {
            debug!(adopted, dropped, "surrogate generation truncated to population size");
        }
        Ok(Substitution { adopted, dropped })
    }

    /// Replaces the population wholesale.
    ///
    /// # Errors
    /// [`EngineError::DimensionMismatch`] if any unit has the wrong length.
    pub fn set_population(&mut self, population: Vec<M>) -> Result<(), EngineError> {
        check_dimensions(&population, self.config.dim)?;
        self.population = population;
        Ok(())
    }

    // ---- Accessors ----

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bounds(&self) -> &Bounds {
        &self.config.bounds
    }

    pub fn objective(&self) -> Objective {
        self.config.objective
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn population(&self) -> &[M] {
        &self.population
    }

    /// Mutable access to the members. Unit dimensions stay fixed.
    pub fn population_mut(&mut self) -> &mut [M] {
        &mut self.population
    }

    /// Random generator shared by the engine and its strategy.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Best position seen so far.
    pub fn best_position(&self) -> &[f64] {
        &self.best_position
    }

    /// Best fitness seen so far, in the user's sense.
    pub fn best_fitness(&self) -> f64 {
        self.config.objective.to_external(self.best_fitness)
    }

    /// Best fitness seen so far, internal maximize convention.
    pub fn best_fitness_internal(&self) -> f64 {
        self.best_fitness
    }

    /// Best fitness per generation, user sense.
    pub fn fitness_history(&self) -> &[f64] {
        &self.fitness_history
    }

    /// Best position per generation.
    pub fn position_history(&self) -> &[Vec<f64>] {
        &self.position_history
    }

    pub fn generations_completed(&self) -> usize {
        self.fitness_history.len()
    }

    /// Number of fitness values obtained, true or predicted.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Wall-clock duration of the last [`run`](Self::run).
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Positions of every unit at `generation` (1-based).
    ///
    /// `None` if any unit has no snapshot for that generation.
    pub fn frame(&self, generation: usize) -> Option<Vec<&[f64]>> {
        let index = generation.checked_sub(1)?;
        self.population
            .iter()
            .map(|member| member.unit().history().get(index).map(Vec::as_slice))
            .collect()
    }

    /// Builds the result export for this run under `name`.
    pub fn report(&self, name: &str) -> RunReport {
        let history = self
            .fitness_history
            .iter()
            .zip(&self.position_history)
            .enumerate()
            .map(|(i, (&best_fitness, best_position))| GenerationRecord {
                generation: i + 1,
                best_position: best_position.clone(),
                best_fitness,
            })
            .collect();

        RunReport {
            name: name.to_string(),
            config: self.config.clone(),
            evaluations: self.evaluations,
            elapsed: self.elapsed,
            best_fitness: self.best_fitness(),
            best_position: self.best_position.clone(),
            history,
        }
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        match self.state {
            RunState::Initialized => Ok(()),
            RunState::Uninitialized => Err(EngineError::NotInitialized(self.state)),
            RunState::Completed => Err(EngineError::AlreadyCompleted(self.config.max_generations)),
        }
    }
}

fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random()),
    }
}

/// Picks the override bounds, if any, after checking them against `dim`.
fn resolve_bounds<'a>(
    config: &'a EngineConfig,
    bounds: Option<&'a Bounds>,
) -> Result<&'a Bounds, EngineError> {
    let Some(bounds) = bounds else {
        return Ok(&config.bounds);
    };
    if bounds.min().len() != config.dim || bounds.max().len() != config.dim {
        return Err(EngineError::BoundsLength {
            expected: config.dim,
            lower: bounds.min().len(),
            upper: bounds.max().len(),
        });
    }
    bounds.validate()?;
    Ok(bounds)
}

fn check_dimensions<M: Member>(population: &[M], dim: usize) -> Result<(), EngineError> {
    match population
        .iter()
        .enumerate()
        .find(|(_, member)| member.unit().dim() != dim)
    {
        Some((index, member)) => Err(EngineError::dimension_mismatch(
            index,
            dim,
            member.unit().dim(),
        )),
        None => Ok(()),
    }
}

// ============================================================================
// Tests
// ============================================================================
