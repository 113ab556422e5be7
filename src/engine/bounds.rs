//! Search-space bounds and boundary repair.
//!
//! [`Bounds`] holds one closed interval `[min[i], max[i]]` per dimension.
//! Two repair policies bring out-of-range components back inside:
//!
//! - [`Bounds::clip`]: replace with the nearest bound. Keeps the unit close
//!   to where its move step sent it, which favours greedy convergence.
//! - [`Bounds::randomize`]: replace with a uniform draw from the interval.
//!   Restores diversity that clipping would collapse onto the boundary.
//!
//! Neither policy is applied by the engine on its own; strategies choose
//! one per algorithm, typically through [`BoundaryRepair`].
//!
//! Both policies treat `NaN` as out of range. Clipping has no nearest
//! bound for it and uses the lower bound; randomized repair re-draws it.
//! A position whose length differs from the bounds is rejected.

use super::error::EngineError;
use rand::Rng;

/// Per-dimension closed intervals of the search space.
///
/// # Examples
///
/// ```
/// use u_popcore::engine::Bounds;
///
/// let bounds = Bounds::new(vec![-5.0, 0.0], vec![5.0, 1.0]).unwrap();
/// assert_eq!(bounds.dim(), 2);
/// assert_eq!(bounds.clip(&[7.0, -0.5]).unwrap(), vec![5.0, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from lower and upper vectors.
    ///
    /// # Errors
    /// [`EngineError::BoundsLength`] if the vectors differ in length,
    /// [`EngineError::InvalidBound`] if any `min[i] > max[i]` or either
    /// value is not finite.
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Result<Self, EngineError> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Creates `dim` identical intervals `[min, max]`.
    pub fn uniform(dim: usize, min: f64, max: f64) -> Result<Self, EngineError> {
        Self::new(vec![min; dim], vec![max; dim])
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.min.len()
    }

    /// Lower bounds.
    pub fn min(&self) -> &[f64] {
        &self.min
    }

    /// Upper bounds.
    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Returns `true` if every component lies within its interval.
    pub fn contains(&self, position: &[f64]) -> bool {
        position.len() == self.dim()
            && position
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(&x, (&lo, &hi))| (lo..=hi).contains(&x))
    }

    /// Re-checks the interval invariants.
    ///
    /// Deserialized bounds bypass [`Bounds::new`], so configuration
    /// validation calls this again.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min.len() != self.max.len() {
            return Err(EngineError::BoundsLength {
                expected: self.min.len(),
                lower: self.min.len(),
                upper: self.max.len(),
            });
        }
        for (index, (&min, &max)) in self.min.iter().zip(&self.max).enumerate() {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(EngineError::InvalidBound { index, min, max });
            }
        }
        Ok(())
    }

    /// Rejects a position whose length is not `self.dim()`.
    pub fn check(&self, position: &[f64]) -> Result<(), EngineError> {
        if position.len() != self.dim() {
            return Err(EngineError::dimension_mismatch(
                0,
                self.dim(),
                position.len(),
            ));
        }
        Ok(())
    }

    /// Clipping repair: each component outside `[min[i], max[i]]` becomes
    /// the nearest bound, and `NaN` becomes `min[i]`.
    ///
    /// Idempotent: `clip(clip(x)) == clip(x)`.
    ///
    /// # Errors
    /// [`EngineError::DimensionMismatch`] if `position.len() != self.dim()`.
    pub fn clip(&self, position: &[f64]) -> Result<Vec<f64>, EngineError> {
        self.check(position)?;
        Ok(position
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&x, (&lo, &hi))| if x.is_nan() { lo } else { x.clamp(lo, hi) })
            .collect())
    }

    /// Randomized repair: each component outside `[min[i], max[i]]`, `NaN`
    /// included, is replaced by a uniform draw from that interval.
    ///
    /// In-range components pass through unchanged.
    ///
    /// # Errors
    /// [`EngineError::DimensionMismatch`] if `position.len() != self.dim()`.
    pub fn randomize<R: Rng>(
        &self,
        position: &[f64],
        rng: &mut R,
    ) -> Result<Vec<f64>, EngineError> {
        self.check(position)?;
        Ok(position
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&x, (&lo, &hi))| {
                if (lo..=hi).contains(&x) {
                    x
                } else {
                    draw(lo, hi, rng)
                }
            })
            .collect())
    }

    /// Draws a position uniformly from the whole box.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(&lo, &hi)| draw(lo, hi, rng))
            .collect()
    }
}

/// Uniform draw from `[lo, hi]` for any finite interval.
///
/// Works on half-widths so `hi - lo` never overflows, even for
/// `[-f64::MAX, f64::MAX]`.
fn draw<R: Rng>(lo: f64, hi: f64, rng: &mut R) -> f64 {
    let step = (hi / 2.0 - lo / 2.0) * rng.random::<f64>();
    (lo + step + step).clamp(lo, hi)
}

/// Boundary repair policy, selectable per algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryRepair {
    /// Replace out-of-range components with the nearest bound.
    #[default]
    Clip,
    /// Replace out-of-range components with a uniform draw.
    Random,
}

impl BoundaryRepair {
    /// Applies this policy to `position` within `bounds`.
    pub fn apply<R: Rng>(
        self,
        bounds: &Bounds,
        position: &[f64],
        rng: &mut R,
    ) -> Result<Vec<f64>, EngineError> {
        match self {
            BoundaryRepair::Clip => bounds.clip(position),
            BoundaryRepair::Random => bounds.randomize(position, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square() -> Bounds {
        Bounds::uniform(3, -5.0, 5.0).unwrap()
    }

    // ---- Construction ----

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = Bounds::new(vec![0.0, 0.0], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::BoundsLength {
                lower: 2,
                upper: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_new_rejects_inverted_interval() {
        let err = Bounds::new(vec![0.0, 3.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidBound { index: 1, .. }));
    }

    #[test]
    fn test_new_rejects_non_finite() {
        assert!(Bounds::new(vec![f64::NEG_INFINITY], vec![1.0]).is_err());
        assert!(Bounds::new(vec![0.0], vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_widest_bounds_sample_inside() {
        let bounds = Bounds::uniform(2, -f64::MAX, f64::MAX).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..32 {
            let position = bounds.sample(&mut rng);
            assert!(position.iter().all(|x| x.is_finite()));
            assert!(bounds.contains(&position));
        }
    }

    #[test]
    fn test_widest_bounds_randomize_inside() {
        let bounds = Bounds::new(vec![-f64::MAX, 0.0], vec![f64::MAX, 1.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let repaired = bounds.randomize(&[f64::NAN, 2.0], &mut rng).unwrap();
        assert!(bounds.contains(&repaired));
    }

    #[test]
    fn test_degenerate_interval_allowed() {
        let bounds = Bounds::new(vec![2.0], vec![2.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(bounds.randomize(&[10.0], &mut rng).unwrap(), vec![2.0]);
        assert_eq!(bounds.sample(&mut rng), vec![2.0]);
    }

    // ---- Clipping ----

    #[test]
    fn test_clip_moves_to_nearest_bound() {
        let clipped = square().clip(&[7.0, -9.0, 1.5]).unwrap();
        assert_eq!(clipped, vec![5.0, -5.0, 1.5]);
    }

    #[test]
    fn test_clip_keeps_boundary_values() {
        let clipped = square().clip(&[5.0, -5.0, 0.0]).unwrap();
        assert_eq!(clipped, vec![5.0, -5.0, 0.0]);
    }

    #[test]
    fn test_clip_sends_nan_to_lower_bound() {
        let clipped = square().clip(&[f64::NAN, 0.0, 0.0]).unwrap();
        assert_eq!(clipped, vec![-5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_repair_rejects_wrong_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = square();

        assert!(matches!(
            bounds.clip(&[9.0]),
            Err(EngineError::DimensionMismatch {
                expected: 3,
                actual: 1,
                ..
            })
        ));
        assert!(bounds.randomize(&[9.0, 9.0, 9.0, 9.0], &mut rng).is_err());
    }

    // ---- Randomized ----

    #[test]
    fn test_randomize_passes_in_range_through() {
        let mut rng = StdRng::seed_from_u64(42);
        let repaired = square().randomize(&[1.0, 100.0, -2.0], &mut rng).unwrap();
        assert_eq!(repaired[0], 1.0);
        assert_eq!(repaired[2], -2.0);
        assert!((-5.0..=5.0).contains(&repaired[1]));
    }

    #[test]
    fn test_randomize_treats_nan_as_out_of_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let repaired = square().randomize(&[f64::NAN, 0.0, 0.0], &mut rng).unwrap();
        assert!((-5.0..=5.0).contains(&repaired[0]));
    }

    #[test]
    fn test_policy_dispatch() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = square();
        assert_eq!(
            BoundaryRepair::Clip.apply(&bounds, &[6.0, 0.0, 0.0], &mut rng).unwrap(),
            vec![5.0, 0.0, 0.0]
        );
        let random = BoundaryRepair::Random
            .apply(&bounds, &[6.0, 0.0, 0.0], &mut rng)
            .unwrap();
        assert!(bounds.contains(&random));
    }

    // ---- Properties ----

    proptest! {
        #[test]
        fn prop_clip_is_idempotent(position in prop::collection::vec(-1e6f64..1e6, 3)) {
            let bounds = square();
            let once = bounds.clip(&position).unwrap();
            let twice = bounds.clip(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_clip_lands_inside(position in prop::collection::vec(-1e6f64..1e6, 3)) {
            prop_assert!(square().contains(&square().clip(&position).unwrap()));
        }

        #[test]
        fn prop_randomize_lands_inside(
            position in prop::collection::vec(-1e6f64..1e6, 3),
            seed in any::<u64>(),
        ) {
            let bounds = square();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..8 {
                let repaired = bounds.randomize(&position, &mut rng).unwrap();
                prop_assert!(bounds.contains(&repaired), "escaped bounds: {:?}", repaired);
            }
        }
    }
}
