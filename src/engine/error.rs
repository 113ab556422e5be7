//! Error type shared by the engine and its configuration.

use super::runner::RunState;

/// Errors surfaced by [`Engine`](super::Engine) and its configuration.
///
/// Every failure is fatal to the current run. The engine never retries
/// and never logs-and-continues.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Lower and upper bound vectors differ in length, or disagree with
    /// the configured dimensionality.
    #[error("BoundsLength: expected {expected} bounds, got lower={lower}, upper={upper}")]
    BoundsLength {
        expected: usize,
        lower: usize,
        upper: usize,
    },

    /// A dimension whose lower bound exceeds its upper bound, or whose
    /// bounds are not finite.
    #[error("InvalidBound: dimension {index} has min={min}, max={max}")]
    InvalidBound { index: usize, min: f64, max: f64 },

    /// Any other rejected configuration parameter.
    #[error("InvalidConfig: {0}")]
    InvalidConfig(String),

    /// A position whose length differs from the configured dimensionality.
    #[error("DimensionMismatch: unit {index} has {actual} components, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// `update` was called with a generation other than the next one.
    #[error("GenerationOutOfOrder: expected generation {expected}, got {actual}")]
    GenerationOutOfOrder { expected: usize, actual: usize },

    /// The fitness function failed.
    #[error("Evaluation: fitness function failed")]
    Evaluation(#[source] anyhow::Error),

    /// The surrogate predictor failed.
    #[error("Surrogate: predictor failed")]
    Surrogate(#[source] anyhow::Error),

    /// The surrogate predictor returned a different number of values than
    /// positions it was given.
    #[error("PredictionCount: surrogate returned {actual} predictions for {expected} positions")]
    PredictionCount { expected: usize, actual: usize },

    /// A lifecycle operation was called before `init`.
    #[error("NotInitialized: engine is {0:?}, call init first")]
    NotInitialized(RunState),

    /// A lifecycle operation was called after the final generation.
    #[error("AlreadyCompleted: all {0} generations have run")]
    AlreadyCompleted(usize),
}

impl EngineError {
    pub(crate) fn dimension_mismatch(index: usize, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            index,
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_fields() {
        let err = EngineError::dimension_mismatch(2, 3, 4);
        assert_eq!(
            err.to_string(),
            "DimensionMismatch: unit 2 has 4 components, expected 3"
        );

        let err = EngineError::InvalidBound {
            index: 1,
            min: 2.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("dimension 1"));
    }

    #[test]
    fn test_evaluation_keeps_source() {
        use std::error::Error;

        let err = EngineError::Evaluation(anyhow::anyhow!("solver diverged"));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("solver diverged"));
    }
}
