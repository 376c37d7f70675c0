//! Configuration types for grading sessions.
//!
//! All types implement [`serde::Deserialize`] and default every field, so a
//! configuration file only needs to name the values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`CompassConfig`] - Clustering strictness and the weight of unreviewed
//!   automatic feedback.
//! - [`SelectionConfig`] - How many models are proposed for manual grading.
//!
//! Values are validated when a session is built from them, not while the
//! file is read.
//!
//! # Example
//!
//! ```
//! # use compass::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.compass().equality_threshold()?.value(), 0.95);
//! assert_eq!(config.selection().batch_size(), 10);
//! # Ok::<(), compass::CompassError>(())
//! ```

use serde::Deserialize;

use crate::error::CompassError;

const DEFAULT_EQUALITY_THRESHOLD: f64 = 0.95;
const DEFAULT_AUTOMATIC_FEEDBACK_CONFIDENCE: f64 = 0.5;
const DEFAULT_BATCH_SIZE: usize = 10;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Assessment engine section.
    #[serde(default)]
    compass: CompassConfig,

    /// Model selection section.
    #[serde(default)]
    selection: SelectionConfig,
}

impl AppConfig {
    pub fn new(compass: CompassConfig, selection: SelectionConfig) -> Self {
        Self { compass, selection }
    }

    pub fn compass(&self) -> &CompassConfig {
        &self.compass
    }

    pub fn selection(&self) -> &SelectionConfig {
        &self.selection
    }
}

/// Assessment engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompassConfig {
    /// Similarity an element must exceed to join an existing cluster.
    equality_threshold: f64,

    /// Confidence of automatic feedback a tutor accepted without changes.
    automatic_feedback_confidence: f64,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            equality_threshold: DEFAULT_EQUALITY_THRESHOLD,
            automatic_feedback_confidence: DEFAULT_AUTOMATIC_FEEDBACK_CONFIDENCE,
        }
    }
}

impl CompassConfig {
    pub fn new(equality_threshold: f64, automatic_feedback_confidence: f64) -> Self {
        Self {
            equality_threshold,
            automatic_feedback_confidence,
        }
    }

    /// Returns the validated clustering threshold.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::InvalidThreshold`] unless the value lies in
    /// the open interval `(0, 1)`.
    pub fn equality_threshold(&self) -> Result<EqualityThreshold, CompassError> {
        EqualityThreshold::new(self.equality_threshold)
    }

    /// Returns the validated confidence of automatic feedback.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::InvalidConfidence`] unless the value lies in
    /// `[0, 1]`.
    pub fn automatic_feedback_confidence(&self) -> Result<f64, CompassError> {
        let confidence = self.automatic_feedback_confidence;
        if (0.0..=1.0).contains(&confidence) {
            Ok(confidence)
        } else {
            Err(CompassError::InvalidConfidence(confidence))
        }
    }
}

/// Model selection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of models proposed for manual assessment at once.
    batch_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SelectionConfig {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Clustering threshold in the open interval `(0, 1)`.
///
/// An element joins the cluster of its most similar predecessor only when
/// the similarity is strictly greater than this value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct EqualityThreshold(f64);

impl EqualityThreshold {
    /// Validates a threshold.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::InvalidThreshold`] for values outside `(0, 1)`
    /// and for NaN.
    pub fn new(value: f64) -> Result<Self, CompassError> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(CompassError::InvalidThreshold(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` if `similarity` is high enough to join a cluster.
    pub fn is_exceeded_by(self, similarity: f64) -> bool {
        similarity > self.0
    }
}

impl Default for EqualityThreshold {
    fn default() -> Self {
        Self(DEFAULT_EQUALITY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds_are_exclusive() {
        assert!(EqualityThreshold::new(0.5).is_ok());
        assert!(matches!(
            EqualityThreshold::new(0.0),
            Err(CompassError::InvalidThreshold(_))
        ));
        assert!(EqualityThreshold::new(1.0).is_err());
        assert!(EqualityThreshold::new(-0.3).is_err());
        assert!(EqualityThreshold::new(f64::NAN).is_err());
    }

    #[test]
    fn test_threshold_is_strict() {
        let threshold = EqualityThreshold::new(0.8).unwrap();

        assert!(threshold.is_exceeded_by(0.81));
        assert!(!threshold.is_exceeded_by(0.8));
    }

    #[test]
    fn test_confidence_bounds_are_inclusive() {
        assert_eq!(
            CompassConfig::new(0.9, 1.0)
                .automatic_feedback_confidence()
                .unwrap(),
            1.0
        );
        assert!(matches!(
            CompassConfig::new(0.9, 1.2).automatic_feedback_confidence(),
            Err(CompassError::InvalidConfidence(_))
        ));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [compass]
            equality_threshold = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.compass().equality_threshold().unwrap().value(), 0.8);
        assert_eq!(
            config.compass().automatic_feedback_confidence().unwrap(),
            DEFAULT_AUTOMATIC_FEEDBACK_CONFIDENCE
        );
        assert_eq!(config.selection().batch_size(), DEFAULT_BATCH_SIZE);
    }
}
