//! Score values and the automatic assessment result of a diagram.

use indexmap::IndexMap;
use serde::Serialize;

use crate::identifier::Id;

/// Points together with the confidence that they are right.
///
/// Scores are immutable; aggregation always produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    points: f64,
    confidence: f64,
}

impl Score {
    /// Creates a score. `confidence` is clamped into `[0, 1]`.
    pub fn new(points: f64, confidence: f64) -> Self {
        Self {
            points,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Signed credits.
    pub fn points(&self) -> f64 {
        self.points
    }

    /// Confidence in `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Folds `other` into a running mean that already holds `count` scores.
    ///
    /// # Examples
    ///
    /// ```
    /// use compass_core::score::Score;
    ///
    /// let mean = Score::new(1.0, 1.0).merge(1, Score::new(0.0, 0.5));
    /// assert_eq!(mean.points(), 0.5);
    /// assert_eq!(mean.confidence(), 0.75);
    /// ```
    pub fn merge(&self, count: usize, other: Score) -> Self {
        let weight = count as f64;
        let total = weight + 1.0;
        Self::new(
            (self.points * weight + other.points) / total,
            (self.confidence * weight + other.confidence) / total,
        )
    }
}

/// Suggested assessment of one diagram, derived from grading memory.
///
/// Recomputed from scratch on every run and never partially updated.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompassResult {
    entities_covered: usize,
    total_elements: usize,
    points: f64,
    confidence: f64,
    element_scores: IndexMap<Id, Score>,
}

impl CompassResult {
    /// Aggregates per-element scores of a diagram with `total_elements`
    /// assessable elements.
    ///
    /// Points are summed; confidence is the mean confidence over the covered
    /// elements, or zero when nothing is covered.
    pub fn from_element_scores(element_scores: IndexMap<Id, Score>, total_elements: usize) -> Self {
        let entities_covered = element_scores.len();
        let (points, confidence_sum) = element_scores
            .values()
            .fold((0.0, 0.0), |(points, confidence), score| {
                (points + score.points(), confidence + score.confidence())
            });
        let confidence = if entities_covered > 0 {
            confidence_sum / entities_covered as f64
        } else {
            0.0
        };

        Self {
            entities_covered,
            total_elements,
            points,
            confidence,
            element_scores,
        }
    }

    /// Number of elements that received a suggested score.
    pub fn entities_covered(&self) -> usize {
        self.entities_covered
    }

    /// Number of elements that were considered.
    pub fn total_elements(&self) -> usize {
        self.total_elements
    }

    /// Sum of suggested points.
    pub fn points(&self) -> f64 {
        self.points
    }

    /// Mean confidence of the covered elements.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Share of elements covered, zero for an empty diagram.
    pub fn coverage(&self) -> f64 {
        if self.total_elements == 0 {
            0.0
        } else {
            self.entities_covered as f64 / self.total_elements as f64
        }
    }

    /// Suggested score for a single element.
    pub fn score_for(&self, element: Id) -> Option<Score> {
        self.element_scores.get(&element).copied()
    }

    /// Suggested scores in diagram order.
    pub fn element_scores(&self) -> impl Iterator<Item = (Id, Score)> + '_ {
        self.element_scores.iter().map(|(id, score)| (*id, *score))
    }
}
