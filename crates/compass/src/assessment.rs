//! Grading memory: what tutors decided for each cluster.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;

use compass_core::{
    context::{Context, SimilarityId},
    score::Score,
};

#[derive(Debug, Clone)]
struct Entry {
    score: Score,
    contributions: usize,
    latest_comment: Option<String>,
}

/// Remembered scores of one cluster, one per context.
#[derive(Debug, Clone, Default)]
pub struct Assessment {
    entries: IndexMap<Context, Entry>,
}

impl Assessment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a score into the running mean for `context`.
    ///
    /// The first score for a context is stored as is. Every further score is
    /// merged into a mean weighted by the number of earlier contributions.
    pub fn record(&mut self, context: Context, score: Score) {
        match self.entries.get_mut(&context) {
            Some(entry) => {
                entry.score = entry.score.merge(entry.contributions, score);
                entry.contributions += 1;
            }
            None => {
                self.entries.insert(
                    context,
                    Entry {
                        score,
                        contributions: 1,
                        latest_comment: None,
                    },
                );
            }
        }
        trace!(context:% = context, points = score.points(); "Score recorded");
    }

    /// Records a score together with the tutor's comment.
    ///
    /// A missing comment keeps the previous one.
    pub fn record_feedback(&mut self, context: Context, score: Score, comment: Option<&str>) {
        self.record(context, score);
        if let (Some(comment), Some(entry)) = (comment, self.entries.get_mut(&context)) {
            entry.latest_comment = Some(comment.to_string());
        }
    }

    /// Current mean score for `context`, if any tutor graded it.
    pub fn score_for(&self, context: Context) -> Option<Score> {
        self.entries.get(&context).map(|entry| entry.score)
    }

    /// Number of scores merged into the mean for `context`.
    pub fn contributions(&self, context: Context) -> usize {
        self.entries
            .get(&context)
            .map_or(0, |entry| entry.contributions)
    }

    pub fn latest_comment(&self, context: Context) -> Option<&str> {
        self.entries
            .get(&context)
            .and_then(|entry| entry.latest_comment.as_deref())
    }

    /// Number of graded contexts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assessments keyed by cluster id.
#[derive(Debug, Clone, Default)]
pub struct AssessmentIndex {
    assessments: HashMap<SimilarityId, Assessment>,
}

impl AssessmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, similarity_id: SimilarityId) -> Option<&Assessment> {
        self.assessments.get(&similarity_id)
    }

    /// Returns the assessment of a cluster, creating an empty one on first
    /// access.
    pub fn get_or_create(&mut self, similarity_id: SimilarityId) -> &mut Assessment {
        self.assessments.entry(similarity_id).or_default()
    }

    /// Number of clusters with an assessment.
    pub fn len(&self) -> usize {
        self.assessments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }

    pub fn clear(&mut self) {
        self.assessments.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (SimilarityId, &Assessment)> {
        self.assessments.iter().map(|(id, assessment)| (*id, assessment))
    }
}
