//! Per-exercise grading session.
//!
//! A [`GradingSession`] owns the cluster index and the grading memory of one
//! exercise for as long as tutors grade it. Both live behind their own
//! [`RwLock`]: clustering a new submission or absorbing feedback takes a
//! write lock, computing suggestions only takes read locks, so concurrent
//! tutors never observe a half-recorded assessment.
//!
//! Locks are always taken in the same order, models before memory.

use std::{
    collections::BTreeSet,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;

use compass_core::{diagram::Diagram, feedback::Feedback, identifier::Id, score::CompassResult};

use crate::{
    assessment::AssessmentIndex,
    config::AppConfig,
    controller::{AutomaticAssessmentController, BatchAssessment, ModelFailure, SuggestedFeedback},
    error::CompassError,
    model_index::ModelIndex,
    similarity_detector::SimilarityDetector,
};

/// Grading decisions of an exercise.
#[derive(Debug, Default)]
pub struct GradingMemory {
    assessments: AssessmentIndex,
    assessed: BTreeSet<u64>,
}

impl GradingMemory {
    pub fn assessments(&self) -> &AssessmentIndex {
        &self.assessments
    }

    /// Submissions a tutor graded, in ascending order.
    pub fn assessed_submissions(&self) -> impl Iterator<Item = u64> + '_ {
        self.assessed.iter().copied()
    }
}

/// Size of a session at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatistics {
    models: usize,
    elements: usize,
    unique_elements: usize,
    assessed_clusters: usize,
    assessed_submissions: usize,
}

impl SessionStatistics {
    pub fn models(&self) -> usize {
        self.models
    }

    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Number of clusters.
    pub fn unique_elements(&self) -> usize {
        self.unique_elements
    }

    /// Number of clusters with at least one recorded score.
    pub fn assessed_clusters(&self) -> usize {
        self.assessed_clusters
    }

    pub fn assessed_submissions(&self) -> usize {
        self.assessed_submissions
    }
}

/// Cluster index and grading memory of one exercise.
///
/// # Examples
///
/// ```
/// use compass::{
///     config::AppConfig,
///     diagram::{DiagramBuilder, DiagramKind},
///     element::{Class, ClassType},
///     feedback::Feedback,
///     identifier::Id,
///     session::GradingSession,
/// };
/// use indexmap::IndexMap;
///
/// let session = GradingSession::new(42, &AppConfig::default())?;
///
/// for submission_id in [1, 2] {
///     let mut builder = DiagramBuilder::new(submission_id, DiagramKind::ClassDiagram);
///     builder.add_class("c1", Class::new("Pizza", ClassType::Class), None)?;
///     session.add_model(builder.build())?;
/// }
///
/// let mut feedback = IndexMap::new();
/// feedback.insert(Id::new("c1"), Feedback::manual(1.0));
/// session.add_feedback(1, &feedback)?;
///
/// let suggestion = session.suggest(2)?;
/// assert_eq!(suggestion.entities_covered(), 1);
/// assert_eq!(suggestion.points(), 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct GradingSession {
    exercise_id: u64,
    controller: AutomaticAssessmentController,
    batch_size: usize,
    models: RwLock<ModelIndex>,
    memory: RwLock<GradingMemory>,
}

impl GradingSession {
    /// Opens a session.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::InvalidThreshold`] or
    /// [`CompassError::InvalidConfidence`] for out-of-range settings.
    pub fn new(exercise_id: u64, config: &AppConfig) -> Result<Self, CompassError> {
        let threshold = config.compass().equality_threshold()?;
        let confidence = config.compass().automatic_feedback_confidence()?;

        info!(
            exercise_id,
            threshold = threshold.value(),
            confidence;
            "Grading session opened"
        );
        Ok(Self {
            exercise_id,
            controller: AutomaticAssessmentController::new(confidence),
            batch_size: config.selection().batch_size(),
            models: RwLock::new(ModelIndex::new(threshold)),
            memory: RwLock::new(GradingMemory::default()),
        })
    }

    pub fn exercise_id(&self) -> u64 {
        self.exercise_id
    }

    /// Stores `diagram` and clusters its elements under one write lock.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::DuplicateSubmission`] if the submission was
    /// added before; the clustering is left unchanged in that case.
    pub fn add_model(&self, diagram: Diagram) -> Result<(), CompassError> {
        let submission_id = diagram.submission_id();
        let elements = diagram.len();
        let mut models = self.write_models()?;

        models.add_model(diagram)?;
        SimilarityDetector::analyze(&mut models, submission_id)?;

        info!(
            exercise_id = self.exercise_id,
            submission_id,
            elements,
            unique_elements = models.number_of_unique_elements();
            "Model added"
        );
        Ok(())
    }

    /// Adds several diagrams, collecting the ones that were rejected.
    ///
    /// # Errors
    ///
    /// Only fails if the session itself is unusable.
    pub fn add_models(
        &self,
        diagrams: impl IntoIterator<Item = Diagram>,
    ) -> Result<Vec<ModelFailure>, CompassError> {
        let mut failures = Vec::new();
        for diagram in diagrams {
            let submission_id = diagram.submission_id();
            match self.add_model(diagram) {
                Ok(()) => {}
                Err(CompassError::SessionPoisoned) => return Err(CompassError::SessionPoisoned),
                Err(error) => failures.push(ModelFailure::new(submission_id, error)),
            }
        }
        Ok(failures)
    }

    /// Absorbs a tutor's feedback on a stored submission and marks the
    /// submission as manually assessed.
    ///
    /// Returns the number of recorded items.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownSubmission`] if the submission was
    /// never added.
    pub fn add_feedback(
        &self,
        submission_id: u64,
        feedback: &IndexMap<Id, Feedback>,
    ) -> Result<usize, CompassError> {
        let models = self.read_models()?;
        let diagram = models
            .model(submission_id)
            .ok_or(CompassError::UnknownSubmission(submission_id))?;

        let mut memory = self.write_memory()?;
        let recorded = self.controller.try_add_feedbacks_to_assessment(
            &mut memory.assessments,
            feedback,
            diagram,
        )?;
        memory.assessed.insert(submission_id);
        Ok(recorded)
    }

    /// Suggests an assessment for a stored submission and caches it on the
    /// diagram.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownSubmission`] if the submission was
    /// never added.
    pub fn suggest(&self, submission_id: u64) -> Result<CompassResult, CompassError> {
        let result = {
            let models = self.read_models()?;
            let diagram = models
                .model(submission_id)
                .ok_or(CompassError::UnknownSubmission(submission_id))?;
            let memory = self.read_memory()?;
            self.controller
                .try_assess_model(diagram, &memory.assessments)?
        };

        let mut models = self.write_models()?;
        if let Some(diagram) = models.model_mut(submission_id) {
            diagram.set_last_assessment_result(result.clone());
        }
        Ok(result)
    }

    /// Proposes feedback for every covered element of a stored submission.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownSubmission`] if the submission was
    /// never added.
    pub fn suggest_feedback(
        &self,
        submission_id: u64,
    ) -> Result<Vec<SuggestedFeedback>, CompassError> {
        let models = self.read_models()?;
        let diagram = models
            .model(submission_id)
            .ok_or(CompassError::UnknownSubmission(submission_id))?;
        let memory = self.read_memory()?;
        self.controller
            .suggest_feedback(diagram, &memory.assessments)
    }

    /// Latest cached suggestion of a stored submission.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownSubmission`] if the submission was
    /// never added.
    pub fn last_assessment_result(
        &self,
        submission_id: u64,
    ) -> Result<Option<CompassResult>, CompassError> {
        let models = self.read_models()?;
        let diagram = models
            .model(submission_id)
            .ok_or(CompassError::UnknownSubmission(submission_id))?;
        Ok(diagram.last_assessment_result().cloned())
    }

    /// Scores every stored submission and caches the results.
    pub fn assess_all(&self) -> Result<BatchAssessment, CompassError> {
        let mut models = self.write_models()?;
        let memory = self.read_memory()?;
        Ok(self
            .controller
            .assess_models_automatically(&mut models, &memory.assessments))
    }

    /// Returns `true` once a tutor gave feedback on the submission.
    pub fn is_assessed(&self, submission_id: u64) -> Result<bool, CompassError> {
        Ok(self.read_memory()?.assessed.contains(&submission_id))
    }

    /// Picks up to `limit` submissions no tutor graded yet, those with the
    /// most elements the engine cannot score first. Ties go to the lower
    /// submission id.
    pub fn next_models_to_assess(&self, limit: usize) -> Result<Vec<u64>, CompassError> {
        let models = self.read_models()?;
        let memory = self.read_memory()?;

        let mut candidates = Vec::new();
        for diagram in models.models() {
            let submission_id = diagram.submission_id();
            if memory.assessed.contains(&submission_id) {
                continue;
            }
            let result = self
                .controller
                .try_assess_model(diagram, &memory.assessments)?;
            let uncovered = result.total_elements() - result.entities_covered();
            candidates.push((uncovered, submission_id));
        }

        candidates.sort_by(|(a_uncovered, a_id), (b_uncovered, b_id)| {
            b_uncovered.cmp(a_uncovered).then(a_id.cmp(b_id))
        });
        let selected: Vec<u64> = candidates
            .into_iter()
            .take(limit)
            .map(|(_, submission_id)| submission_id)
            .collect();

        debug!(selected = selected.len(), limit; "Models selected for assessment");
        Ok(selected)
    }

    /// [`next_models_to_assess`](Self::next_models_to_assess) with the
    /// configured batch size.
    pub fn next_batch_to_assess(&self) -> Result<Vec<u64>, CompassError> {
        self.next_models_to_assess(self.batch_size)
    }

    pub fn statistics(&self) -> Result<SessionStatistics, CompassError> {
        let models = self.read_models()?;
        let memory = self.read_memory()?;

        Ok(SessionStatistics {
            models: models.model_count(),
            elements: models.element_count(),
            unique_elements: models.number_of_unique_elements(),
            assessed_clusters: memory.assessments.len(),
            assessed_submissions: memory.assessed.len(),
        })
    }

    /// Forgets all grading decisions but keeps the clustering.
    pub fn reset_assessments(&self) -> Result<(), CompassError> {
        let mut memory = self.write_memory()?;
        memory.assessments.clear();
        memory.assessed.clear();
        info!(exercise_id = self.exercise_id; "Assessments reset");
        Ok(())
    }

    /// Ends the session and hands out its state.
    pub fn close(self) -> Result<(ModelIndex, GradingMemory), CompassError> {
        let models = self
            .models
            .into_inner()
            .map_err(|_| CompassError::SessionPoisoned)?;
        let memory = self
            .memory
            .into_inner()
            .map_err(|_| CompassError::SessionPoisoned)?;

        info!(
            exercise_id = self.exercise_id,
            models = models.model_count();
            "Grading session closed"
        );
        Ok((models, memory))
    }

    fn read_models(&self) -> Result<RwLockReadGuard<'_, ModelIndex>, CompassError> {
        self.models.read().map_err(|_| CompassError::SessionPoisoned)
    }

    fn write_models(&self) -> Result<RwLockWriteGuard<'_, ModelIndex>, CompassError> {
        self.models.write().map_err(|_| CompassError::SessionPoisoned)
    }

    fn read_memory(&self) -> Result<RwLockReadGuard<'_, GradingMemory>, CompassError> {
        self.memory.read().map_err(|_| CompassError::SessionPoisoned)
    }

    fn write_memory(&self) -> Result<RwLockWriteGuard<'_, GradingMemory>, CompassError> {
        self.memory.write().map_err(|_| CompassError::SessionPoisoned)
    }
}
