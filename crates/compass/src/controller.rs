//! Propagation of tutor feedback into grading memory and automatic scoring
//! of diagrams from that memory.

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;

use compass_core::{
    context::{Context, SimilarityId},
    diagram::Diagram,
    element::Element,
    feedback::Feedback,
    identifier::Id,
    score::{CompassResult, Score},
};

use crate::{assessment::AssessmentIndex, error::CompassError, model_index::ModelIndex};

/// Feedback the engine proposes for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedFeedback {
    element: Id,
    credits: f64,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl SuggestedFeedback {
    pub fn element(&self) -> Id {
        self.element
    }

    pub fn credits(&self) -> f64 {
        self.credits
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// A diagram a session operation could not process.
#[derive(Debug)]
pub struct ModelFailure {
    submission_id: u64,
    error: CompassError,
}

impl ModelFailure {
    pub(crate) fn new(submission_id: u64, error: CompassError) -> Self {
        Self {
            submission_id,
            error,
        }
    }

    pub fn submission_id(&self) -> u64 {
        self.submission_id
    }

    pub fn error(&self) -> &CompassError {
        &self.error
    }
}

/// Outcome of scoring every stored diagram.
#[derive(Debug, Default)]
pub struct BatchAssessment {
    results: IndexMap<u64, CompassResult>,
    failures: Vec<ModelFailure>,
}

impl BatchAssessment {
    /// Results by submission id, in model insertion order.
    pub fn results(&self) -> &IndexMap<u64, CompassResult> {
        &self.results
    }

    pub fn failures(&self) -> &[ModelFailure] {
        &self.failures
    }

    pub fn into_parts(self) -> (IndexMap<u64, CompassResult>, Vec<ModelFailure>) {
        (self.results, self.failures)
    }
}

/// Moves scores between diagrams and the [`AssessmentIndex`].
#[derive(Debug, Clone, Copy)]
pub struct AutomaticAssessmentController {
    automatic_confidence: f64,
}

impl AutomaticAssessmentController {
    /// Creates a controller.
    ///
    /// `automatic_confidence` is the confidence given to automatic feedback
    /// a tutor accepted unchanged; it is expected to be validated already.
    pub fn new(automatic_confidence: f64) -> Self {
        Self {
            automatic_confidence,
        }
    }

    pub fn automatic_confidence(&self) -> f64 {
        self.automatic_confidence
    }

    /// Records tutor feedback for the elements of `diagram`.
    ///
    /// Feedback for ids the diagram does not contain is skipped. Returns the
    /// number of recorded items.
    ///
    /// # Panics
    ///
    /// Panics if an element that received feedback was never analyzed.
    pub fn add_feedbacks_to_assessment(
        &self,
        index: &mut AssessmentIndex,
        feedback: &IndexMap<Id, Feedback>,
        diagram: &Diagram,
    ) -> usize {
        self.try_add_feedbacks_to_assessment(index, feedback, diagram)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Fallible variant of
    /// [`add_feedbacks_to_assessment`](Self::add_feedbacks_to_assessment).
    ///
    /// Every referenced element is checked before anything is recorded, so
    /// an error leaves `index` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UntaggedElement`] if an element that received
    /// feedback was never analyzed.
    pub fn try_add_feedbacks_to_assessment(
        &self,
        index: &mut AssessmentIndex,
        feedback: &IndexMap<Id, Feedback>,
        diagram: &Diagram,
    ) -> Result<usize, CompassError> {
        let submission_id = diagram.submission_id();
        let mut resolved = Vec::with_capacity(feedback.len());

        for (&id, item) in feedback {
            let Some(element) = diagram.find_element(id) else {
                warn!(submission_id, element:% = id; "Feedback for unknown element skipped");
                continue;
            };
            let (similarity_id, context) = tag_of(diagram, element)?;
            resolved.push((similarity_id, context, item));
        }

        for &(similarity_id, context, item) in &resolved {
            index.get_or_create(similarity_id).record_feedback(
                context,
                item.to_score(self.automatic_confidence),
                item.text(),
            );
        }

        info!(
            submission_id,
            recorded = resolved.len(),
            skipped = feedback.len() - resolved.len();
            "Feedback absorbed"
        );
        Ok(resolved.len())
    }

    /// Scores `diagram` from grading memory without caching the result.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UntaggedElement`] if any element of the
    /// diagram was never analyzed.
    pub fn try_assess_model(
        &self,
        diagram: &Diagram,
        index: &AssessmentIndex,
    ) -> Result<CompassResult, CompassError> {
        let mut element_scores = IndexMap::new();
        for (_, element) in diagram.elements() {
            if let Some(score) = remembered_score(diagram, element, index)? {
                element_scores.insert(element.id(), score);
            }
        }

        let result = CompassResult::from_element_scores(element_scores, diagram.len());
        debug!(
            submission_id = diagram.submission_id(),
            covered = result.entities_covered(),
            total = result.total_elements(),
            points = result.points(),
            confidence = result.confidence();
            "Model assessed"
        );
        Ok(result)
    }

    /// Scores `diagram`, caches the result on it and returns it.
    ///
    /// # Panics
    ///
    /// Panics if any element of the diagram was never analyzed.
    pub fn assess_model_automatically(
        &self,
        diagram: &mut Diagram,
        index: &AssessmentIndex,
    ) -> CompassResult {
        self.try_assess_model_automatically(diagram, index)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Fallible variant of
    /// [`assess_model_automatically`](Self::assess_model_automatically).
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UntaggedElement`] if any element of the
    /// diagram was never analyzed. The cached result is left unchanged.
    pub fn try_assess_model_automatically(
        &self,
        diagram: &mut Diagram,
        index: &AssessmentIndex,
    ) -> Result<CompassResult, CompassError> {
        let result = self.try_assess_model(diagram, index)?;
        diagram.set_last_assessment_result(result.clone());
        Ok(result)
    }

    /// Scores every stored diagram independently.
    ///
    /// A diagram that cannot be scored is reported in the failure list and
    /// does not affect the others.
    pub fn assess_models_automatically(
        &self,
        models: &mut ModelIndex,
        index: &AssessmentIndex,
    ) -> BatchAssessment {
        let mut batch = BatchAssessment::default();

        for diagram in models.models_mut() {
            let submission_id = diagram.submission_id();
            match self.try_assess_model_automatically(diagram, index) {
                Ok(result) => {
                    batch.results.insert(submission_id, result);
                }
                Err(error) => {
                    warn!(submission_id, error:% = error; "Model could not be assessed");
                    batch.failures.push(ModelFailure::new(submission_id, error));
                }
            }
        }

        info!(
            assessed = batch.results.len(),
            failed = batch.failures.len();
            "Batch assessment finished"
        );
        batch
    }

    /// Proposes feedback for every covered element of `diagram`, in diagram
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UntaggedElement`] if any element of the
    /// diagram was never analyzed.
    pub fn suggest_feedback(
        &self,
        diagram: &Diagram,
        index: &AssessmentIndex,
    ) -> Result<Vec<SuggestedFeedback>, CompassError> {
        let mut suggestions = Vec::new();
        for (_, element) in diagram.elements() {
            let (similarity_id, context) = tag_of(diagram, element)?;
            let Some(assessment) = index.get(similarity_id) else {
                continue;
            };
            let Some(score) = assessment.score_for(context) else {
                continue;
            };
            suggestions.push(SuggestedFeedback {
                element: element.id(),
                credits: score.points(),
                confidence: score.confidence(),
                text: assessment.latest_comment(context).map(str::to_string),
            });
        }
        Ok(suggestions)
    }
}

fn tag_of(diagram: &Diagram, element: &Element) -> Result<(SimilarityId, Context), CompassError> {
    element.tag().ok_or(CompassError::UntaggedElement {
        submission_id: diagram.submission_id(),
        element: element.id(),
    })
}

fn remembered_score(
    diagram: &Diagram,
    element: &Element,
    index: &AssessmentIndex,
) -> Result<Option<Score>, CompassError> {
    let (similarity_id, context) = tag_of(diagram, element)?;
    Ok(index
        .get(similarity_id)
        .and_then(|assessment| assessment.score_for(context)))
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use compass_core::{
        diagram::{DiagramBuilder, DiagramKind},
        element::{Attribute, Class, ClassType},
        feedback::FeedbackType,
    };

    use super::*;
    use crate::{
        assessment::AssessmentIndex, config::EqualityThreshold,
        similarity_detector::SimilarityDetector,
    };

    const NAMES: [&str; 6] = ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot"];

    fn controller() -> AutomaticAssessmentController {
        AutomaticAssessmentController::new(0.5)
    }

    fn models() -> ModelIndex {
        ModelIndex::new(EqualityThreshold::new(0.9).unwrap())
    }

    fn classes(submission_id: u64, names: &[&str]) -> Diagram {
        let mut builder = DiagramBuilder::new(submission_id, DiagramKind::ClassDiagram);
        for (i, name) in names.iter().enumerate() {
            builder
                .add_class(&format!("c{i}"), Class::new(*name, ClassType::Class), None)
                .unwrap();
        }
        builder.build()
    }

    /// Stores and analyzes `diagram`, returning the tagged copy.
    fn stored(diagram: Diagram, index: &mut ModelIndex) -> Diagram {
        let submission_id = diagram.submission_id();
        index.add_model(diagram).unwrap();
        SimilarityDetector::analyze(index, submission_id).unwrap();
        index.model(submission_id).unwrap().clone()
    }

    fn analyzed(submission_id: u64, names: &[&str], index: &mut ModelIndex) -> Diagram {
        stored(classes(submission_id, names), index)
    }

    #[test]
    fn test_aggregation_over_six_clusters() {
        let mut models = models();
        let mut diagram = analyzed(1, &NAMES, &mut models);
        assert_eq!(models.number_of_unique_elements(), 6);

        let recorded = [
            (-0.5, 0.5),
            (-0.5, 0.6),
            (0.0, 0.7),
            (1.5, 0.8),
            (1.0, 0.9),
            (0.5, 1.0),
        ];
        let mut assessments = AssessmentIndex::new();
        for ((_, element), (points, confidence)) in diagram.elements().zip(recorded) {
            let (similarity_id, context) = element.tag().unwrap();
            assessments
                .get_or_create(similarity_id)
                .record(context, Score::new(points, confidence));
        }

        let result = controller().assess_model_automatically(&mut diagram, &assessments);

        assert_eq!(result.entities_covered(), 6);
        assert!(approx_eq!(f64, result.points(), 2.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, result.confidence(), 0.75, epsilon = 1e-12));
        assert_eq!(diagram.last_assessment_result(), Some(&result));
    }

    #[test]
    fn test_uncovered_context_scores_zero() {
        let mut models = models();
        let mut diagram = analyzed(1, &["Pizza"], &mut models);
        let (similarity_id, _) = diagram
            .find_element(Id::new("c0"))
            .and_then(Element::tag)
            .unwrap();

        let mut assessments = AssessmentIndex::new();
        assessments
            .get_or_create(similarity_id)
            .record(Context::Scoped(SimilarityId::new(99)), Score::new(1.0, 1.0));

        let result = controller().assess_model_automatically(&mut diagram, &assessments);

        assert_eq!(result.entities_covered(), 0);
        assert_eq!(result.points(), 0.0);
        assert_eq!(result.confidence(), 0.0);
        assert_eq!(result.total_elements(), 1);
    }

    #[test]
    fn test_feedback_for_missing_element_is_skipped() {
        let mut models = models();
        let diagram = analyzed(1, &["Pizza"], &mut models);
        let mut feedback = IndexMap::new();
        feedback.insert(Id::new("not-in-diagram"), Feedback::manual(1.0));

        let mut assessments = AssessmentIndex::new();
        let recorded =
            controller().add_feedbacks_to_assessment(&mut assessments, &feedback, &diagram);

        assert_eq!(recorded, 0);
        assert!(assessments.is_empty());
    }

    #[test]
    fn test_feedback_propagates_to_similar_elements() {
        let mut models = models();
        let graded = analyzed(1, &["Pizza", "Order"], &mut models);
        let mut ungraded = analyzed(2, &["pizza", "Customer"], &mut models);

        let mut feedback = IndexMap::new();
        feedback.insert(Id::new("c0"), Feedback::manual(1.0).with_text("correct"));
        feedback.insert(
            Id::new("c1"),
            Feedback::new(-0.5, FeedbackType::Automatic, None),
        );

        let controller = controller();
        let mut assessments = AssessmentIndex::new();
        assert_eq!(
            controller.add_feedbacks_to_assessment(&mut assessments, &feedback, &graded),
            2
        );

        let result = controller.assess_model_automatically(&mut ungraded, &assessments);
        assert_eq!(result.entities_covered(), 1);
        assert_eq!(result.score_for(Id::new("c0")), Some(Score::new(1.0, 1.0)));
        assert_eq!(result.score_for(Id::new("c1")), None);

        let suggestions = controller.suggest_feedback(&ungraded, &assessments).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].element(), Id::new("c0"));
        assert_eq!(suggestions[0].text(), Some("correct"));

        let own = controller.suggest_feedback(&graded, &assessments).unwrap();
        assert_eq!(own[1].confidence(), 0.5);
    }

    #[test]
    fn test_member_feedback_needs_equivalent_class() {
        let mut models = models();
        let mut builder = DiagramBuilder::new(1, DiagramKind::ClassDiagram);
        let pizza = builder
            .add_class("c1", Class::new("Pizza", ClassType::Class), None)
            .unwrap();
        builder
            .add_attribute(pizza, "a1", Attribute::new("size", "int"))
            .unwrap();
        let graded = stored(builder.build(), &mut models);

        let mut builder = DiagramBuilder::new(2, DiagramKind::ClassDiagram);
        let order = builder
            .add_class("c1", Class::new("Order", ClassType::Class), None)
            .unwrap();
        builder
            .add_attribute(order, "a1", Attribute::new("size", "int"))
            .unwrap();
        let mut other = stored(builder.build(), &mut models);

        let mut feedback = IndexMap::new();
        feedback.insert(Id::new("a1"), Feedback::manual(0.5));
        let mut assessments = AssessmentIndex::new();
        controller().add_feedbacks_to_assessment(&mut assessments, &feedback, &graded);

        let result = controller().assess_model_automatically(&mut other, &assessments);
        assert_eq!(result.entities_covered(), 0);
    }

    #[test]
    #[should_panic(expected = "never analyzed")]
    fn test_scoring_untagged_diagram_panics() {
        let mut diagram = classes(1, &["Pizza"]);
        controller().assess_model_automatically(&mut diagram, &AssessmentIndex::new());
    }

    #[test]
    fn test_untagged_feedback_leaves_index_untouched() {
        let diagram = classes(1, &["Pizza"]);
        let mut feedback = IndexMap::new();
        feedback.insert(Id::new("c0"), Feedback::manual(1.0));
        let mut assessments = AssessmentIndex::new();

        let err = controller()
            .try_add_feedbacks_to_assessment(&mut assessments, &feedback, &diagram)
            .unwrap_err();

        assert!(matches!(
            err,
            CompassError::UntaggedElement {
                submission_id: 1,
                ..
            }
        ));
        assert!(assessments.is_empty());
    }

    #[test]
    fn test_batch_isolates_failing_diagrams() {
        let mut models = models();
        analyzed(1, &["Pizza"], &mut models);
        models.add_model(classes(2, &["Order"])).unwrap();
        analyzed(3, &["Customer"], &mut models);

        let batch =
            controller().assess_models_automatically(&mut models, &AssessmentIndex::new());

        assert_eq!(
            batch.results().keys().copied().collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(batch.failures().len(), 1);
        assert_eq!(batch.failures()[0].submission_id(), 2);
        assert!(models.model(1).unwrap().last_assessment_result().is_some());
        assert!(models.model(2).unwrap().last_assessment_result().is_none());
    }
}
