//! Tags every element of a stored diagram with its cluster id and context.

use std::collections::HashMap;

use log::debug;

use compass_core::{
    context::{Context, SimilarityId},
    diagram::Diagram,
    element::{ElementIndex, Scope},
};

use crate::{error::CompassError, model_index::ModelIndex};

/// Assigns cluster ids and contexts to the elements of a diagram.
pub struct SimilarityDetector;

impl SimilarityDetector {
    /// Clusters every element of the stored diagram `submission_id` through
    /// `index` and stores the resulting tags on the elements.
    ///
    /// Elements are visited parent first, so a member's context can name the
    /// cluster of its class. Top-level elements get [`Context::NoContext`];
    /// class members get [`Context::Scoped`] with their class's cluster.
    /// Running the detector twice on the same diagram changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownSubmission`] if the diagram was not
    /// added to `index` first.
    pub fn analyze(index: &mut ModelIndex, submission_id: u64) -> Result<(), CompassError> {
        let order = index
            .model(submission_id)
            .map(Self::parents_first)
            .ok_or(CompassError::UnknownSubmission(submission_id))?;

        let mut clusters: HashMap<ElementIndex, SimilarityId> = HashMap::new();
        let mut tags = Vec::with_capacity(order.len());
        for (current, parent, scope) in order {
            let similarity_id = index.assign_or_lookup(submission_id, current)?;

            // Members always have a class parent, which was visited first.
            let context = match scope {
                Scope::TopLevel => Context::NoContext,
                Scope::Nested => parent
                    .and_then(|parent| clusters.get(&parent).copied())
                    .map_or(Context::NoContext, Context::Scoped),
            };

            clusters.insert(current, similarity_id);
            tags.push((current, similarity_id, context));
        }

        let diagram = index
            .model_mut(submission_id)
            .ok_or(CompassError::UnknownSubmission(submission_id))?;
        for &(element, similarity_id, context) in &tags {
            if let Some(element) = diagram.element_mut(element) {
                element.assign_similarity_id(similarity_id);
                element.assign_context(context);
            }
        }

        debug!(
            submission_id,
            elements = tags.len(),
            unique_elements = index.number_of_unique_elements();
            "Diagram analyzed"
        );
        Ok(())
    }

    /// Depth-first walk from the roots, each element before its children.
    fn parents_first(diagram: &Diagram) -> Vec<(ElementIndex, Option<ElementIndex>, Scope)> {
        let mut order = Vec::with_capacity(diagram.len());
        let mut stack: Vec<ElementIndex> = diagram.roots().collect();
        stack.reverse();

        while let Some(current) = stack.pop() {
            let Some(element) = diagram.element(current) else {
                continue;
            };
            order.push((current, element.parent(), element.kind().scope()));
            stack.extend(element.children().iter().rev());
        }
        order
    }
}
