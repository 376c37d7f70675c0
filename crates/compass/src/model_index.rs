//! Online clustering of elements across all diagrams of an exercise.
//!
//! Every element is compared with the previously seen elements of the same
//! [`ElementKind`] variant and joins the cluster of the single most similar
//! one when that similarity exceeds the [`EqualityThreshold`]. Otherwise it
//! opens a new cluster. Cluster ids therefore depend only on the order in
//! which elements are first seen.
//!
//! Only elements of stored diagrams are clustered, so every element a
//! cluster remembers can be resolved again.

use std::{
    collections::HashMap,
    mem::{self, Discriminant},
};

use indexmap::IndexMap;
use log::{debug, trace};

use compass_core::{
    context::SimilarityId,
    diagram::Diagram,
    element::{ElementIndex, ElementKind},
    error::DiagramError,
    similarity::ElementRef,
};

use crate::{config::EqualityThreshold, error::CompassError};

/// Position of an element in the exercise: submission plus arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ElementKey {
    submission_id: u64,
    index: ElementIndex,
}

impl ElementKey {
    fn of(element: &ElementRef<'_>) -> Self {
        Self {
            submission_id: element.diagram().submission_id(),
            index: element.index(),
        }
    }
}

/// Cluster bookkeeping, kept apart from the stored diagrams it refers to.
#[derive(Debug)]
struct Clusters {
    threshold: EqualityThreshold,
    next_id: usize,
    assigned: HashMap<ElementKey, SimilarityId>,
    /// Seen elements per kind, in the order they were first seen.
    seen: HashMap<Discriminant<ElementKind>, Vec<ElementKey>>,
}

impl Clusters {
    fn assign(
        &mut self,
        element: ElementRef<'_>,
        models: &IndexMap<u64, Diagram>,
    ) -> SimilarityId {
        let key = ElementKey::of(&element);
        if let Some(&existing) = self.assigned.get(&key) {
            return existing;
        }

        let kind = mem::discriminant(element.element().kind());
        let best = self.best_match(&element, kind, models);

        let similarity_id = match best {
            Some((earlier, similarity)) if self.threshold.is_exceeded_by(similarity) => {
                let joined = self.assigned[&earlier];
                trace!(
                    element:% = element.element(),
                    cluster:% = joined,
                    similarity;
                    "Element joined cluster"
                );
                joined
            }
            _ => {
                let fresh = SimilarityId::new(self.next_id);
                self.next_id += 1;
                trace!(element:% = element.element(), cluster:% = fresh; "Element opened cluster");
                fresh
            }
        };

        self.assigned.insert(key, similarity_id);
        self.seen.entry(kind).or_default().push(key);
        similarity_id
    }

    fn best_match(
        &self,
        element: &ElementRef<'_>,
        kind: Discriminant<ElementKind>,
        models: &IndexMap<u64, Diagram>,
    ) -> Option<(ElementKey, f64)> {
        let candidates = self.seen.get(&kind)?;
        let mut best: Option<(ElementKey, f64)> = None;

        for &candidate in candidates {
            let Some(earlier) = models
                .get(&candidate.submission_id)
                .and_then(|diagram| diagram.element_ref(candidate.index))
            else {
                continue;
            };
            let similarity = earlier.similarity(element);
            if best.is_none_or(|(_, score)| similarity > score) {
                best = Some((candidate, similarity));
            }
        }
        best
    }
}

/// Cluster assignments and the diagrams of one exercise.
#[derive(Debug)]
pub struct ModelIndex {
    clusters: Clusters,
    models: IndexMap<u64, Diagram>,
}

impl ModelIndex {
    pub fn new(threshold: EqualityThreshold) -> Self {
        Self {
            clusters: Clusters {
                threshold,
                next_id: 0,
                assigned: HashMap::new(),
                seen: HashMap::new(),
            },
            models: IndexMap::new(),
        }
    }

    pub fn threshold(&self) -> EqualityThreshold {
        self.clusters.threshold
    }

    /// Returns the cluster of a stored element, assigning one on first sight.
    ///
    /// Repeated calls for the same element return the same id. A new element
    /// is compared with every earlier element of the same kind, using the
    /// earlier element as the anchor of the comparison. It joins the cluster
    /// of the best match if that match exceeds the threshold; on ties the
    /// earliest element wins.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::UnknownSubmission`] if no diagram with
    /// `submission_id` is stored, and [`DiagramError::UnknownElement`] if the
    /// diagram has no element at `index`. Nothing is clustered in either case.
    pub fn assign_or_lookup(
        &mut self,
        submission_id: u64,
        index: ElementIndex,
    ) -> Result<SimilarityId, CompassError> {
        let diagram = self
            .models
            .get(&submission_id)
            .ok_or(CompassError::UnknownSubmission(submission_id))?;
        let element = diagram
            .element_ref(index)
            .ok_or(DiagramError::UnknownElement(index.get()))?;
        Ok(self.clusters.assign(element, &self.models))
    }

    /// Cluster of an already processed element, without assigning one.
    pub fn similarity_id(&self, submission_id: u64, index: ElementIndex) -> Option<SimilarityId> {
        let key = ElementKey {
            submission_id,
            index,
        };
        self.clusters.assigned.get(&key).copied()
    }

    /// Number of distinct cluster ids issued so far.
    pub fn number_of_unique_elements(&self) -> usize {
        self.clusters.next_id
    }

    /// Number of elements processed so far.
    pub fn element_count(&self) -> usize {
        self.clusters.assigned.len()
    }

    /// Stores a diagram so its elements can be clustered.
    ///
    /// # Errors
    ///
    /// Returns [`CompassError::DuplicateSubmission`] if a diagram with the
    /// same submission id is already stored.
    pub fn add_model(&mut self, diagram: Diagram) -> Result<(), CompassError> {
        let submission_id = diagram.submission_id();
        if self.models.contains_key(&submission_id) {
            return Err(CompassError::DuplicateSubmission(submission_id));
        }
        debug!(submission_id, elements = diagram.len(); "Model stored");
        self.models.insert(submission_id, diagram);
        Ok(())
    }

    pub fn contains_model(&self, submission_id: u64) -> bool {
        self.models.contains_key(&submission_id)
    }

    pub fn model(&self, submission_id: u64) -> Option<&Diagram> {
        self.models.get(&submission_id)
    }

    pub fn model_mut(&mut self, submission_id: u64) -> Option<&mut Diagram> {
        self.models.get_mut(&submission_id)
    }

    /// Stored diagrams in insertion order.
    pub fn models(&self) -> impl Iterator<Item = &Diagram> {
        self.models.values()
    }

    pub fn models_mut(&mut self) -> impl Iterator<Item = &mut Diagram> {
        self.models.values_mut()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
