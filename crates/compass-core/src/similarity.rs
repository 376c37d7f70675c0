//! Structural similarity between elements of (possibly different) diagrams.
//!
//! Every comparison yields a score in `[0, 1]`. Elements of different
//! [`ElementKind`] variants score zero. The weights below decide how much
//! each feature of a kind contributes; the weights of one kind always sum to
//! one.

use crate::{
    diagram::Diagram,
    element::{
        Element, ElementIndex, ElementKind, Place, Relationship, RelationshipEnd,
        UseCaseAssociation,
    },
};

pub const CLASS_NAME_WEIGHT: f64 = 0.7;
pub const CLASS_TYPE_WEIGHT: f64 = 0.3;

pub const ATTRIBUTE_NAME_WEIGHT: f64 = 0.7;
pub const ATTRIBUTE_TYPE_WEIGHT: f64 = 0.3;

pub const METHOD_NAME_WEIGHT: f64 = 0.5;
pub const METHOD_RETURN_TYPE_WEIGHT: f64 = 0.25;
pub const METHOD_PARAMETERS_WEIGHT: f64 = 0.25;

pub const RELATIONSHIP_TYPE_WEIGHT: f64 = 0.2;
pub const RELATIONSHIP_ENDPOINT_WEIGHT: f64 = 0.25;
pub const RELATIONSHIP_ROLE_WEIGHT: f64 = 0.075;
pub const RELATIONSHIP_MULTIPLICITY_WEIGHT: f64 = 0.075;

pub const USE_CASE_ASSOCIATION_NAME_WEIGHT: f64 = 0.2;
pub const USE_CASE_ASSOCIATION_ENDPOINT_WEIGHT: f64 = 0.4;

pub const PLACE_NAME_WEIGHT: f64 = 0.5;
pub const PLACE_TOKENS_WEIGHT: f64 = 0.25;
pub const PLACE_CAPACITY_WEIGHT: f64 = 0.25;

pub const ARC_MULTIPLICITY_WEIGHT: f64 = 0.2;
pub const ARC_ENDPOINT_WEIGHT: f64 = 0.4;

/// Normalized Levenshtein similarity of two names.
///
/// Names are compared case-insensitively after trimming. Two empty names are
/// identical.
///
/// # Examples
///
/// ```
/// use compass_core::similarity::name_similarity;
///
/// assert_eq!(name_similarity("Pizza", "pizza "), 1.0);
/// assert_eq!(name_similarity("", ""), 1.0);
/// assert_eq!(name_similarity("abcd", "abce"), 0.75);
/// ```
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();

    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

/// Similarity of optional labels such as roles and multiplicities.
pub fn optional_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (None, None) => 1.0,
        (Some(a), Some(b)) => name_similarity(a, b),
        _ => 0.0,
    }
}

/// Similarity of two parameter lists.
///
/// Each parameter of the shorter list is matched with its most similar
/// counterpart; the sum is normalized by the length of the longer list so
/// that missing parameters count as mismatches.
pub fn parameter_similarity(a: &[String], b: &[String]) -> f64 {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if longer.is_empty() {
        return 1.0;
    }

    let matched: f64 = shorter
        .iter()
        .map(|parameter| {
            longer
                .iter()
                .map(|candidate| name_similarity(parameter, candidate))
                .fold(0.0, f64::max)
        })
        .sum();
    matched / longer.len() as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(a_char != b_char);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

fn equality(equal: bool) -> f64 {
    if equal { 1.0 } else { 0.0 }
}

fn place_similarity(a: &Place, b: &Place) -> f64 {
    PLACE_NAME_WEIGHT * name_similarity(a.name(), b.name())
        + PLACE_TOKENS_WEIGHT * equality(a.tokens() == b.tokens())
        + PLACE_CAPACITY_WEIGHT * equality(a.capacity() == b.capacity())
}

/// An element together with the diagram it lives in.
///
/// Relationship and control-flow similarity depend on their endpoints, which
/// are only reachable through the owning diagram.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'d> {
    diagram: &'d Diagram,
    index: ElementIndex,
}

impl<'d> ElementRef<'d> {
    pub(crate) fn new(diagram: &'d Diagram, index: ElementIndex) -> Self {
        Self { diagram, index }
    }

    pub fn diagram(&self) -> &'d Diagram {
        self.diagram
    }

    pub fn index(&self) -> ElementIndex {
        self.index
    }

    pub fn element(&self) -> &'d Element {
        self.diagram.element_unchecked(self.index)
    }

    fn endpoint(&self, index: ElementIndex) -> ElementRef<'d> {
        ElementRef::new(self.diagram, index)
    }

    /// Similarity of this element to `other`, in `[0, 1]`.
    pub fn similarity(&self, other: &ElementRef<'_>) -> f64 {
        let score = match (self.element().kind(), other.element().kind()) {
            (ElementKind::Class(a), ElementKind::Class(b)) => {
                CLASS_NAME_WEIGHT * name_similarity(a.name(), b.name())
                    + CLASS_TYPE_WEIGHT * equality(a.class_type() == b.class_type())
            }
            (ElementKind::Attribute(a), ElementKind::Attribute(b)) => {
                ATTRIBUTE_NAME_WEIGHT * name_similarity(a.name(), b.name())
                    + ATTRIBUTE_TYPE_WEIGHT
                        * name_similarity(a.attribute_type(), b.attribute_type())
            }
            (ElementKind::Method(a), ElementKind::Method(b)) => {
                METHOD_NAME_WEIGHT * name_similarity(a.name(), b.name())
                    + METHOD_RETURN_TYPE_WEIGHT * name_similarity(a.return_type(), b.return_type())
                    + METHOD_PARAMETERS_WEIGHT
                        * parameter_similarity(a.parameters(), b.parameters())
            }
            (ElementKind::Relationship(a), ElementKind::Relationship(b)) => {
                self.relationship_similarity(a, other, b)
            }
            (ElementKind::ActivityNode(a), ElementKind::ActivityNode(b)) => {
                if a.node_type() == b.node_type() {
                    name_similarity(a.name(), b.name())
                } else {
                    0.0
                }
            }
            (ElementKind::ControlFlow(a), ElementKind::ControlFlow(b)) => {
                let source = self.endpoint_similarity(a.source(), other, b.source());
                let target = self.endpoint_similarity(a.target(), other, b.target());
                (source + target) / 2.0
            }
            (ElementKind::UseCaseAssociation(a), ElementKind::UseCaseAssociation(b)) => {
                self.use_case_association_similarity(a, other, b)
            }
            (ElementKind::Place(a), ElementKind::Place(b)) => place_similarity(a, b),
            (ElementKind::Arc(a), ElementKind::Arc(b)) => {
                let source = self.endpoint_similarity(a.source(), other, b.source());
                let target = self.endpoint_similarity(a.target(), other, b.target());
                ARC_MULTIPLICITY_WEIGHT * name_similarity(a.multiplicity(), b.multiplicity())
                    + ARC_ENDPOINT_WEIGHT * (source + target)
            }
            (ElementKind::SyntaxTreeLink(a), ElementKind::SyntaxTreeLink(b)) => {
                let source = self.endpoint_similarity(a.source(), other, b.source());
                let target = self.endpoint_similarity(a.target(), other, b.target());
                (source + target) / 2.0
            }
            (
                ElementKind::Package(_)
                | ElementKind::Activity(_)
                | ElementKind::Actor(_)
                | ElementKind::UseCase(_)
                | ElementKind::SystemBoundary(_)
                | ElementKind::Transition(_)
                | ElementKind::Nonterminal(_)
                | ElementKind::Terminal(_),
                _,
            ) => self.name_only_similarity(other),
            _ => 0.0,
        };
        score.clamp(0.0, 1.0)
    }

    /// Kinds identified by their name alone.
    fn name_only_similarity(&self, other: &ElementRef<'_>) -> f64 {
        let (a, b) = (self.element().kind(), other.element().kind());
        if std::mem::discriminant(a) != std::mem::discriminant(b) {
            return 0.0;
        }
        match (a.name(), b.name()) {
            (Some(a), Some(b)) => name_similarity(a, b),
            _ => 0.0,
        }
    }

    fn endpoint_similarity(
        &self,
        mine: ElementIndex,
        other: &ElementRef<'_>,
        theirs: ElementIndex,
    ) -> f64 {
        self.endpoint(mine).similarity(&other.endpoint(theirs))
    }

    fn use_case_association_similarity(
        &self,
        a: &UseCaseAssociation,
        other: &ElementRef<'_>,
        b: &UseCaseAssociation,
    ) -> f64 {
        if a.association_type() != b.association_type() {
            return 0.0;
        }

        let ends_score = |theirs: [ElementIndex; 2]| {
            USE_CASE_ASSOCIATION_ENDPOINT_WEIGHT
                * (self.endpoint_similarity(a.source(), other, theirs[0])
                    + self.endpoint_similarity(a.target(), other, theirs[1]))
        };
        let straight = ends_score([b.source(), b.target()]);
        let ends = if a.association_type().is_undirected() {
            straight.max(ends_score([b.target(), b.source()]))
        } else {
            straight
        };

        USE_CASE_ASSOCIATION_NAME_WEIGHT * optional_similarity(a.name(), b.name()) + ends
    }

    fn relationship_similarity(
        &self,
        a: &Relationship,
        other: &ElementRef<'_>,
        b: &Relationship,
    ) -> f64 {
        let type_score = RELATIONSHIP_TYPE_WEIGHT
            * equality(a.relationship_type() == b.relationship_type());

        let straight =
            self.ends_similarity((a.source(), a.target()), other, (b.source(), b.target()));
        let ends = if a.relationship_type().is_bidirectional()
            && b.relationship_type().is_bidirectional()
        {
            let swapped =
                self.ends_similarity((a.source(), a.target()), other, (b.target(), b.source()));
            straight.max(swapped)
        } else {
            straight
        };

        type_score + ends
    }

    fn ends_similarity(
        &self,
        (a_source, a_target): (&RelationshipEnd, &RelationshipEnd),
        other: &ElementRef<'_>,
        (b_source, b_target): (&RelationshipEnd, &RelationshipEnd),
    ) -> f64 {
        [(a_source, b_source), (a_target, b_target)]
            .into_iter()
            .map(|(mine, theirs)| {
                let endpoint = self.endpoint_similarity(mine.element(), other, theirs.element());
                RELATIONSHIP_ENDPOINT_WEIGHT * endpoint
                    + RELATIONSHIP_ROLE_WEIGHT * optional_similarity(mine.role(), theirs.role())
                    + RELATIONSHIP_MULTIPLICITY_WEIGHT
                        * optional_similarity(mine.multiplicity(), theirs.multiplicity())
            })
            .sum()
    }
}
