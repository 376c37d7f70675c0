//! Diagram element types.
//!
//! Element kinds form a closed set covering the class, activity, use case,
//! Petri net and syntax tree families. Per-kind behaviour is decided by
//! matching on [`ElementKind`] rather than through trait objects.

use std::fmt;

use serde::Deserialize;

use crate::{
    context::{Context, SimilarityId},
    identifier::Id,
};

/// Position of an element inside its diagram's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementIndex(usize);

impl ElementIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena slot.
    pub fn get(self) -> usize {
        self.0
    }
}

/// Flavour of a class box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ClassType {
    #[default]
    Class,
    AbstractClass,
    Interface,
    Enumeration,
}

/// Kind of a class diagram relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum RelationshipType {
    ClassBidirectional,
    ClassUnidirectional,
    ClassAggregation,
    ClassComposition,
    ClassInheritance,
    ClassRealization,
    ClassDependency,
}

impl RelationshipType {
    /// Returns `true` when swapping source and target keeps the meaning.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self, RelationshipType::ClassBidirectional)
    }
}

/// Kind of an activity diagram control node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ActivityNodeType {
    #[serde(rename = "ActivityInitialNode")]
    Initial,
    #[serde(rename = "ActivityFinalNode")]
    Final,
    #[serde(rename = "ActivityActionNode")]
    Action,
    #[serde(rename = "ActivityObjectNode")]
    Object,
    #[serde(rename = "ActivityForkNode")]
    Fork,
    #[serde(rename = "ActivityForkNodeHorizontal")]
    ForkHorizontal,
    #[serde(rename = "ActivityMergeNode")]
    Merge,
}

/// Kind of a use case diagram connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum UseCaseAssociationType {
    #[serde(rename = "UseCaseAssociation")]
    Association,
    #[serde(rename = "UseCaseGeneralization")]
    Generalization,
    #[serde(rename = "UseCaseInclude")]
    Include,
    #[serde(rename = "UseCaseExtend")]
    Extend,
}

impl UseCaseAssociationType {
    /// Plain associations link an actor and a use case without a direction.
    pub fn is_undirected(&self) -> bool {
        matches!(self, UseCaseAssociationType::Association)
    }
}

/// Whether grading decisions on a kind are global or scoped to a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Comparable across the whole exercise.
    TopLevel,
    /// Only comparable inside equivalent parents.
    Nested,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    name: String,
    class_type: ClassType,
}

impl Class {
    pub fn new(name: impl Into<String>, class_type: ClassType) -> Self {
        Self {
            name: name.into(),
            class_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_type(&self) -> ClassType {
        self.class_type
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    attribute_type: String,
}

impl Attribute {
    /// Creates an attribute; an untyped attribute has an empty type.
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_type(&self) -> &str {
        &self.attribute_type
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    name: String,
    return_type: String,
    parameters: Vec<String>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

/// One end of a relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipEnd {
    element: ElementIndex,
    role: Option<String>,
    multiplicity: Option<String>,
}

impl RelationshipEnd {
    /// An end without role or multiplicity.
    pub fn new(element: ElementIndex) -> Self {
        Self {
            element,
            role: None,
            multiplicity: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: impl Into<String>) -> Self {
        self.multiplicity = Some(multiplicity.into());
        self
    }

    pub fn element(&self) -> ElementIndex {
        self.element
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn multiplicity(&self) -> Option<&str> {
        self.multiplicity.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    relationship_type: RelationshipType,
    source: RelationshipEnd,
    target: RelationshipEnd,
}

impl Relationship {
    pub fn new(
        relationship_type: RelationshipType,
        source: RelationshipEnd,
        target: RelationshipEnd,
    ) -> Self {
        Self {
            relationship_type,
            source,
            target,
        }
    }

    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship_type
    }

    pub fn source(&self) -> &RelationshipEnd {
        &self.source
    }

    pub fn target(&self) -> &RelationshipEnd {
        &self.target
    }
}

macro_rules! named_element {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            name: String,
        }

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self { name: name.into() }
            }

            pub fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

named_element!(Package);
named_element!(Activity);
named_element!(
    /// A role interacting with the system.
    Actor
);
named_element!(UseCase);
named_element!(
    /// The system box use cases are drawn inside.
    SystemBoundary
);
named_element!(
    /// Petri net transition.
    Transition
);
named_element!(
    /// Inner node of a syntax tree, named after a grammar rule.
    Nonterminal
);
named_element!(
    /// Leaf of a syntax tree.
    Terminal
);

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityNode {
    name: String,
    node_type: ActivityNodeType,
}

impl ActivityNode {
    pub fn new(name: impl Into<String>, node_type: ActivityNodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> ActivityNodeType {
        self.node_type
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlFlow {
    source: ElementIndex,
    target: ElementIndex,
}

impl ControlFlow {
    pub fn new(source: ElementIndex, target: ElementIndex) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> ElementIndex {
        self.source
    }

    pub fn target(&self) -> ElementIndex {
        self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UseCaseAssociation {
    association_type: UseCaseAssociationType,
    name: Option<String>,
    source: ElementIndex,
    target: ElementIndex,
}

impl UseCaseAssociation {
    pub fn new(
        association_type: UseCaseAssociationType,
        source: ElementIndex,
        target: ElementIndex,
    ) -> Self {
        Self {
            association_type,
            name: None,
            source,
            target,
        }
    }

    /// Labels the connection; only plain associations carry a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn association_type(&self) -> UseCaseAssociationType {
        self.association_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn source(&self) -> ElementIndex {
        self.source
    }

    pub fn target(&self) -> ElementIndex {
        self.target
    }
}

/// Petri net place with its initial marking.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    name: String,
    tokens: u32,
    capacity: Option<u32>,
}

impl Place {
    /// A place without a capacity bound.
    pub fn new(name: impl Into<String>, tokens: u32) -> Self {
        Self {
            name: name.into(),
            tokens,
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    /// `None` means unbounded.
    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }
}

/// Weighted Petri net arc between a place and a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    multiplicity: String,
    source: ElementIndex,
    target: ElementIndex,
}

impl Arc {
    pub fn new(
        multiplicity: impl Into<String>,
        source: ElementIndex,
        target: ElementIndex,
    ) -> Self {
        Self {
            multiplicity: multiplicity.into(),
            source,
            target,
        }
    }

    pub fn multiplicity(&self) -> &str {
        &self.multiplicity
    }

    pub fn source(&self) -> ElementIndex {
        self.source
    }

    pub fn target(&self) -> ElementIndex {
        self.target
    }
}

/// Parent-to-child edge of a syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTreeLink {
    source: ElementIndex,
    target: ElementIndex,
}

impl SyntaxTreeLink {
    pub fn new(source: ElementIndex, target: ElementIndex) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> ElementIndex {
        self.source
    }

    pub fn target(&self) -> ElementIndex {
        self.target
    }
}

/// The closed set of element kinds.
///
/// Only elements of the same variant are ever compared with each other.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Class(Class),
    Attribute(Attribute),
    Method(Method),
    Relationship(Relationship),
    Package(Package),
    Activity(Activity),
    ActivityNode(ActivityNode),
    ControlFlow(ControlFlow),
    Actor(Actor),
    UseCase(UseCase),
    SystemBoundary(SystemBoundary),
    UseCaseAssociation(UseCaseAssociation),
    Place(Place),
    Transition(Transition),
    Arc(Arc),
    Nonterminal(Nonterminal),
    Terminal(Terminal),
    SyntaxTreeLink(SyntaxTreeLink),
}

impl ElementKind {
    /// Class members are scoped to their class; everything else is global.
    pub fn scope(&self) -> Scope {
        match self {
            ElementKind::Attribute(_) | ElementKind::Method(_) => Scope::Nested,
            _ => Scope::TopLevel,
        }
    }

    /// Human-readable kind name, used in logs and diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Class(_) => "Class",
            ElementKind::Attribute(_) => "Attribute",
            ElementKind::Method(_) => "Method",
            ElementKind::Relationship(_) => "Relationship",
            ElementKind::Package(_) => "Package",
            ElementKind::Activity(_) => "Activity",
            ElementKind::ActivityNode(_) => "ActivityNode",
            ElementKind::ControlFlow(_) => "ControlFlow",
            ElementKind::Actor(_) => "Actor",
            ElementKind::UseCase(_) => "UseCase",
            ElementKind::SystemBoundary(_) => "SystemBoundary",
            ElementKind::UseCaseAssociation(_) => "UseCaseAssociation",
            ElementKind::Place(_) => "Place",
            ElementKind::Transition(_) => "Transition",
            ElementKind::Arc(_) => "Arc",
            ElementKind::Nonterminal(_) => "Nonterminal",
            ElementKind::Terminal(_) => "Terminal",
            ElementKind::SyntaxTreeLink(_) => "SyntaxTreeLink",
        }
    }

    /// Display name of named kinds.
    pub fn name(&self) -> Option<&str> {
        match self {
            ElementKind::Class(class) => Some(class.name()),
            ElementKind::Attribute(attribute) => Some(attribute.name()),
            ElementKind::Method(method) => Some(method.name()),
            ElementKind::Package(package) => Some(package.name()),
            ElementKind::Activity(activity) => Some(activity.name()),
            ElementKind::ActivityNode(node) => Some(node.name()),
            ElementKind::Actor(actor) => Some(actor.name()),
            ElementKind::UseCase(use_case) => Some(use_case.name()),
            ElementKind::SystemBoundary(boundary) => Some(boundary.name()),
            ElementKind::UseCaseAssociation(association) => association.name(),
            ElementKind::Place(place) => Some(place.name()),
            ElementKind::Transition(transition) => Some(transition.name()),
            ElementKind::Nonterminal(nonterminal) => Some(nonterminal.name()),
            ElementKind::Terminal(terminal) => Some(terminal.name()),
            ElementKind::Relationship(_)
            | ElementKind::ControlFlow(_)
            | ElementKind::Arc(_)
            | ElementKind::SyntaxTreeLink(_) => None,
        }
    }

    /// Source and target of connection kinds.
    pub fn endpoints(&self) -> Option<[ElementIndex; 2]> {
        match self {
            ElementKind::Relationship(relationship) => Some([
                relationship.source().element(),
                relationship.target().element(),
            ]),
            ElementKind::ControlFlow(flow) => Some([flow.source(), flow.target()]),
            ElementKind::UseCaseAssociation(association) => {
                Some([association.source(), association.target()])
            }
            ElementKind::Arc(arc) => Some([arc.source(), arc.target()]),
            ElementKind::SyntaxTreeLink(link) => Some([link.source(), link.target()]),
            _ => None,
        }
    }
}

/// An element living in a diagram's arena.
///
/// The cluster id and context start out empty and are written exactly once
/// when the diagram is analyzed.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: Id,
    kind: ElementKind,
    parent: Option<ElementIndex>,
    children: Vec<ElementIndex>,
    similarity_id: Option<SimilarityId>,
    context: Option<Context>,
}

impl Element {
    pub(crate) fn new(id: Id, kind: ElementKind, parent: Option<ElementIndex>) -> Self {
        Self {
            id,
            kind,
            parent,
            children: Vec::new(),
            similarity_id: None,
            context: None,
        }
    }

    pub(crate) fn add_child(&mut self, child: ElementIndex) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: ElementIndex) {
        self.children.retain(|existing| *existing != child);
    }

    pub(crate) fn set_parent(&mut self, parent: ElementIndex) {
        self.parent = Some(parent);
    }

    /// External identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Structural parent (class of a member, package of a class, activity of
    /// a node).
    pub fn parent(&self) -> Option<ElementIndex> {
        self.parent
    }

    pub fn children(&self) -> &[ElementIndex] {
        &self.children
    }

    pub fn similarity_id(&self) -> Option<SimilarityId> {
        self.similarity_id
    }

    pub fn context(&self) -> Option<Context> {
        self.context
    }

    /// Cluster id and context, once both are assigned.
    pub fn tag(&self) -> Option<(SimilarityId, Context)> {
        self.similarity_id.zip(self.context)
    }

    /// Stores the element's cluster id.
    ///
    /// # Panics
    ///
    /// Panics if a different cluster id was assigned before.
    pub fn assign_similarity_id(&mut self, similarity_id: SimilarityId) {
        if let Some(existing) = self.similarity_id {
            assert_eq!(
                existing, similarity_id,
                "Element {} already belongs to cluster {existing}",
                self.id
            );
        }
        self.similarity_id = Some(similarity_id);
    }

    /// Stores the element's context.
    ///
    /// # Panics
    ///
    /// Panics if a different context was assigned before.
    pub fn assign_context(&mut self, context: Context) {
        if let Some(existing) = self.context {
            assert_eq!(
                existing, context,
                "Element {} already has context {existing}",
                self.id
            );
        }
        self.context = Some(context);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.name() {
            Some(name) => write!(f, "{} `{}` ({})", self.kind.type_name(), name, self.id),
            None => write!(f, "{} ({})", self.kind.type_name(), self.id),
        }
    }
}
