//! Student diagrams as element arenas.
//!
//! A [`Diagram`] owns its elements in a flat vector and links them through
//! [`ElementIndex`] values: members point at their class, classes at their
//! package, relationships at their endpoints. Diagrams are assembled with a
//! [`DiagramBuilder`], which rejects structurally invalid input up front so
//! that later stages can index the arena without checks.

use std::{collections::HashMap, fmt, mem};

use log::trace;
use serde::Deserialize;

use crate::{
    element::{
        Activity, ActivityNode, Actor, Arc, Attribute, Class, ControlFlow, Element, ElementIndex,
        ElementKind, Method, Nonterminal, Package, Place, Relationship, SyntaxTreeLink,
        SystemBoundary, Terminal, Transition, UseCase, UseCaseAssociation,
    },
    error::DiagramError,
    identifier::Id,
    score::CompassResult,
    similarity::ElementRef,
};

/// Diagram types the assessment engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum DiagramKind {
    ClassDiagram,
    ActivityDiagram,
    UseCaseDiagram,
    PetriNet,
    SyntaxTree,
}

impl DiagramKind {
    fn allows(&self, kind: &ElementKind) -> bool {
        match self {
            DiagramKind::ClassDiagram => matches!(
                kind,
                ElementKind::Class(_)
                    | ElementKind::Attribute(_)
                    | ElementKind::Method(_)
                    | ElementKind::Relationship(_)
                    | ElementKind::Package(_)
            ),
            DiagramKind::ActivityDiagram => matches!(
                kind,
                ElementKind::Activity(_)
                    | ElementKind::ActivityNode(_)
                    | ElementKind::ControlFlow(_)
            ),
            DiagramKind::UseCaseDiagram => matches!(
                kind,
                ElementKind::Actor(_)
                    | ElementKind::UseCase(_)
                    | ElementKind::SystemBoundary(_)
                    | ElementKind::UseCaseAssociation(_)
            ),
            DiagramKind::PetriNet => matches!(
                kind,
                ElementKind::Place(_) | ElementKind::Transition(_) | ElementKind::Arc(_)
            ),
            DiagramKind::SyntaxTree => matches!(
                kind,
                ElementKind::Nonterminal(_)
                    | ElementKind::Terminal(_)
                    | ElementKind::SyntaxTreeLink(_)
            ),
        }
    }

    /// Lower-case display label.
    pub fn label(&self) -> &'static str {
        match self {
            DiagramKind::ClassDiagram => "class diagram",
            DiagramKind::ActivityDiagram => "activity diagram",
            DiagramKind::UseCaseDiagram => "use case diagram",
            DiagramKind::PetriNet => "petri net",
            DiagramKind::SyntaxTree => "syntax tree",
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One student submission's diagram.
#[derive(Debug, Clone)]
pub struct Diagram {
    submission_id: u64,
    kind: DiagramKind,
    elements: Vec<Element>,
    lookup: HashMap<Id, ElementIndex>,
    last_assessment_result: Option<CompassResult>,
}

impl Diagram {
    /// Submission this diagram belongs to.
    pub fn submission_id(&self) -> u64 {
        self.submission_id
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the element at `index`, if it exists.
    pub fn element(&self, index: ElementIndex) -> Option<&Element> {
        self.elements.get(index.get())
    }

    /// Indexes the arena directly.
    ///
    /// Only used for indices the builder validated or that were produced by
    /// this diagram.
    pub(crate) fn element_unchecked(&self, index: ElementIndex) -> &Element {
        &self.elements[index.get()]
    }

    /// Returns the element at `index` mutably, if it exists.
    pub fn element_mut(&mut self, index: ElementIndex) -> Option<&mut Element> {
        self.elements.get_mut(index.get())
    }

    /// Iterates over all elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementIndex, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementIndex::new(index), element))
    }

    /// Elements without a structural parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = ElementIndex> + '_ {
        self.elements()
            .filter(|(_, element)| element.parent().is_none())
            .map(|(index, _)| index)
    }

    /// Resolves an external id to the element's arena index.
    pub fn find_by_external_id(&self, id: Id) -> Option<ElementIndex> {
        self.lookup.get(&id).copied()
    }

    /// Resolves an external id to the element itself.
    pub fn find_element(&self, id: Id) -> Option<&Element> {
        self.find_by_external_id(id)
            .and_then(|index| self.element(index))
    }

    /// Borrowed view of an element that can be compared with elements of
    /// other diagrams.
    pub fn element_ref(&self, index: ElementIndex) -> Option<ElementRef<'_>> {
        self.element(index).map(|_| ElementRef::new(self, index))
    }

    /// Returns `true` once every element carries a cluster id and a context.
    pub fn is_analyzed(&self) -> bool {
        self.elements.iter().all(|element| element.tag().is_some())
    }

    /// Result of the latest automatic assessment run.
    pub fn last_assessment_result(&self) -> Option<&CompassResult> {
        self.last_assessment_result.as_ref()
    }

    /// Replaces the cached automatic assessment result.
    pub fn set_last_assessment_result(&mut self, result: CompassResult) {
        self.last_assessment_result = Some(result);
    }
}

/// Incremental, validating constructor for [`Diagram`].
///
/// # Examples
///
/// ```
/// use compass_core::{
///     diagram::{DiagramBuilder, DiagramKind},
///     element::{Attribute, Class, ClassType},
/// };
///
/// let mut builder = DiagramBuilder::new(7, DiagramKind::ClassDiagram);
/// let pizza = builder.add_class("c1", Class::new("Pizza", ClassType::Class), None)?;
/// builder.add_attribute(pizza, "a1", Attribute::new("size", "int"))?;
/// let diagram = builder.build();
///
/// assert_eq!(diagram.len(), 2);
/// # Ok::<(), compass_core::error::DiagramError>(())
/// ```
#[derive(Debug)]
pub struct DiagramBuilder {
    submission_id: u64,
    kind: DiagramKind,
    elements: Vec<Element>,
    lookup: HashMap<Id, ElementIndex>,
}

impl DiagramBuilder {
    pub fn new(submission_id: u64, kind: DiagramKind) -> Self {
        Self {
            submission_id,
            kind,
            elements: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Adds a class, optionally owned by a package.
    pub fn add_class(
        &mut self,
        id: &str,
        class: Class,
        package: Option<ElementIndex>,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Class(class), package)
    }

    pub fn add_attribute(
        &mut self,
        class: ElementIndex,
        id: &str,
        attribute: Attribute,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Attribute(attribute), Some(class))
    }

    pub fn add_method(
        &mut self,
        class: ElementIndex,
        id: &str,
        method: Method,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Method(method), Some(class))
    }

    pub fn add_package(
        &mut self,
        id: &str,
        package: Package,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Package(package), None)
    }

    pub fn add_relationship(
        &mut self,
        id: &str,
        relationship: Relationship,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Relationship(relationship), None)
    }

    /// Adds an activity, optionally nested in another activity.
    pub fn add_activity(
        &mut self,
        id: &str,
        activity: Activity,
        owner: Option<ElementIndex>,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Activity(activity), owner)
    }

    /// Adds an activity node, optionally nested in an activity.
    pub fn add_activity_node(
        &mut self,
        id: &str,
        node: ActivityNode,
        owner: Option<ElementIndex>,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::ActivityNode(node), owner)
    }

    pub fn add_control_flow(
        &mut self,
        id: &str,
        control_flow: ControlFlow,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::ControlFlow(control_flow), None)
    }

    /// Adds an actor, optionally drawn inside a system boundary.
    pub fn add_actor(
        &mut self,
        id: &str,
        actor: Actor,
        boundary: Option<ElementIndex>,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Actor(actor), boundary)
    }

    /// Adds a use case, optionally drawn inside a system boundary.
    pub fn add_use_case(
        &mut self,
        id: &str,
        use_case: UseCase,
        boundary: Option<ElementIndex>,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::UseCase(use_case), boundary)
    }

    pub fn add_system_boundary(
        &mut self,
        id: &str,
        boundary: SystemBoundary,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::SystemBoundary(boundary), None)
    }

    pub fn add_use_case_association(
        &mut self,
        id: &str,
        association: UseCaseAssociation,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::UseCaseAssociation(association), None)
    }

    pub fn add_place(&mut self, id: &str, place: Place) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Place(place), None)
    }

    pub fn add_transition(
        &mut self,
        id: &str,
        transition: Transition,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Transition(transition), None)
    }

    pub fn add_arc(&mut self, id: &str, arc: Arc) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Arc(arc), None)
    }

    pub fn add_nonterminal(
        &mut self,
        id: &str,
        nonterminal: Nonterminal,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Nonterminal(nonterminal), None)
    }

    pub fn add_terminal(
        &mut self,
        id: &str,
        terminal: Terminal,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::Terminal(terminal), None)
    }

    pub fn add_syntax_tree_link(
        &mut self,
        id: &str,
        link: SyntaxTreeLink,
    ) -> Result<ElementIndex, DiagramError> {
        self.add_element(id, ElementKind::SyntaxTreeLink(link), None)
    }

    /// Moves an already added element under `owner`.
    ///
    /// Owners can appear after their children in modeling tool exports, so
    /// ownership may be resolved in a second pass.
    pub fn set_owner(
        &mut self,
        element: ElementIndex,
        owner: ElementIndex,
    ) -> Result<(), DiagramError> {
        let child = self
            .elements
            .get(element.get())
            .ok_or(DiagramError::UnknownElement(element.get()))?;
        self.check_parent(child.id(), child.kind(), Some(owner))?;

        let mut ancestor = Some(owner);
        while let Some(current) = ancestor {
            if current == element {
                return Err(DiagramError::OwnershipCycle(child.id()));
            }
            ancestor = self.elements[current.get()].parent();
        }

        if let Some(previous) = child.parent() {
            self.elements[previous.get()].remove_child(element);
        }
        self.elements[element.get()].set_parent(owner);
        self.elements[owner.get()].add_child(element);
        Ok(())
    }

    /// Adds an element of any kind with an optional structural parent.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError`] when the id is taken, the kind does not fit
    /// the diagram kind, the parent is missing or of the wrong kind, or an
    /// endpoint does not exist or has the wrong kind.
    pub fn add_element(
        &mut self,
        id: &str,
        kind: ElementKind,
        parent: Option<ElementIndex>,
    ) -> Result<ElementIndex, DiagramError> {
        let id = Id::new(id);
        if self.lookup.contains_key(&id) {
            return Err(DiagramError::DuplicateElement(id));
        }
        if !self.kind.allows(&kind) {
            return Err(DiagramError::UnsupportedElement {
                id,
                kind: kind.type_name(),
                diagram: self.kind.label(),
            });
        }
        self.check_parent(id, &kind, parent)?;
        self.check_endpoints(id, &kind)?;

        let index = ElementIndex::new(self.elements.len());
        trace!(id:% = id, kind = kind.type_name(), index = index.get(); "Adding element");

        self.elements.push(Element::new(id, kind, parent));
        self.lookup.insert(id, index);
        if let Some(parent) = parent {
            self.elements[parent.get()].add_child(index);
        }
        Ok(index)
    }

    /// Finishes the diagram.
    pub fn build(self) -> Diagram {
        Diagram {
            submission_id: self.submission_id,
            kind: self.kind,
            elements: self.elements,
            lookup: self.lookup,
            last_assessment_result: None,
        }
    }

    fn kind_at(&self, index: ElementIndex) -> Result<&ElementKind, DiagramError> {
        self.elements
            .get(index.get())
            .map(Element::kind)
            .ok_or(DiagramError::UnknownElement(index.get()))
    }

    fn check_parent(
        &self,
        id: Id,
        kind: &ElementKind,
        parent: Option<ElementIndex>,
    ) -> Result<(), DiagramError> {
        let Some(parent) = parent else {
            return match kind {
                ElementKind::Attribute(_) | ElementKind::Method(_) => {
                    Err(DiagramError::MissingParent {
                        id,
                        kind: kind.type_name(),
                    })
                }
                _ => Ok(()),
            };
        };

        let parent_kind = self.kind_at(parent)?;
        let allowed = match kind {
            ElementKind::Attribute(_) | ElementKind::Method(_) => {
                matches!(parent_kind, ElementKind::Class(_))
            }
            ElementKind::Class(_) => matches!(parent_kind, ElementKind::Package(_)),
            ElementKind::Activity(_) | ElementKind::ActivityNode(_) => {
                matches!(parent_kind, ElementKind::Activity(_))
            }
            ElementKind::Actor(_) | ElementKind::UseCase(_) => {
                matches!(parent_kind, ElementKind::SystemBoundary(_))
            }
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(DiagramError::InvalidParent {
                id,
                kind: kind.type_name(),
                parent: parent_kind.type_name(),
            })
        }
    }

    fn check_endpoints(&self, id: Id, kind: &ElementKind) -> Result<(), DiagramError> {
        let allowed: fn(&ElementKind) -> bool = match kind {
            ElementKind::Relationship(_) => is_class_endpoint,
            ElementKind::ControlFlow(_) => is_activity_endpoint,
            ElementKind::UseCaseAssociation(_) => is_use_case_endpoint,
            ElementKind::Arc(_) => is_petri_net_endpoint,
            ElementKind::SyntaxTreeLink(_) => is_syntax_tree_endpoint,
            _ => return Ok(()),
        };
        let Some(endpoints) = kind.endpoints() else {
            return Ok(());
        };

        let [source, target] = endpoints.map(|endpoint| self.kind_at(endpoint));
        let (source, target) = (source?, target?);
        for endpoint_kind in [source, target] {
            if !allowed(endpoint_kind) {
                return Err(DiagramError::InvalidEndpoint {
                    id,
                    kind: kind.type_name(),
                    endpoint: endpoint_kind.type_name(),
                });
            }
        }

        // Arcs alternate between places and transitions.
        let same_kind = mem::discriminant(source) == mem::discriminant(target);
        if matches!(kind, ElementKind::Arc(_)) && same_kind {
            return Err(DiagramError::InvalidEndpoint {
                id,
                kind: kind.type_name(),
                endpoint: target.type_name(),
            });
        }
        Ok(())
    }
}

fn is_class_endpoint(kind: &ElementKind) -> bool {
    matches!(kind, ElementKind::Class(_) | ElementKind::Package(_))
}

fn is_activity_endpoint(kind: &ElementKind) -> bool {
    matches!(
        kind,
        ElementKind::Activity(_) | ElementKind::ActivityNode(_)
    )
}

fn is_use_case_endpoint(kind: &ElementKind) -> bool {
    matches!(kind, ElementKind::Actor(_) | ElementKind::UseCase(_))
}

fn is_petri_net_endpoint(kind: &ElementKind) -> bool {
    matches!(kind, ElementKind::Place(_) | ElementKind::Transition(_))
}

fn is_syntax_tree_endpoint(kind: &ElementKind) -> bool {
    matches!(kind, ElementKind::Nonterminal(_) | ElementKind::Terminal(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{
        ActivityNodeType, ClassType, RelationshipEnd, RelationshipType, UseCaseAssociationType,
    };

    fn class_diagram() -> (Diagram, [ElementIndex; 4]) {
        let mut builder = DiagramBuilder::new(1, DiagramKind::ClassDiagram);
        let package = builder.add_package("p", Package::new("shop")).unwrap();
        let pizza = builder
            .add_class("c1", Class::new("Pizza", ClassType::Class), Some(package))
            .unwrap();
        let size = builder
            .add_attribute(pizza, "a1", Attribute::new("size", "int"))
            .unwrap();
        let order = builder
            .add_class("c2", Class::new("Order", ClassType::Class), None)
            .unwrap();
        builder
            .add_relationship(
                "r1",
                Relationship::new(
                    RelationshipType::ClassAggregation,
                    RelationshipEnd::new(order),
                    RelationshipEnd::new(pizza).with_multiplicity("*"),
                ),
            )
            .unwrap();
        (builder.build(), [package, pizza, size, order])
    }

    #[test]
    fn test_builder_links_parents_and_children() {
        let (diagram, [package, pizza, size, order]) = class_diagram();

        assert_eq!(diagram.len(), 5);
        assert_eq!(diagram.element(pizza).unwrap().parent(), Some(package));
        assert_eq!(diagram.element(pizza).unwrap().children(), &[size]);
        assert_eq!(diagram.element(package).unwrap().children(), &[pizza]);
        assert_eq!(diagram.element(order).unwrap().parent(), None);
    }

    #[test]
    fn test_lookup_by_external_id() {
        let (diagram, [_, pizza, _, _]) = class_diagram();

        assert_eq!(diagram.find_by_external_id(Id::new("c1")), Some(pizza));
        assert_eq!(diagram.find_by_external_id(Id::new("missing")), None);
        assert_eq!(
            diagram.find_element(Id::new("a1")).unwrap().kind().name(),
            Some("size")
        );
    }

    #[test]
    fn test_roots_exclude_nested_elements() {
        let (diagram, [package, _, _, order]) = class_diagram();
        let roots: Vec<_> = diagram.roots().collect();

        assert_eq!(roots, vec![package, order, ElementIndex::new(4)]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::ClassDiagram);
        builder.add_package("p", Package::new("a")).unwrap();

        let err = builder.add_package("p", Package::new("b")).unwrap_err();
        assert_eq!(err, DiagramError::DuplicateElement(Id::new("p")));
    }

    #[test]
    fn test_member_requires_class_parent() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::ClassDiagram);
        let package = builder.add_package("p", Package::new("a")).unwrap();

        let missing = builder
            .add_element("a1", ElementKind::Attribute(Attribute::new("x", "")), None)
            .unwrap_err();
        assert!(matches!(missing, DiagramError::MissingParent { .. }));

        let invalid = builder
            .add_attribute(package, "a2", Attribute::new("x", ""))
            .unwrap_err();
        assert!(matches!(invalid, DiagramError::InvalidParent { .. }));
    }

    #[test]
    fn test_unknown_endpoint_is_rejected() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::ActivityDiagram);
        let start = builder
            .add_activity_node("n1", ActivityNode::new("", ActivityNodeType::Initial), None)
            .unwrap();

        let err = builder
            .add_control_flow("f1", ControlFlow::new(start, ElementIndex::new(9)))
            .unwrap_err();
        assert_eq!(err, DiagramError::UnknownElement(9));
    }

    #[test]
    fn test_element_kind_must_fit_diagram() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::ActivityDiagram);

        let err = builder.add_package("p", Package::new("a")).unwrap_err();
        assert!(matches!(err, DiagramError::UnsupportedElement { .. }));
    }

    #[test]
    fn test_set_owner_moves_child() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::ActivityDiagram);
        let node = builder
            .add_activity_node(
                "n1",
                ActivityNode::new("pay", ActivityNodeType::Action),
                None,
            )
            .unwrap();
        let activity = builder
            .add_activity("act", Activity::new("checkout"), None)
            .unwrap();
        builder.set_owner(node, activity).unwrap();
        let diagram = builder.build();

        assert_eq!(diagram.element(node).unwrap().parent(), Some(activity));
        assert_eq!(diagram.element(activity).unwrap().children(), &[node]);
        assert_eq!(diagram.roots().collect::<Vec<_>>(), vec![activity]);
    }

    #[test]
    fn test_set_owner_rejects_cycles() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::ActivityDiagram);
        let outer = builder
            .add_activity("a1", Activity::new("outer"), None)
            .unwrap();
        let inner = builder
            .add_activity("a2", Activity::new("inner"), Some(outer))
            .unwrap();

        let err = builder.set_owner(outer, inner).unwrap_err();
        assert_eq!(err, DiagramError::OwnershipCycle(Id::new("a1")));
        assert!(builder.set_owner(outer, outer).is_err());
    }

    #[test]
    fn test_fresh_diagram_is_not_analyzed() {
        let (diagram, _) = class_diagram();
        let empty = DiagramBuilder::new(2, DiagramKind::ClassDiagram).build();

        assert!(!diagram.is_analyzed());
        assert!(empty.is_analyzed());
        assert!(diagram.last_assessment_result().is_none());
    }

    #[test]
    fn test_use_cases_live_inside_system_boundaries() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::UseCaseDiagram);
        let shop = builder
            .add_system_boundary("s", SystemBoundary::new("Shop"))
            .unwrap();
        let customer = builder
            .add_actor("a", Actor::new("Customer"), None)
            .unwrap();
        let order = builder
            .add_use_case("u", UseCase::new("Order"), Some(shop))
            .unwrap();
        let association =
            UseCaseAssociation::new(UseCaseAssociationType::Association, customer, order);
        builder.add_use_case_association("r", association).unwrap();

        let err = builder
            .add_use_case("u2", UseCase::new("Pay"), Some(customer))
            .unwrap_err();
        assert!(matches!(err, DiagramError::InvalidParent { .. }));
        assert_eq!(builder.build().element(shop).unwrap().children(), &[order]);
    }

    #[test]
    fn test_use_case_association_rejects_boundary_endpoint() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::UseCaseDiagram);
        let shop = builder
            .add_system_boundary("s", SystemBoundary::new("Shop"))
            .unwrap();
        let order = builder
            .add_use_case("u", UseCase::new("Order"), None)
            .unwrap();
        let include = UseCaseAssociation::new(UseCaseAssociationType::Include, order, shop);

        let err = builder.add_use_case_association("r", include).unwrap_err();
        assert_eq!(
            err,
            DiagramError::InvalidEndpoint {
                id: Id::new("r"),
                kind: "UseCaseAssociation",
                endpoint: "SystemBoundary",
            }
        );
    }

    #[test]
    fn test_arcs_connect_places_and_transitions() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::PetriNet);
        let buffer = builder.add_place("p1", Place::new("buffer", 1)).unwrap();
        let done = builder.add_place("p2", Place::new("done", 0)).unwrap();
        let consume = builder
            .add_transition("t", Transition::new("consume"))
            .unwrap();

        builder
            .add_arc("a1", Arc::new("1", buffer, consume))
            .unwrap();
        builder.add_arc("a2", Arc::new("1", consume, done)).unwrap();

        let err = builder
            .add_arc("a3", Arc::new("1", buffer, done))
            .unwrap_err();
        assert_eq!(
            err,
            DiagramError::InvalidEndpoint {
                id: Id::new("a3"),
                kind: "Arc",
                endpoint: "Place",
            }
        );
        assert_eq!(builder.build().len(), 5);
    }

    #[test]
    fn test_syntax_tree_rejects_foreign_kinds() {
        let mut builder = DiagramBuilder::new(1, DiagramKind::SyntaxTree);
        let expr = builder
            .add_nonterminal("n", Nonterminal::new("Expr"))
            .unwrap();
        let plus = builder.add_terminal("t", Terminal::new("+")).unwrap();
        builder
            .add_syntax_tree_link("l", SyntaxTreeLink::new(expr, plus))
            .unwrap();

        let err = builder.add_place("p", Place::new("x", 0)).unwrap_err();
        assert!(matches!(err, DiagramError::UnsupportedElement { .. }));
    }
}
