//! Elaboration of session documents into diagrams.
//!
//! Each `[[diagrams]]` table is turned into a [`Diagram`] plus its feedback
//! map. Structural problems are collected per diagram, so one broken
//! submission does not hide the problems of another or keep the rest of the
//! document from loading.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use compass_core::{
    diagram::{Diagram, DiagramBuilder},
    element::{
        Activity, ActivityNode, Actor, Arc, Class, ControlFlow, ElementIndex, Nonterminal,
        Package, Place, Relationship, RelationshipEnd, SyntaxTreeLink, SystemBoundary, Terminal,
        Transition, UseCase, UseCaseAssociation,
    },
    error::DiagramError,
    feedback::Feedback,
    identifier::Id,
};

use crate::{
    document::{
        DiagramDocument, ElementDocument, EndDocument, RelationshipDocument, SessionDocument,
    },
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    member,
    session::{DiagramFailure, ParsedDiagram, ParsedSession},
    span::Span,
};

/// Elaborates every diagram of the document.
pub(crate) fn elaborate(document: SessionDocument) -> ParsedSession {
    let mut session = ParsedSession::default();
    let mut seen: HashMap<u64, Span> = HashMap::new();

    for diagram in &document.diagrams {
        let submission_id = *diagram.submission_id.get_ref();
        let span = Span::from(diagram.submission_id.span());

        if let Some(first) = seen.get(&submission_id) {
            warn!(submission_id; "Duplicate submission skipped");
            let diagnostic = Diagnostic::new(
                ErrorCode::E205,
                format!("submission {submission_id} appears more than once"),
            )
            .with_label(span, "duplicate submission")
            .with_context(*first, "first defined here");
            session.push_failure(DiagramFailure::new(submission_id, diagnostic.into()));
            continue;
        }
        seen.insert(submission_id, span);

        match DiagramElaborator::new(diagram).elaborate(diagram) {
            Ok((parsed, warnings)) => {
                session.push_diagram(parsed);
                session.extend_warnings(warnings);
            }
            Err(err) => {
                warn!(submission_id, diagnostics = err.diagnostics().len(); "Diagram rejected");
                session.push_failure(DiagramFailure::new(submission_id, err));
            }
        }
    }

    info!(
        diagrams = session.diagrams().len(),
        failures = session.failures().len(),
        warnings = session.warnings().len();
        "Session document elaborated"
    );
    session
}

struct DiagramElaborator {
    submission_id: u64,
    builder: DiagramBuilder,
    indices: HashMap<String, ElementIndex>,
    collector: DiagnosticCollector,
}

impl DiagramElaborator {
    fn new(document: &DiagramDocument) -> Self {
        let submission_id = *document.submission_id.get_ref();
        Self {
            submission_id,
            builder: DiagramBuilder::new(submission_id, document.kind),
            indices: HashMap::new(),
            collector: DiagnosticCollector::new(),
        }
    }

    // ============================================================================
    // Main Entry Method
    // ============================================================================

    fn elaborate(
        mut self,
        document: &DiagramDocument,
    ) -> Result<(ParsedDiagram, Vec<Diagnostic>), ParseError> {
        debug!(submission_id = self.submission_id, kind:% = document.kind; "Elaborating diagram");

        // Owners may be declared after the elements they contain.
        let mut owned = Vec::new();
        for element in &document.elements {
            let span = Span::from(element.span());
            let index = self.add_element(element.get_ref(), span);
            if let (Some(index), Some(owner)) = (index, element.get_ref().owner()) {
                owned.push((index, element.get_ref().id(), owner, span));
            }
        }
        for (index, id, owner, span) in owned {
            self.assign_owner(index, id, owner, span);
        }

        for relationship in &document.relationships {
            self.add_relationship(relationship.get_ref(), Span::from(relationship.span()));
        }

        let Self {
            submission_id,
            builder,
            mut collector,
            ..
        } = self;

        let diagram = builder.build();
        let feedback = collect_feedback(&diagram, document, &mut collector);
        let warnings = collector.finish()?;

        debug!(
            submission_id,
            elements = diagram.len(),
            feedback = feedback.len();
            "Diagram elaborated"
        );
        Ok((ParsedDiagram::new(diagram, feedback), warnings))
    }

    // ============================================================================
    // Elements
    // ============================================================================

    fn add_element(&mut self, element: &ElementDocument, span: Span) -> Option<ElementIndex> {
        trace!(id = element.id(); "Adding element");
        match element {
            ElementDocument::Class {
                id,
                name,
                class_type,
                attributes,
                methods,
                ..
            } => {
                let added = self
                    .builder
                    .add_class(id, Class::new(name, *class_type), None);
                let class = self.register(id, span, added)?;

                for attribute in attributes {
                    match member::parse_attribute(&attribute.label) {
                        Ok(parsed) => {
                            let added = self.builder.add_attribute(class, &attribute.id, parsed);
                            self.register(&attribute.id, span, added);
                        }
                        Err(err) => self.emit_label_error(id, &err, span),
                    }
                }
                for method in methods {
                    match member::parse_method(&method.label) {
                        Ok(parsed) => {
                            let added = self.builder.add_method(class, &method.id, parsed);
                            self.register(&method.id, span, added);
                        }
                        Err(err) => self.emit_label_error(id, &err, span),
                    }
                }
                Some(class)
            }
            ElementDocument::Package { id, name } => {
                let added = self.builder.add_package(id, Package::new(name));
                self.register(id, span, added)
            }
            ElementDocument::Activity { id, name, .. } => {
                let added = self.builder.add_activity(id, Activity::new(name), None);
                self.register(id, span, added)
            }
            ElementDocument::ActivityNode {
                id,
                name,
                node_type,
                ..
            } => {
                let node = ActivityNode::new(name, *node_type);
                let added = self.builder.add_activity_node(id, node, None);
                self.register(id, span, added)
            }
            ElementDocument::Actor { id, name, .. } => {
                let added = self.builder.add_actor(id, Actor::new(name), None);
                self.register(id, span, added)
            }
            ElementDocument::UseCase { id, name, .. } => {
                let added = self.builder.add_use_case(id, UseCase::new(name), None);
                self.register(id, span, added)
            }
            ElementDocument::SystemBoundary { id, name } => {
                let added = self
                    .builder
                    .add_system_boundary(id, SystemBoundary::new(name));
                self.register(id, span, added)
            }
            ElementDocument::Place {
                id,
                name,
                tokens,
                capacity,
            } => {
                let mut place = Place::new(name, *tokens);
                if let Some(capacity) = capacity {
                    place = place.with_capacity(*capacity);
                }
                let added = self.builder.add_place(id, place);
                self.register(id, span, added)
            }
            ElementDocument::Transition { id, name } => {
                let added = self.builder.add_transition(id, Transition::new(name));
                self.register(id, span, added)
            }
            ElementDocument::Nonterminal { id, name } => {
                let added = self.builder.add_nonterminal(id, Nonterminal::new(name));
                self.register(id, span, added)
            }
            ElementDocument::Terminal { id, name } => {
                let added = self.builder.add_terminal(id, Terminal::new(name));
                self.register(id, span, added)
            }
        }
    }

    fn assign_owner(&mut self, element: ElementIndex, id: &str, owner: &str, span: Span) {
        let Some(&owner_index) = self.indices.get(owner) else {
            let diagnostic = Diagnostic::new(
                ErrorCode::E202,
                format!("`{id}` is owned by unknown element `{owner}`"),
            )
            .with_label(span, self.not_defined())
            .with_help("define the owner in the same diagram");
            self.collector.emit(diagnostic);
            return;
        };

        if let Err(err) = self.builder.set_owner(element, owner_index) {
            self.collector.emit(diagram_error(&err, span));
        }
    }

    fn register(
        &mut self,
        id: &str,
        span: Span,
        added: Result<ElementIndex, DiagramError>,
    ) -> Option<ElementIndex> {
        match added {
            Ok(index) => {
                self.indices.insert(id.to_string(), index);
                Some(index)
            }
            Err(err) => {
                self.collector.emit(diagram_error(&err, span));
                None
            }
        }
    }

    fn emit_label_error(&mut self, class: &str, err: &member::MemberLabelError, span: Span) {
        let help = match err.kind() {
            "method" => "write methods as `[+-#~] name(parameters)[: return type]`",
            _ => "write attributes as `[+-#~] name[: type]`",
        };
        let diagnostic = Diagnostic::new(ErrorCode::E203, format!("{err} in class `{class}`"))
            .with_label(span, "in this class")
            .with_help(help);
        self.collector.emit(diagnostic);
    }

    fn not_defined(&self) -> String {
        format!("not defined in submission {}", self.submission_id)
    }

    // ============================================================================
    // Relationships
    // ============================================================================

    fn add_relationship(&mut self, relationship: &RelationshipDocument, span: Span) {
        match relationship {
            RelationshipDocument::Relationship {
                id,
                relationship_type,
                source,
                target,
            } => {
                let (Some(source), Some(target)) = (
                    self.resolve_end(id, source, span),
                    self.resolve_end(id, target, span),
                ) else {
                    return;
                };
                let added = self.builder.add_relationship(
                    id,
                    Relationship::new(*relationship_type, source, target),
                );
                self.register(id, span, added);
            }
            RelationshipDocument::ControlFlow { id, source, target } => {
                let Some([source, target]) = self.resolve_both(id, source, target, span) else {
                    return;
                };
                let added = self
                    .builder
                    .add_control_flow(id, ControlFlow::new(source, target));
                self.register(id, span, added);
            }
            RelationshipDocument::UseCaseAssociation {
                id,
                association_type,
                name,
                source,
                target,
            } => {
                let Some([source, target]) = self.resolve_both(id, source, target, span) else {
                    return;
                };
                let mut association = UseCaseAssociation::new(*association_type, source, target);
                if let Some(name) = name {
                    association = association.with_name(name);
                }
                let added = self.builder.add_use_case_association(id, association);
                self.register(id, span, added);
            }
            RelationshipDocument::Arc {
                id,
                multiplicity,
                source,
                target,
            } => {
                let Some([source, target]) = self.resolve_both(id, source, target, span) else {
                    return;
                };
                let added = self
                    .builder
                    .add_arc(id, Arc::new(multiplicity, source, target));
                self.register(id, span, added);
            }
            RelationshipDocument::SyntaxTreeLink { id, source, target } => {
                let Some([source, target]) = self.resolve_both(id, source, target, span) else {
                    return;
                };
                let added = self
                    .builder
                    .add_syntax_tree_link(id, SyntaxTreeLink::new(source, target));
                self.register(id, span, added);
            }
        }
    }

    /// Resolves both endpoints, reporting each unknown one.
    fn resolve_both(
        &mut self,
        id: &str,
        source: &str,
        target: &str,
        span: Span,
    ) -> Option<[ElementIndex; 2]> {
        let source = self.resolve(id, source, span);
        let target = self.resolve(id, target, span);
        Some([source?, target?])
    }

    fn resolve_end(&mut self, id: &str, end: &EndDocument, span: Span) -> Option<RelationshipEnd> {
        let index = self.resolve(id, &end.element, span)?;
        let mut resolved = RelationshipEnd::new(index);
        if let Some(role) = &end.role {
            resolved = resolved.with_role(role);
        }
        if let Some(multiplicity) = &end.multiplicity {
            resolved = resolved.with_multiplicity(multiplicity);
        }
        Some(resolved)
    }

    fn resolve(&mut self, id: &str, endpoint: &str, span: Span) -> Option<ElementIndex> {
        let index = self.indices.get(endpoint).copied();
        if index.is_none() {
            let diagnostic = Diagnostic::new(
                ErrorCode::E201,
                format!("`{id}` refers to unknown element `{endpoint}`"),
            )
            .with_label(span, self.not_defined())
            .with_help("relationships only connect elements of one diagram");
            self.collector.emit(diagnostic);
        }
        index
    }
}

fn collect_feedback(
    diagram: &Diagram,
    document: &DiagramDocument,
    collector: &mut DiagnosticCollector,
) -> IndexMap<Id, Feedback> {
    let mut feedback = IndexMap::new();

    for item in &document.feedback {
        let element = item.element.get_ref();
        let span = Span::from(item.element.span());
        let id = Id::new(element);

        if diagram.find_by_external_id(id).is_none() {
            let diagnostic = Diagnostic::new(
                ErrorCode::E300,
                format!("feedback for unknown element `{element}` is ignored"),
            )
            .with_label(
                span,
                format!("not defined in submission {}", diagram.submission_id()),
            );
            collector.emit(diagnostic);
            continue;
        }
        let credits = item.credits;
        if !credits.is_finite() {
            let diagnostic = Diagnostic::new(
                ErrorCode::E302,
                format!("feedback for `{element}` has non-finite credits {credits}"),
            )
            .with_label(span, "credits of this entry")
            .with_help("credits must be a finite number");
            collector.emit(diagnostic);
            continue;
        }

        let value = Feedback::new(credits, item.feedback_type, item.text.clone());
        if feedback.insert(id, value).is_some() {
            let diagnostic = Diagnostic::new(
                ErrorCode::E301,
                format!("element `{element}` received feedback twice"),
            )
            .with_label(span, "this entry replaces the earlier one");
            collector.emit(diagnostic);
        }
    }
    feedback
}

fn diagram_error(err: &DiagramError, span: Span) -> Diagnostic {
    let (code, label) = match err {
        DiagramError::DuplicateElement(_) => (ErrorCode::E200, "duplicate definition"),
        DiagramError::UnknownElement(_) | DiagramError::InvalidEndpoint { .. } => {
            (ErrorCode::E201, "invalid endpoint")
        }
        DiagramError::InvalidParent { .. }
        | DiagramError::MissingParent { .. }
        | DiagramError::OwnershipCycle(_) => (ErrorCode::E202, "invalid owner"),
        DiagramError::UnsupportedElement { .. } => (ErrorCode::E204, "not allowed here"),
    };
    Diagnostic::new(code, err.to_string()).with_label(span, label)
}
