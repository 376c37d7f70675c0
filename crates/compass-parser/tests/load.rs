use compass_core::{
    diagram::DiagramKind,
    element::{
        ActivityNodeType, ClassType, ElementKind, RelationshipType, UseCaseAssociationType,
    },
    feedback::FeedbackType,
    identifier::Id,
};
use compass_parser::{
    ParsedSession,
    error::{ErrorCode, ParseError, Severity},
    parse_session,
};

fn load(source: &str) -> ParsedSession {
    parse_session(source).expect("Failed to parse session")
}

fn codes(err: &ParseError) -> Vec<ErrorCode> {
    err.diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.code())
        .collect()
}

#[test]
fn test_class_diagram_with_members_and_feedback() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 7
        kind = "ClassDiagram"

        [[diagrams.elements]]
        type = "Package"
        id = "p1"
        name = "shop"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"
        owner = "p1"
        attributes = [{ id = "a1", label = "+ size: int" }]
        methods = [{ id = "m1", label = "bake(temperature: int): void" }]

        [[diagrams.elements]]
        type = "Class"
        id = "c2"
        name = "Order"
        class_type = "AbstractClass"

        [[diagrams.relationships]]
        type = "Relationship"
        id = "r1"
        relationship_type = "ClassAggregation"
        source = { element = "c2", role = "order" }
        target = { element = "c1", multiplicity = "1..*" }

        [[diagrams.feedback]]
        element = "a1"
        credits = 0.5
        text = "correct"

        [[diagrams.feedback]]
        element = "r1"
        credits = 1
        feedback_type = "AutomaticAdapted"
        "#,
    );

    assert!(session.failures().is_empty());
    assert!(session.warnings().is_empty());
    assert_eq!(session.diagrams().len(), 1);

    let parsed = &session.diagrams()[0];
    let diagram = parsed.diagram();
    assert_eq!(parsed.submission_id(), 7);
    assert_eq!(diagram.kind(), DiagramKind::ClassDiagram);
    assert_eq!(diagram.len(), 6);

    let package = diagram.find_by_external_id(Id::new("p1")).unwrap();
    let pizza = diagram.find_by_external_id(Id::new("c1")).unwrap();
    assert_eq!(diagram.element(pizza).unwrap().parent(), Some(package));
    assert_eq!(diagram.element(pizza).unwrap().children().len(), 2);

    match diagram.find_element(Id::new("m1")).unwrap().kind() {
        ElementKind::Method(method) => {
            assert_eq!(method.name(), "bake");
            assert_eq!(method.return_type(), "void");
            assert_eq!(method.parameters(), &["temperature: int".to_string()]);
        }
        other => panic!("Expected method, got {other:?}"),
    }

    match diagram.find_element(Id::new("c2")).unwrap().kind() {
        ElementKind::Class(class) => assert_eq!(class.class_type(), ClassType::AbstractClass),
        other => panic!("Expected class, got {other:?}"),
    }

    match diagram.find_element(Id::new("r1")).unwrap().kind() {
        ElementKind::Relationship(relationship) => {
            assert_eq!(
                relationship.relationship_type(),
                RelationshipType::ClassAggregation
            );
            assert_eq!(relationship.source().role(), Some("order"));
            assert_eq!(relationship.source().multiplicity(), None);
            assert_eq!(relationship.target().element(), pizza);
            assert_eq!(relationship.target().multiplicity(), Some("1..*"));
        }
        other => panic!("Expected relationship, got {other:?}"),
    }

    assert!(parsed.is_assessed());
    let feedback = parsed.feedback();
    assert_eq!(feedback.len(), 2);
    assert_eq!(feedback[&Id::new("a1")].credits(), 0.5);
    assert_eq!(
        feedback[&Id::new("a1")].feedback_type(),
        FeedbackType::Manual
    );
    assert_eq!(feedback[&Id::new("a1")].text(), Some("correct"));
    assert_eq!(
        feedback[&Id::new("r1")].feedback_type(),
        FeedbackType::AutomaticAdapted
    );
}

#[test]
fn test_activity_diagram_owner_declared_later() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 3
        kind = "ActivityDiagram"

        [[diagrams.elements]]
        type = "ActivityNode"
        id = "start"
        node_type = "ActivityInitialNode"
        owner = "checkout"

        [[diagrams.elements]]
        type = "ActivityNode"
        id = "pay"
        name = "pay"
        node_type = "ActivityActionNode"
        owner = "checkout"

        [[diagrams.elements]]
        type = "Activity"
        id = "checkout"
        name = "Checkout"

        [[diagrams.relationships]]
        type = "ControlFlow"
        id = "f1"
        source = "start"
        target = "pay"
        "#,
    );

    assert!(session.failures().is_empty());
    let diagram = session.diagrams()[0].diagram();
    let checkout = diagram.find_by_external_id(Id::new("checkout")).unwrap();

    assert_eq!(diagram.element(checkout).unwrap().children().len(), 2);
    assert_eq!(diagram.roots().count(), 2);
    match diagram.find_element(Id::new("start")).unwrap().kind() {
        ElementKind::ActivityNode(node) => {
            assert_eq!(node.node_type(), ActivityNodeType::Initial);
            assert_eq!(node.name(), "");
        }
        other => panic!("Expected activity node, got {other:?}"),
    }
    assert!(!session.diagrams()[0].is_assessed());
}

#[test]
fn test_syntax_error_fails_whole_document() {
    let err = parse_session("[[diagrams]\nsubmission_id = 1").unwrap_err();

    assert_eq!(codes(&err), vec![ErrorCode::E100]);
    assert_eq!(err.diagnostics()[0].labels().len(), 1);
}

#[test]
fn test_schema_error_fails_whole_document() {
    let err = parse_session(
        r#"
        [[diagrams]]
        submission_id = 1
        kind = "SequenceDiagram"
        "#,
    )
    .unwrap_err();

    assert_eq!(codes(&err), vec![ErrorCode::E100]);
}

#[test]
fn test_broken_diagram_is_isolated() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 1
        kind = "ClassDiagram"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"

        [[diagrams.relationships]]
        type = "Relationship"
        id = "r1"
        relationship_type = "ClassDependency"
        source = { element = "c1" }
        target = { element = "missing" }

        [[diagrams]]
        submission_id = 2
        kind = "ClassDiagram"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"
        "#,
    );

    assert_eq!(session.diagrams().len(), 1);
    assert_eq!(session.diagrams()[0].submission_id(), 2);

    assert_eq!(session.failures().len(), 1);
    let failure = &session.failures()[0];
    assert_eq!(failure.submission_id(), 1);
    assert_eq!(codes(failure.error()), vec![ErrorCode::E201]);
}

#[test]
fn test_every_problem_of_a_diagram_is_reported() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 4
        kind = "ActivityDiagram"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"

        [[diagrams.elements]]
        type = "Activity"
        id = "a1"
        name = "order"
        owner = "nowhere"

        [[diagrams.elements]]
        type = "Activity"
        id = "a1"
        name = "again"
        "#,
    );

    assert!(session.diagrams().is_empty());
    let mut found = codes(session.failures()[0].error());
    found.sort_by_key(|code| code.as_str());
    assert_eq!(
        found,
        vec![ErrorCode::E200, ErrorCode::E202, ErrorCode::E204]
    );
}

#[test]
fn test_invalid_member_label() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 5
        kind = "ClassDiagram"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"
        methods = [{ id = "m1", label = "bake(" }]
        "#,
    );

    let err = session.failures()[0].error();
    assert_eq!(codes(err), vec![ErrorCode::E203]);
    assert!(err.diagnostics()[0].help().is_some());
}

#[test]
fn test_duplicate_submission() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 9
        kind = "ClassDiagram"

        [[diagrams]]
        submission_id = 9
        kind = "ActivityDiagram"
        "#,
    );

    assert_eq!(session.diagrams().len(), 1);
    assert_eq!(
        session.diagrams()[0].diagram().kind(),
        DiagramKind::ClassDiagram
    );
    assert_eq!(codes(session.failures()[0].error()), vec![ErrorCode::E205]);
}

#[test]
fn test_feedback_warnings() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 6
        kind = "ClassDiagram"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"

        [[diagrams.feedback]]
        element = "ghost"
        credits = 1.0

        [[diagrams.feedback]]
        element = "c1"
        credits = 1.0

        [[diagrams.feedback]]
        element = "c1"
        credits = -0.5
        "#,
    );

    assert!(session.failures().is_empty());
    let warnings: Vec<_> = session
        .warnings()
        .iter()
        .map(|warning| warning.code())
        .collect();
    assert_eq!(warnings, vec![ErrorCode::E300, ErrorCode::E301]);
    for warning in session.warnings() {
        assert_eq!(warning.severity(), Severity::Warning);
    }

    let feedback = session.diagrams()[0].feedback();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[&Id::new("c1")].credits(), -0.5);
}

#[test]
fn test_use_case_diagram() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 11
        kind = "UseCaseDiagram"

        [[diagrams.elements]]
        type = "Actor"
        id = "customer"
        name = "Customer"

        [[diagrams.elements]]
        type = "UseCase"
        id = "order"
        name = "Order pizza"
        owner = "shop"

        [[diagrams.elements]]
        type = "UseCase"
        id = "pay"
        name = "Pay"
        owner = "shop"

        [[diagrams.elements]]
        type = "SystemBoundary"
        id = "shop"
        name = "Pizza shop"

        [[diagrams.relationships]]
        type = "UseCaseAssociation"
        id = "r1"
        name = "places"
        source = "customer"
        target = "order"

        [[diagrams.relationships]]
        type = "UseCaseAssociation"
        id = "r2"
        association_type = "UseCaseInclude"
        source = "order"
        target = "pay"
        "#,
    );

    assert!(session.failures().is_empty());
    let diagram = session.diagrams()[0].diagram();
    let shop = diagram.find_by_external_id(Id::new("shop")).unwrap();
    assert_eq!(diagram.kind(), DiagramKind::UseCaseDiagram);
    assert_eq!(diagram.element(shop).unwrap().children().len(), 2);

    match diagram.find_element(Id::new("r1")).unwrap().kind() {
        ElementKind::UseCaseAssociation(association) => {
            assert_eq!(
                association.association_type(),
                UseCaseAssociationType::Association
            );
            assert_eq!(association.name(), Some("places"));
        }
        other => panic!("Expected use case association, got {other:?}"),
    }
    match diagram.find_element(Id::new("r2")).unwrap().kind() {
        ElementKind::UseCaseAssociation(association) => {
            assert_eq!(
                association.association_type(),
                UseCaseAssociationType::Include
            );
            assert_eq!(association.name(), None);
        }
        other => panic!("Expected use case association, got {other:?}"),
    }
}

#[test]
fn test_actor_cannot_own_use_case() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 12
        kind = "UseCaseDiagram"

        [[diagrams.elements]]
        type = "Actor"
        id = "customer"
        name = "Customer"

        [[diagrams.elements]]
        type = "UseCase"
        id = "order"
        name = "Order"
        owner = "customer"
        "#,
    );

    assert!(session.diagrams().is_empty());
    assert_eq!(codes(session.failures()[0].error()), vec![ErrorCode::E202]);
}

#[test]
fn test_petri_net() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 13
        kind = "PetriNet"

        [[diagrams.elements]]
        type = "Place"
        id = "buffer"
        name = "buffer"
        tokens = 2
        capacity = 5

        [[diagrams.elements]]
        type = "Place"
        id = "done"
        name = "done"

        [[diagrams.elements]]
        type = "Transition"
        id = "consume"
        name = "consume"

        [[diagrams.relationships]]
        type = "Arc"
        id = "a1"
        multiplicity = "2"
        source = "buffer"
        target = "consume"

        [[diagrams.relationships]]
        type = "Arc"
        id = "a2"
        source = "consume"
        target = "done"
        "#,
    );

    assert!(session.failures().is_empty());
    let diagram = session.diagrams()[0].diagram();
    assert_eq!(diagram.len(), 5);

    match diagram.find_element(Id::new("buffer")).unwrap().kind() {
        ElementKind::Place(place) => {
            assert_eq!(place.tokens(), 2);
            assert_eq!(place.capacity(), Some(5));
        }
        other => panic!("Expected place, got {other:?}"),
    }
    match diagram.find_element(Id::new("done")).unwrap().kind() {
        ElementKind::Place(place) => {
            assert_eq!(place.tokens(), 0);
            assert_eq!(place.capacity(), None);
        }
        other => panic!("Expected place, got {other:?}"),
    }
    match diagram.find_element(Id::new("a2")).unwrap().kind() {
        ElementKind::Arc(arc) => assert_eq!(arc.multiplicity(), "1"),
        other => panic!("Expected arc, got {other:?}"),
    }
}

#[test]
fn test_arc_between_places_is_rejected() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 14
        kind = "PetriNet"

        [[diagrams.elements]]
        type = "Place"
        id = "p1"
        name = "in"

        [[diagrams.elements]]
        type = "Place"
        id = "p2"
        name = "out"

        [[diagrams.relationships]]
        type = "Arc"
        id = "a1"
        source = "p1"
        target = "p2"
        "#,
    );

    assert!(session.diagrams().is_empty());
    assert_eq!(codes(session.failures()[0].error()), vec![ErrorCode::E201]);
}

#[test]
fn test_syntax_tree() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 15
        kind = "SyntaxTree"

        [[diagrams.elements]]
        type = "Nonterminal"
        id = "expr"
        name = "Expr"

        [[diagrams.elements]]
        type = "Terminal"
        id = "plus"
        name = "+"

        [[diagrams.relationships]]
        type = "SyntaxTreeLink"
        id = "l1"
        source = "expr"
        target = "plus"

        [[diagrams.relationships]]
        type = "SyntaxTreeLink"
        id = "l2"
        source = "expr"
        target = "minus"
        "#,
    );

    assert!(session.diagrams().is_empty());
    let failure = &session.failures()[0];
    assert_eq!(failure.submission_id(), 15);
    assert_eq!(codes(failure.error()), vec![ErrorCode::E201]);
}

#[test]
fn test_non_finite_credits_reject_the_diagram() {
    let session = load(
        r#"
        [[diagrams]]
        submission_id = 16
        kind = "ClassDiagram"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"

        [[diagrams.elements]]
        type = "Class"
        id = "c2"
        name = "Order"

        [[diagrams.feedback]]
        element = "c1"
        credits = nan

        [[diagrams.feedback]]
        element = "c2"
        credits = -inf

        [[diagrams]]
        submission_id = 17
        kind = "ClassDiagram"

        [[diagrams.elements]]
        type = "Class"
        id = "c1"
        name = "Pizza"

        [[diagrams.feedback]]
        element = "c1"
        credits = 1.5
        "#,
    );

    assert_eq!(session.diagrams().len(), 1);
    assert_eq!(session.diagrams()[0].submission_id(), 17);

    let failure = &session.failures()[0];
    assert_eq!(failure.submission_id(), 16);
    assert_eq!(
        codes(failure.error()),
        vec![ErrorCode::E302, ErrorCode::E302]
    );
    assert!(failure.error().diagnostics()[0].message().contains("`c1`"));
}

#[test]
fn test_empty_document() {
    let session = load("");

    assert!(session.diagrams().is_empty());
    assert!(session.failures().is_empty());
}
