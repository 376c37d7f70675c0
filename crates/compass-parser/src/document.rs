//! Serde schema of the session document.
//!
//! Tables carrying a `type` key are wrapped in [`Spanned`] as a whole: the
//! span of a field inside an internally tagged enum is not recoverable, so
//! diagnostics point at the enclosing table instead.

use serde::Deserialize;
use toml::Spanned;

use compass_core::{
    diagram::DiagramKind,
    element::{ActivityNodeType, ClassType, RelationshipType, UseCaseAssociationType},
    feedback::FeedbackType,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionDocument {
    #[serde(default)]
    pub diagrams: Vec<DiagramDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DiagramDocument {
    pub submission_id: Spanned<u64>,
    pub kind: DiagramKind,
    #[serde(default)]
    pub elements: Vec<Spanned<ElementDocument>>,
    #[serde(default)]
    pub relationships: Vec<Spanned<RelationshipDocument>>,
    #[serde(default)]
    pub feedback: Vec<FeedbackDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum ElementDocument {
    Class {
        id: String,
        name: String,
        #[serde(default)]
        class_type: ClassType,
        owner: Option<String>,
        #[serde(default)]
        attributes: Vec<MemberDocument>,
        #[serde(default)]
        methods: Vec<MemberDocument>,
    },
    Package {
        id: String,
        name: String,
    },
    Activity {
        id: String,
        name: String,
        owner: Option<String>,
    },
    ActivityNode {
        id: String,
        #[serde(default)]
        name: String,
        node_type: ActivityNodeType,
        owner: Option<String>,
    },
    Actor {
        id: String,
        name: String,
        owner: Option<String>,
    },
    UseCase {
        id: String,
        name: String,
        owner: Option<String>,
    },
    SystemBoundary {
        id: String,
        name: String,
    },
    Place {
        id: String,
        name: String,
        #[serde(default)]
        tokens: u32,
        /// Omitted for an unbounded place.
        capacity: Option<u32>,
    },
    Transition {
        id: String,
        name: String,
    },
    Nonterminal {
        id: String,
        name: String,
    },
    Terminal {
        id: String,
        name: String,
    },
}

impl ElementDocument {
    pub fn id(&self) -> &str {
        match self {
            ElementDocument::Class { id, .. }
            | ElementDocument::Package { id, .. }
            | ElementDocument::Activity { id, .. }
            | ElementDocument::ActivityNode { id, .. }
            | ElementDocument::Actor { id, .. }
            | ElementDocument::UseCase { id, .. }
            | ElementDocument::SystemBoundary { id, .. }
            | ElementDocument::Place { id, .. }
            | ElementDocument::Transition { id, .. }
            | ElementDocument::Nonterminal { id, .. }
            | ElementDocument::Terminal { id, .. } => id,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match self {
            ElementDocument::Class { owner, .. }
            | ElementDocument::Activity { owner, .. }
            | ElementDocument::ActivityNode { owner, .. }
            | ElementDocument::Actor { owner, .. }
            | ElementDocument::UseCase { owner, .. } => owner.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberDocument {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum RelationshipDocument {
    Relationship {
        id: String,
        relationship_type: RelationshipType,
        source: EndDocument,
        target: EndDocument,
    },
    ControlFlow {
        id: String,
        source: String,
        target: String,
    },
    UseCaseAssociation {
        id: String,
        #[serde(default = "default_association_type")]
        association_type: UseCaseAssociationType,
        name: Option<String>,
        source: String,
        target: String,
    },
    Arc {
        id: String,
        #[serde(default = "default_arc_multiplicity")]
        multiplicity: String,
        source: String,
        target: String,
    },
    SyntaxTreeLink {
        id: String,
        source: String,
        target: String,
    },
}

fn default_association_type() -> UseCaseAssociationType {
    UseCaseAssociationType::Association
}

fn default_arc_multiplicity() -> String {
    "1".to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct EndDocument {
    pub element: String,
    pub role: Option<String>,
    pub multiplicity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FeedbackDocument {
    pub element: Spanned<String>,
    pub credits: f64,
    #[serde(default)]
    pub feedback_type: FeedbackType,
    pub text: Option<String>,
}
