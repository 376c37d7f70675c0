//! Errors raised while assembling a diagram.

use thiserror::Error;

use crate::identifier::Id;

/// Structural problems detected by [`DiagramBuilder`](crate::diagram::DiagramBuilder).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("Element `{0}` is defined more than once")]
    DuplicateElement(Id),

    #[error("Element index {0} does not exist in this diagram")]
    UnknownElement(usize),

    #[error("{kind} `{id}` cannot be placed inside a {parent}")]
    InvalidParent {
        id: Id,
        kind: &'static str,
        parent: &'static str,
    },

    #[error("{kind} `{id}` requires a parent element")]
    MissingParent { id: Id, kind: &'static str },

    #[error("{kind} `{id}` cannot connect to a {endpoint}")]
    InvalidEndpoint {
        id: Id,
        kind: &'static str,
        endpoint: &'static str,
    },

    #[error("`{0}` would end up inside itself")]
    OwnershipCycle(Id),

    #[error("{kind} `{id}` is not allowed in a {diagram}")]
    UnsupportedElement {
        id: Id,
        kind: &'static str,
        diagram: &'static str,
    },
}
