//! Cluster identifiers and the context an element's grading is scoped to.

use std::fmt;

/// Identifier of a cluster of structurally similar elements.
///
/// Ids are issued by the model index in increasing order starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimilarityId(usize);

impl SimilarityId {
    /// Wraps a raw cluster number.
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    /// Returns the raw cluster number.
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for SimilarityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scope in which two elements of the same cluster count as the same
/// grading decision.
///
/// Diagram-level elements (classes, relationships, packages, activity
/// elements) are comparable across the whole exercise and carry
/// [`Context::NoContext`]. Class members are only comparable when their
/// enclosing classes fell into the same cluster, so they carry the parent's
/// cluster id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Exercise-wide scope.
    NoContext,
    /// Scoped to the cluster of the structural parent.
    Scoped(SimilarityId),
}

impl Context {
    /// Returns the parent cluster of a scoped context.
    pub fn parent(&self) -> Option<SimilarityId> {
        match self {
            Context::NoContext => None,
            Context::Scoped(parent) => Some(*parent),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::NoContext => write!(f, "no-context"),
            Context::Scoped(parent) => write!(f, "in {parent}"),
        }
    }
}
