//! Compass Core Types and Definitions
//!
//! This crate provides the foundational types for automatic assessment of
//! UML student models. It includes:
//!
//! - **Identifiers**: String-interned external element ids ([`identifier::Id`])
//! - **Elements**: The closed set of element kinds of every diagram family ([`element`] module)
//! - **Diagrams**: Arena-backed student diagrams and their builder ([`diagram`] module)
//! - **Similarity**: Per-kind structural similarity in `[0, 1]` ([`similarity`] module)
//! - **Contexts**: Cluster ids and grading contexts ([`context`] module)
//! - **Scores**: Points with confidence and aggregated results ([`score`] module)
//! - **Feedback**: Tutor feedback and its conversion to scores ([`feedback`] module)

pub mod context;
pub mod diagram;
pub mod element;
pub mod error;
pub mod feedback;
pub mod identifier;
pub mod score;
pub mod similarity;
