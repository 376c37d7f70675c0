//! Grammar for attribute and method labels.
//!
//! Modeling tools store class members as a single label string:
//!
//! ```text
//! + size: int
//! - bake(temperature: int, minutes: int): void
//! # toString()
//! ```
//!
//! A label starts with an optional visibility marker (`+ - # ~`), followed
//! by the member name. Attributes may carry a `: type` suffix; methods carry
//! a parenthesised parameter list and an optional return type. Visibility is
//! not part of the element model and is dropped.

use thiserror::Error;
use winnow::{
    ModalResult, Parser,
    ascii::multispace0,
    combinator::{delimited, opt, preceded, separated},
    token::{one_of, rest, take_while},
};

use compass_core::element::{Attribute, Method};

/// A member label that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} label `{label}` at offset {offset}")]
pub struct MemberLabelError {
    kind: &'static str,
    label: String,
    offset: usize,
}

impl MemberLabelError {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Byte offset in the label where parsing stopped.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

fn visibility(input: &mut &str) -> ModalResult<char> {
    one_of(['+', '-', '#', '~']).parse_next(input)
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}

/// `: type`, running to the end of the label.
fn type_annotation<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded(
        (multispace0, ':', multispace0),
        rest.map(str::trim_end).verify(|ty: &str| !ty.is_empty()),
    )
    .parse_next(input)
}

fn member_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    preceded((multispace0, opt(visibility), multispace0), identifier).parse_next(input)
}

fn parameter<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c != ',' && c != ')')
        .map(str::trim)
        .verify(|parameter: &str| !parameter.is_empty())
        .parse_next(input)
}

fn parameters<'i>(input: &mut &'i str) -> ModalResult<Vec<&'i str>> {
    delimited(
        (multispace0, '(', multispace0),
        separated(0.., parameter, ','),
        ')',
    )
    .parse_next(input)
}

fn attribute<'i>(input: &mut &'i str) -> ModalResult<(&'i str, Option<&'i str>)> {
    (member_name, opt(type_annotation), multispace0)
        .map(|(name, ty, _)| (name, ty))
        .parse_next(input)
}

fn method<'i>(input: &mut &'i str) -> ModalResult<(&'i str, Vec<&'i str>, Option<&'i str>)> {
    (member_name, parameters, opt(type_annotation), multispace0)
        .map(|(name, parameters, ty, _)| (name, parameters, ty))
        .parse_next(input)
}

/// Parses an attribute label such as `+ size: int`.
///
/// # Examples
///
/// ```
/// use compass_parser::member::parse_attribute;
///
/// let attribute = parse_attribute("- toppings: List<Topping>")?;
/// assert_eq!(attribute.name(), "toppings");
/// assert_eq!(attribute.attribute_type(), "List<Topping>");
/// # Ok::<(), compass_parser::member::MemberLabelError>(())
/// ```
pub fn parse_attribute(label: &str) -> Result<Attribute, MemberLabelError> {
    attribute
        .parse(label)
        .map(|(name, ty)| Attribute::new(name, ty.unwrap_or_default()))
        .map_err(|err| MemberLabelError {
            kind: "attribute",
            label: label.to_string(),
            offset: err.offset(),
        })
}

/// Parses a method label such as `bake(temperature: int): void`.
pub fn parse_method(label: &str) -> Result<Method, MemberLabelError> {
    method
        .parse(label)
        .map(|(name, parameters, ty)| {
            Method::new(
                name,
                ty.unwrap_or_default(),
                parameters.into_iter().map(String::from).collect(),
            )
        })
        .map_err(|err| MemberLabelError {
            kind: "method",
            label: label.to_string(),
            offset: err.offset(),
        })
}
