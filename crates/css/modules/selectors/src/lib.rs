//! Selectors Level 3 subset used for document queries.
//! Reference: <https://www.w3.org/TR/selectors-3/>
//!
//! Supported:
//! - Type, universal, class and id selectors
//! - Attribute presence, `[name=value]` and `[name^=value]`
//! - Descendant and child combinators
//! - Comma separated selector groups
//!
//! Matching runs right-to-left through an [`ElementAdapter`] so any tree
//! representation can be queried.

mod matcher;
mod parser;

use core::fmt;

pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::{parse_complex_selector, parse_selector_list};

/// An adapter that abstracts DOM access for selector matching.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any. The document node itself is not an element.
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name in ASCII lowercase.
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns `Some(id)` if the element has an id attribute.
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element carries the given class token (case-sensitive).
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;
}

/// How an attribute selector compares the attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[name]`
    Exists,
    /// `[name=value]`
    Equals,
    /// `[name^=value]`
    Prefix,
}

/// Simple selectors (subset).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    Type(String),
    Class(String),
    IdSelector(String),
    Attr {
        name: String,
        operator: AttrOperator,
        value: String,
    },
    Universal,
}

/// A sequence of simple selectors with no combinator between them.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// One or more compounds separated by combinators, stored left to right.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// Number of compounds in this selector.
    #[inline]
    pub fn len(&self) -> usize {
        self.rest.len().saturating_add(1)
    }

    /// A complex selector always holds at least one compound.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Compound at `index`, counting from the left-most one.
    #[inline]
    pub(crate) fn compound(&self, index: usize) -> Option<&CompoundSelector> {
        if index == 0 {
            Some(&self.first)
        } else {
            self.rest.get(index.saturating_sub(1)).map(|pair| &pair.1)
        }
    }

    /// Combinator joining compound `index` to the one on its left.
    #[inline]
    pub(crate) fn combinator_before(&self, index: usize) -> Option<Combinator> {
        index
            .checked_sub(1)
            .and_then(|left| self.rest.get(left))
            .map(|pair| pair.0)
    }
}

/// A selector group separated by commas.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Reasons a selector string could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorError {
    /// The input (or one comma separated part of it) was empty.
    Empty,
    /// A `.`, `#` or `[` was not followed by an identifier.
    MissingIdent { position: usize },
    /// A byte that starts no supported selector syntax.
    Unexpected { position: usize, found: char },
    /// A combinator with nothing on one of its sides.
    DanglingCombinator { position: usize },
    /// An attribute selector without its closing bracket.
    UnterminatedAttribute { position: usize },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(formatter, "empty selector"),
            Self::MissingIdent { position } => {
                write!(formatter, "expected identifier at byte {position}")
            }
            Self::Unexpected { position, found } => {
                write!(formatter, "unexpected '{found}' at byte {position}")
            }
            Self::DanglingCombinator { position } => {
                write!(formatter, "combinator without operand at byte {position}")
            }
            Self::UnterminatedAttribute { position } => {
                write!(formatter, "unterminated attribute selector at byte {position}")
            }
        }
    }
}

impl core::error::Error for SelectorError {}
