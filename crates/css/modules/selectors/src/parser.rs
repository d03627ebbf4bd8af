//! Selector parsing.
//! Reference: <https://www.w3.org/TR/selectors-3/#w3cselgrammar>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, SelectorError, SelectorList,
    SimpleSelector,
};
use core::mem::take;

/// Internal tokenizer token kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok {
    /// An explicit combinator (`>`).
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A simple selector.
    Simple(SimpleSelector),
}

/// Tokenizer over a single complex selector.
struct SelectorTokenizer<'input> {
    input_bytes: &'input [u8],
    index: usize,
}

impl<'input> SelectorTokenizer<'input> {
    #[inline]
    const fn new(input: &'input str) -> Self {
        Self {
            input_bytes: input.as_bytes(),
            index: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input_bytes.get(self.index).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Return the next selector token, if any.
    fn next_token(&mut self) -> Result<Option<Tok>, SelectorError> {
        if self.skip_spaces() && self.peek().is_some() {
            return Ok(Some(Tok::DescendantWS));
        }
        let Some(current) = self.peek() else {
            return Ok(None);
        };
        let token = match current {
            b'*' => {
                self.bump();
                Tok::Simple(SimpleSelector::Universal)
            }
            b'.' => {
                self.bump();
                Tok::Simple(SimpleSelector::Class(self.consume_required_ident()?))
            }
            b'#' => {
                self.bump();
                Tok::Simple(SimpleSelector::IdSelector(self.consume_required_ident()?))
            }
            b'[' => Tok::Simple(self.consume_attr()?),
            b'>' => {
                self.bump();
                self.skip_spaces();
                Tok::Combinator(Combinator::Child)
            }
            byte if is_ident_byte(byte) => {
                Tok::Simple(SimpleSelector::Type(self.consume_ident().to_ascii_lowercase()))
            }
            _ => {
                let found = self
                    .remaining_str()
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(SelectorError::Unexpected {
                    position: self.index,
                    found,
                });
            }
        };
        Ok(Some(token))
    }

    fn remaining_str(&self) -> String {
        let slice = self.input_bytes.get(self.index..).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    /// Skip ASCII whitespace, reporting whether any was consumed.
    fn skip_spaces(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
        self.index != start
    }

    /// Consume an identifier made of ASCII alphanumerics, `-`, `_` and non-ASCII bytes.
    fn consume_ident(&mut self) -> String {
        let start = self.index;
        while self.peek().is_some_and(is_ident_byte) {
            self.bump();
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    fn consume_required_ident(&mut self) -> Result<String, SelectorError> {
        let position = self.index;
        let ident = self.consume_ident();
        if ident.is_empty() {
            return Err(SelectorError::MissingIdent { position });
        }
        Ok(ident)
    }

    /// Parse `[name]`, `[name=value]` or `[name^=value]`, value quoted or not.
    fn consume_attr(&mut self) -> Result<SimpleSelector, SelectorError> {
        let open = self.index;
        self.bump();
        self.skip_spaces();
        let name = self.consume_required_ident()?.to_ascii_lowercase();
        self.skip_spaces();
        let operator = match self.peek() {
            Some(b'=') => {
                self.bump();
                AttrOperator::Equals
            }
            Some(b'^') if self.input_bytes.get(self.index.saturating_add(1)) == Some(&b'=') => {
                self.bump();
                self.bump();
                AttrOperator::Prefix
            }
            _ => AttrOperator::Exists,
        };
        let value = if operator == AttrOperator::Exists {
            String::new()
        } else {
            self.skip_spaces();
            match self.peek() {
                Some(quote @ (b'"' | b'\'')) => {
                    self.bump();
                    self.consume_quoted_value(quote, open)?
                }
                _ => self.consume_unquoted_value(),
            }
        };
        self.skip_spaces();
        if self.peek() != Some(b']') {
            return Err(SelectorError::UnterminatedAttribute { position: open });
        }
        self.bump();
        Ok(SimpleSelector::Attr {
            name,
            operator,
            value,
        })
    }

    fn consume_unquoted_value(&mut self) -> String {
        let start = self.index;
        while self
            .peek()
            .is_some_and(|byte| !byte.is_ascii_whitespace() && byte != b']')
        {
            self.bump();
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        String::from_utf8_lossy(slice).into_owned()
    }

    fn consume_quoted_value(&mut self, quote: u8, open: usize) -> Result<String, SelectorError> {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte != quote) {
            self.bump();
        }
        if self.peek().is_none() {
            return Err(SelectorError::UnterminatedAttribute { position: open });
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        let out = String::from_utf8_lossy(slice).into_owned();
        self.bump();
        Ok(out)
    }
}

#[inline]
const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || !byte.is_ascii()
}

/// Accumulates compounds left to right while tokens stream in.
#[derive(Default)]
struct ComplexBuilder {
    first: Option<CompoundSelector>,
    rest: Vec<(Combinator, CompoundSelector)>,
    pending: Option<Combinator>,
}

impl ComplexBuilder {
    fn close(&mut self, current: CompoundSelector) {
        if current.simples.is_empty() {
            return;
        }
        if self.first.is_none() {
            self.first = Some(current);
        } else {
            let combinator = self.pending.take().unwrap_or(Combinator::Descendant);
            self.rest.push((combinator, current));
        }
    }
}

/// Parse a comma separated selector group.
///
/// # Errors
/// Returns the first [`SelectorError`] found in any of the groups.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let selectors = input
        .split(',')
        .map(|part| parse_complex_selector(part.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SelectorList { selectors })
}

/// Parse one complex selector.
///
/// # Errors
/// Returns [`SelectorError`] for empty input, dangling combinators, missing
/// identifiers, unterminated attribute selectors and unsupported syntax.
pub fn parse_complex_selector(input: &str) -> Result<ComplexSelector, SelectorError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut tokens = SelectorTokenizer::new(trimmed);
    let mut builder = ComplexBuilder::default();
    let mut current = CompoundSelector::default();

    while let Some(token) = tokens.next_token()? {
        match token {
            Tok::DescendantWS => {
                let had_compound = !current.simples.is_empty();
                builder.close(take(&mut current));
                if had_compound && builder.pending.is_none() {
                    builder.pending = Some(Combinator::Descendant);
                }
            }
            Tok::Combinator(combinator) => {
                builder.close(take(&mut current));
                if builder.first.is_none() {
                    return Err(SelectorError::DanglingCombinator {
                        position: tokens.index,
                    });
                }
                builder.pending = Some(combinator);
            }
            Tok::Simple(simple) => current.simples.push(simple),
        }
    }

    if current.simples.is_empty() && builder.pending.is_some() {
        return Err(SelectorError::DanglingCombinator {
            position: tokens.index,
        });
    }
    builder.close(current);

    Ok(ComplexSelector {
        first: builder.first.unwrap_or_default(),
        rest: builder.rest,
    })
}
