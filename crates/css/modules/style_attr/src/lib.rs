//! CSS Style Attributes: the declaration block behind `style="..."`.
//! Reference: <https://www.w3.org/TR/css-style-attr/>
//!
//! [`InlineStyle`] is the per-element block that scripts read and write
//! property by property, and that round-trips through the `style` attribute.

#![forbid(unsafe_code)]

use core::fmt;

/// A single CSS declaration parsed from a style attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name normalized to ASCII lowercase.
    pub property: String,
    /// Value trimmed of surrounding ASCII whitespace. May contain spaces.
    pub value: String,
}

/// Parse the value of a `style` attribute into a list of declarations.
///
/// - Splits on semicolons that are not nested inside parentheses or quotes.
/// - Splits each item on its first colon into property and value.
/// - Skips items with no colon, an empty property or an empty value.
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    for raw_item in split_declarations(input) {
        let Some((raw_prop, raw_value)) = raw_item.split_once(':') else {
            continue;
        };
        let property_text = raw_prop.trim_matches(is_ascii_whitespace);
        let value_text = raw_value.trim_matches(is_ascii_whitespace);
        if property_text.is_empty() || value_text.is_empty() {
            continue;
        }
        out.push(Declaration {
            property: property_text.to_ascii_lowercase(),
            value: value_text.to_owned(),
        });
    }
    out
}

/// Split a declaration block on top-level semicolons.
fn split_declarations(input: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start = 0_usize;
    for (index, character) in input.char_indices() {
        match (quote, character) {
            (Some(open), _) if character == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(character),
            (None, '(') => depth = depth.saturating_add(1),
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                items.push(input.get(start..index).unwrap_or_default());
                start = index.saturating_add(1);
            }
            _ => {}
        }
    }
    items.push(input.get(start..).unwrap_or_default());
    items
        .into_iter()
        .map(|item| item.trim_matches(is_ascii_whitespace))
        .filter(|item| !item.is_empty())
        .collect()
}

/// An element's inline declaration block.
///
/// Setting a property that already exists replaces its value in place, a new
/// property is appended, and setting an empty value removes the property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    /// Build a block from `style` attribute text. Duplicate properties keep
    /// the last value.
    pub fn parse(input: &str) -> Self {
        let mut style = Self::default();
        for decl in parse_style_attribute(input) {
            style.set(&decl.property, &decl.value);
        }
        style
    }

    /// Current value of `property`, if set.
    pub fn get(&self, property: &str) -> Option<&str> {
        let needle = property.to_ascii_lowercase();
        self.declarations
            .iter()
            .find(|decl| decl.property == needle)
            .map(|decl| decl.value.as_str())
    }

    /// Set `property` to `value`, returning whether the block changed.
    pub fn set(&mut self, property: &str, value: &str) -> bool {
        let value_text = value.trim_matches(is_ascii_whitespace);
        if value_text.is_empty() {
            return self.remove(property).is_some();
        }
        let needle = property.to_ascii_lowercase();
        if let Some(existing) = self
            .declarations
            .iter_mut()
            .find(|decl| decl.property == needle)
        {
            if existing.value == value_text {
                return false;
            }
            value_text.clone_into(&mut existing.value);
            return true;
        }
        self.declarations.push(Declaration {
            property: needle,
            value: value_text.to_owned(),
        });
        true
    }

    /// Remove `property`, returning its previous value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let needle = property.to_ascii_lowercase();
        let position = self
            .declarations
            .iter()
            .position(|decl| decl.property == needle)?;
        Some(self.declarations.remove(position).value)
    }

    /// Replace the whole block, as assigning `cssText` does.
    pub fn replace(&mut self, css_text: &str) {
        *self = Self::parse(css_text);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Serialize back to attribute text (`a: b; c: d;`).
    pub fn to_css_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, decl) in self.declarations.iter().enumerate() {
            if index > 0 {
                formatter.write_str(" ")?;
            }
            write!(formatter, "{}: {};", decl.property, decl.value)?;
        }
        Ok(())
    }
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}
