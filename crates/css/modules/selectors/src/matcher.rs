//! Selector matching.
//! Reference: <https://www.w3.org/TR/selectors-3/#combinators>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, ElementAdapter, SelectorList,
    SimpleSelector,
};

/// Match a selector group against an element.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element, right to left.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    match_from(adapter, element, sel, sel.len().saturating_sub(1))
}

/// Match compound `index` at `element`, then relate the compounds to its left.
///
/// Descendant combinators backtrack: every ancestor matching the left compound
/// is tried before giving up.
fn match_from<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(compound) = sel.compound(index) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    let Some(combinator) = sel.combinator_before(index) else {
        return true;
    };
    let left = index.saturating_sub(1);
    match combinator {
        Combinator::Child => adapter
            .parent(element)
            .is_some_and(|parent| match_from(adapter, parent, sel, left)),
        Combinator::Descendant => {
            let mut current_parent = adapter.parent(element);
            while let Some(ancestor) = current_parent {
                if match_from(adapter, ancestor, sel, left) {
                    return true;
                }
                current_parent = adapter.parent(ancestor);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(adapter, element, simple))
}

fn matches_simple<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    simple: &SimpleSelector,
) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(type_name) => adapter.tag_name(element) == type_name.as_str(),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => adapter
            .element_id(element)
            .is_some_and(|value| value == id_value.as_str()),
        SimpleSelector::Attr {
            name,
            operator,
            value,
        } => adapter
            .attr(element, name)
            .is_some_and(|attr_value| match operator {
                AttrOperator::Exists => true,
                AttrOperator::Equals => attr_value == value.as_str(),
                AttrOperator::Prefix => !value.is_empty() && attr_value.starts_with(value.as_str()),
            }),
    }
}
