//! Subtree matching and copying
//!
//! Both filter representations, the typed [`FilterNode`] tree and a raw
//! `<filter>` element, are driven through [`FilterSpec`] so that the copy
//! algorithm exists once.

use std::fmt;

use tracing::{debug, trace};

use crate::filter::FilterNode;
use crate::xml::{split_prefixed, Element, Scope};

/// Outcome of matching one filter node against one source element
///
/// Only the node itself is inspected: name, namespace, content and
/// attributes, never descendants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchResult {
    NoMatch,
    TagMatch,
    ContentMatch,
    ContentMismatch,
}

impl MatchResult {
    /// Whether the source element is a candidate for copying
    pub const fn is_match(self) -> bool {
        matches!(self, Self::TagMatch | Self::ContentMatch)
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoMatch => "no match",
            Self::TagMatch => "tag match",
            Self::ContentMatch => "content match",
            Self::ContentMismatch => "content mismatch",
        };
        f.write_str(name)
    }
}

/// A filter node the copy algorithm can walk
pub trait FilterSpec: Sized + fmt::Display {
    /// Nested filter nodes, in document order
    fn children(&self) -> Vec<Self>;

    /// Shallow match against `source`; `scope` is the namespace scope at
    /// `source`, its own declarations included
    fn classify(&self, source: &Element, scope: &Scope<'_>) -> MatchResult;
}

impl<'f> FilterSpec for &'f FilterNode {
    fn children(&self) -> Vec<Self> {
        FilterNode::children(*self).iter().collect()
    }

    fn classify(&self, source: &Element, scope: &Scope<'_>) -> MatchResult {
        let selector = self.selector();
        if !selector.matches(&source.name, source.namespace.as_deref()) {
            return MatchResult::NoMatch;
        }
        if let FilterNode::ContentMatch(node) = *self {
            let matched = source.text().is_some_and(|actual| {
                actual == node.value()
                    || node.qname().is_some_and(|(_, local)| {
                        same_qname(local, node.namespace(), &actual, scope)
                    })
            });
            return content_outcome(matched);
        }
        let satisfied = self.attributes().iter().all(|attribute| {
            has_attribute(
                source,
                attribute.selector().name(),
                attribute.selector().namespace(),
                attribute.value(),
            )
        });
        tag_outcome(satisfied)
    }
}

/// Filter node read straight from a `<filter>` element
///
/// Elements and attributes without a namespace match any namespace, the same
/// rule the filter reader applies when building [`FilterNode`]s.
#[derive(Clone, Debug)]
pub struct ElementFilter<'a> {
    element: &'a Element,
    scope: Scope<'a>,
}

impl<'a> ElementFilter<'a> {
    /// `parent_scope` is the scope at the parent of `element`
    pub fn new(element: &'a Element, parent_scope: &Scope<'a>) -> Self {
        Self {
            element,
            scope: parent_scope.enter(element),
        }
    }

    /// Top-level nodes of a `<filter>` element
    pub fn children_of(filter: &'a Element, scope: &Scope<'a>) -> Vec<Self> {
        filter
            .child_elements()
            .map(|child| Self::new(child, scope))
            .collect()
    }

    pub const fn element(&self) -> &'a Element {
        self.element
    }

    fn content_matches(&self, expected: &str, source: &Element, scope: &Scope<'_>) -> bool {
        let Some(actual) = source.text() else {
            return false;
        };
        if actual == expected {
            return true;
        }
        split_prefixed(expected).is_some_and(|(prefix, local)| {
            same_qname(local, self.scope.resolve(prefix), &actual, scope)
        })
    }
}

impl fmt::Display for ElementFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element.namespace.as_deref() {
            Some(namespace) => write!(f, "{{{namespace}}}{}", self.element.name),
            None => write!(f, "{{*}}{}", self.element.name),
        }
    }
}

impl FilterSpec for ElementFilter<'_> {
    fn children(&self) -> Vec<Self> {
        Self::children_of(self.element, &self.scope)
    }

    fn classify(&self, source: &Element, scope: &Scope<'_>) -> MatchResult {
        let filter = self.element;
        let namespace_ok = match filter.namespace.as_deref() {
            Some(namespace) => source.namespace.as_deref() == Some(namespace),
            None => true,
        };
        if filter.name != source.name || !namespace_ok {
            return MatchResult::NoMatch;
        }
        if let Some(expected) = filter.text() {
            return content_outcome(self.content_matches(&expected, source, scope));
        }
        let satisfied = filter.attributes.iter().all(|attribute| {
            has_attribute(
                source,
                &attribute.name,
                attribute.namespace.as_deref(),
                &attribute.value,
            )
        });
        tag_outcome(satisfied)
    }
}

const fn content_outcome(equal: bool) -> MatchResult {
    if equal {
        MatchResult::ContentMatch
    } else {
        MatchResult::ContentMismatch
    }
}

const fn tag_outcome(attributes_satisfied: bool) -> MatchResult {
    if attributes_satisfied {
        MatchResult::TagMatch
    } else {
        MatchResult::NoMatch
    }
}

/// `namespace == None` accepts the attribute in any namespace
fn has_attribute(source: &Element, name: &str, namespace: Option<&str>, value: &str) -> bool {
    source.attributes.iter().any(|attribute| {
        attribute.name == name
            && namespace.map_or(true, |ns| attribute.namespace.as_deref() == Some(ns))
            && attribute.value == value
    })
}

/// QName-valued content may use different prefixes on either side
fn same_qname(local: &str, namespace: Option<&str>, actual: &str, scope: &Scope<'_>) -> bool {
    namespace.is_some()
        && split_prefixed(actual).is_some_and(|(source_prefix, source_local)| {
            source_local == local && scope.resolve(source_prefix) == namespace
        })
}

/// Match `filter` against `source` and copy what it selects into `dst`
///
/// Returns the shallow outcome, except that a content mismatch in any
/// nested filter node vetoes the whole element and yields
/// [`MatchResult::NoMatch`]. When every nested filter node produced a
/// content match, `source` is copied whole, so selecting a list entry by
/// its key returns the complete entry.
pub fn add_subtree<'s, F: FilterSpec>(
    filter: &F,
    source: &'s Element,
    scope: &Scope<'s>,
    dst: &mut Element,
) -> MatchResult {
    let outcome = filter.classify(source, scope);
    debug!(
        "Matching {} to {} resulted in {}",
        source.qualified_name(),
        filter,
        outcome
    );
    if !outcome.is_match() {
        return outcome;
    }

    let children = filter.children();
    if children.is_empty() {
        trace!("Copying {} at full depth", source.qualified_name());
        dst.push_child(source.clone());
        return outcome;
    }

    let mut copy = source.shallow_copy();
    let mut content_matched = vec![false; children.len()];
    for source_child in source.child_elements() {
        let child_scope = scope.enter(source_child);
        for (child, matched) in children.iter().zip(content_matched.iter_mut()) {
            match add_subtree(child, source_child, &child_scope, &mut copy) {
                MatchResult::ContentMismatch => {
                    trace!("Dropping {} on content mismatch", source.qualified_name());
                    return MatchResult::NoMatch;
                }
                MatchResult::ContentMatch => *matched = true,
                MatchResult::NoMatch | MatchResult::TagMatch => {}
            }
        }
    }

    if content_matched.iter().all(|&matched| matched) {
        trace!("All content matched, copying {} whole", source.qualified_name());
        dst.push_child(source.clone());
    } else if copy.has_child_elements() {
        dst.push_child(copy);
    }
    outcome
}

/// Run every filter against every child element of `source`, copying the
/// selected parts into `dst`
///
/// `scope` is the namespace scope at `source`.
pub fn copy_matching_children<'s, F: FilterSpec>(
    filters: &[F],
    source: &'s Element,
    scope: &Scope<'s>,
    dst: &mut Element,
) {
    for child in source.child_elements() {
        let child_scope = scope.enter(child);
        for filter in filters {
            add_subtree(filter, child, &child_scope, dst);
        }
    }
}
