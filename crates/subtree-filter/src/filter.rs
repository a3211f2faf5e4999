//! RFC 6241 subtree filter model
//!
//! A [`SubtreeFilter`] is a list of top-level [`FilterNode`]s. Filters are
//! built in code through the builders, or read from a `<filter>` element,
//! and can be written back to XML or applied to data directly.

pub mod builder;
pub mod node;
pub mod prefix;
pub mod reader;
pub mod selector;
pub mod writer;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use builder::{
    ContainmentItem, ContainmentNodeBuilder, SelectionNodeBuilder, SubtreeFilterBuilder,
};
pub use node::{AttributeMatch, ContainmentNode, ContentMatchNode, FilterNode, SelectionNode};
pub use prefix::{prefix_of, Prefixes};
pub use selector::NamespaceSelector;

use crate::error::Result;
use crate::matching::copy_matching_children;
use crate::netconf;
use crate::xml::{Document, Element, Scope};

/// Complete subtree filter
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubtreeFilter {
    roots: Vec<FilterNode>,
}

impl SubtreeFilter {
    pub fn builder() -> SubtreeFilterBuilder {
        SubtreeFilterBuilder::new()
    }

    pub(crate) fn from_roots(roots: Vec<FilterNode>) -> Self {
        Self { roots }
    }

    /// Top-level nodes, never empty
    pub fn roots(&self) -> &[FilterNode] {
        &self.roots
    }

    /// Read a filter from the children of a `<filter>` element
    pub fn read_from(filter: &Element) -> Result<Self> {
        reader::read_from(filter)
    }

    /// Read a filter whose envelope sits below elements declaring prefixes
    ///
    /// `parent_scope` is the namespace scope at the parent of `filter`.
    pub fn read_from_in(filter: &Element, parent_scope: &Scope<'_>) -> Result<Self> {
        reader::read_from_in(filter, parent_scope)
    }

    /// Parse `<filter>` XML text
    pub fn from_xml_str(input: &str) -> Result<Self> {
        let document = Document::parse_str(input)?;
        reader::read_from(&document.root)
    }

    /// Append the top-level nodes to `parent`
    pub fn write_to(&self, parent: &mut Element) {
        writer::write_to(self, parent);
    }

    /// `<filter type="subtree">` element carrying this filter
    pub fn to_element(&self) -> Element {
        writer::to_element(self)
    }

    /// Wire form, compact
    pub fn to_xml_string(&self) -> String {
        self.to_element().to_xml_string()
    }

    /// Indented top-level nodes without the envelope
    pub fn pretty_tree(&self) -> String {
        writer::pretty_tree(self)
    }

    fn nodes(&self) -> Vec<&FilterNode> {
        self.roots.iter().collect()
    }

    /// Filter the children of a `<data>`-like element
    ///
    /// Returns a shallow copy of `data` holding the selected subtrees.
    pub fn apply_to_data(&self, data: &Element) -> Element {
        let mut result = data.shallow_copy();
        copy_matching_children(&self.nodes(), data, &Scope::new().enter(data), &mut result);
        result
    }

    /// Filter the `<data>` of an `<rpc-reply>`
    pub fn apply_to_reply(&self, reply: &Document) -> Result<Document> {
        netconf::filter_reply(&self.nodes(), reply)
    }

    /// Filter a `<notification>`, returning `None` when nothing is selected
    pub fn apply_to_notification(&self, notification: Document) -> Result<Option<Document>> {
        netconf::filter_notification(&self.nodes(), notification)
    }
}

impl fmt::Display for SubtreeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_tree())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://example.com/schema/1.2/config";

    fn users_filter() -> Result<SubtreeFilter> {
        SubtreeFilter::builder()
            .add(
                ContainmentNode::builder(NamespaceSelector::exact(NS, "top"))
                    .add(SelectionNode::builder(NamespaceSelector::exact(NS, "users")).build())
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_xml_round_trip() -> Result<()> {
        let filter = users_filter()?;
        let text = filter.to_xml_string();
        assert!(text.starts_with("<filter type=\"subtree\">"));
        assert_eq!(SubtreeFilter::from_xml_str(&text)?, filter);
        Ok(())
    }

    #[test]
    fn test_display_is_pretty_tree() -> Result<()> {
        let filter = users_filter()?;
        assert_eq!(filter.to_string(), filter.pretty_tree());
        assert!(!filter.to_string().contains("filter"));
        Ok(())
    }

    #[test]
    fn test_apply_to_data() -> Result<()> {
        let data = Element::new("data")
            .with_child(
                Element::qualified(None, "top", NS)
                    .with_namespace_declaration("", NS)
                    .with_child(Element::qualified(None, "users", NS))
                    .with_child(Element::qualified(None, "interfaces", NS)),
            )
            .with_child(Element::qualified(None, "other", "urn:other"));
        let filtered = users_filter()?.apply_to_data(&data);
        let expected = Element::new("data").with_child(
            Element::qualified(None, "top", NS)
                .with_namespace_declaration("", NS)
                .with_child(Element::qualified(None, "users", NS)),
        );
        assert_eq!(filtered, expected);
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let filter = users_filter()?;
        let json = serde_json::to_string(&filter)?;
        assert!(json.contains("\"containment\""));
        let back: SubtreeFilter = serde_json::from_str(&json)?;
        assert_eq!(back, filter);
        Ok(())
    }
}
