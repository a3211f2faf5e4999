//! Fluent construction of filter trees

use crate::error::{Error, ErrorKind, Result};
use crate::filter::node::{
    AttributeMatch, ContainmentNode, ContentMatchNode, FilterNode, SelectionNode,
};
use crate::filter::selector::NamespaceSelector;
use crate::filter::SubtreeFilter;

/// Builder for [`SelectionNode`]
#[derive(Clone, Debug)]
#[must_use]
pub struct SelectionNodeBuilder {
    selector: NamespaceSelector,
    attributes: Vec<AttributeMatch>,
}

impl SelectionNodeBuilder {
    pub fn new(selector: NamespaceSelector) -> Self {
        Self {
            selector,
            attributes: Vec::new(),
        }
    }

    pub fn add(mut self, attribute: AttributeMatch) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> SelectionNode {
        SelectionNode::from_parts(self.selector, self.attributes)
    }
}

/// Anything a [`ContainmentNodeBuilder`] accepts through `add`
#[derive(Clone, Debug)]
pub enum ContainmentItem {
    Child(FilterNode),
    Attribute(AttributeMatch),
}

impl From<FilterNode> for ContainmentItem {
    fn from(node: FilterNode) -> Self {
        Self::Child(node)
    }
}

impl From<SelectionNode> for ContainmentItem {
    fn from(node: SelectionNode) -> Self {
        Self::Child(node.into())
    }
}

impl From<ContainmentNode> for ContainmentItem {
    fn from(node: ContainmentNode) -> Self {
        Self::Child(node.into())
    }
}

impl From<ContentMatchNode> for ContainmentItem {
    fn from(node: ContentMatchNode) -> Self {
        Self::Child(node.into())
    }
}

impl From<AttributeMatch> for ContainmentItem {
    fn from(attribute: AttributeMatch) -> Self {
        Self::Attribute(attribute)
    }
}

/// Builder for [`ContainmentNode`]
#[derive(Clone, Debug)]
#[must_use]
pub struct ContainmentNodeBuilder {
    selector: NamespaceSelector,
    attributes: Vec<AttributeMatch>,
    children: Vec<FilterNode>,
}

impl ContainmentNodeBuilder {
    pub fn new(selector: NamespaceSelector) -> Self {
        Self {
            selector,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a child node or an attribute match
    pub fn add(mut self, item: impl Into<ContainmentItem>) -> Self {
        match item.into() {
            ContainmentItem::Child(node) => self.children.push(node),
            ContainmentItem::Attribute(attribute) => self.attributes.push(attribute),
        }
        self
    }

    /// Finish the node
    ///
    /// Without children the node only asks for the element's presence, which
    /// is a selection node.
    pub fn build(self) -> FilterNode {
        if self.children.is_empty() {
            SelectionNode::from_parts(self.selector, self.attributes).into()
        } else {
            ContainmentNode::from_parts(self.selector, self.attributes, self.children).into()
        }
    }
}

/// Builder for [`SubtreeFilter`]
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SubtreeFilterBuilder {
    roots: Vec<FilterNode>,
}

impl SubtreeFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node
    pub fn add(mut self, node: impl Into<FilterNode>) -> Self {
        self.roots.push(node.into());
        self
    }

    /// Finish the filter; at least one top-level node is required
    pub fn build(self) -> Result<SubtreeFilter> {
        if self.roots.is_empty() {
            return Err(Error::structural(ErrorKind::EmptyFilter));
        }
        Ok(SubtreeFilter::from_roots(self.roots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://example.com/schema/1.2/config";

    fn exact(name: &str) -> NamespaceSelector {
        NamespaceSelector::exact(NS, name)
    }

    #[test]
    fn test_containment_without_children_is_selection() {
        let node = ContainmentNode::builder(exact("users"))
            .add(AttributeMatch::new(exact("kind"), "local"))
            .build();
        let expected = SelectionNode::builder(exact("users"))
            .add(AttributeMatch::new(exact("kind"), "local"))
            .build();
        assert_eq!(node, FilterNode::from(expected));
    }

    #[test]
    fn test_add_accepts_children_and_attributes() {
        let node = ContainmentNode::builder(exact("interfaces"))
            .add(AttributeMatch::new(exact("scope"), "all"))
            .add(SelectionNode::builder(exact("interface")).build())
            .add(ContentMatchNode::new(exact("name"), "eth0"))
            .build();
        let FilterNode::Containment(containment) = node else {
            return;
        };
        assert_eq!(containment.attributes().len(), 1);
        assert_eq!(containment.children().len(), 2);
    }

    #[test]
    fn test_builders_are_reusable() -> Result<()> {
        let builder = SubtreeFilter::builder().add(SelectionNode::builder(exact("top")).build());
        let first = builder.clone().build()?;
        let second = builder.build()?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_empty_filter_rejected() {
        let err = SubtreeFilter::builder().build().err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::EmptyFilter));
    }

    #[test]
    fn test_multiple_roots_keep_order() -> Result<()> {
        let filter = SubtreeFilter::builder()
            .add(SelectionNode::builder(exact("top")).build())
            .add(SelectionNode::builder(NamespaceSelector::wildcard("state")).build())
            .build()?;
        let names: Vec<&str> = filter.roots().iter().map(|n| n.selector().name()).collect();
        assert_eq!(names, vec!["top", "state"]);
        Ok(())
    }
}
