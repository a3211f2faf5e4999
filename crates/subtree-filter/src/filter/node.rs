//! Filter node model

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::filter::builder::{ContainmentNodeBuilder, SelectionNodeBuilder};
use crate::filter::selector::NamespaceSelector;
use crate::xml::{check_declaration, is_prefix_name, split_prefixed};

/// Requirement that the matched element carries an attribute with this value
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttributeMatch {
    selector: NamespaceSelector,
    value: String,
}

impl AttributeMatch {
    pub fn new(selector: NamespaceSelector, value: impl Into<String>) -> Self {
        Self {
            selector,
            value: value.into(),
        }
    }

    pub fn selector(&self) -> &NamespaceSelector {
        &self.selector
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Leaf selecting the whole matched subtree
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionNode {
    selector: NamespaceSelector,
    attributes: Vec<AttributeMatch>,
}

impl SelectionNode {
    pub fn builder(selector: NamespaceSelector) -> SelectionNodeBuilder {
        SelectionNodeBuilder::new(selector)
    }

    pub(crate) fn from_parts(selector: NamespaceSelector, attributes: Vec<AttributeMatch>) -> Self {
        Self {
            selector,
            attributes,
        }
    }

    pub fn selector(&self) -> &NamespaceSelector {
        &self.selector
    }

    pub fn attributes(&self) -> &[AttributeMatch] {
        &self.attributes
    }
}

/// Branch whose children decide what is returned under the matched element
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainmentNode {
    selector: NamespaceSelector,
    attributes: Vec<AttributeMatch>,
    children: Vec<FilterNode>,
}

impl ContainmentNode {
    pub fn builder(selector: NamespaceSelector) -> ContainmentNodeBuilder {
        ContainmentNodeBuilder::new(selector)
    }

    pub(crate) fn from_parts(
        selector: NamespaceSelector,
        attributes: Vec<AttributeMatch>,
        children: Vec<FilterNode>,
    ) -> Self {
        Self {
            selector,
            attributes,
            children,
        }
    }

    pub fn selector(&self) -> &NamespaceSelector {
        &self.selector
    }

    pub fn attributes(&self) -> &[AttributeMatch] {
        &self.attributes
    }

    pub fn children(&self) -> &[FilterNode] {
        &self.children
    }
}

/// Leaf that also requires the element's text to equal `value`
///
/// Values are stored trimmed, the way element text is compared. A value of
/// the form `prefix:local` may carry the namespace its prefix stands for, in
/// which case source text with any prefix bound to that namespace and the
/// same local part also matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentMatchNode {
    selector: NamespaceSelector,
    value: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    namespace: Option<String>,
}

impl ContentMatchNode {
    /// Match on plain text
    ///
    /// # Panics
    ///
    /// Panics if `value` is blank. Use [`ContentMatchNode::try_new`] for
    /// values that come from untrusted input.
    pub fn new(selector: NamespaceSelector, value: impl Into<String>) -> Self {
        let value = trimmed(value.into());
        assert!(!value.is_empty(), "content match needs a non-blank value");
        Self {
            selector,
            value,
            namespace: None,
        }
    }

    pub fn try_new(selector: NamespaceSelector, value: impl Into<String>) -> Result<Self> {
        let value = trimmed(value.into());
        if value.is_empty() {
            return Err(Error::structural(ErrorKind::EmptyContent));
        }
        Ok(Self {
            selector,
            value,
            namespace: None,
        })
    }

    /// Match on a QName value whose prefix stands for `namespace`
    ///
    /// `value` must be `prefix:local` with a usable prefix. `xmlns` is never
    /// usable, and `xml` only with its own namespace.
    pub fn qualified(
        selector: NamespaceSelector,
        value: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<Self> {
        let value = trimmed(value.into());
        let namespace = namespace.into();
        let usable = split_prefixed(&value).is_some_and(|(prefix, _)| {
            is_prefix_name(prefix) && check_declaration(prefix, &namespace).is_ok()
        });
        if !usable {
            return Err(Error::structural(ErrorKind::InvalidQualifiedContent { value }));
        }
        Ok(Self {
            selector,
            value,
            namespace: Some(namespace),
        })
    }

    pub fn selector(&self) -> &NamespaceSelector {
        &self.selector
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Namespace of the value's prefix, for qualified values
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Prefix and local part of a qualified value
    pub fn qname(&self) -> Option<(&str, &str)> {
        self.namespace.as_ref().and(split_prefixed(&self.value))
    }
}

fn trimmed(value: String) -> String {
    if value.trim().len() == value.len() {
        value
    } else {
        value.trim().to_string()
    }
}

/// One node of a subtree filter
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FilterNode {
    Selection(SelectionNode),
    Containment(ContainmentNode),
    ContentMatch(ContentMatchNode),
}

impl FilterNode {
    pub fn selector(&self) -> &NamespaceSelector {
        match self {
            Self::Selection(node) => node.selector(),
            Self::Containment(node) => node.selector(),
            Self::ContentMatch(node) => node.selector(),
        }
    }

    /// Attribute constraints; content match nodes never carry any
    pub fn attributes(&self) -> &[AttributeMatch] {
        match self {
            Self::Selection(node) => node.attributes(),
            Self::Containment(node) => node.attributes(),
            Self::ContentMatch(_) => &[],
        }
    }

    pub fn children(&self) -> &[Self] {
        match self {
            Self::Containment(node) => node.children(),
            Self::Selection(_) | Self::ContentMatch(_) => &[],
        }
    }

    /// Expected text of a content match node
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::ContentMatch(node) => Some(node.value()),
            Self::Selection(_) | Self::Containment(_) => None,
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.selector(), f)
    }
}

impl From<SelectionNode> for FilterNode {
    fn from(node: SelectionNode) -> Self {
        Self::Selection(node)
    }
}

impl From<ContainmentNode> for FilterNode {
    fn from(node: ContainmentNode) -> Self {
        Self::Containment(node)
    }
}

impl From<ContentMatchNode> for FilterNode {
    fn from(node: ContentMatchNode) -> Self {
        Self::ContentMatch(node)
    }
}
