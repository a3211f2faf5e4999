//! Namespace-aware XML data model

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result};

/// Namespace bound to the reserved `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// Namespace of `xmlns` declarations themselves, never bindable
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub const fn new(root: Element) -> Self {
        Self { root }
    }
}

/// XML element
///
/// `name` is the local name and `namespace` the resolved namespace URI.
/// Namespace declarations made on this element live in `namespaces`
/// (prefix to URI, the empty prefix standing for the default namespace) and
/// never appear in `attributes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub prefix: Option<String>,
    pub name: String,
    pub namespace: Option<String>,
    pub namespaces: IndexMap<String, String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Content>,
}

/// XML attribute
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

impl Attribute {
    /// Unqualified attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: None,
            name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }

    /// Attribute bound to `namespace` through `prefix`
    pub fn qualified(
        prefix: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            name: name.into(),
            namespace: Some(namespace.into()),
            value: value.into(),
        }
    }

    /// Name as written in markup, `prefix:name` or bare `name`
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.name)
    }
}

impl Element {
    /// Element in no namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Element bound to `namespace`, written with `prefix` (`None` for the
    /// default namespace). No declaration is added; the writer emits one
    /// where the binding is not already in scope.
    pub fn qualified(
        prefix: Option<&str>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Name as written in markup, `prefix:name` or bare `name`
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.name)
    }

    /// Check local name and namespace
    pub fn is(&self, name: &str, namespace: Option<&str>) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    /// Declare a namespace on this element
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Builder-style [`Element::declare_namespace`]
    pub fn with_namespace_declaration(
        mut self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        self.declare_namespace(prefix, uri);
        self
    }

    /// Value of the attribute with this local name and namespace
    pub fn attribute(&self, name: &str, namespace: Option<&str>) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name && attr.namespace.as_deref() == namespace)
            .map(|attr| attr.value.as_str())
    }

    /// Add an attribute, replacing one with the same expanded name
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self
            .attributes
            .iter_mut()
            .find(|attr| attr.name == attribute.name && attr.namespace == attribute.namespace)
        {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Builder-style [`Element::set_attribute`]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.set_attribute(attribute);
        self
    }

    pub fn push_child(&mut self, child: Self) {
        self.children.push(Content::Element(child));
    }

    /// Builder-style [`Element::push_child`]
    pub fn with_child(mut self, child: Self) -> Self {
        self.push_child(child);
        self
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(Content::Text(text.into()));
    }

    /// Builder-style [`Element::set_text`]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Trimmed text of an element without child elements
    ///
    /// Returns `None` when the element has child elements or its text is
    /// empty after trimming.
    pub fn text(&self) -> Option<String> {
        if self.has_child_elements() {
            return None;
        }
        let mut text = String::new();
        for child in &self.children {
            if let Content::Text(part) = child {
                text.push_str(part);
            }
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Non-whitespace text nodes mixed in with child elements
    pub fn has_mixed_text(&self) -> bool {
        self.has_child_elements()
            && self
                .children
                .iter()
                .any(|child| matches!(child, Content::Text(text) if !text.trim().is_empty()))
    }

    /// The single child element
    pub fn only_child_element(&self) -> Result<&Self> {
        let mut children = self.child_elements();
        match (children.next(), children.next()) {
            (Some(only), None) => Ok(only),
            _ => Err(self.count_error(None, self.child_elements().count())),
        }
    }

    /// The single child element with this local name and namespace
    pub fn only_child_element_named(&self, name: &str, namespace: Option<&str>) -> Result<&Self> {
        let mut matching = self.child_elements().filter(|child| child.is(name, namespace));
        match (matching.next(), matching.next()) {
            (Some(only), None) => Ok(only),
            _ => {
                let count = self
                    .child_elements()
                    .filter(|child| child.is(name, namespace))
                    .count();
                Err(self.count_error(Some(name), count))
            }
        }
    }

    /// Like [`Element::only_child_element_named`], `None` unless exactly one
    /// child matches
    pub fn find_only_child(&self, name: &str, namespace: Option<&str>) -> Option<&Self> {
        self.only_child_element_named(name, namespace).ok()
    }

    /// Consume the element, returning its single child element
    pub fn into_only_child_element(self) -> Result<Self> {
        let parent = self.qualified_name();
        let mut elements = self.children.into_iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        });
        match (elements.next(), elements.next()) {
            (Some(only), None) => Ok(only),
            (first, second) => {
                let count =
                    usize::from(first.is_some()) + usize::from(second.is_some()) + elements.count();
                Err(count_error(parent, None, count))
            }
        }
    }

    /// Remove and return the first child element with this name and namespace
    pub fn remove_child_element(&mut self, name: &str, namespace: Option<&str>) -> Option<Self> {
        let index = self.children.iter().position(
            |child| matches!(child, Content::Element(element) if element.is(name, namespace)),
        )?;
        match self.children.remove(index) {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        }
    }

    /// Copy of tag, namespace declarations and attributes, without children
    pub fn shallow_copy(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            namespaces: self.namespaces.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }

    fn count_error(&self, name: Option<&str>, count: usize) -> Error {
        count_error(self.qualified_name(), name, count)
    }
}

fn count_error(parent: String, name: Option<&str>, count: usize) -> Error {
    Error::structural(ErrorKind::UnexpectedElementCount {
        parent,
        name: name.map(str::to_string),
        count,
    })
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{name}"),
        _ => name.to_string(),
    }
}

/// Check a namespace declaration against the reserved prefixes and names
///
/// `prefix` is empty for a default namespace declaration.
pub fn check_declaration(prefix: &str, uri: &str) -> Result<()> {
    let allowed = match prefix {
        "xmlns" => false,
        "xml" => uri == XML_NAMESPACE,
        "" => uri != XML_NAMESPACE && uri != XMLNS_NAMESPACE,
        _ => !uri.is_empty() && uri != XML_NAMESPACE && uri != XMLNS_NAMESPACE,
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::structural(ErrorKind::InvalidNamespaceDeclaration {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        }))
    }
}

/// Whether `name` can serve as a namespace prefix
pub fn is_prefix_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b >= 0x80)
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.') || b >= 0x80)
}

/// Split a `prefix:local` text value, as used by QName-valued leaves
pub fn split_prefixed(text: &str) -> Option<(&str, &str)> {
    let (prefix, local) = text.split_once(':')?;
    if prefix.is_empty() || local.is_empty() || local.contains(':') {
        return None;
    }
    Some((prefix, local))
}

/// Resolve `prefix` against declaration frames, innermost last
///
/// The empty prefix names the default namespace; an empty URI undeclares it.
pub fn resolve_prefix<'m, I>(frames: I, prefix: &str) -> Option<&'m str>
where
    I: DoubleEndedIterator<Item = &'m IndexMap<String, String>>,
{
    if prefix == "xml" {
        return Some(XML_NAMESPACE);
    }
    frames
        .rev()
        .find_map(|frame| frame.get(prefix))
        .map(String::as_str)
        .filter(|uri| !uri.is_empty())
}

/// Namespace declarations in scope at some element of a tree
///
/// Built while walking down from the root with [`Scope::enter`].
#[derive(Clone, Debug, Default)]
pub struct Scope<'a> {
    frames: Vec<&'a IndexMap<String, String>>,
}

impl<'a> Scope<'a> {
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Scope inside `element`, including its own declarations
    pub fn enter(&self, element: &'a Element) -> Self {
        let mut frames = self.frames.clone();
        frames.push(&element.namespaces);
        Self { frames }
    }

    /// Scope at the innermost of `path`, outermost element first
    pub fn along<I>(path: I) -> Self
    where
        I: IntoIterator<Item = &'a Element>,
    {
        Self {
            frames: path.into_iter().map(|element| &element.namespaces).collect(),
        }
    }

    /// Namespace bound to `prefix`, the empty prefix meaning the default
    pub fn resolve(&self, prefix: &str) -> Option<&'a str> {
        resolve_prefix(self.frames.iter().copied(), prefix)
    }
}
