//! Filter serialization to XML

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::filter::node::{AttributeMatch, FilterNode};
use crate::filter::prefix::Prefixes;
use crate::filter::selector::NamespaceSelector;
use crate::filter::SubtreeFilter;
use crate::netconf::{FILTER, SUBTREE, TYPE};
use crate::xml::{split_prefixed, Attribute, Element};

/// Append the filter's top-level nodes to `parent`
///
/// Namespaces get generated prefixes (`a`, `b`, ...), one per namespace for
/// the whole filter, declared on the outermost element of each branch that
/// uses them.
pub fn write_to(filter: &SubtreeFilter, parent: &mut Element) {
    let mut writer = NodeWriter::default();
    for root in filter.roots() {
        writer.reserve_content_prefixes(root);
    }
    for root in filter.roots() {
        let element = writer.write_node(root);
        parent.push_child(element);
    }
}

/// `<filter type="subtree">` envelope holding the filter
pub fn to_element(filter: &SubtreeFilter) -> Element {
    let mut envelope = Element::new(FILTER).with_attribute(Attribute::new(TYPE, SUBTREE));
    write_to(filter, &mut envelope);
    envelope
}

/// Indented XML of the top-level nodes, without the envelope
pub fn pretty_tree(filter: &SubtreeFilter) -> String {
    let mut holder = Element::default();
    write_to(filter, &mut holder);
    holder
        .child_elements()
        .map(Element::to_pretty_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Default)]
struct NodeWriter {
    /// Namespace to prefix, stable for the whole filter
    assigned: IndexMap<String, String>,
    prefixes: Prefixes,
    /// Prefixes appearing in content values, never allocated
    taken: HashSet<String>,
    /// Namespaces declared on the open ancestors
    in_scope: Vec<String>,
}

impl NodeWriter {
    fn write_node(&mut self, node: &FilterNode) -> Element {
        let mark = self.in_scope.len();
        let mut element = self.open(node.selector());
        for attribute in node.attributes() {
            let attribute = self.attribute(&mut element, attribute);
            element.set_attribute(attribute);
        }
        match node {
            FilterNode::Selection(_) => {}
            FilterNode::Containment(containment) => {
                for child in containment.children() {
                    let child = self.write_node(child);
                    element.push_child(child);
                }
            }
            FilterNode::ContentMatch(content) => {
                element.set_text(content.value());
                if let (Some((prefix, _)), Some(namespace)) = (content.qname(), content.namespace()) {
                    if prefix != "xml" {
                        element.declare_namespace(prefix, namespace);
                    }
                }
            }
        }
        self.in_scope.truncate(mark);
        element
    }

    fn reserve_content_prefixes(&mut self, node: &FilterNode) {
        if let Some((prefix, _)) = node.content().and_then(split_prefixed) {
            self.taken.insert(prefix.to_string());
        }
        for child in node.children() {
            self.reserve_content_prefixes(child);
        }
    }

    fn open(&mut self, selector: &NamespaceSelector) -> Element {
        match selector {
            NamespaceSelector::Exact { namespace, name } if !namespace.is_empty() => {
                let mut element = Element::default();
                let prefix = self.bind(&mut element, namespace);
                element.prefix = Some(prefix);
                element.name.clone_from(name);
                element.namespace = Some(namespace.clone());
                element
            }
            NamespaceSelector::Exact { name, .. } | NamespaceSelector::Wildcard { name } => {
                Element::new(name.as_str())
            }
        }
    }

    fn attribute(&mut self, element: &mut Element, attribute: &AttributeMatch) -> Attribute {
        match attribute.selector() {
            NamespaceSelector::Exact { namespace, name } if !namespace.is_empty() => {
                let prefix = self.bind(element, namespace);
                Attribute::qualified(prefix, name.as_str(), namespace.as_str(), attribute.value())
            }
            NamespaceSelector::Exact { name, .. } | NamespaceSelector::Wildcard { name } => {
                Attribute::new(name.as_str(), attribute.value())
            }
        }
    }

    /// Prefix for `namespace`, declared on `element` unless already in scope
    fn bind(&mut self, element: &mut Element, namespace: &str) -> String {
        let prefix = match self.assigned.get(namespace) {
            Some(prefix) => prefix.clone(),
            None => {
                let mut prefix = self.prefixes.allocate();
                while self.taken.contains(&prefix) {
                    prefix = self.prefixes.allocate();
                }
                self.assigned.insert(namespace.to_string(), prefix.clone());
                prefix
            }
        };
        if !self.in_scope.iter().any(|declared| declared == namespace) {
            element.declare_namespace(prefix.as_str(), namespace);
            self.in_scope.push(namespace.to_string());
        }
        prefix
    }
}
