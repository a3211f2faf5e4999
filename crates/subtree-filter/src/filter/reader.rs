//! Filter construction from parsed XML

use tracing::warn;

use crate::error::{Error, ErrorKind, Result};
use crate::filter::node::{
    AttributeMatch, ContainmentNode, ContentMatchNode, FilterNode, SelectionNode,
};
use crate::filter::selector::NamespaceSelector;
use crate::filter::SubtreeFilter;
use crate::xml::{split_prefixed, Content, Element, Scope};

/// Build a filter from the children of a `<filter>` element
///
/// Elements and attributes with a namespace get exact selectors; those
/// without one (no default namespace in scope, or `xmlns=""`) get wildcard
/// selectors. Text of the form `prefix:local` whose prefix is bound where it
/// appears keeps that namespace. The `type` attribute of the envelope is not
/// inspected.
///
/// Only declarations made on `filter` and below are visible; use
/// [`read_from_in`] when ancestors of the envelope declare prefixes.
pub fn read_from(filter: &Element) -> Result<SubtreeFilter> {
    read_from_in(filter, &Scope::new())
}

/// [`read_from`] with `parent_scope` holding the declarations in scope at
/// the parent of `filter`
pub fn read_from_in(filter: &Element, parent_scope: &Scope<'_>) -> Result<SubtreeFilter> {
    if has_text(filter) {
        return Err(Error::structural(ErrorKind::UnexpectedText {
            element: filter.qualified_name(),
        }));
    }
    let scope = parent_scope.enter(filter);
    filter
        .child_elements()
        .try_fold(SubtreeFilter::builder(), |builder, child| -> Result<_> {
            Ok(builder.add(read_node(child, &scope)?))
        })?
        .build()
}

fn read_node<'a>(element: &'a Element, parent_scope: &Scope<'a>) -> Result<FilterNode> {
    let scope = parent_scope.enter(element);
    if element.has_mixed_text() {
        return Err(Error::structural(ErrorKind::MixedContent {
            element: element.qualified_name(),
        }));
    }
    let selector = NamespaceSelector::from_parts(element.namespace.as_deref(), &element.name)?;
    let attributes = element
        .attributes
        .iter()
        .map(|attr| {
            let selector = NamespaceSelector::from_parts(attr.namespace.as_deref(), &attr.name)?;
            Ok(AttributeMatch::new(selector, attr.value.as_str()))
        })
        .collect::<Result<Vec<_>>>()?;

    if element.has_child_elements() {
        let children = element
            .child_elements()
            .map(|child| read_node(child, &scope))
            .collect::<Result<Vec<_>>>()?;
        return Ok(ContainmentNode::from_parts(selector, attributes, children).into());
    }

    match element.text() {
        Some(text) => {
            if !attributes.is_empty() {
                warn!(
                    "Ignoring {} attribute(s) on content match node {}",
                    attributes.len(),
                    selector
                );
            }
            let namespace = split_prefixed(&text).and_then(|(prefix, _)| scope.resolve(prefix));
            let node = match namespace {
                Some(namespace) => ContentMatchNode::qualified(selector, text, namespace)?,
                None => ContentMatchNode::try_new(selector, text)?,
            };
            Ok(node.into())
        }
        None => Ok(SelectionNode::from_parts(selector, attributes).into()),
    }
}

fn has_text(element: &Element) -> bool {
    element
        .children
        .iter()
        .any(|child| matches!(child, Content::Text(text) if !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    const NS: &str = "http://example.com/schema/1.2/config";

    fn read(xml: &str) -> Result<SubtreeFilter> {
        read_from(&Document::parse_str(xml)?.root)
    }

    #[test]
    fn test_node_kinds() -> Result<()> {
        let filter = read(&format!(
            r#"<filter type="subtree">
                 <top xmlns="{NS}">
                   <users><user><name>fred</name></user></users>
                   <interfaces/>
                 </top>
               </filter>"#
        ))?;
        let expected = SubtreeFilter::builder()
            .add(
                ContainmentNode::builder(NamespaceSelector::exact(NS, "top"))
                    .add(
                        ContainmentNode::builder(NamespaceSelector::exact(NS, "users"))
                            .add(
                                ContainmentNode::builder(NamespaceSelector::exact(NS, "user"))
                                    .add(ContentMatchNode::new(
                                        NamespaceSelector::exact(NS, "name"),
                                        "fred",
                                    ))
                                    .build(),
                            )
                            .build(),
                    )
                    .add(SelectionNode::builder(NamespaceSelector::exact(NS, "interfaces")).build())
                    .build(),
            )
            .build()?;
        assert_eq!(filter, expected);
        Ok(())
    }

    #[test]
    fn test_unqualified_nodes_are_wildcards() -> Result<()> {
        let filter = read(r#"<filter><top xmlns=""><users id="1"/></top></filter>"#)?;
        let expected = SubtreeFilter::builder()
            .add(
                ContainmentNode::builder(NamespaceSelector::wildcard("top"))
                    .add(
                        SelectionNode::builder(NamespaceSelector::wildcard("users"))
                            .add(AttributeMatch::new(NamespaceSelector::wildcard("id"), "1"))
                            .build(),
                    )
                    .build(),
            )
            .build()?;
        assert_eq!(filter, expected);
        Ok(())
    }

    #[test]
    fn test_text_in_envelope_rejected() {
        let err = read("<filter>oops<top/></filter>").err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::UnexpectedText { .. })
        ));
    }

    #[test]
    fn test_mixed_content_rejected() {
        let err = read("<filter><top>text<users/></top></filter>").err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::MixedContent { .. })
        ));
    }

    #[test]
    fn test_empty_envelope_rejected() {
        let err = read(r#"<filter type="subtree"/>"#).err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::EmptyFilter));
    }

    #[test]
    fn test_content_wins_over_attributes() -> Result<()> {
        let filter = read(r#"<filter><name kind="x">fred</name></filter>"#)?;
        assert_eq!(
            filter.roots(),
            &[FilterNode::from(ContentMatchNode::new(
                NamespaceSelector::wildcard("name"),
                "fred"
            ))]
        );
        Ok(())
    }

    #[test]
    fn test_prefixed_content_keeps_namespace() -> Result<()> {
        let filter = read(&format!(
            r#"<filter xmlns:ift="urn:iana:if-type">
                 <interface xmlns="{NS}"><type>ift:ethernetCsmacd</type></interface>
               </filter>"#
        ))?;
        let expected = ContentMatchNode::qualified(
            NamespaceSelector::exact(NS, "type"),
            "ift:ethernetCsmacd",
            "urn:iana:if-type",
        )?;
        assert_eq!(
            filter.roots().first().map(FilterNode::children),
            Some(&[FilterNode::from(expected)][..])
        );
        Ok(())
    }

    #[test]
    fn test_unbound_content_prefix_is_plain_text() -> Result<()> {
        let filter = read(r#"<filter><type>ift:ethernetCsmacd</type></filter>"#)?;
        let expected = ContentMatchNode::new(NamespaceSelector::wildcard("type"), "ift:ethernetCsmacd");
        assert_eq!(filter.roots(), &[FilterNode::from(expected)]);
        Ok(())
    }

    #[test]
    fn test_envelope_ancestors_are_in_scope() -> Result<()> {
        let rpc = Document::parse_str(
            r#"<rpc xmlns:ift="urn:iana:if-type"><get><filter><type>ift:eth</type></filter></get></rpc>"#,
        )?
        .root;
        let get = rpc.only_child_element()?;
        let envelope = get.only_child_element()?;
        let filter = read_from_in(envelope, &Scope::along([&rpc, get]))?;
        let node = filter.roots().first().and_then(|root| match root {
            FilterNode::ContentMatch(node) => node.namespace(),
            _ => None,
        });
        assert_eq!(node, Some("urn:iana:if-type"));
        Ok(())
    }
}
