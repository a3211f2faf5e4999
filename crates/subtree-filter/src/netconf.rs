//! NETCONF entry points
//!
//! Applies `<filter type="subtree">` elements, as found in `<get>` and
//! `<get-config>` requests or notification subscriptions, to replies and
//! notifications. Filters of any other type are passed through untouched.

use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::matching::{add_subtree, copy_matching_children, ElementFilter, FilterSpec};
use crate::xml::{Content, Document, Element, Scope};

/// NETCONF base namespace
pub const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
/// NETCONF event notification namespace
pub const NOTIFICATION_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:notification:1.0";

pub const RPC: &str = "rpc";
pub const RPC_REPLY: &str = "rpc-reply";
pub const DATA: &str = "data";
pub const FILTER: &str = "filter";
pub const GET: &str = "get";
pub const GET_CONFIG: &str = "get-config";
pub const EVENT_TIME: &str = "eventTime";
pub const TYPE: &str = "type";
pub const SUBTREE: &str = "subtree";

/// Whether `filter` declares `type="subtree"`, unprefixed or in the base
/// namespace
pub fn is_subtree_filter(filter: &Element) -> bool {
    filter.attribute(TYPE, None) == Some(SUBTREE)
        || filter.attribute(TYPE, Some(BASE_NAMESPACE)) == Some(SUBTREE)
}

/// Apply the subtree filter of a `<get>` or `<get-config>` request to its
/// reply
///
/// The reply comes back unchanged for other operations, for requests
/// without a `<filter>` and for filters that are not of type `subtree`.
/// Otherwise a new reply is built holding only the selected parts of
/// `<data>`.
#[instrument(skip_all)]
pub fn apply_rpc_subtree_filter(request: &Document, reply: Document) -> Result<Document> {
    let rpc = &request.root;
    let operation = rpc.child_elements().next().ok_or_else(|| {
        Error::structural(ErrorKind::UnexpectedElementCount {
            parent: rpc.qualified_name(),
            name: None,
            count: 0,
        })
    })?;

    if !is_filtered_operation(operation) {
        debug!("Operation {} is not filtered", operation.qualified_name());
        return Ok(reply);
    }
    let Some(filter) = operation.find_only_child(FILTER, Some(BASE_NAMESPACE)) else {
        debug!("No filter in {}", operation.qualified_name());
        return Ok(reply);
    };
    if !is_subtree_filter(filter) {
        debug!("Filter is not a subtree filter, passing reply through");
        return Ok(reply);
    }

    let scope = Scope::along([rpc, operation, filter]);
    let filters = ElementFilter::children_of(filter, &scope);
    filter_reply(&filters, &reply)
}

/// Apply a notification subscription filter
///
/// `eventTime` is removed first. A subtree filter yields the selected part
/// of the event payload, or `None` when nothing matched and the
/// notification should not be delivered. Any other filter type yields the
/// payload unchanged.
#[instrument(skip_all)]
pub fn apply_subtree_notification_filter(
    filter: &Element,
    notification: Document,
) -> Result<Option<Document>> {
    if is_subtree_filter(filter) {
        let scope = Scope::new().enter(filter);
        let filters = ElementFilter::children_of(filter, &scope);
        return filter_notification(&filters, notification);
    }
    let root = without_event_time(notification.root);
    let payload = root.into_only_child_element()?;
    Ok(Some(Document::new(payload)))
}

fn is_filtered_operation(operation: &Element) -> bool {
    operation.is(GET, Some(BASE_NAMESPACE)) || operation.is(GET_CONFIG, Some(BASE_NAMESPACE))
}

/// New reply with the shallow `<rpc-reply>` and `<data>` of `reply`, holding
/// the children of `<data>` that `filters` select
pub(crate) fn filter_reply<F: FilterSpec>(filters: &[F], reply: &Document) -> Result<Document> {
    let data = reply
        .root
        .only_child_element_named(DATA, Some(BASE_NAMESPACE))?;
    let scope = Scope::along([&reply.root, data]);
    let mut filtered = data.shallow_copy();
    copy_matching_children(filters, data, &scope, &mut filtered);

    let mut root = reply.root.shallow_copy();
    root.push_child(filtered);
    Ok(Document::new(root))
}

/// Selected part of the notification payload, `None` when nothing matched
pub(crate) fn filter_notification<F: FilterSpec>(
    filters: &[F],
    notification: Document,
) -> Result<Option<Document>> {
    let root = without_event_time(notification.root);
    let payload = root.only_child_element()?;
    let scope = Scope::along([&root, payload]);
    let mut selected = root.shallow_copy();
    for filter in filters {
        add_subtree(filter, payload, &scope, &mut selected);
    }

    let first = selected.children.into_iter().find_map(|child| match child {
        Content::Element(element) => Some(element),
        Content::Text(_) => None,
    });
    if first.is_none() {
        debug!("Notification filtered out");
    }
    Ok(first.map(Document::new))
}

fn without_event_time(mut root: Element) -> Element {
    if root
        .remove_child_element(EVENT_TIME, Some(NOTIFICATION_NAMESPACE))
        .is_none()
    {
        warn!("Notification {} has no eventTime", root.qualified_name());
    }
    root
}
