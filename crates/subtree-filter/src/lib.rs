//! subtree-filter - RFC 6241 subtree filtering for NETCONF
//!
//! # Quick Start
//!
//! ```
//! use subtree_filter::{ContentMatchNode, ContainmentNode, NamespaceSelector, SubtreeFilter};
//! # fn main() -> Result<(), subtree_filter::Error> {
//! const NS: &str = "http://example.com/schema/1.2/config";
//!
//! let filter = SubtreeFilter::builder()
//!     .add(
//!         ContainmentNode::builder(NamespaceSelector::exact(NS, "users"))
//!             .add(
//!                 ContainmentNode::builder(NamespaceSelector::exact(NS, "user"))
//!                     .add(ContentMatchNode::new(NamespaceSelector::exact(NS, "name"), "fred"))
//!                     .build(),
//!             )
//!             .build(),
//!     )
//!     .build()?;
//!
//! let data = subtree_filter::from_xml_str(&format!(
//!     r#"<data><users xmlns="{NS}">
//!          <user><name>fred</name><type>admin</type></user>
//!          <user><name>barney</name><type>user</type></user>
//!        </users></data>"#
//! ))?;
//! let filtered = filter.apply_to_data(&data.root);
//! let text = filtered.to_xml_string();
//! assert!(text.contains("<type>admin</type>"));
//! assert!(!text.contains("barney"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod xml;
pub use xml::{
    Attribute, Config, Content, Document, Element, Parser, Scope, WriteConfig,
};

pub mod filter;
pub use filter::{
    prefix_of, AttributeMatch, ContainmentNode, ContentMatchNode, FilterNode, NamespaceSelector,
    SelectionNode, SubtreeFilter,
};

pub mod matching;
pub use matching::{ElementFilter, FilterSpec, MatchResult};

pub mod netconf;
pub use netconf::{apply_rpc_subtree_filter, apply_subtree_notification_filter};

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<Document> {
    Document::parse_str(s)
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Document> {
    Parser::new(bytes).parse()
}

/// Parse XML with custom limits
pub fn from_xml_str_with_config(s: &str, config: Config) -> Result<Document> {
    Document::parse_str_with_config(s, config)
}

/// Read a subtree filter from `<filter>` XML text
pub fn filter_from_str(s: &str) -> Result<SubtreeFilter> {
    SubtreeFilter::from_xml_str(s)
}
