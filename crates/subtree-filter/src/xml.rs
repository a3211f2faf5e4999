//! Namespace-aware XML model, parser and writer

pub mod cursor;
pub mod model;
pub mod parser;
pub mod writer;

pub use cursor::Cursor;
pub use model::{
    check_declaration, is_prefix_name, split_prefixed, Attribute, Content, Document, Element, Scope,
    XMLNS_NAMESPACE, XML_NAMESPACE,
};
pub use parser::{Config, Parser};
pub use writer::{
    document_to_string, element_to_string, escape_attribute, escape_text, WriteConfig,
};

use crate::error::Result;

impl Document {
    /// Parse a document with the default [`Config`]
    pub fn parse_str(input: &str) -> Result<Self> {
        Parser::new(input.as_bytes()).parse()
    }

    /// Parse a document with custom limits
    pub fn parse_str_with_config(input: &str, config: Config) -> Result<Self> {
        Parser::with_config(input.as_bytes(), config).parse()
    }

    /// Compact XML text
    pub fn to_xml_string(&self) -> String {
        document_to_string(self, &WriteConfig::compact())
    }

    /// Indented XML text
    pub fn to_pretty_string(&self) -> String {
        document_to_string(self, &WriteConfig::pretty())
    }
}

impl Element {
    /// Compact XML text
    pub fn to_xml_string(&self) -> String {
        element_to_string(self, &WriteConfig::compact())
    }

    /// Indented XML text
    pub fn to_pretty_string(&self) -> String {
        element_to_string(self, &WriteConfig::pretty())
    }
}
