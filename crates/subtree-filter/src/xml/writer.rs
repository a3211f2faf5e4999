//! XML text output

use std::iter;

use indexmap::IndexMap;

use crate::xml::model::{resolve_prefix, Content, Document, Element};

/// Configuration options for XML output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteConfig {
    /// Put each element on its own line
    pub pretty: bool,
    /// Number of spaces per nesting level when pretty
    pub indent_spaces: usize,
    /// Emit the `<?xml ...?>` declaration for documents
    pub declaration: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self::compact()
    }
}

impl WriteConfig {
    /// Everything on one line
    pub const fn compact() -> Self {
        Self {
            pretty: false,
            indent_spaces: 2,
            declaration: false,
        }
    }

    /// One element per line, 2-space indentation
    pub const fn pretty() -> Self {
        Self {
            pretty: true,
            indent_spaces: 2,
            declaration: false,
        }
    }

    pub const fn with_indent(mut self, indent_spaces: usize) -> Self {
        self.indent_spaces = indent_spaces;
        self
    }

    pub const fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

/// Render an element and its subtree
///
/// Namespace bindings the tree relies on but does not declare (typically a
/// subtree copied out of a larger document) are declared where first needed.
pub fn element_to_string(element: &Element, config: &WriteConfig) -> String {
    let mut writer = Writer {
        out: String::new(),
        config,
        frames: Vec::new(),
        inline: false,
    };
    writer.write_element(element, 0);
    writer.out
}

/// Render a document
pub fn document_to_string(document: &Document, config: &WriteConfig) -> String {
    let body = element_to_string(&document.root, config);
    if !config.declaration {
        return body;
    }
    let separator = if config.pretty { "\n" } else { "" };
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{separator}{body}")
}

/// Escape `& < >` for text content
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape `& < > " '` for attribute values
pub fn escape_attribute(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

struct Writer<'c> {
    out: String,
    config: &'c WriteConfig,
    /// Declarations emitted on open ancestors, outermost first
    frames: Vec<IndexMap<String, String>>,
    /// Inside mixed content, where layout whitespace would change the text
    inline: bool,
}

impl Writer<'_> {
    fn write_element(&mut self, element: &Element, depth: usize) {
        let mut declarations = element.namespaces.clone();
        self.bind_element(element, &mut declarations);
        let attributes: Vec<(String, &str)> = element
            .attributes
            .iter()
            .map(|attr| {
                let name = match attr.namespace.as_deref() {
                    Some(namespace) => {
                        let prefix = self.bind_attribute_prefix(
                            attr.prefix.as_deref(),
                            namespace,
                            &mut declarations,
                        );
                        format!("{prefix}:{}", attr.name)
                    }
                    None => attr.name.clone(),
                };
                (name, attr.value.as_str())
            })
            .collect();

        let name = element.qualified_name();
        self.indent(depth);
        self.out.push('<');
        self.out.push_str(&name);
        for (prefix, uri) in &declarations {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(prefix);
                self.out.push_str("=\"");
            }
            self.out.push_str(&escape_attribute(uri));
            self.out.push('"');
        }
        for (attr_name, value) in &attributes {
            self.out.push(' ');
            self.out.push_str(attr_name);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attribute(value));
            self.out.push('"');
        }

        if element.children.is_empty() {
            self.out.push_str("/>");
            return;
        }
        self.out.push('>');

        // any text child keeps the element inline so text is written verbatim
        let has_text = element
            .children
            .iter()
            .any(|child| matches!(child, Content::Text(_)));
        self.frames.push(declarations);
        if has_text || self.inline || !self.config.pretty {
            let inline = self.inline || has_text;
            let outer = std::mem::replace(&mut self.inline, inline);
            for child in &element.children {
                match child {
                    Content::Text(text) => self.out.push_str(&escape_text(text)),
                    Content::Element(child) => self.write_element(child, depth + 1),
                }
            }
            self.inline = outer;
        } else {
            for child in element.child_elements() {
                self.out.push('\n');
                self.write_element(child, depth + 1);
            }
            self.out.push('\n');
            self.indent(depth);
        }
        self.frames.pop();

        self.out.push_str("</");
        self.out.push_str(&name);
        self.out.push('>');
    }

    fn resolve(&self, declarations: &IndexMap<String, String>, prefix: &str) -> Option<String> {
        resolve_prefix(self.frames.iter().chain(iter::once(declarations)), prefix)
            .map(str::to_string)
    }

    fn bind_element(&self, element: &Element, declarations: &mut IndexMap<String, String>) {
        let prefix = element.prefix.as_deref().unwrap_or_default();
        let current = self.resolve(declarations, prefix);
        match (element.namespace.as_deref(), current) {
            (Some(wanted), Some(current)) if wanted == current => {}
            (Some(wanted), _) => {
                declarations.insert(prefix.to_string(), wanted.to_string());
            }
            // unqualified element under a default namespace
            (None, Some(_)) if prefix.is_empty() => {
                declarations.insert(String::new(), String::new());
            }
            (None, _) => {}
        }
    }

    fn bind_attribute_prefix(
        &self,
        prefix: Option<&str>,
        namespace: &str,
        declarations: &mut IndexMap<String, String>,
    ) -> String {
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            if self.resolve(declarations, prefix).as_deref() != Some(namespace) {
                declarations.insert(prefix.to_string(), namespace.to_string());
            }
            return prefix.to_string();
        }

        // attributes need a prefix to carry a namespace; reuse a binding in scope
        let bound = self
            .frames
            .iter()
            .chain(iter::once(&*declarations))
            .flat_map(|frame| frame.iter())
            .map(|(prefix, _)| prefix.clone())
            .filter(|prefix| !prefix.is_empty())
            .find(|prefix| self.resolve(declarations, prefix).as_deref() == Some(namespace));
        if let Some(prefix) = bound {
            return prefix;
        }
        let prefix = (0usize..)
            .map(|n| format!("ns{n}"))
            .find(|candidate| self.resolve(declarations, candidate).is_none())
            .unwrap_or_default();
        declarations.insert(prefix.clone(), namespace.to_string());
        prefix
    }

    fn indent(&mut self, depth: usize) {
        if self.config.pretty && !self.inline {
            let width = depth.saturating_mul(self.config.indent_spaces);
            self.out.extend(iter::repeat(' ').take(width));
        }
    }
}
