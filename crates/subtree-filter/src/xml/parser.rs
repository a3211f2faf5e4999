//! XML parser implementation

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::model::{check_declaration, resolve_prefix, Attribute, Content, Document, Element};

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_size: 16 * 1024 * 1024, // 16 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// Start tag before namespace resolution
struct RawTag {
    name: String,
    attributes: Vec<RawAttribute>,
    self_closing: bool,
    pos: Pos,
}

struct RawAttribute {
    name: String,
    value: String,
    pos: Pos,
}

/// Namespace-aware XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    depth: u16,
    /// Declarations of the currently open elements, outermost first
    frames: Vec<IndexMap<String, String>>,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new XML parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
            frames: Vec::new(),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        let size = self.cursor.remaining().len();
        if self.config.max_size > 0 && size > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.cursor.position(),
            ));
        }

        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position()));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here("unexpected content after root element"));
        }

        Ok(Document { root })
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.cursor.position(),
            ));
        }

        let tag = self.parse_start_tag()?;
        let mut element = self.resolve_tag(&tag)?;
        trace!(element = %tag.name, depth = self.depth, "parsed start tag");

        if !tag.self_closing {
            element.children = self.parse_content(&tag.name)?;
        }

        self.frames.pop();
        self.depth = self.depth.saturating_sub(1);
        Ok(element)
    }

    fn parse_start_tag(&mut self) -> Result<RawTag> {
        let pos = self.cursor.position();
        self.expect_byte(b'<')?;
        let name = self.parse_name()?;
        let mut attributes: Vec<RawAttribute> = Vec::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') => {
                    self.cursor.advance();
                    self.expect_byte(b'>')?;
                    return Ok(RawTag {
                        name,
                        attributes,
                        self_closing: true,
                        pos,
                    });
                }
                Some(b'>') => {
                    self.cursor.advance();
                    return Ok(RawTag {
                        name,
                        attributes,
                        self_closing: false,
                        pos,
                    });
                }
                Some(_) => {}
                None => return Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position())),
            }

            let attr_pos = self.cursor.position();
            let attr_name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attributes.iter().any(|existing| existing.name == attr_name) {
                return Err(Error::at(
                    ErrorKind::DuplicateAttribute { name: attr_name },
                    attr_pos,
                ));
            }
            attributes.push(RawAttribute {
                name: attr_name,
                value,
                pos: attr_pos,
            });
        }
    }

    /// Split declarations from attributes and bind prefixes to namespaces
    fn resolve_tag(&mut self, tag: &RawTag) -> Result<Element> {
        let mut namespaces = IndexMap::new();
        let mut plain = Vec::new();
        for attr in &tag.attributes {
            let declared = if attr.name == "xmlns" {
                Some("")
            } else {
                attr.name.strip_prefix("xmlns:")
            };
            match declared {
                Some(prefix) => {
                    check_declaration(prefix, &attr.value)
                        .map_err(|err| Error::at(err.kind().clone(), attr.pos))?;
                    namespaces.insert(prefix.to_string(), attr.value.clone());
                }
                None => plain.push(attr),
            }
        }
        self.frames.push(namespaces.clone());

        let (prefix, local) = split_qname(&tag.name);
        let namespace = self.resolve(prefix.unwrap_or_default(), prefix.is_some(), tag.pos)?;

        let mut attributes = Vec::with_capacity(plain.len());
        for attr in plain {
            let (attr_prefix, attr_local) = split_qname(&attr.name);
            // unprefixed attributes are never in the default namespace
            let attr_namespace = match attr_prefix {
                Some(p) => self.resolve(p, true, attr.pos)?,
                None => None,
            };
            if attributes.iter().any(|existing: &Attribute| {
                existing.name == attr_local && existing.namespace == attr_namespace
            }) {
                return Err(Error::at(
                    ErrorKind::DuplicateAttribute {
                        name: attr.name.clone(),
                    },
                    attr.pos,
                ));
            }
            attributes.push(Attribute {
                prefix: attr_prefix.map(str::to_string),
                name: attr_local.to_string(),
                namespace: attr_namespace,
                value: attr.value.clone(),
            });
        }

        Ok(Element {
            prefix: prefix.map(str::to_string),
            name: local.to_string(),
            namespace,
            namespaces,
            attributes,
            children: Vec::new(),
        })
    }

    fn resolve(&self, prefix: &str, required: bool, pos: Pos) -> Result<Option<String>> {
        match resolve_prefix(self.frames.iter(), prefix) {
            Some(uri) => Ok(Some(uri.to_string())),
            None if required => Err(Error::at(
                ErrorKind::UnboundPrefix {
                    prefix: prefix.to_string(),
                },
                pos,
            )),
            None => Ok(None),
        }
    }

    fn parse_content(&mut self, open_name: &str) -> Result<Vec<Content>> {
        let mut children = Vec::new();
        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here("unterminated element"));
            }

            let pos = self.cursor.position();
            if self.cursor.eat(b"</") {
                let close_name = self.parse_name()?;
                if close_name != open_name {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            expected: open_name.to_string(),
                            found: close_name,
                        },
                        pos,
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                return Ok(children);
            } else if self.cursor.eat(b"<!--") {
                self.skip_past(b"-->")?;
            } else if self.cursor.eat(b"<![CDATA[") {
                let raw = self.skip_past(b"]]>")?;
                push_text(&mut children, bytes_to_string(raw)?);
            } else if self.cursor.eat(b"<?") {
                self.skip_past(b"?>")?;
            } else if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
            } else {
                let raw = self.cursor.take_while(|b| b != b'<');
                push_text(&mut children, decode_entities(&bytes_to_string(raw)?)?);
            }
        }
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let raw = self.cursor.take_while(|b| b != quote && b != b'<');
        match self.cursor.current() {
            Some(b'<') => Err(self.error_here("'<' not allowed in attribute value")),
            Some(_) => {
                self.cursor.advance();
                decode_entities(&bytes_to_string(raw)?)
            }
            None => Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position())),
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let pos = self.cursor.position();
        match self.cursor.current() {
            None => return Err(Error::at(ErrorKind::UnexpectedEof, pos)),
            Some(first) if !is_name_start(first) => {
                return Err(Error::at(ErrorKind::InvalidToken, pos));
            }
            Some(_) => {}
        }
        let raw = self.cursor.take_while(is_name_char);
        bytes_to_string(raw)
    }

    /// Skip whitespace, comments, processing instructions and DOCTYPE
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat(b"<?") {
                self.skip_past(b"?>")?;
            } else if self.cursor.eat(b"<!--") {
                self.skip_past(b"-->")?;
            } else if self.cursor.eat(b"<!") {
                self.skip_past(b">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_past(&mut self, terminator: &[u8]) -> Result<&'a [u8]> {
        self.cursor
            .skip_past(terminator)
            .ok_or_else(|| Error::at(ErrorKind::UnexpectedEof, self.cursor.position()))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position()))
        } else {
            Err(self.error_here(&format!("expected '{}'", char::from(expected))))
        }
    }

    fn error_here(&self, message: &str) -> Error {
        let pos = self.cursor.position();
        Error::with_message(ErrorKind::InvalidToken, Span::new(pos, pos), message)
    }
}

fn push_text(children: &mut Vec<Content>, text: String) {
    // whitespace between elements is formatting, not content
    if text.trim().is_empty() {
        return;
    }
    if let Some(Content::Text(previous)) = children.last_mut() {
        previous.push_str(&text);
    } else {
        children.push(Content::Text(text));
    }
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| Error::with_message(ErrorKind::InvalidToken, Span::empty(), "invalid utf-8"))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            }
        } else {
            None
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidEntity { entity },
                    Span::empty(),
                ));
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
