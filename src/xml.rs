//! Minimal XML pull scanner for scene files.
//!
//! Supports exactly what the scene format needs: start, end and empty tags
//! with `name="value"` attributes. Text nodes, namespaces, entities and
//! CDATA are out; headers (`<?…>`) and comments (`<!…>`) are skipped.

use std::collections::HashMap;
use std::io::BufRead;

/// Classification of a scanned tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    /// `<name …>`
    Start,
    /// `</name>`
    End,
    /// `<name …/>`
    Empty,
}

/// One scanned tag with its attributes.
#[derive(Debug, Clone)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Start, end or empty.
    pub kind: TagType,
    /// Attribute map; values are stored verbatim.
    pub attributes: HashMap<String, String>,
}

impl Tag {
    /// True when name and kind both match.
    pub fn is(&self, name: &str, kind: TagType) -> bool {
        self.name == name && self.kind == kind
    }

    /// Looks up a required attribute.
    pub fn attr(&self, key: &str) -> Result<&str, String> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| format!("attribute \"{key}\" not found"))
    }
}

/// Pull scanner over a byte stream.
pub struct XmlScanner<R: BufRead> {
    reader: R,
    tag: Tag,
    tag_string: String,
}

impl<R: BufRead> XmlScanner<R> {
    /// Wraps a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tag: Tag {
                name: String::new(),
                kind: TagType::Start,
                attributes: HashMap::new(),
            },
            tag_string: String::new(),
        }
    }

    /// Advances to the next tag and returns it. Everything between tags is
    /// skipped, as the scene format has no mixed content.
    pub fn next_tag(&mut self) -> Result<&Tag, String> {
        let mut skipped = Vec::new();
        self.reader
            .read_until(b'<', &mut skipped)
            .map_err(|e| e.to_string())?;

        let mut raw = Vec::new();
        let n = self
            .reader
            .read_until(b'>', &mut raw)
            .map_err(|e| e.to_string())?;
        if raw.last() == Some(&b'>') {
            raw.pop();
        }
        let mut tag_string = String::from_utf8_lossy(&raw).into_owned();
        if tag_string.is_empty() {
            if n == 0 {
                return Err("xml file ended unexpectedly".to_string());
            }
            return Err("xml file contains completely empty tag".to_string());
        }
        self.tag_string = tag_string.clone();

        // skip header and comments
        if tag_string.starts_with('?') || tag_string.starts_with('!') {
            return self.next_tag();
        }

        if let Some(name) = tag_string.strip_prefix('/') {
            self.tag = Tag {
                name: name.to_string(),
                kind: TagType::End,
                attributes: HashMap::new(),
            };
            return Ok(&self.tag);
        }

        let kind = if tag_string.ends_with('/') {
            tag_string.pop();
            TagType::Empty
        } else {
            TagType::Start
        };

        let mut parts = tag_string.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| "xml file contains tag without name".to_string())?
            .to_string();

        let mut attributes = HashMap::new();
        for part in parts {
            let (key, value) = parse_attribute(part)?;
            attributes.insert(key, value);
        }
        self.tag = Tag {
            name,
            kind,
            attributes,
        };
        Ok(&self.tag)
    }

    /// The tag returned by the last `next_tag` call.
    pub fn this_tag(&self) -> &Tag {
        &self.tag
    }

    /// Raw text of the last scanned tag, for error context.
    pub fn this_tag_string(&self) -> &str {
        &self.tag_string
    }
}

/// Parses one `name="value"` token (no spaces inside values).
fn parse_attribute(token: &str) -> Result<(String, String), String> {
    let invalid = || "xml file contains invalid attribute".to_string();
    let (name, quoted) = token.split_once('=').ok_or_else(invalid)?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(invalid());
    }
    let value = quoted
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| quoted.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .ok_or_else(invalid)?;
    if value.contains('"') || value.contains('\'') {
        return Err(invalid());
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
fn scan(input: &str) -> XmlScanner<&[u8]> {
    XmlScanner::new(input.as_bytes())
}

#[test]
fn scans_start_end_and_empty_tags() {
    let mut xml = scan("<scene a=\"1\"><camera/></scene>");
    assert!(xml.next_tag().unwrap().is("scene", TagType::Start));
    assert_eq!(xml.this_tag().attr("a").unwrap(), "1");
    assert!(xml.next_tag().unwrap().is("camera", TagType::Empty));
    assert!(xml.next_tag().unwrap().is("scene", TagType::End));
}

#[test]
fn skips_header_comments_and_text() {
    let mut xml = scan("<?xml version=\"1.0\"?>\n<!-- hi -->\n<scene>text</scene>");
    assert!(xml.next_tag().unwrap().is("scene", TagType::Start));
    assert!(xml.next_tag().unwrap().is("scene", TagType::End));
}

#[test]
fn single_quoted_attributes() {
    let mut xml = scan("<light color='red'/>");
    assert_eq!(xml.next_tag().unwrap().attr("color").unwrap(), "red");
}

#[test]
fn eof_and_malformed_attributes_error() {
    assert!(scan("<scene>").next_tag().is_ok());
    let mut xml = scan("<scene>");
    xml.next_tag().unwrap();
    assert!(xml.next_tag().is_err());
    assert!(scan("<scene a=1/>").next_tag().is_err());
    assert!(scan("<>").next_tag().is_err());
}

#[test]
fn missing_attribute_reports_its_name() {
    let mut xml = scan("<scene/>");
    let err = xml.next_tag().unwrap().attr("output_file").unwrap_err();
    assert!(err.contains("output_file"));
}
