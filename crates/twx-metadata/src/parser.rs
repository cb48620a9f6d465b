//! Markup decoding for metadata documents
//!
//! A small cursor-based reader for the document class the build handles:
//! prolog, comments, doctype, elements with quoted attributes, character
//! data with entity references, CDATA. Errors carry the line and column of
//! the offending byte and are reported verbatim to the caller.

use crate::document::{Document, Element};
use crate::errors::XmlError;

/// Decode a complete document. Exactly one root element is expected.
pub(crate) fn parse_document(input: &str) -> Result<Document, XmlError> {
    let mut parser = Parser::new(input);

    parser.skip_misc()?;
    if parser.at_end() {
        return Err(parser.error("document has no root element"));
    }
    let root = parser.parse_element()?;
    parser.skip_misc()?;
    if !parser.at_end() {
        return Err(parser.error("unexpected content after the root element"));
    }

    Ok(Document { root })
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        // A byte order mark is tolerated but not part of the document.
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Parser { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        let consumed = &self.input[..self.pos.min(self.input.len())];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        XmlError {
            message: message.into(),
            line,
            column,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn skip_until(&mut self, terminator: &str) -> Result<(), XmlError> {
        match self.rest().find(terminator) {
            Some(offset) => {
                self.pos += offset + terminator.len();
                Ok(())
            }
            None => Err(self.error(format!("unterminated construct, expected `{terminator}`"))),
        }
    }

    /// Skip whitespace, comments, processing instructions (the prolog
    /// included) and doctype declarations between markup constructs.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<!--") {
                self.pos += 4;
                self.skip_until("-->")?;
            } else if self.starts_with("<?") {
                self.pos += 2;
                self.skip_until("?>")?;
            } else if self.starts_with("<!DOCTYPE") {
                self.pos += "<!DOCTYPE".len();
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    /// The doctype may carry a bracketed internal subset; skip to the `>`
    /// that closes the declaration itself.
    fn skip_doctype(&mut self) -> Result<(), XmlError> {
        let mut bracket_depth = 0usize;
        loop {
            match self.peek() {
                Some(b'[') => {
                    bracket_depth += 1;
                    self.pos += 1;
                }
                Some(b']') => {
                    bracket_depth = bracket_depth.saturating_sub(1);
                    self.pos += 1;
                }
                Some(b'>') if bracket_depth == 0 => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error("unterminated doctype declaration")),
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element, XmlError> {
        if self.peek() != Some(b'<') {
            return Err(self.error("expected an element start tag"));
        }
        self.pos += 1;

        let name = self.parse_name()?;
        let mut element = Element::new(name);
        self.parse_attributes(&mut element)?;

        self.skip_whitespace();
        if self.starts_with("/>") {
            self.pos += 2;
            return Ok(element);
        }
        if self.peek() != Some(b'>') {
            return Err(self.error(format!("malformed start tag for `{}`", element.name)));
        }
        self.pos += 1;

        self.parse_content(&mut element)?;
        Ok(element)
    }

    fn parse_name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() || matches!(byte, b'/' | b'>' | b'=' | b'<') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_attributes(&mut self, element: &mut Element) -> Result<(), XmlError> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'/' | b'>') | None => return Ok(()),
                Some(_) => {}
            }

            let name = self.parse_name()?;
            self.skip_whitespace();
            if self.peek() != Some(b'=') {
                return Err(self.error(format!("attribute `{name}` is missing a value")));
            }
            self.pos += 1;
            self.skip_whitespace();

            let quote = match self.peek() {
                Some(quote @ (b'"' | b'\'')) => quote as char,
                _ => return Err(self.error(format!("attribute `{name}` value must be quoted"))),
            };
            self.pos += 1;

            let start = self.pos;
            let end = match self.rest().find(quote) {
                Some(offset) => self.pos + offset,
                None => return Err(self.error(format!("unterminated value for attribute `{name}`"))),
            };
            let value = decode_entities(&self.input[start..end]).map_err(|msg| self.error(msg))?;
            self.pos = end + 1;

            element.set_attribute(name, value);
        }
    }

    fn parse_content(&mut self, element: &mut Element) -> Result<(), XmlError> {
        let mut text = String::new();

        loop {
            if self.at_end() {
                return Err(self.error(format!("missing closing tag for `{}`", element.name)));
            }

            if self.starts_with("</") {
                self.pos += 2;
                let name = self.parse_name()?;
                if name != element.name {
                    return Err(self.error(format!(
                        "closing tag `{}` does not match `{}`",
                        name, element.name
                    )));
                }
                self.skip_whitespace();
                if self.peek() != Some(b'>') {
                    return Err(self.error(format!("malformed closing tag for `{name}`")));
                }
                self.pos += 1;

                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    element.text = Some(trimmed.to_string());
                }
                return Ok(());
            }

            if self.starts_with("<![CDATA[") {
                self.pos += "<![CDATA[".len();
                let end = match self.rest().find("]]>") {
                    Some(offset) => self.pos + offset,
                    None => return Err(self.error("unterminated CDATA section")),
                };
                text.push_str(&self.input[self.pos..end]);
                self.pos = end + 3;
                continue;
            }

            if self.starts_with("<!--") {
                self.pos += 4;
                self.skip_until("-->")?;
                continue;
            }

            if self.starts_with("<?") {
                self.pos += 2;
                self.skip_until("?>")?;
                continue;
            }

            if self.peek() == Some(b'<') {
                let child = self.parse_element()?;
                element.children.push(child);
                continue;
            }

            // Character data up to the next markup construct.
            let end = self
                .rest()
                .find('<')
                .map_or(self.input.len(), |offset| self.pos + offset);
            let decoded =
                decode_entities(&self.input[self.pos..end]).map_err(|msg| self.error(msg))?;
            text.push_str(&decoded);
            self.pos = end;
        }
    }
}

/// Resolve the predefined entities and numeric character references.
/// Anything else is a decoding error, reported with the raised message.
fn decode_entities(raw: &str) -> Result<String, String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        rest = &rest[start..];

        let end = rest
            .find(';')
            .ok_or_else(|| format!("unterminated entity reference in `{raw}`"))?;
        let entity = &rest[1..end];
        match entity {
            "amp" => decoded.push('&'),
            "lt" => decoded.push('<'),
            "gt" => decoded.push('>'),
            "quot" => decoded.push('"'),
            "apos" => decoded.push('\''),
            _ => decoded.push(decode_character_reference(entity)?),
        }
        rest = &rest[end + 1..];
    }
    decoded.push_str(rest);

    Ok(decoded)
}

fn decode_character_reference(entity: &str) -> Result<char, String> {
    let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => match entity.strip_prefix('#') {
            Some(decimal) => decimal.parse().ok(),
            None => return Err(format!("unknown entity `&{entity};`")),
        },
    };

    code.and_then(char::from_u32)
        .ok_or_else(|| format!("invalid character reference `&{entity};`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_manifest() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<Entities>
  <ExtensionPackages>
    <ExtensionPackage name="placeholder" packageVersion="0.0.1"/>
  </ExtensionPackages>
  <Widgets>
    <Widget name="placeholder">
      <UIResources>
      </UIResources>
    </Widget>
  </Widgets>
</Entities>
"#;

        let document = parse_document(text).unwrap();
        assert_eq!(document.root.name, "Entities");

        let package = document
            .root
            .child("ExtensionPackages")
            .and_then(|packages| packages.child("ExtensionPackage"))
            .unwrap();
        assert_eq!(package.attribute("name"), Some("placeholder"));
        assert_eq!(package.attribute("packageVersion"), Some("0.0.1"));

        let widget = document
            .root
            .child("Widgets")
            .and_then(|widgets| widgets.child("Widget"))
            .unwrap();
        assert!(widget.child("UIResources").is_some());
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let document =
            parse_document(r#"<Entities c="3" a="1" b="2"/>"#).unwrap();
        let keys: Vec<&str> = document.root.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["c", "a", "b"]);
    }

    #[test]
    fn test_decodes_entities_in_attributes_and_text() {
        let document = parse_document(
            r#"<Entities note="a &amp; b &#x21;"><Note>x &lt; y</Note></Entities>"#,
        )
        .unwrap();
        assert_eq!(document.root.attribute("note"), Some("a & b !"));
        assert_eq!(
            document.root.child("Note").and_then(|n| n.text.as_deref()),
            Some("x < y")
        );
    }

    #[test]
    fn test_comments_and_doctype_are_skipped() {
        let text = "<?xml version=\"1.0\"?>\n<!DOCTYPE Entities>\n<!-- manifest -->\n<Entities><!-- inner --><Widgets/></Entities>";
        let document = parse_document(text).unwrap();
        assert_eq!(document.root.children.len(), 1);
    }

    #[test]
    fn test_cdata_becomes_text() {
        let document =
            parse_document("<Entities><![CDATA[<not markup>]]></Entities>").unwrap();
        assert_eq!(document.root.text.as_deref(), Some("<not markup>"));
    }

    #[test]
    fn test_single_quoted_attributes() {
        let document = parse_document("<Entities name='single'/>").unwrap();
        assert_eq!(document.root.attribute("name"), Some("single"));
    }

    #[test]
    fn test_mismatched_closing_tag_is_an_error() {
        let error = parse_document("<Entities><Widgets></Entities></Entities>");
        assert!(error.is_err());
    }

    #[test]
    fn test_error_carries_position() {
        let error = match parse_document("<Entities>\n  <Widget oops></Widget>\n</Entities>") {
            Err(error) => error,
            Ok(_) => panic!("expected a parse error"),
        };
        assert_eq!(error.line, 2);
        assert!(error.column > 1);
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        assert!(parse_document("<Entities note=\"&nope;\"/>").is_err());
    }

    #[test]
    fn test_trailing_content_is_an_error() {
        assert!(parse_document("<Entities/><Entities/>").is_err());
    }
}
