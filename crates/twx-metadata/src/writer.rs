//! Markup serialization for metadata documents
//!
//! Mirrors the document shape the platform import expects: an XML
//! declaration, two-space indentation, attributes in insertion order and
//! self-closing empty elements. Serialization never fails; values are
//! escaped as written.

use crate::document::{Document, Element};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";
const INDENT: &str = "  ";

pub(crate) fn write_document(document: &Document) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    write_element(&mut out, &document.root, 0);
    out
}

fn write_element(out: &mut String, element: &Element, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        push_escaped(out, value);
        out.push('"');
    }

    let text = element.text.as_deref().unwrap_or("");
    if element.children.is_empty() && text.is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push('>');
    push_escaped(out, text);

    if element.children.is_empty() {
        // Text-only elements stay on one line.
        out.push_str("</");
        out.push_str(&element.name);
        out.push_str(">\n");
        return;
    }

    out.push('\n');
    for child in &element.children {
        write_element(out, child, depth + 1);
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
}

fn push_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn sample_document() -> Document {
        let mut root = Element::new("Entities");
        let mut widgets = Element::new("Widgets");
        let mut widget = Element::new("Widget");
        widget.set_attribute("name", "gauge");
        widget.set_attribute("note", "a & b");
        let mut label = Element::new("Label");
        label.text = Some("x < y".to_string());
        widget.push_child(label);
        widget.push_child(Element::new("UIResources"));
        widgets.push_child(widget);
        root.push_child(widgets);
        Document { root }
    }

    #[test]
    fn test_writes_declaration_and_indentation() {
        let xml = sample_document().to_xml();
        let lines: Vec<&str> = xml.lines().collect();

        assert_eq!(
            lines[0],
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"
        );
        assert_eq!(lines[1], "<Entities>");
        assert_eq!(lines[2], "  <Widgets>");
        assert_eq!(lines[3], "    <Widget name=\"gauge\" note=\"a &amp; b\">");
        assert_eq!(lines[4], "      <Label>x &lt; y</Label>");
        assert_eq!(lines[5], "      <UIResources/>");
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let document = sample_document();
        let reparsed = Document::parse(&document.to_xml()).unwrap();
        assert_eq!(reparsed, document);
    }
}
