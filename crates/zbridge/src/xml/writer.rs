//! XML serialization

use crate::xml::model::{Document, Element, Node};

/// Declaration written in front of every serialized document
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Serialize a document as the declaration followed by a single-line root element
pub fn to_string(doc: &Document) -> String {
    let mut output = String::new();
    write_document(doc, &mut output);
    output
}

/// Append the serialized document to `output`
pub fn write_document(doc: &Document, output: &mut String) {
    output.push_str(XML_DECLARATION);
    write_element(&doc.root, output);
}

/// Append one element and its subtree; childless elements use `<name/>`
pub fn write_element(element: &Element, output: &mut String) {
    let mut open = Vec::new();
    if open_tag(element, output) {
        open.push((element, element.children.iter()));
    }

    while let Some((current, children)) = open.last_mut() {
        match children.next() {
            Some(Node::Element(child)) => {
                if open_tag(child, output) {
                    open.push((child, child.children.iter()));
                }
            }
            Some(Node::Text(text)) => escape_text(text, output),
            None => {
                output.push_str("</");
                output.push_str(&current.name);
                output.push('>');
                open.pop();
            }
        }
    }
}

/// Write the start tag, or the whole element when it has no children.
/// Returns whether the element was left open.
fn open_tag(element: &Element, output: &mut String) -> bool {
    output.push('<');
    output.push_str(&element.name);

    for (key, value) in &element.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        escape_attribute(value, output);
        output.push('"');
    }

    if element.children.is_empty() {
        output.push_str("/>");
        false
    } else {
        output.push('>');
        true
    }
}

/// Escape character data. CR is written as a reference so it survives
/// line-end normalization on the way back in.
fn escape_text(input: &str, output: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\n' | '\t' => output.push(ch),
            c if needs_char_ref(c) => push_char_ref(c, output),
            c => output.push(c),
        }
    }
}

/// Escape an attribute value. Whitespace other than space would be
/// normalized by a parser, so it goes out as references too.
fn escape_attribute(input: &str, output: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&apos;"),
            c if needs_char_ref(c) => push_char_ref(c, output),
            c => output.push(c),
        }
    }
}

/// Characters a parser would reject or normalize if written raw
fn needs_char_ref(ch: char) -> bool {
    (ch.is_ascii_control() && ch != '\u{7F}') || matches!(ch, '\u{FFFE}' | '\u{FFFF}')
}

fn push_char_ref(ch: char, output: &mut String) {
    output.push_str(&format!("&#x{:X};", u32::from(ch)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(root: Element) -> Document {
        Document::new(root)
    }

    #[test]
    fn test_declaration_and_empty_root() {
        assert_eq!(
            to_string(&doc(Element::new("message"))),
            r#"<?xml version="1.0" encoding="utf-8"?><message/>"#
        );
    }

    #[test]
    fn test_nested_with_attributes() {
        let mut b = Element::new("b");
        b.push_text("2");
        let a = Element::new("a").with_attribute("x", "1").with_child(b);
        let mut out = String::new();
        write_element(&a, &mut out);
        assert_eq!(out, r#"<a x="1"><b>2</b></a>"#);
    }

    #[test]
    fn test_text_escaping() {
        let mut note = Element::new("note");
        note.push_text("a < b && c > d \"q\" 'a'\r\n\t\u{1}");
        let mut out = String::new();
        write_element(&note, &mut out);
        assert_eq!(
            out,
            "<note>a &lt; b &amp;&amp; c &gt; d \"q\" 'a'&#xD;\n\t&#x1;</note>"
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let element = Element::new("e").with_attribute("v", "<\"&'>\t\n\r");
        let mut out = String::new();
        write_element(&element, &mut out);
        assert_eq!(out, r#"<e v="&lt;&quot;&amp;&apos;&gt;&#x9;&#xA;&#xD;"/>"#);
    }

    #[test]
    fn test_non_ascii_passes_through() {
        let mut element = Element::new("цена");
        element.push_text("€5");
        let mut out = String::new();
        write_element(&element, &mut out);
        assert_eq!(out, "<цена>€5</цена>");
    }

    #[test]
    fn test_noncharacters_become_references() {
        let mut element = Element::new("e");
        element.push_text("\u{FFFE}x\u{FFFF}");
        let mut out = String::new();
        write_element(&element, &mut out);
        assert_eq!(out, "<e>&#xFFFE;x&#xFFFF;</e>");
    }

    #[test]
    fn test_deep_nesting() {
        let mut element = Element::new("a");
        for _ in 0..20_000 {
            element = Element::new("a").with_child(element);
        }
        let document = doc(element);
        let out = to_string(&document);
        assert!(out.ends_with("<a/></a></a>"));
        assert_eq!(out.matches("</a>").count(), 20_000);
    }
}
