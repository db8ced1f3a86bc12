//! JSON value -> XML document mapping

use crate::convert::{ATTRIBUTE_PREFIX, TEXT_KEY};
use crate::error::{Error, ErrorKind, Result};
use crate::value::Value;
use crate::xml::is_valid_name;
use crate::xml::model::{Document, Element, Node};

/// Wrap an object in a `root_tag` element.
///
/// Members are processed from an explicit work stack in document order, so
/// nesting depth is not limited by the call stack.
pub(crate) fn value_to_document(value: &Value, root_tag: &str) -> Result<Document> {
    if !is_valid_name(root_tag) {
        return Err(unsupported_key(root_tag));
    }
    let Value::Object(obj) = value else {
        return Err(Error::bare(ErrorKind::InvalidRoot {
            found: value.type_name(),
        }));
    };

    let mut root = Element::new(root_tag);
    let mut open: Vec<Element> = Vec::new();
    let mut tasks = Vec::new();
    push_in_order(&mut tasks, obj.iter().map(|(name, member)| Task::Member(name, member)));

    while let Some(task) = tasks.pop() {
        let (key, value) = match task {
            Task::Member(key, value) => (key, value),
            Task::Close => {
                if let Some(child) = open.pop() {
                    let parent = open.last_mut().unwrap_or(&mut root);
                    parent.children.push(Node::Element(child));
                }
                continue;
            }
        };
        let element = open.last_mut().unwrap_or(&mut root);

        if key == TEXT_KEY {
            append_text(element, key, value)?;
        } else if let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            if !is_valid_name(name) {
                return Err(unsupported_key(key));
            }
            let text = value.scalar_text().ok_or_else(|| reserved_value(key))?;
            element.attributes.insert(name.to_string(), checked(key, text)?);
        } else {
            if !is_valid_name(key) {
                return Err(unsupported_key(key));
            }
            match value {
                // arrays expand into repeated siblings, nested arrays into the same run
                Value::Array(items) => {
                    push_in_order(&mut tasks, items.iter().map(|item| Task::Member(key, item)));
                }
                Value::Object(obj) => {
                    open.push(Element::new(key.as_str()));
                    tasks.push(Task::Close);
                    push_in_order(
                        &mut tasks,
                        obj.iter().map(|(name, member)| Task::Member(name, member)),
                    );
                }
                scalar => {
                    let mut child = Element::new(key.as_str());
                    if let Some(text) = scalar.scalar_text() {
                        child.push_text(&checked(key, text)?);
                    }
                    element.children.push(Node::Element(child));
                }
            }
        }
    }

    Ok(Document::new(root))
}

/// Pending work while mapping an object tree
enum Task<'v> {
    /// A member to apply to the innermost open element
    Member(&'v String, &'v Value),
    /// The innermost open element is complete
    Close,
}

/// Push `tasks` so they pop in iteration order
fn push_in_order<'v>(stack: &mut Vec<Task<'v>>, tasks: impl Iterator<Item = Task<'v>>) {
    let start = stack.len();
    stack.extend(tasks);
    if let Some(added) = stack.get_mut(start..) {
        added.reverse();
    }
}

fn append_text(element: &mut Element, key: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                let text = item.scalar_text().ok_or_else(|| reserved_value(key))?;
                element.push_text(&checked(key, text)?);
            }
        }
        other => {
            let text = other.scalar_text().ok_or_else(|| reserved_value(key))?;
            element.push_text(&checked(key, text)?);
        }
    }
    Ok(())
}

/// NUL is not an XML character, not even as a reference
fn checked(key: &str, text: String) -> Result<String> {
    if text.contains('\0') {
        return Err(Error::bare(ErrorKind::UnrepresentableCharacter {
            key: key.to_string(),
        }));
    }
    Ok(text)
}

fn unsupported_key(key: &str) -> Error {
    Error::bare(ErrorKind::UnsupportedKeyName {
        key: key.to_string(),
    })
}

fn reserved_value(key: &str) -> Error {
    Error::bare(ErrorKind::InvalidReservedValue {
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::Parser;
    use crate::xml;

    fn render(json: &str, root_tag: &str) -> Result<String> {
        let value = Parser::new(json).parse_document()?;
        let doc = value_to_document(&value, root_tag)?;
        let mut out = String::new();
        xml::writer::write_element(&doc.root, &mut out);
        Ok(out)
    }

    fn kind_of(json: &str, root_tag: &str) -> Option<ErrorKind> {
        render(json, root_tag).err().map(|e| e.kind().clone())
    }

    #[test]
    fn test_attributes_and_children() -> Result<()> {
        assert_eq!(
            render(r#"{"a": {"@x": "1", "b": 2}}"#, "message")?,
            r#"<message><a x="1"><b>2</b></a></message>"#
        );
        Ok(())
    }

    #[test]
    fn test_arrays_repeat_siblings() -> Result<()> {
        assert_eq!(
            render(r#"{"item": [1, [2, 3], {"@id": "x"}]}"#, "list")?,
            r#"<list><item>1</item><item>2</item><item>3</item><item id="x"/></list>"#
        );
        Ok(())
    }

    #[test]
    fn test_scalars_and_empties() -> Result<()> {
        assert_eq!(
            render(
                r#"{"n": 1.0, "f": 2.5, "t": true, "z": null, "e": "", "o": {}}"#,
                "m"
            )?,
            "<m><n>1</n><f>2.5</f><t>true</t><z/><e/><o/></m>"
        );
        Ok(())
    }

    #[test]
    fn test_text_key() -> Result<()> {
        assert_eq!(
            render(r##"{"p": {"@lang": "en", "#text": "hi"}}"##, "m")?,
            r#"<m><p lang="en">hi</p></m>"#
        );
        assert_eq!(
            render(r##"{"#text": ["a", 1, null, true]}"##, "m")?,
            "<m>a1true</m>"
        );
        Ok(())
    }

    #[test]
    fn test_attribute_scalars_rendered() -> Result<()> {
        assert_eq!(
            render(r#"{"@n": 3, "@b": false, "@z": null}"#, "m")?,
            r#"<m n="3" b="false" z=""/>"#
        );
        Ok(())
    }

    #[test]
    fn test_invalid_keys() {
        for json in [
            r#"{"1abc": 1}"#,
            r#"{"has space": 1}"#,
            r#"{"": 1}"#,
            r#"{"@": 1}"#,
            r#"{"@1x": 1}"#,
            r#"{"a": {"b c": 1}}"#,
        ] {
            assert!(
                matches!(kind_of(json, "m"), Some(ErrorKind::UnsupportedKeyName { .. })),
                "{json}"
            );
        }
        assert!(matches!(
            kind_of("{}", "bad root"),
            Some(ErrorKind::UnsupportedKeyName { key }) if key == "bad root"
        ));
    }

    #[test]
    fn test_invalid_root() {
        assert_eq!(
            kind_of("[1, 2]", "m"),
            Some(ErrorKind::InvalidRoot { found: "array" })
        );
        assert_eq!(
            kind_of("\"x\"", "m"),
            Some(ErrorKind::InvalidRoot { found: "string" })
        );
    }

    #[test]
    fn test_reserved_values_must_be_scalars() {
        for json in [
            r#"{"@x": {"a": 1}}"#,
            r#"{"@x": [1]}"#,
            r##"{"#text": {"a": 1}}"##,
            r##"{"#text": [[1]]}"##,
        ] {
            assert!(
                matches!(kind_of(json, "m"), Some(ErrorKind::InvalidReservedValue { .. })),
                "{json}"
            );
        }
    }

    #[test]
    fn test_nul_is_rejected() {
        for json in [
            r#"{"a": "x\u0000y"}"#,
            r#"{"@a": "\u0000"}"#,
            r##"{"#text": ["ok", "\u0000"]}"##,
            r#"{"a": {"b": ["\u0000"]}}"#,
        ] {
            assert!(
                matches!(
                    kind_of(json, "m"),
                    Some(ErrorKind::UnrepresentableCharacter { .. })
                ),
                "{json}"
            );
        }
        assert!(render(r#"{"a": "\u0001"}"#, "m").is_ok());
    }

    #[test]
    fn test_deep_nesting_maps_without_overflow() -> Result<()> {
        let depth = 20_000;
        let json = format!("{}1{}", r#"{"a":["#.repeat(depth), "]}".repeat(depth));
        let value = Parser::with_config(&json, crate::json::Config::unlimited()).parse_document()?;
        let doc = value_to_document(&value, "m")?;

        let mut current = &doc.root;
        let mut levels = 0;
        while let Some(child) = current.child_elements().next() {
            current = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(current.text(), "1");
        Ok(())
    }
}
