//! XML document -> JSON value mapping

use crate::convert::coerce::coerce_text;
use crate::convert::{ATTRIBUTE_PREFIX, ConvertOptions, TEXT_KEY};
use crate::error::{Error, ErrorKind, Result};
use crate::value::{Array, Object, Value};
use crate::xml::model::{Document, Element, Node};

/// Map a parsed document, wrapping or unwrapping the root per `options`
pub(crate) fn document_to_value(doc: &Document, options: &ConvertOptions) -> Result<Value> {
    let content = element_to_value(&doc.root);

    if !options.unwrap_root {
        let mut wrapper = Object::with_capacity(1);
        wrapper.insert(doc.root.name.clone(), content);
        return Ok(Value::Object(wrapper));
    }

    if doc.root.name != options.root_tag {
        return Err(Error::bare(ErrorKind::RootMismatch {
            expected: options.root_tag.clone(),
            found: doc.root.name.clone(),
        }));
    }

    Ok(match content {
        Value::Object(obj) => Value::Object(obj),
        Value::Null => Value::Object(Object::new()),
        scalar => {
            let mut obj = Object::with_capacity(1);
            obj.insert(TEXT_KEY, scalar);
            Value::Object(obj)
        }
    })
}

/// Leaf elements become coerced scalars, everything else an object.
///
/// Open elements are kept on an explicit stack, so nesting depth is not
/// limited by the call stack.
pub(crate) fn element_to_value(element: &Element) -> Value {
    if is_leaf(element) {
        return coerce_text(&element.text());
    }

    let mut open = vec![Frame::new(element)];
    while let Some(frame) = open.last_mut() {
        match frame.children.next() {
            Some(Node::Element(child)) if is_leaf(child) => {
                insert_grouped(&mut frame.obj, &child.name, coerce_text(&child.text()));
            }
            Some(Node::Element(child)) => open.push(Frame::new(child)),
            Some(Node::Text(_)) => {}
            None => {
                let Some(done) = open.pop() else {
                    break;
                };
                let value = Value::Object(done.obj);
                match open.last_mut() {
                    Some(parent) => insert_grouped(&mut parent.obj, &done.element.name, value),
                    None => return value,
                }
            }
        }
    }
    Value::Null
}

/// Element whose child elements are still being mapped
struct Frame<'e> {
    element: &'e Element,
    children: std::slice::Iter<'e, Node>,
    obj: Object,
}

impl<'e> Frame<'e> {
    /// Attributes and text go in first, child elements follow as they close
    fn new(element: &'e Element) -> Self {
        let mut obj = Object::with_capacity(element.attributes.len() + element.children.len());

        for (name, value) in &element.attributes {
            obj.insert(
                format!("{ATTRIBUTE_PREFIX}{name}"),
                Value::String(value.clone()),
            );
        }

        let text = element.text();
        if !text.is_empty() {
            obj.insert(TEXT_KEY, coerce_text(&text));
        }

        Self {
            element,
            children: element.children.iter(),
            obj,
        }
    }
}

fn is_leaf(element: &Element) -> bool {
    element.attributes.is_empty() && !element.has_child_elements()
}

fn insert_grouped(obj: &mut Object, name: &str, value: Value) {
    match obj.get_mut(name) {
        // element values are never arrays, so an array here is a sibling group
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = Value::Array(Array::from(vec![first, value]));
        }
        None => {
            obj.insert(name, value);
        }
    }
}
