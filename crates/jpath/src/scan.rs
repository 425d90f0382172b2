//! Recursive descent over a node and all of its descendants.
use serde_json::Value;
use std::slice;

enum Frame<'a> {
    Node(&'a Value),
    Elements(slice::Iter<'a, Value>),
    Properties(serde_json::map::Iter<'a>),
}

/// Lazy pre-order traversal yielding `(key, value)` entries.
///
/// Every node appears once with a `None` key. Object property values
/// additionally appear once with `Some(key)`, immediately before their own
/// `None` entry.
pub struct ScanValues<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> ScanValues<'a> {
    pub fn new(node: &'a Value) -> Self {
        Self {
            stack: vec![Frame::Node(node)],
        }
    }

    fn push_children(&mut self, node: &'a Value) {
        match node {
            Value::Array(items) => self.stack.push(Frame::Elements(items.iter())),
            Value::Object(map) => self.stack.push(Frame::Properties(map.iter())),
            _ => {}
        }
    }
}

impl<'a> Iterator for ScanValues<'a> {
    type Item = (Option<&'a str>, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.last_mut()? {
                Frame::Node(node) => {
                    let node = *node;
                    self.stack.pop();
                    self.push_children(node);
                    return Some((None, node));
                }
                Frame::Elements(items) => match items.next() {
                    Some(item) => self.stack.push(Frame::Node(item)),
                    None => {
                        self.stack.pop();
                    }
                },
                Frame::Properties(props) => match props.next() {
                    Some((key, value)) => {
                        self.stack.push(Frame::Node(value));
                        return Some((Some(key.as_str()), value));
                    }
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
    }
}

pub fn scan_values(node: &Value) -> ScanValues<'_> {
    ScanValues::new(node)
}
