//! catalog-dom: Shared DomNode types for catalog renderers
//!
//! This crate defines the Rust representation of the JSON DOM snapshot that the
//! catalog view produces. The HTML renderer and the WASM reducer both consume
//! this type, and the browser-side patcher receives it as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single node in the DOM tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    /// HTML tag name (e.g. "div", "button", "input")
    pub tag: String,

    /// Stable identity for efficient DOM reuse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// HTML attributes (class, placeholder, data-*, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<HashMap<String, String>>,

    /// Map of DOM event name → action name (e.g. "change" → "toggle:official")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<HashMap<String, String>>,

    /// Text content for leaf nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DomNode>>,
}

/// A complete snapshot wrapping the root DomNode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub root: DomNode,
}

impl DomNode {
    /// Create an empty element.
    pub fn el(tag: &str) -> Self {
        DomNode {
            tag: tag.to_string(),
            key: None,
            attrs: None,
            events: None,
            text: None,
            children: None,
        }
    }

    /// Create a simple text node
    pub fn text(tag: &str, content: &str) -> Self {
        DomNode::el(tag).with_text(content)
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.into());
        self
    }

    /// Add a class, appending to any class already set.
    pub fn class(mut self, class: &str) -> Self {
        let attrs = self.attrs.get_or_insert_with(HashMap::new);
        match attrs.get_mut("class") {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(class);
            }
            _ => {
                attrs.insert("class".to_string(), class.to_string());
            }
        }
        self
    }

    /// Bind a DOM event to a named action.
    pub fn on(mut self, event: &str, action: impl Into<String>) -> Self {
        self.events
            .get_or_insert_with(HashMap::new)
            .insert(event.to_string(), action.into());
        self
    }

    pub fn with_text(mut self, content: &str) -> Self {
        self.text = Some(content.to_string());
        self
    }

    pub fn child(mut self, node: DomNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = DomNode>) -> Self {
        self.children.get_or_insert_with(Vec::new).extend(nodes);
        self
    }

    /// Get an attribute if present
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(name).map(|s| s.as_str())
    }

    /// Get a class attribute if present
    pub fn class_name(&self) -> Option<&str> {
        self.get_attr("class")
    }

    /// Check whether the class attribute contains `class` as a whole word.
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name()
            .map(|c| c.split_whitespace().any(|w| w == class))
            .unwrap_or(false)
    }

    /// Check if this node is a head node (for SSR extraction)
    pub fn is_head(&self) -> bool {
        self.tag == "catalog:head"
    }

    /// Iterate over children (empty slice if none)
    pub fn children_iter(&self) -> &[DomNode] {
        match &self.children {
            Some(c) => c,
            None => &[],
        }
    }

    /// Get an event action by event name
    pub fn event(&self, name: &str) -> Option<&str> {
        self.events.as_ref()?.get(name).map(|s| s.as_str())
    }

    /// Depth-first search for the first node with the given key.
    pub fn find_key(&self, key: &str) -> Option<&DomNode> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children_iter().iter().find_map(|c| c.find_key(key))
    }

    /// Depth-first collection of every node carrying `class`.
    pub fn find_all_by_class<'a>(&'a self, class: &str, out: &mut Vec<&'a DomNode>) {
        if self.has_class(class) {
            out.push(self);
        }
        for child in self.children_iter() {
            child.find_all_by_class(class, out);
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(t) = &self.text {
            out.push_str(t);
        }
        for child in self.children_iter() {
            child.collect_text(out);
        }
    }
}

/// Parse a snapshot from a JSON string
pub fn parse_snapshot(json: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let json = r#"{
            "root": {
                "tag": "div",
                "key": "app",
                "children": [
                    { "tag": "h1", "text": "Profiles" },
                    { "tag": "input", "events": { "input": "search_input" } }
                ]
            }
        }"#;

        let snap = parse_snapshot(json).unwrap();
        assert_eq!(snap.root.tag, "div");
        assert_eq!(snap.root.key.as_deref(), Some("app"));
        assert_eq!(snap.root.children_iter().len(), 2);
        assert_eq!(snap.root.children_iter()[1].event("input"), Some("search_input"));
    }

    #[test]
    fn test_builder_appends_classes() {
        let node = DomNode::el("span").class("badge").class("official");
        assert_eq!(node.class_name(), Some("badge official"));
        assert!(node.has_class("official"));
        assert!(!node.has_class("offic"));
    }

    #[test]
    fn test_find_key_and_text_content() {
        let root = DomNode::el("div")
            .key("root")
            .child(DomNode::text("p", "a").key("first"))
            .child(DomNode::el("div").child(DomNode::text("span", "b").key("deep")));
        assert_eq!(root.find_key("deep").and_then(|n| n.text.as_deref()), Some("b"));
        assert!(root.find_key("missing").is_none());
        assert_eq!(root.text_content(), "ab");
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let json = serde_json::to_string(&DomNode::text("p", "hi")).unwrap();
        assert_eq!(json, r#"{"tag":"p","text":"hi"}"#);
    }
}
