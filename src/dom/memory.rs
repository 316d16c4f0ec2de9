//! In-memory document used by the headless platform and the tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{Dom, Rect, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

const DOCUMENT: NodeId = NodeId(0);

#[derive(Debug, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    style: BTreeMap<String, String>,
    rect: Option<Rect>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
pub struct MemoryDom {
    nodes: RefCell<Vec<Element>>,
    body: NodeId,
    focused: Cell<Option<NodeId>>,
    scrolled: RefCell<Vec<NodeId>>,
    mutations: Cell<u64>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document holding just `<body>`.
    pub fn new() -> Self {
        let document = Element {
            tag: "#document".to_string(),
            children: vec![NodeId(1)],
            ..Element::default()
        };
        let body = Element {
            tag: "body".to_string(),
            parent: Some(DOCUMENT),
            ..Element::default()
        };
        Self {
            nodes: RefCell::new(vec![document, body]),
            body: NodeId(1),
            focused: Cell::new(None),
            scrolled: RefCell::new(Vec::new()),
            mutations: Cell::new(0),
        }
    }

    pub fn body_id(&self) -> NodeId {
        self.body
    }

    /// Appends a new element described as `tag#id.class.class` (id and
    /// classes optional) under `parent` and returns it.
    pub fn spawn(&self, parent: &NodeId, spec: &str) -> NodeId {
        let (head, classes) = match spec.split_once('.') {
            Some((head, rest)) => (head, rest.split('.').collect::<Vec<_>>()),
            None => (spec, Vec::new()),
        };
        let (tag, id) = match head.split_once('#') {
            Some((tag, id)) => (tag, Some(id)),
            None => (head, None),
        };
        let node = self.alloc(tag);
        {
            let mut nodes = self.nodes.borrow_mut();
            let element = &mut nodes[node.0];
            if let Some(id) = id {
                element.attributes.insert("id".to_string(), id.to_string());
            }
            element.classes = classes.into_iter().map(str::to_string).collect();
        }
        self.append_child(parent, &node);
        node
    }

    /// Simulates the visitor typing into (or choosing) a control.
    pub fn set_value(&self, node: &NodeId, value: &str) {
        self.nodes.borrow_mut()[node.0].value = value.to_string();
    }

    pub fn set_rect(&self, node: &NodeId, rect: Rect) {
        self.nodes.borrow_mut()[node.0].rect = Some(rect);
    }

    pub fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[node.0].style.get(property).cloned()
    }

    pub fn tag(&self, node: &NodeId) -> String {
        self.nodes.borrow()[node.0].tag.clone()
    }

    pub fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get()
    }

    pub fn scrolled_into_view(&self) -> Vec<NodeId> {
        self.scrolled.borrow().clone()
    }

    /// Count of document mutations so far (structure, classes, attributes,
    /// text, inline style, disabled state).
    pub fn mutation_count(&self) -> u64 {
        self.mutations.get()
    }

    pub fn count(&self, selector: &Selector) -> usize {
        self.query_all(None, selector).len()
    }

    fn alloc(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        });
        NodeId(nodes.len() - 1)
    }

    fn touch(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }

    fn detach(&self, node: &NodeId) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = nodes[node.0].parent.take() else {
            return false;
        };
        nodes[parent.0].children.retain(|child| child != node);
        true
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let nodes = self.nodes.borrow();
        let element = &nodes[node.0];
        match selector {
            Selector::Id(id) => element.attributes.get("id").map(String::as_str) == Some(*id),
            Selector::Class(class) => element.classes.iter().any(|c| c == class),
            Selector::ClassWithin { ancestor, class } => {
                if !element.classes.iter().any(|c| c == class) {
                    return false;
                }
                let mut cursor = element.parent;
                while let Some(id) = cursor {
                    if nodes[id.0].classes.iter().any(|c| c == ancestor) {
                        return true;
                    }
                    cursor = nodes[id.0].parent;
                }
                false
            }
            Selector::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Selector::SubmitButton => {
                element.tag == "button"
                    && element.attributes.get("type").map(String::as_str) == Some("submit")
            }
        }
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes[root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn is_control(tag: &str) -> bool {
        matches!(tag, "input" | "select" | "textarea")
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn query(&self, scope: Option<&NodeId>, selector: &Selector) -> Option<NodeId> {
        let root = scope.copied().unwrap_or(DOCUMENT);
        self.descendants(root)
            .into_iter()
            .find(|id| self.matches(*id, selector))
    }

    fn query_all(&self, scope: Option<&NodeId>, selector: &Selector) -> Vec<NodeId> {
        let root = scope.copied().unwrap_or(DOCUMENT);
        self.descendants(root)
            .into_iter()
            .filter(|id| self.matches(*id, selector))
            .collect()
    }

    fn closest(&self, node: &NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(*node);
        while let Some(id) = cursor {
            if id != DOCUMENT && self.matches(id, selector) {
                return Some(id);
            }
            cursor = self.nodes.borrow()[id.0].parent;
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut cursor = Some(*node);
        while let Some(id) = cursor {
            if id == *ancestor {
                return true;
            }
            cursor = self.nodes.borrow()[id.0].parent;
        }
        false
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent.filter(|p| *p != DOCUMENT)
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.contains(&DOCUMENT, node)
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.alloc(tag))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(*parent);
        nodes[parent.0].children.push(*child);
        drop(nodes);
        self.touch();
    }

    fn prepend_child(&self, parent: &NodeId, child: &NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(*parent);
        nodes[parent.0].children.insert(0, *child);
        drop(nodes);
        self.touch();
    }

    fn remove(&self, node: &NodeId) {
        if self.detach(node) {
            self.touch();
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        self.nodes.borrow_mut()[node.0].classes.push(class.to_string());
        self.touch();
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        self.nodes.borrow_mut()[node.0].classes.retain(|c| c != class);
        self.touch();
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let previous = self.nodes.borrow_mut()[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.touch();
        }
    }

    fn text(&self, node: &NodeId) -> String {
        let mut text = self.nodes.borrow()[node.0].text.clone();
        for child in self.descendants(*node) {
            text.push_str(&self.nodes.borrow()[child.0].text);
        }
        text
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        let children = self.children(node);
        for child in &children {
            self.detach(child);
        }
        let mut nodes = self.nodes.borrow_mut();
        let changed = nodes[node.0].text != text || !children.is_empty();
        nodes[node.0].text = text.to_string();
        drop(nodes);
        if changed {
            self.touch();
        }
    }

    fn value(&self, node: &NodeId) -> String {
        let nodes = self.nodes.borrow();
        let element = &nodes[node.0];
        if Self::is_control(&element.tag) {
            element.value.clone()
        } else {
            String::new()
        }
    }

    fn set_disabled(&self, node: &NodeId, disabled: bool) {
        let mut nodes = self.nodes.borrow_mut();
        if nodes[node.0].disabled == disabled {
            return;
        }
        nodes[node.0].disabled = disabled;
        drop(nodes);
        self.touch();
    }

    fn is_disabled(&self, node: &NodeId) -> bool {
        self.nodes.borrow()[node.0].disabled
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let style = &mut nodes[node.0].style;
        let changed = if value.is_empty() {
            style.remove(property).is_some()
        } else {
            style.insert(property.to_string(), value.to_string()).as_deref() != Some(value)
        };
        drop(nodes);
        if changed {
            self.touch();
        }
    }

    fn focus(&self, node: &NodeId) {
        self.focused.set(Some(*node));
    }

    fn scroll_into_view(&self, node: &NodeId) {
        self.scrolled.borrow_mut().push(*node);
    }

    fn bounding_rect(&self, node: &NodeId) -> Option<Rect> {
        Some(self.nodes.borrow()[node.0].rect.unwrap_or_default())
    }

    fn reset_form(&self, form: &NodeId) {
        for id in self.descendants(*form) {
            let mut nodes = self.nodes.borrow_mut();
            let element = &mut nodes[id.0];
            if !Self::is_control(&element.tag) {
                continue;
            }
            element.value = if element.tag == "textarea" {
                element.text.clone()
            } else {
                element.attributes.get("value").cloned().unwrap_or_default()
            };
        }
    }

    fn form_fields(&self, form: &NodeId) -> Vec<(String, String)> {
        let nodes = self.nodes.borrow();
        self.descendants(*form)
            .into_iter()
            .filter_map(|id| {
                let element = &nodes[id.0];
                if !Self::is_control(&element.tag) || element.disabled {
                    return None;
                }
                let name = element.attributes.get("name")?;
                let kind = element.attributes.get("type").map(String::as_str).unwrap_or("");
                match kind {
                    "submit" | "button" | "reset" | "file" | "image" => return None,
                    "checkbox" | "radio" if !element.attributes.contains_key("checked") => {
                        return None
                    }
                    _ => {}
                }
                Some((name.clone(), element.value.clone()))
            })
            .collect()
    }
}
