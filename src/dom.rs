//! The slice of the document the site behaviors read and mutate.
//!
//! Every lookup hands back an `Option` (or an empty `Vec`). Callers treat a
//! missing element as "feature not present on this page" and move on.

use std::fmt;

#[cfg(any(test, feature = "headless"))]
pub mod memory;

/// Element selectors the behaviors need. Kept deliberately small so the
/// in-memory document can match them without a CSS engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    Id(&'a str),
    Class(&'a str),
    /// Element with `class` that has an ancestor with class `ancestor`.
    ClassWithin { ancestor: &'a str, class: &'a str },
    Tag(&'a str),
    /// `button[type="submit"]`
    SubmitButton,
}

impl Selector<'_> {
    pub fn to_css(&self) -> String {
        match self {
            Selector::Id(id) => format!("#{}", id),
            Selector::Class(class) => format!(".{}", class),
            Selector::ClassWithin { ancestor, class } => format!(".{} .{}", ancestor, class),
            Selector::Tag(tag) => tag.to_string(),
            Selector::SubmitButton => r#"button[type="submit"]"#.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    fn body(&self) -> Option<Self::Node>;

    /// First match in document order, searching below `scope` (or the whole
    /// document when `scope` is `None`).
    fn query(&self, scope: Option<&Self::Node>, selector: &Selector) -> Option<Self::Node>;
    fn query_all(&self, scope: Option<&Self::Node>, selector: &Selector) -> Vec<Self::Node>;
    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &Selector) -> Option<Self::Node>;
    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn is_connected(&self, node: &Self::Node) -> bool;

    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn prepend_child(&self, parent: &Self::Node, child: &Self::Node);
    fn remove(&self, node: &Self::Node);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn text(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);
    /// Current value of an input, select or textarea. Empty for anything else.
    fn value(&self, node: &Self::Node) -> String;
    fn set_disabled(&self, node: &Self::Node, disabled: bool);
    fn is_disabled(&self, node: &Self::Node) -> bool;
    /// An empty `value` clears the inline property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    fn focus(&self, node: &Self::Node);
    fn scroll_into_view(&self, node: &Self::Node);
    fn bounding_rect(&self, node: &Self::Node) -> Option<Rect>;

    /// Restores every control of `form` to its markup default.
    fn reset_form(&self, form: &Self::Node);
    /// Named, enabled controls of `form` in document order.
    fn form_fields(&self, form: &Self::Node) -> Vec<(String, String)>;
}
