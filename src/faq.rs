use crate::dom::{Dom, Selector};

pub const ITEM_CLASS: &str = "faq-item";
pub const QUESTION_CLASS: &str = "faq-question";
pub const OPEN_CLASS: &str = "active";

/// FAQ accordion: at most one item open.
pub struct Accordion;

impl Accordion {
    /// Returns true when `target` was inside a question.
    pub fn on_click<D: Dom>(dom: &D, target: &D::Node) -> bool {
        let Some(question) = dom.closest(target, &Selector::Class(QUESTION_CLASS)) else {
            return false;
        };
        let Some(item) = dom.parent(&question) else {
            return true;
        };
        let was_open = dom.has_class(&item, OPEN_CLASS);

        for other in dom.query_all(None, &Selector::Class(ITEM_CLASS)) {
            dom.remove_class(&other, OPEN_CLASS);
        }
        if !was_open {
            dom.add_class(&item, OPEN_CLASS);
        }
        true
    }

    pub fn open_items<D: Dom>(dom: &D) -> Vec<D::Node> {
        dom.query_all(None, &Selector::Class(ITEM_CLASS))
            .into_iter()
            .filter(|item| dom.has_class(item, OPEN_CLASS))
            .collect()
    }
}
