use log::info;

use crate::cta::{floating_cta, VISIBLE_CLASS};
use crate::dom::{Dom, Selector};

pub const MODAL_ID: &str = "projectModal";
pub const ACTIVE_CLASS: &str = "active";

pub const OPEN_GLOBAL: &str = "openProjectModal";
pub const CLOSE_GLOBAL: &str = "closeProjectModal";
/// Functions the page's inline handlers call on `window`.
pub const GLOBAL_FUNCTIONS: [&str; 2] = [OPEN_GLOBAL, CLOSE_GLOBAL];

/// The project-inquiry dialog. Open state is the `active` class on
/// `#projectModal`.
pub struct InquiryModal;

impl InquiryModal {
    fn node<D: Dom>(dom: &D) -> Option<D::Node> {
        dom.query(None, &Selector::Id(MODAL_ID))
    }

    pub fn is_open<D: Dom>(dom: &D) -> bool {
        Self::node(dom).is_some_and(|modal| dom.has_class(&modal, ACTIVE_CLASS))
    }

    /// Returns false when the page has no modal.
    pub fn open<D: Dom>(dom: &D) -> bool {
        let Some(modal) = Self::node(dom) else {
            return false;
        };
        dom.add_class(&modal, ACTIVE_CLASS);
        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "hidden");
        }
        if let Some(floating) = floating_cta(dom) {
            dom.remove_class(&floating, VISIBLE_CLASS);
        }
        info!("Inquiry modal opened");
        true
    }

    /// Returns false when nothing was open.
    pub fn close<D: Dom>(dom: &D) -> bool {
        let Some(modal) = Self::node(dom) else {
            return false;
        };
        if !dom.has_class(&modal, ACTIVE_CLASS) {
            return false;
        }
        dom.remove_class(&modal, ACTIVE_CLASS);
        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "");
        }
        info!("Inquiry modal closed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDom;

    #[test]
    fn open_hides_floating_and_locks_scroll() {
        let dom = MemoryDom::new();
        let modal = dom.spawn(&dom.body_id(), "div#projectModal.modal");
        let floating = dom.spawn(&dom.body_id(), "button.btn-nav-modal-mobile.visible");

        assert!(InquiryModal::open(&dom));
        assert!(dom.has_class(&modal, "active"));
        assert!(!dom.has_class(&floating, "visible"));
        assert_eq!(dom.style(&dom.body_id(), "overflow").as_deref(), Some("hidden"));

        assert!(InquiryModal::close(&dom));
        assert!(!InquiryModal::is_open(&dom));
        assert_eq!(dom.style(&dom.body_id(), "overflow"), None);
        assert!(!InquiryModal::close(&dom));
    }

    #[test]
    fn missing_modal_is_a_noop() {
        let dom = MemoryDom::new();
        assert!(!InquiryModal::open(&dom));
        assert!(!InquiryModal::close(&dom));
        assert_eq!(dom.mutation_count(), 0);
    }
}
