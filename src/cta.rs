//! The "Start a Project" call-to-action: which variant exists, and when the
//! floating one is shown.

use crate::dom::{Dom, Selector};
use crate::forms::CONTACT_FORM_ID;

pub mod presence;
pub mod visibility;

pub const HEADER_CONTAINER_CLASS: &str = "header-content";
pub const HEADER_CTA_CLASS: &str = "btn-nav-modal";
pub const FLOATING_CTA_CLASS: &str = "btn-nav-modal-mobile";
pub const VISIBLE_CLASS: &str = "visible";
pub const OPEN_MODAL_HANDLER: &str = "openProjectModal()";

const HEADER_CTA: Selector<'static> = Selector::ClassWithin {
    ancestor: HEADER_CONTAINER_CLASS,
    class: HEADER_CTA_CLASS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Contact,
    Other,
}

impl PageKind {
    /// Decided once per page load from the contact form's presence or the URL.
    pub fn detect<D: Dom>(dom: &D, pathname: &str) -> Self {
        let is_contact = dom.query(None, &Selector::Id(CONTACT_FORM_ID)).is_some()
            || pathname.contains("contact.html")
            || pathname.ends_with("/contact")
            || pathname.ends_with("/contact/");
        if is_contact {
            PageKind::Contact
        } else {
            PageKind::Other
        }
    }
}

pub fn header_container<D: Dom>(dom: &D) -> Option<D::Node> {
    dom.query(None, &Selector::Class(HEADER_CONTAINER_CLASS))
}

pub fn header_cta<D: Dom>(dom: &D) -> Option<D::Node> {
    dom.query(None, &HEADER_CTA)
}

pub fn floating_cta<D: Dom>(dom: &D) -> Option<D::Node> {
    dom.query(None, &Selector::Class(FLOATING_CTA_CLASS))
}

/// True when `target` sits inside either CTA variant.
pub fn is_cta_click<D: Dom>(dom: &D, target: &D::Node) -> bool {
    dom.closest(target, &HEADER_CTA).is_some()
        || dom.closest(target, &Selector::Class(FLOATING_CTA_CLASS)).is_some()
}
