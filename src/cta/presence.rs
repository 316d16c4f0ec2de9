use log::{debug, info};

use super::{
    floating_cta, header_container, header_cta, PageKind, FLOATING_CTA_CLASS, HEADER_CTA_CLASS,
    OPEN_MODAL_HANDLER,
};
use crate::dom::Dom;
use crate::viewport::ViewportBucket;

/// DOM changes made by one [`CtaPresence::reconcile`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<N> {
    pub header_removed: bool,
    pub floating_removed: bool,
    pub header_created: Option<N>,
    pub floating_created: Option<N>,
}

impl<N> Default for Reconciliation<N> {
    fn default() -> Self {
        Self {
            header_removed: false,
            floating_removed: false,
            header_created: None,
            floating_created: None,
        }
    }
}

impl<N> Reconciliation<N> {
    pub fn is_noop(&self) -> bool {
        !self.header_removed
            && !self.floating_removed
            && self.header_created.is_none()
            && self.floating_created.is_none()
    }
}

/// Keeps exactly the CTA variant that fits the viewport attached.
pub struct CtaPresence {
    label: String,
}

impl CtaPresence {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    pub fn reconcile<D: Dom>(
        &self,
        dom: &D,
        bucket: ViewportBucket,
        page: PageKind,
    ) -> Reconciliation<D::Node> {
        let mut changes = Reconciliation::default();
        let header = header_cta(dom);
        let floating = floating_cta(dom);

        if bucket.is_mobile_or_tablet() {
            if let Some(header) = header {
                dom.remove(&header);
                changes.header_removed = true;
            }
            match (floating, page) {
                (None, PageKind::Other) => {
                    changes.floating_created = self.create_floating(dom);
                }
                (Some(floating), PageKind::Contact) => {
                    dom.remove(&floating);
                    changes.floating_removed = true;
                }
                _ => {}
            }
        } else {
            if let Some(floating) = floating {
                dom.remove(&floating);
                changes.floating_removed = true;
            }
            if header.is_none() {
                changes.header_created = self.create_header(dom);
            }
        }

        if !changes.is_noop() {
            info!("CTA reconciled for {:?} on {:?} page: {:?}", bucket, page, changes);
        }
        changes
    }

    fn create_floating<D: Dom>(&self, dom: &D) -> Option<D::Node> {
        let body = dom.body()?;
        let button = dom.create_element("button")?;
        dom.add_class(&button, FLOATING_CTA_CLASS);
        dom.set_attribute(&button, "onclick", OPEN_MODAL_HANDLER);
        dom.set_attribute(&button, "aria-label", &self.label);
        dom.set_text(&button, &self.label);
        dom.append_child(&body, &button);
        Some(button)
    }

    fn create_header<D: Dom>(&self, dom: &D) -> Option<D::Node> {
        let Some(container) = header_container(dom) else {
            debug!("No header container, skipping header CTA");
            return None;
        };
        let button = dom.create_element("button")?;
        dom.add_class(&button, HEADER_CTA_CLASS);
        dom.set_attribute(&button, "onclick", OPEN_MODAL_HANDLER);
        dom.set_text(&button, &self.label);
        dom.append_child(&container, &button);
        Some(button)
    }
}
