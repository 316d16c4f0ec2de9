use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info};

use crate::config::SiteConfig;
use crate::cta::presence::{CtaPresence, Reconciliation};
use crate::cta::visibility::{CtaVisibility, VisibilityState};
use crate::cta::{header_cta, is_cta_click, PageKind};
use crate::events::{Disposition, PageEvent};
use crate::faq::Accordion;
use crate::forms::legacy::LegacyContactForm;
use crate::forms::transport::SubmitError;
use crate::forms::{
    FormController, FormKind, FormSpec, PendingSubmission, PrepareError, SubmissionState,
};
use crate::modal::{InquiryModal, CLOSE_GLOBAL, OPEN_GLOBAL};
use crate::nav::NavDrawer;
use crate::platform::{NodeOf, Platform, Timers};
use crate::viewport::{Viewport, ViewportBucket};

type TimerSlot<P> = RefCell<Option<<<P as Platform>::Timers as Timers>::Handle>>;

/// One page's worth of behavior. Built once per load and shared by every
/// event handler.
pub struct Site<P: Platform> {
    platform: P,
    config: SiteConfig,
    page: PageKind,
    presence: CtaPresence,
    visibility: RefCell<CtaVisibility>,
    inquiry: FormController,
    contact: FormController,
    resize_timer: TimerSlot<P>,
    rescan_timer: TimerSlot<P>,
    this: Weak<Site<P>>,
}

impl<P: Platform> Site<P> {
    pub fn new(platform: P, config: SiteConfig) -> Rc<Self> {
        let page = PageKind::detect(platform.dom(), &platform.viewport().pathname());
        Rc::new_cyclic(|this| Self {
            presence: CtaPresence::new(config.cta_label.clone()),
            visibility: RefCell::new(CtaVisibility::new()),
            inquiry: FormController::new(FormSpec::inquiry()),
            contact: FormController::new(FormSpec::contact_page(&config.contact_endpoint)),
            resize_timer: RefCell::new(None),
            rescan_timer: RefCell::new(None),
            this: this.clone(),
            platform,
            config,
            page,
        })
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn page_kind(&self) -> PageKind {
        self.page
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility.borrow().state()
    }

    pub fn submission_state(&self, kind: FormKind) -> SubmissionState {
        self.form(kind).state()
    }

    fn form(&self, kind: FormKind) -> &FormController {
        match kind {
            FormKind::Inquiry => &self.inquiry,
            FormKind::ContactPage => &self.contact,
        }
    }

    fn bucket(&self) -> ViewportBucket {
        ViewportBucket::classify(self.platform.viewport().inner_width(), &self.config)
    }

    pub fn handle(&self, event: PageEvent<NodeOf<P>>) -> Disposition {
        match event {
            PageEvent::Ready => self.on_ready(),
            PageEvent::Resize => self.on_resize(),
            PageEvent::Scroll => self.on_scroll(),
            PageEvent::Click(target) => return self.on_click(&target),
            PageEvent::KeyDown(key) => self.on_key(&key),
            PageEvent::Submit(form) => return self.on_submit(&form),
            PageEvent::HeaderCtaIntersection(intersecting) => {
                self.visibility.borrow_mut().on_intersection(intersecting);
                self.apply_visibility();
            }
        }
        Disposition::Continue
    }

    /// Attaches the CTA variant that fits the current viewport.
    pub fn reconcile_ctas(&self) -> Reconciliation<NodeOf<P>> {
        let changes = self
            .presence
            .reconcile(self.platform.dom(), self.bucket(), self.page);
        if let Some(header) = &changes.header_created {
            self.observe_header(header);
        }
        changes
    }

    pub fn open_modal(&self) {
        InquiryModal::open(self.platform.dom());
    }

    pub fn close_modal(&self) {
        let dom = self.platform.dom();
        if !InquiryModal::close(dom) {
            return;
        }
        if self.inquiry.state() == SubmissionState::Succeeded {
            self.inquiry.reset(dom);
        }

        // Let the scroll rule decide again once the modal is gone.
        let this = self.this.clone();
        let handle = self.platform.timers().set_timeout(
            self.config.modal_rescan_delay_ms,
            Box::new(move || {
                if let Some(site) = this.upgrade() {
                    let _ = site.handle(PageEvent::Scroll);
                }
            }),
        );
        *self.rescan_timer.borrow_mut() = Some(handle);
    }

    /// Runs the window-level function `name`. Returns false for names this
    /// site does not provide.
    pub fn call_global(&self, name: &str) -> bool {
        match name {
            OPEN_GLOBAL => self.open_modal(),
            CLOSE_GLOBAL => self.close_modal(),
            _ => return false,
        }
        true
    }

    /// The network half of a submission that already passed validation.
    pub async fn complete(&self, pending: PendingSubmission<NodeOf<P>>) -> Result<(), SubmitError> {
        self.form(pending.kind)
            .send(
                self.platform.dom(),
                self.platform.transport(),
                &self.config,
                pending,
            )
            .await
    }

    fn on_ready(&self) {
        let dom = self.platform.dom();
        let viewport = self.platform.viewport();
        let _ = self.reconcile_ctas();

        {
            let mut visibility = self.visibility.borrow_mut();
            let _ = visibility.on_resize(viewport.inner_width(), &self.config);
            visibility.measure_header(dom, viewport);
            visibility.on_scroll(dom, viewport, &self.config);
        }
        if let Some(header) = header_cta(dom) {
            self.observe_header(&header);
        }
        self.apply_visibility();

        info!("Site ready: {:?} page, {:?} viewport", self.page, self.bucket());
    }

    fn on_resize(&self) {
        let this = self.this.clone();
        let handle = self.platform.timers().set_timeout(
            self.config.resize_debounce_ms,
            Box::new(move || {
                if let Some(site) = this.upgrade() {
                    let _ = site.reconcile_ctas();
                    site.apply_visibility();
                }
            }),
        );
        // Replacing the handle cancels the previous, still pending reconcile.
        *self.resize_timer.borrow_mut() = Some(handle);

        let width = self.platform.viewport().inner_width();
        let crossed = self.visibility.borrow_mut().on_resize(width, &self.config);
        if crossed {
            self.apply_visibility();
        }
    }

    fn on_scroll(&self) {
        self.visibility.borrow_mut().on_scroll(
            self.platform.dom(),
            self.platform.viewport(),
            &self.config,
        );
        self.apply_visibility();
    }

    fn on_click(&self, target: &NodeOf<P>) -> Disposition {
        let dom = self.platform.dom();
        if let Some(disposition) = NavDrawer::on_click(dom, target) {
            return disposition;
        }
        if Accordion::on_click(dom, target) {
            return Disposition::Continue;
        }
        if is_cta_click(dom, target) {
            self.open_modal();
        }
        Disposition::Continue
    }

    fn on_key(&self, key: &str) {
        NavDrawer::on_key(self.platform.dom(), key);
        if key == "Escape" {
            self.close_modal();
        }
    }

    fn on_submit(&self, form: &NodeOf<P>) -> Disposition {
        let dom = self.platform.dom();
        let viewport = self.platform.viewport();

        for controller in [&self.inquiry, &self.contact] {
            if !controller.owns(dom, form) {
                continue;
            }
            return match controller.prepare(dom, viewport, &self.config) {
                Ok(pending) => {
                    self.spawn_send(pending);
                    Disposition::PreventDefault
                }
                Err(PrepareError::Invalid(_) | PrepareError::Busy) => Disposition::PreventDefault,
                Err(PrepareError::Unbound) => Disposition::Continue,
            };
        }

        if LegacyContactForm::owns(dom, form) {
            return LegacyContactForm::on_submit(dom, viewport, &self.config, form);
        }
        Disposition::Continue
    }

    fn spawn_send(&self, pending: PendingSubmission<NodeOf<P>>) {
        let Some(site) = self.this.upgrade() else {
            return;
        };
        self.platform.spawn_local(Box::pin(async move {
            let _ = site.complete(pending).await;
        }));
    }

    fn observe_header(&self, header: &NodeOf<P>) {
        let this = self.this.clone();
        let observing = self.platform.observe_intersection(
            header,
            self.config.intersection_threshold,
            Box::new(move |intersecting| {
                if let Some(site) = this.upgrade() {
                    let _ = site.handle(PageEvent::HeaderCtaIntersection(intersecting));
                }
            }),
        );
        if !observing {
            debug!("No intersection observer, measuring header CTA on scroll");
        }
        self.visibility.borrow_mut().set_observing(observing);
    }

    fn apply_visibility(&self) {
        let dom = self.platform.dom();
        self.visibility
            .borrow()
            .apply(dom, InquiryModal::is_open(dom));
    }
}
