//! A browser-free [`Platform`]: in-memory document, hand-cranked timers and a
//! scripted form backend. Tests drive the site through it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::dom::memory::{MemoryDom, NodeId};
use crate::events::{Disposition, EventKind, EventSource, Handler, PageEvent};
use crate::forms::transport::{SubmitError, SubmitResponse, Transport};
use crate::platform::{Platform, Timers};
use crate::viewport::Viewport;

#[derive(Debug)]
pub struct HeadlessViewport {
    width: Cell<f64>,
    height: Cell<f64>,
    scroll_y: Cell<f64>,
    pathname: RefCell<String>,
    alerts: RefCell<Vec<String>>,
    navigations: RefCell<Vec<String>>,
}

impl HeadlessViewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Cell::new(width),
            height: Cell::new(height),
            scroll_y: Cell::new(0.0),
            pathname: RefCell::new("/".to_string()),
            alerts: RefCell::new(Vec::new()),
            navigations: RefCell::new(Vec::new()),
        }
    }

    pub fn resize(&self, width: f64) {
        self.width.set(width);
    }

    pub fn scroll_to(&self, y: f64) {
        self.scroll_y.set(y);
    }

    pub fn set_pathname(&self, pathname: &str) {
        *self.pathname.borrow_mut() = pathname.to_string();
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }
}

impl Viewport for HeadlessViewport {
    fn inner_width(&self) -> f64 {
        self.width.get()
    }

    fn inner_height(&self) -> f64 {
        self.height.get()
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn pathname(&self) -> String {
        self.pathname.borrow().clone()
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }
}

struct PendingTimer {
    due: u64,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnOnce()>,
}

/// Timers that only fire when [`ManualTimers::advance`] moves the clock.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<u64>,
    seq: Cell<u64>,
    pending: RefCell<Vec<PendingTimer>>,
}

pub struct ManualTimeout {
    cancelled: Rc<Cell<bool>>,
}

impl Drop for ManualTimeout {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Live (not yet fired, not cancelled) timers.
    pub fn pending(&self) -> usize {
        self.pending
            .borrow()
            .iter()
            .filter(|timer| !timer.cancelled.get())
            .count()
    }

    /// Moves the clock forward, firing due callbacks in deadline order.
    pub fn advance(&self, millis: u64) {
        let target = self.now.get() + millis;
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                pending.retain(|timer| !timer.cancelled.get());
                let index = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.seq))
                    .map(|(index, _)| index);
                index.map(|index| pending.remove(index))
            };
            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            (timer.callback)();
        }
        self.now.set(target);
    }
}

impl Timers for ManualTimers {
    type Handle = ManualTimeout;

    fn set_timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> ManualTimeout {
        let cancelled = Rc::new(Cell::new(false));
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.pending.borrow_mut().push(PendingTimer {
            due: self.now.get() + u64::from(millis),
            seq,
            cancelled: cancelled.clone(),
            callback,
        });
        ManualTimeout { cancelled }
    }
}

/// Form backend that replays queued responses and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<SubmitResponse, SubmitError>>>,
    requests: RefCell<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .push_back(Ok(SubmitResponse::new(status, body)));
    }

    pub fn push_failure(&self, reason: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(SubmitError::Network(reason.to_string())));
    }

    /// `(endpoint, body)` pairs in send order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, endpoint: &str, body: String) -> Result<SubmitResponse, SubmitError> {
        self.requests.borrow_mut().push((endpoint.to_string(), body));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SubmitError::Network("no scripted response".to_string())))
    }
}

pub struct HeadlessPlatform {
    pub dom: MemoryDom,
    pub viewport: HeadlessViewport,
    pub timers: ManualTimers,
    pub transport: ScriptedTransport,
    tasks: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
    intersection_supported: bool,
    observed: RefCell<Option<NodeId>>,
    intersection_callback: RefCell<Option<Rc<dyn Fn(bool)>>>,
}

impl HeadlessPlatform {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            dom: MemoryDom::new(),
            viewport: HeadlessViewport::new(width, height),
            timers: ManualTimers::new(),
            transport: ScriptedTransport::new(),
            tasks: RefCell::new(Vec::new()),
            intersection_supported: false,
            observed: RefCell::new(None),
            intersection_callback: RefCell::new(None),
        }
    }

    /// Pretends the host has an intersection observer.
    pub fn with_intersection_observer(mut self) -> Self {
        self.intersection_supported = true;
        self
    }

    pub fn observed(&self) -> Option<NodeId> {
        *self.observed.borrow()
    }

    /// Delivers an intersection change for the observed node.
    pub fn report_intersection(&self, intersecting: bool) {
        let callback = self.intersection_callback.borrow().clone();
        if let Some(callback) = callback {
            callback(intersecting);
        }
    }

    /// Drives every spawned task (and any they spawn) to completion.
    pub fn run_pending(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                futures::executor::block_on(task);
            }
        }
    }
}

impl Platform for HeadlessPlatform {
    type Dom = MemoryDom;
    type Viewport = HeadlessViewport;
    type Timers = ManualTimers;
    type Transport = ScriptedTransport;

    fn dom(&self) -> &MemoryDom {
        &self.dom
    }

    fn viewport(&self) -> &HeadlessViewport {
        &self.viewport
    }

    fn timers(&self) -> &ManualTimers {
        &self.timers
    }

    fn transport(&self) -> &ScriptedTransport {
        &self.transport
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push(task);
    }

    fn observe_intersection(
        &self,
        node: &NodeId,
        _threshold: f64,
        on_change: Box<dyn Fn(bool)>,
    ) -> bool {
        if !self.intersection_supported {
            return false;
        }
        *self.observed.borrow_mut() = Some(*node);
        *self.intersection_callback.borrow_mut() = Some(Rc::from(on_change));
        true
    }
}

/// Event source whose listeners fire when a test calls [`HeadlessEvents::fire`].
#[derive(Default)]
pub struct HeadlessEvents {
    handlers: RefCell<Vec<(EventKind, Handler<NodeId>)>>,
}

impl HeadlessEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Dispatches to every listener for the event's kind and returns the
    /// strongest disposition any of them asked for.
    pub fn fire(&self, event: PageEvent<NodeId>) -> Disposition {
        let Some(kind) = event.kind() else {
            return Disposition::Continue;
        };
        let handlers: Vec<Handler<NodeId>> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, handler)| handler.clone())
            .collect();
        handlers
            .into_iter()
            .map(|handler| handler(event.clone()))
            .max()
            .unwrap_or(Disposition::Continue)
    }
}

impl EventSource<NodeId> for HeadlessEvents {
    fn listen(&self, kind: EventKind, handler: Handler<NodeId>) {
        self.handlers.borrow_mut().push((kind, handler));
    }
}

/// Page markup matching what the production templates ship.
pub mod markup {
    use crate::dom::memory::{MemoryDom, NodeId};
    use crate::dom::Dom;

    #[derive(Debug, Clone, Copy)]
    pub struct InquiryForm {
        pub form: NodeId,
        pub name: NodeId,
        pub email: NodeId,
        pub business_type: NodeId,
        pub submit: NodeId,
    }

    #[derive(Debug, Clone)]
    pub struct Page {
        pub header_container: NodeId,
        pub header_cta: NodeId,
        pub nav_toggle: NodeId,
        pub nav: NodeId,
        pub nav_link: NodeId,
        pub faq_items: Vec<NodeId>,
        pub faq_questions: Vec<NodeId>,
        pub modal: NodeId,
        pub inquiry: InquiryForm,
        pub inquiry_success: NodeId,
        pub main: NodeId,
        pub contact: Option<(InquiryForm, NodeId)>,
    }

    fn group(dom: &MemoryDom, form: &NodeId, spec: &str, name: &str) -> NodeId {
        let group = dom.spawn(form, "div.form-group");
        let field = dom.spawn(&group, spec);
        dom.set_attribute(&field, "name", name);
        field
    }

    fn build_form(dom: &MemoryDom, parent: &NodeId, ids: [&str; 4], label: &str) -> InquiryForm {
        let form = dom.spawn(parent, &format!("form#{}", ids[0]));
        let form_name = dom.spawn(&form, "input");
        dom.set_attribute(&form_name, "type", "hidden");
        dom.set_attribute(&form_name, "name", "form-name");
        dom.set_attribute(&form_name, "value", ids[0]);
        dom.set_value(&form_name, ids[0]);

        let name = group(dom, &form, &format!("input#{}", ids[1]), "name");
        let email = group(dom, &form, &format!("input#{}", ids[2]), "email");
        dom.set_attribute(&email, "type", "email");
        let business_type = group(dom, &form, &format!("select#{}", ids[3]), "business-type");
        for option in ["", "retail", "services", "hospitality"] {
            let node = dom.spawn(&business_type, "option");
            dom.set_attribute(&node, "value", option);
        }

        let submit = dom.spawn(&form, "button.btn-primary");
        dom.set_attribute(&submit, "type", "submit");
        dom.set_text(&submit, label);
        InquiryForm { form, name, email, business_type, submit }
    }

    pub fn inquiry_form(dom: &MemoryDom, parent: &NodeId) -> InquiryForm {
        build_form(dom, parent, ["project-inquiry-form", "name", "email", "business-type"], "Send Inquiry")
    }

    pub fn contact_form(dom: &MemoryDom, parent: &NodeId) -> InquiryForm {
        build_form(
            dom,
            parent,
            ["contact-page-form", "contact-name", "contact-email", "contact-business-type"],
            "Send Message",
        )
    }

    pub fn fill_inquiry(dom: &MemoryDom, form: &InquiryForm, name: &str, email: &str, business_type: &str) {
        dom.set_value(&form.name, name);
        dom.set_value(&form.email, email);
        dom.set_value(&form.business_type, business_type);
    }

    /// Header with CTA, nav drawer, three FAQ entries and the inquiry modal.
    pub fn landing_page(dom: &MemoryDom) -> Page {
        let body = dom.body_id();
        let header = dom.spawn(&body, "header.header");
        let header_container = dom.spawn(&header, "div.header-content");
        dom.spawn(&header_container, "a.logo");
        let nav_toggle = dom.spawn(&header_container, "button.nav-toggle");
        dom.spawn(&nav_toggle, "span.hamburger");
        let nav = dom.spawn(&header_container, "nav.nav");
        let list = dom.spawn(&nav, "ul.nav-list");
        let item = dom.spawn(&list, "li");
        let nav_link = dom.spawn(&item, "a.nav-link");
        dom.set_attribute(&nav_link, "href", "/services");
        let header_cta = dom.spawn(&header_container, "button.btn-nav-modal");
        dom.set_attribute(&header_cta, "onclick", "openProjectModal()");
        dom.set_text(&header_cta, "Start a Project");

        let main = dom.spawn(&body, "main");
        let faq = dom.spawn(&main, "section.faq");
        let mut faq_items = Vec::new();
        let mut faq_questions = Vec::new();
        for _ in 0..3 {
            let item = dom.spawn(&faq, "div.faq-item");
            faq_questions.push(dom.spawn(&item, "button.faq-question"));
            dom.spawn(&item, "div.faq-answer");
            faq_items.push(item);
        }

        let modal = dom.spawn(&body, "div#projectModal.modal");
        let content = dom.spawn(&modal, "div.modal-content");
        let inquiry = inquiry_form(dom, &content);
        let inquiry_success = dom.spawn(&content, "div#form-success.form-success");
        dom.set_style(&inquiry_success, "display", "none");

        Page {
            header_container,
            header_cta,
            nav_toggle,
            nav,
            nav_link,
            faq_items,
            faq_questions,
            modal,
            inquiry,
            inquiry_success,
            main,
            contact: None,
        }
    }

    /// The landing layout plus the standalone contact form.
    pub fn contact_page(dom: &MemoryDom) -> Page {
        let mut page = landing_page(dom);
        let section = dom.spawn(&page.main, "section.contact");
        let form = contact_form(dom, &section);
        let success = dom.spawn(&section, "div#contact-form-success");
        dom.set_style(&success, "display", "none");
        page.contact = Some((form, success));
        page
    }
}
