//! Browser host: `web-sys` document and window, gloo timers and HTTP, and the
//! listeners that feed page events into the [`Site`].

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    js_sys, AddEventListenerOptions, Document, Element, Event, EventTarget, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, Window,
};

use crate::config::SiteConfig;
use crate::events::{self, Disposition, EventKind, EventSource, Handler, PageEvent};
use crate::forms::transport::{SubmitError, SubmitResponse, Transport, FORM_CONTENT_TYPE};
use crate::modal::GLOBAL_FUNCTIONS;
use crate::platform::{Platform, Timers};
use crate::site::Site;
use crate::viewport::Viewport;

mod dom;

pub use dom::WebDom;

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

thread_local! {
    static SITE: RefCell<Option<Rc<Site<WebPlatform>>>> = const { RefCell::new(None) };
    static EVENTS: RefCell<Option<WebEvents>> = const { RefCell::new(None) };
    static GLOBALS: RefCell<Vec<Closure<dyn Fn()>>> = const { RefCell::new(Vec::new()) };
}

pub struct WebViewport {
    window: Window,
}

impl Viewport for WebViewport {
    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn inner_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn pathname(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn navigate(&self, url: &str) {
        let _ = self.window.location().set_href(url);
    }
}

pub struct WebTimers;

impl Timers for WebTimers {
    type Handle = Timeout;

    fn set_timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(millis, callback)
    }
}

pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn post(&self, endpoint: &str, body: String) -> Result<SubmitResponse, SubmitError> {
        let response = Request::post(endpoint)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(SubmitResponse { status, body })
    }
}

pub struct WebPlatform {
    dom: WebDom,
    viewport: WebViewport,
    timers: WebTimers,
    transport: GlooTransport,
    observer: RefCell<Option<(IntersectionObserver, ObserverCallback)>>,
}

impl WebPlatform {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            dom: WebDom::new(document),
            viewport: WebViewport { window },
            timers: WebTimers,
            transport: GlooTransport,
            observer: RefCell::new(None),
        }
    }

    fn has_intersection_observer(&self) -> bool {
        js_sys::Reflect::has(&self.viewport.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
    }
}

impl Platform for WebPlatform {
    type Dom = WebDom;
    type Viewport = WebViewport;
    type Timers = WebTimers;
    type Transport = GlooTransport;

    fn dom(&self) -> &WebDom {
        &self.dom
    }

    fn viewport(&self) -> &WebViewport {
        &self.viewport
    }

    fn timers(&self) -> &WebTimers {
        &self.timers
    }

    fn transport(&self) -> &GlooTransport {
        &self.transport
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn observe_intersection(
        &self,
        node: &Element,
        threshold: f64,
        on_change: Box<dyn Fn(bool)>,
    ) -> bool {
        if let Some((previous, _)) = self.observer.borrow_mut().take() {
            previous.disconnect();
        }
        if !self.has_intersection_observer() {
            return false;
        }

        let callback: ObserverCallback = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                        on_change(entry.is_intersecting());
                    }
                }
            },
        ));
        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        options.set_root_margin("0px");

        let Ok(observer) =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
        else {
            warn!("IntersectionObserver construction failed");
            return false;
        };
        observer.observe(node);
        *self.observer.borrow_mut() = Some((observer, callback));
        true
    }
}

/// Window/document listeners. Scroll and resize go on the window as passive
/// listeners; everything else is delegated from the document.
pub struct WebEvents {
    window: Window,
    document: Document,
    listeners: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
}

impl WebEvents {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            listeners: RefCell::new(Vec::new()),
        }
    }
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn to_page_event(kind: EventKind, event: &Event) -> Option<PageEvent<Element>> {
    match kind {
        EventKind::Resize => Some(PageEvent::Resize),
        EventKind::Scroll => Some(PageEvent::Scroll),
        EventKind::Click => target_element(event).map(PageEvent::Click),
        EventKind::KeyDown => event
            .dyn_ref::<KeyboardEvent>()
            .map(|key| PageEvent::KeyDown(key.key())),
        EventKind::Submit => target_element(event).map(PageEvent::Submit),
    }
}

impl EventSource<Element> for WebEvents {
    fn listen(&self, kind: EventKind, handler: Handler<Element>) {
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(page_event) = to_page_event(kind, &event) else {
                return;
            };
            match handler(page_event) {
                Disposition::Continue => {}
                Disposition::StopPropagation => event.stop_propagation(),
                Disposition::PreventDefault => event.prevent_default(),
            }
        }) as Box<dyn FnMut(Event)>);

        let target: &EventTarget = match kind {
            EventKind::Resize | EventKind::Scroll => self.window.as_ref(),
            _ => self.document.as_ref(),
        };
        let options = AddEventListenerOptions::new();
        options.set_passive(kind.is_passive());
        if target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.event_name(),
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .is_err()
        {
            warn!("Could not listen for {} events", kind.event_name());
        }
        self.listeners.borrow_mut().push(closure);
    }
}

/// Wires the site up once the document has been parsed.
pub fn boot() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))
        .ok()
        .and_then(|state| state.as_string());
    if ready_state.as_deref() == Some("loading") {
        let target = document.clone();
        let on_ready = Closure::once_into_js(move || start(window, document));
        let _ = target.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    } else {
        start(window, document);
    }
}

fn start(window: Window, document: Document) {
    let config = SiteConfig::load(&WebDom::new(document.clone()));
    let site = Site::new(WebPlatform::new(window.clone(), document.clone()), config);
    let web_events = WebEvents::new(window.clone(), document);
    events::bind(&site, &web_events);
    let _ = site.handle(PageEvent::Ready);

    SITE.with(|slot| *slot.borrow_mut() = Some(site));
    EVENTS.with(|slot| *slot.borrow_mut() = Some(web_events));
    let globals = install_globals(&window);
    GLOBALS.with(|slot| *slot.borrow_mut() = globals);
    info!("Site behaviors attached");
}

/// Puts `openProjectModal` and friends on `window` so inline `onclick`
/// attributes can reach them.
fn install_globals(window: &Window) -> Vec<Closure<dyn Fn()>> {
    GLOBAL_FUNCTIONS
        .iter()
        .filter_map(|&name| {
            let closure = Closure::<dyn Fn()>::new(move || {
                with_site(|site| {
                    let _ = site.call_global(name);
                })
            });
            match js_sys::Reflect::set(window, &JsValue::from_str(name), closure.as_ref()) {
                Ok(true) => Some(closure),
                _ => {
                    warn!("Could not install window.{}", name);
                    None
                }
            }
        })
        .collect()
}

fn with_site(action: impl FnOnce(&Site<WebPlatform>)) {
    let site = SITE.with(|slot| slot.borrow().clone());
    match site {
        Some(site) => action(&site),
        None => debug!("Site not booted yet, ignoring global call"),
    }
}
