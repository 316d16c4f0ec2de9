use std::rc::Rc;

use log::debug;

use crate::platform::{NodeOf, Platform};
use crate::site::Site;

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<N> {
    /// Document finished parsing.
    Ready,
    Resize,
    Scroll,
    Click(N),
    KeyDown(String),
    Submit(N),
    HeaderCtaIntersection(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    Scroll,
    Click,
    KeyDown,
    Submit,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Resize,
        EventKind::Scroll,
        EventKind::Click,
        EventKind::KeyDown,
        EventKind::Submit,
    ];

    pub fn event_name(self) -> &'static str {
        match self {
            EventKind::Resize => "resize",
            EventKind::Scroll => "scroll",
            EventKind::Click => "click",
            EventKind::KeyDown => "keydown",
            EventKind::Submit => "submit",
        }
    }

    /// Scroll and resize listeners never cancel the event.
    pub fn is_passive(self) -> bool {
        matches!(self, EventKind::Resize | EventKind::Scroll)
    }
}

impl<N> PageEvent<N> {
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            PageEvent::Resize => Some(EventKind::Resize),
            PageEvent::Scroll => Some(EventKind::Scroll),
            PageEvent::Click(_) => Some(EventKind::Click),
            PageEvent::KeyDown(_) => Some(EventKind::KeyDown),
            PageEvent::Submit(_) => Some(EventKind::Submit),
            PageEvent::Ready | PageEvent::HeaderCtaIntersection(_) => None,
        }
    }
}

/// What the host should do with the native event after the site handled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[must_use]
pub enum Disposition {
    Continue,
    StopPropagation,
    PreventDefault,
}

pub type Handler<N> = Rc<dyn Fn(PageEvent<N>) -> Disposition>;

pub trait EventSource<N> {
    fn listen(&self, kind: EventKind, handler: Handler<N>);
}

/// Registers the site for every event kind on `source`. Handlers hold a weak
/// reference so a dropped site stops reacting.
pub fn bind<P, S>(site: &Rc<Site<P>>, source: &S)
where
    P: Platform,
    S: EventSource<NodeOf<P>>,
{
    for kind in EventKind::ALL {
        let site = Rc::downgrade(site);
        source.listen(
            kind,
            Rc::new(move |event| match site.upgrade() {
                Some(site) => site.handle(event),
                None => {
                    debug!("Dropping {:?} event, site is gone", kind);
                    Disposition::Continue
                }
            }),
        );
    }
}
