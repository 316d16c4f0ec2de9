use log::debug;

use crate::dom::{Dom, Selector};
use crate::events::Disposition;

pub const NAV_CLASS: &str = "nav";
pub const TOGGLE_CLASS: &str = "nav-toggle";
pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerState {
    Closed,
    Open,
}

/// Mobile navigation drawer. Its state lives in the `active` class on the
/// drawer and the hamburger toggle.
pub struct NavDrawer;

impl NavDrawer {
    fn parts<D: Dom>(dom: &D) -> Option<(D::Node, D::Node)> {
        let nav = dom.query(None, &Selector::Class(NAV_CLASS))?;
        let toggle = dom.query(None, &Selector::Class(TOGGLE_CLASS))?;
        Some((nav, toggle))
    }

    pub fn state<D: Dom>(dom: &D) -> DrawerState {
        match Self::parts(dom) {
            Some((nav, _)) if dom.has_class(&nav, ACTIVE_CLASS) => DrawerState::Open,
            _ => DrawerState::Closed,
        }
    }

    pub fn open<D: Dom>(dom: &D) {
        let Some((nav, toggle)) = Self::parts(dom) else {
            return;
        };
        dom.add_class(&nav, ACTIVE_CLASS);
        dom.add_class(&toggle, ACTIVE_CLASS);
        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "hidden");
        }
        debug!("Nav drawer opened");
    }

    pub fn close<D: Dom>(dom: &D) {
        let Some((nav, toggle)) = Self::parts(dom) else {
            return;
        };
        dom.remove_class(&nav, ACTIVE_CLASS);
        dom.remove_class(&toggle, ACTIVE_CLASS);
        if let Some(body) = dom.body() {
            dom.set_style(&body, "overflow", "");
        }
    }

    /// Toggle clicks stop propagation so the outside-click rule never sees
    /// them. Returns `None` for clicks the drawer does not care about.
    pub fn on_click<D: Dom>(dom: &D, target: &D::Node) -> Option<Disposition> {
        let (nav, toggle) = Self::parts(dom)?;

        if dom.contains(&toggle, target) {
            match Self::state(dom) {
                DrawerState::Open => Self::close(dom),
                DrawerState::Closed => Self::open(dom),
            }
            return Some(Disposition::StopPropagation);
        }

        if Self::state(dom) == DrawerState::Closed {
            return None;
        }

        let on_link = dom
            .closest(target, &Selector::Tag("a"))
            .is_some_and(|link| dom.contains(&nav, &link));
        if on_link || !dom.contains(&nav, target) {
            Self::close(dom);
        }
        None
    }

    pub fn on_key<D: Dom>(dom: &D, key: &str) {
        if key == "Escape" && Self::state(dom) == DrawerState::Open {
            Self::close(dom);
        }
    }
}
