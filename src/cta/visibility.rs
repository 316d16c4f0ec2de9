use super::{floating_cta, header_cta, VISIBLE_CLASS};
use crate::config::SiteConfig;
use crate::dom::Dom;
use crate::viewport::{Viewport, ViewportBucket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    pub is_mobile_narrow: bool,
    pub scrolled_past_threshold: bool,
    pub header_cta_in_view: bool,
}

impl VisibilityState {
    pub fn floating_visible(&self) -> bool {
        self.is_mobile_narrow && self.scrolled_past_threshold && !self.header_cta_in_view
    }
}

/// Owns the scroll/viewport flags that decide whether the floating CTA
/// carries its `visible` class.
#[derive(Debug, Default)]
pub struct CtaVisibility {
    state: VisibilityState,
    /// An intersection observer reports header visibility; otherwise scroll
    /// events fall back to measuring the header CTA.
    observing: bool,
}

impl CtaVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn set_observing(&mut self, observing: bool) {
        self.observing = observing;
    }

    pub fn on_scroll<D: Dom, V: Viewport>(&mut self, dom: &D, viewport: &V, config: &SiteConfig) {
        self.state.scrolled_past_threshold = viewport.scroll_y() >= config.scroll_threshold;
        if !self.observing {
            self.measure_header(dom, viewport);
        }
    }

    /// Returns true when the narrow-mobile boundary was crossed.
    pub fn on_resize(&mut self, width: f64, config: &SiteConfig) -> bool {
        let was_narrow = self.state.is_mobile_narrow;
        self.state.is_mobile_narrow = ViewportBucket::classify(width, config).is_mobile_narrow();
        was_narrow != self.state.is_mobile_narrow
    }

    pub fn on_intersection(&mut self, intersecting: bool) {
        self.state.header_cta_in_view = intersecting;
    }

    pub fn measure_header<D: Dom, V: Viewport>(&mut self, dom: &D, viewport: &V) {
        self.state.header_cta_in_view = header_cta(dom)
            .and_then(|header| dom.bounding_rect(&header))
            .map(|rect| {
                rect.top >= 0.0
                    && rect.top <= viewport.inner_height()
                    && rect.left >= 0.0
                    && rect.left <= viewport.inner_width()
            })
            .unwrap_or(false);
    }

    /// Mirrors the rule onto the floating CTA. `suppressed` forces it hidden
    /// (the inquiry modal is open).
    pub fn apply<D: Dom>(&self, dom: &D, suppressed: bool) {
        let Some(floating) = floating_cta(dom) else {
            return;
        };
        // A header CTA that was removed cannot be in view, whatever the observer last said.
        let mut state = self.state;
        state.header_cta_in_view &= header_cta(dom).is_some();

        if !suppressed && state.floating_visible() {
            dom.add_class(&floating, VISIBLE_CLASS);
        } else {
            dom.remove_class(&floating, VISIBLE_CLASS);
        }
    }
}
