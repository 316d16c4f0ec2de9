use futures::future::LocalBoxFuture;

use crate::dom::Dom;
use crate::forms::transport::Transport;
use crate::viewport::Viewport;

pub type NodeOf<P> = <<P as Platform>::Dom as Dom>::Node;

pub trait Timers {
    /// Dropping the handle cancels the callback if it has not run yet.
    type Handle: 'static;

    fn set_timeout(&self, millis: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Everything the site behaviors need from the host page.
pub trait Platform: 'static {
    type Dom: Dom;
    type Viewport: Viewport;
    type Timers: Timers;
    type Transport: Transport;

    fn dom(&self) -> &Self::Dom;
    fn viewport(&self) -> &Self::Viewport;
    fn timers(&self) -> &Self::Timers;
    fn transport(&self) -> &Self::Transport;

    /// Runs `task` to completion on the page's event loop.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);

    /// Tracks whether `node` intersects the viewport, reporting changes to
    /// `on_change`. Replaces any earlier observation. Returns `false` when the
    /// host cannot observe intersections.
    fn observe_intersection(
        &self,
        node: &NodeOf<Self>,
        threshold: f64,
        on_change: Box<dyn Fn(bool)>,
    ) -> bool;
}
