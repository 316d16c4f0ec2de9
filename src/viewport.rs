use crate::config::SiteConfig;

/// Window-level facts the behaviors read on demand.
pub trait Viewport {
    fn inner_width(&self) -> f64;
    fn inner_height(&self) -> f64;
    fn scroll_y(&self) -> f64;
    fn pathname(&self) -> String;
    /// Blocking browser alert.
    fn alert(&self, message: &str);
    fn navigate(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportBucket {
    /// Phones: at or below the narrow breakpoint.
    MobileNarrow,
    /// Above the narrow breakpoint, at or below the tablet breakpoint.
    Tablet,
    Desktop,
}

impl ViewportBucket {
    pub fn classify(width: f64, config: &SiteConfig) -> Self {
        if width <= config.narrow_breakpoint {
            ViewportBucket::MobileNarrow
        } else if width <= config.tablet_breakpoint {
            ViewportBucket::Tablet
        } else {
            ViewportBucket::Desktop
        }
    }

    pub fn is_mobile_or_tablet(self) -> bool {
        !matches!(self, ViewportBucket::Desktop)
    }

    pub fn is_mobile_narrow(self) -> bool {
        matches!(self, ViewportBucket::MobileNarrow)
    }
}
