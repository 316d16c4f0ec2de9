use log::{warn, Level};
use serde::Deserialize;

use crate::dom::{Dom, Selector};

/// Id of the optional inline JSON block that overrides [`SiteConfig`] defaults.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Widths at or below this are mobile-or-tablet.
    pub tablet_breakpoint: f64,
    /// Widths at or below this are narrow mobile.
    pub narrow_breakpoint: f64,
    pub scroll_threshold: f64,
    pub resize_debounce_ms: u32,
    pub modal_rescan_delay_ms: u32,
    pub intersection_threshold: f64,
    pub cta_label: String,
    pub sending_label: String,
    pub submit_error_message: String,
    pub contact_endpoint: String,
    pub thank_you_url: String,
    pub legacy_missing_fields_alert: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            tablet_breakpoint: 1024.0,
            narrow_breakpoint: 768.0,
            scroll_threshold: 200.0,
            resize_debounce_ms: 100,
            modal_rescan_delay_ms: 100,
            intersection_threshold: 0.1,
            cta_label: "Start a Project".to_string(),
            sending_label: "Sending...".to_string(),
            submit_error_message: "There was an error submitting your form. Please try again or contact me directly.".to_string(),
            contact_endpoint: "/".to_string(),
            thank_you_url: "/thank-you.html".to_string(),
            legacy_missing_fields_alert: "Please fill in all required fields.".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the `#site-config` block if the page has one. Anything unreadable
    /// falls back to the compiled-in defaults.
    pub fn load<D: Dom>(dom: &D) -> Self {
        let Some(node) = dom.query(None, &Selector::Id(CONFIG_ELEMENT_ID)) else {
            return Self::default();
        };
        let raw = dom.text(&node);
        if raw.trim().is_empty() {
            return Self::default();
        }
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring malformed #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }
}
