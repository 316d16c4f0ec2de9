use log::{debug, info};

use crate::config::SiteConfig;
use crate::dom::{Dom, Selector};
use crate::events::Disposition;
use crate::viewport::Viewport;

pub const LEGACY_FORM_ID: &str = "contact-form";

const REQUIRED: [&str; 3] = ["name", "email", "message"];

/// The older `#contact-form`: an alert on missing fields, otherwise either a
/// native Netlify post or a redirect to the thank-you page.
pub struct LegacyContactForm;

impl LegacyContactForm {
    pub fn owns<D: Dom>(dom: &D, node: &D::Node) -> bool {
        dom.query(None, &Selector::Id(LEGACY_FORM_ID)).as_ref() == Some(node)
    }

    pub fn on_submit<D: Dom, V: Viewport>(
        dom: &D,
        viewport: &V,
        config: &SiteConfig,
        form: &D::Node,
    ) -> Disposition {
        let fields = dom.form_fields(form);
        let missing = REQUIRED.iter().any(|name| {
            !fields.iter().any(|(field, value)| field == name && !value.is_empty())
        });
        if missing {
            debug!("Legacy contact form is missing required fields");
            viewport.alert(&config.legacy_missing_fields_alert);
            return Disposition::PreventDefault;
        }

        if dom.attribute(form, "netlify").is_some() {
            return Disposition::Continue;
        }

        info!("Legacy contact form without backend, redirecting to {}", config.thank_you_url);
        viewport.navigate(&config.thank_you_url);
        Disposition::PreventDefault
    }
}
