//! Inquiry and contact-page forms: validation, error rendering and the
//! asynchronous hand-off to the form backend.

use std::cell::Cell;

use log::{debug, error, info, warn};

use crate::config::SiteConfig;
use crate::dom::{Dom, Selector};
use crate::viewport::Viewport;

pub mod legacy;
pub mod transport;
pub mod validate;

use transport::{encode_fields, SubmitError, SubmitResponse, Transport};
use validate::{validate, Field, FieldError, FieldValues};

pub const INQUIRY_FORM_ID: &str = "project-inquiry-form";
pub const INQUIRY_SUCCESS_ID: &str = "form-success";
pub const CONTACT_FORM_ID: &str = "contact-page-form";
pub const CONTACT_SUCCESS_ID: &str = "contact-form-success";

const ERROR_CLASS: &str = "error";
const ERROR_MESSAGE_CLASS: &str = "error-message";
const FORM_ERROR_CLASS: &str = "form-error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Inquiry,
    ContactPage,
}

/// How field errors accumulate on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Every invalid field shows its message; focus goes to the first one.
    ShowAll,
    /// Each message replaces the previous one, so only the last survives.
    ShowLatest,
}

/// What counts as a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// 2xx plus a confirmation marker in the body, or a plain 200.
    StatusOrMarkers,
    StatusOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The form's `action` attribute, else the current path.
    FormAction,
    Fixed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub kind: FormKind,
    pub form_id: &'static str,
    pub success_id: &'static str,
    pub name_id: &'static str,
    pub email_id: &'static str,
    pub business_type_id: &'static str,
    pub errors: ErrorPolicy,
    pub acceptance: Acceptance,
    pub endpoint: Endpoint,
}

impl FormSpec {
    pub fn inquiry() -> Self {
        Self {
            kind: FormKind::Inquiry,
            form_id: INQUIRY_FORM_ID,
            success_id: INQUIRY_SUCCESS_ID,
            name_id: "name",
            email_id: "email",
            business_type_id: "business-type",
            errors: ErrorPolicy::ShowAll,
            acceptance: Acceptance::StatusOrMarkers,
            endpoint: Endpoint::FormAction,
        }
    }

    pub fn contact_page(endpoint: &str) -> Self {
        Self {
            kind: FormKind::ContactPage,
            form_id: CONTACT_FORM_ID,
            success_id: CONTACT_SUCCESS_ID,
            name_id: "contact-name",
            email_id: "contact-email",
            business_type_id: "contact-business-type",
            errors: ErrorPolicy::ShowLatest,
            acceptance: Acceptance::StatusOnly,
            endpoint: Endpoint::Fixed(endpoint.to_string()),
        }
    }

    fn field_id(&self, field: Field) -> &'static str {
        match field {
            Field::Name => self.name_id,
            Field::Email => self.email_id,
            Field::BusinessType => self.business_type_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission<N> {
    pub kind: FormKind,
    pub endpoint: String,
    pub body: String,
    button: Option<N>,
    original_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// The form or one of its required fields is not on this page.
    Unbound,
    /// A submission for this form is still in flight.
    Busy,
    Invalid(Vec<FieldError>),
}

struct BoundForm<N> {
    form: N,
    name: N,
    email: N,
    business_type: N,
}

impl Acceptance {
    pub fn judge(self, response: &SubmitResponse) -> Result<(), SubmitError> {
        if !response.is_ok() {
            return Err(SubmitError::Rejected { status: response.status });
        }
        match self {
            Acceptance::StatusOnly => Ok(()),
            Acceptance::StatusOrMarkers => {
                let confirmed = response.body.contains("Thank you")
                    || response.body.contains("success")
                    || response.status == 200;
                if confirmed {
                    Ok(())
                } else {
                    Err(SubmitError::Unconfirmed { status: response.status })
                }
            }
        }
    }
}

pub struct FormController {
    spec: FormSpec,
    state: Cell<SubmissionState>,
}

impl FormController {
    pub fn new(spec: FormSpec) -> Self {
        Self {
            spec,
            state: Cell::new(SubmissionState::Idle),
        }
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn state(&self) -> SubmissionState {
        self.state.get()
    }

    pub fn form<D: Dom>(&self, dom: &D) -> Option<D::Node> {
        dom.query(None, &Selector::Id(self.spec.form_id))
    }

    pub fn owns<D: Dom>(&self, dom: &D, node: &D::Node) -> bool {
        self.form(dom).as_ref() == Some(node)
    }

    fn bind<D: Dom>(&self, dom: &D) -> Option<BoundForm<D::Node>> {
        let form = self.form(dom)?;
        let field = |id| dom.query(Some(&form), &Selector::Id(id));
        let name = field(self.spec.name_id)?;
        let email = field(self.spec.email_id)?;
        let business_type = field(self.spec.business_type_id)?;
        Some(BoundForm {
            form,
            name,
            email,
            business_type,
        })
    }

    pub fn clear_errors<D: Dom>(&self, dom: &D, form: &D::Node) {
        for message in dom.query_all(Some(form), &Selector::Class(ERROR_MESSAGE_CLASS)) {
            dom.remove(&message);
        }
        for field in dom.query_all(Some(form), &Selector::Class(ERROR_CLASS)) {
            dom.remove_class(&field, ERROR_CLASS);
        }
    }

    /// Runs the synchronous half of a submit: validation, error rendering and
    /// switching the submit button to its sending state.
    pub fn prepare<D: Dom, V: Viewport>(
        &self,
        dom: &D,
        viewport: &V,
        config: &SiteConfig,
    ) -> Result<PendingSubmission<D::Node>, PrepareError> {
        if self.state.get() == SubmissionState::Submitting {
            debug!("{:?} form is already submitting, ignoring submit", self.spec.kind);
            return Err(PrepareError::Busy);
        }
        let Some(bound) = self.bind(dom) else {
            warn!("{:?} form is missing required fields, leaving it alone", self.spec.kind);
            return Err(PrepareError::Unbound);
        };

        self.clear_errors(dom, &bound.form);

        let values = FieldValues {
            name: dom.value(&bound.name),
            email: dom.value(&bound.email),
            business_type: dom.value(&bound.business_type),
        };
        let errors = validate(&values);
        if !errors.is_empty() {
            debug!(
                "{:?} form failed validation: {:?}",
                self.spec.kind,
                errors.iter().map(|e| self.spec.field_id(e.field)).collect::<Vec<_>>()
            );
            self.render_errors(dom, &bound, &errors);
            return Err(PrepareError::Invalid(errors));
        }

        let button = dom.query(Some(&bound.form), &Selector::SubmitButton);
        let original_label = button.as_ref().map(|b| dom.text(b)).unwrap_or_default();
        if let Some(button) = &button {
            dom.set_disabled(button, true);
            dom.set_text(button, &config.sending_label);
        }

        let endpoint = match &self.spec.endpoint {
            Endpoint::Fixed(endpoint) => endpoint.clone(),
            Endpoint::FormAction => dom
                .attribute(&bound.form, "action")
                .filter(|action| !action.trim().is_empty())
                .unwrap_or_else(|| viewport.pathname()),
        };

        self.state.set(SubmissionState::Submitting);
        info!("Submitting {:?} form to {}", self.spec.kind, endpoint);

        Ok(PendingSubmission {
            kind: self.spec.kind,
            endpoint,
            body: encode_fields(&dom.form_fields(&bound.form)),
            button,
            original_label,
        })
    }

    /// The asynchronous half: POST, then swap in the success panel or put
    /// the form back into a retryable state.
    pub async fn send<D: Dom, T: Transport>(
        &self,
        dom: &D,
        transport: &T,
        config: &SiteConfig,
        pending: PendingSubmission<D::Node>,
    ) -> Result<(), SubmitError> {
        let outcome = match transport.post(&pending.endpoint, pending.body.clone()).await {
            Ok(response) => {
                info!("{:?} form endpoint answered {}", self.spec.kind, response.status);
                self.spec.acceptance.judge(&response)
            }
            Err(e) => Err(e),
        };

        // The label comes back either way; the button stays disabled behind
        // the success panel until `reset`.
        if let Some(button) = &pending.button {
            dom.set_text(button, &pending.original_label);
        }

        match &outcome {
            Ok(()) => {
                self.state.set(SubmissionState::Succeeded);
                self.show_success(dom);
            }
            Err(e) => {
                error!("{:?} form submission error: {}", self.spec.kind, e);
                self.state.set(SubmissionState::Failed);
                if let Some(button) = &pending.button {
                    dom.set_disabled(button, false);
                }
                if let Some(form) = self.form(dom) {
                    self.show_banner(dom, &form, &config.submit_error_message);
                }
            }
        }
        outcome
    }

    /// Puts a successfully submitted form back to its empty editable view.
    pub fn reset<D: Dom>(&self, dom: &D) {
        let Some(form) = self.form(dom) else {
            return;
        };
        if let Some(success) = dom.query(None, &Selector::Id(self.spec.success_id)) {
            dom.set_style(&form, "display", "block");
            dom.set_style(&success, "display", "none");
        }
        dom.reset_form(&form);
        self.clear_errors(dom, &form);
        if let Some(button) = dom.query(Some(&form), &Selector::SubmitButton) {
            dom.set_disabled(&button, false);
        }
        self.state.set(SubmissionState::Idle);
    }

    fn render_errors<D: Dom>(&self, dom: &D, bound: &BoundForm<D::Node>, errors: &[FieldError]) {
        let node_for = |field: Field| match field {
            Field::Name => &bound.name,
            Field::Email => &bound.email,
            Field::BusinessType => &bound.business_type,
        };

        match self.spec.errors {
            ErrorPolicy::ShowAll => {
                for e in errors {
                    self.show_field_error(dom, node_for(e.field), e.message);
                }
                if let Some(first) = errors.first() {
                    let input = node_for(first.field);
                    dom.focus(input);
                    dom.scroll_into_view(input);
                }
            }
            ErrorPolicy::ShowLatest => {
                for e in errors {
                    self.clear_errors(dom, &bound.form);
                    let input = node_for(e.field);
                    self.show_field_error(dom, input, e.message);
                    dom.focus(input);
                    dom.scroll_into_view(input);
                }
            }
        }
    }

    fn show_field_error<D: Dom>(&self, dom: &D, input: &D::Node, message: &str) {
        dom.add_class(input, ERROR_CLASS);
        let Some(container) = dom.parent(input) else {
            return;
        };
        if let Some(existing) = dom.query(Some(&container), &Selector::Class(ERROR_MESSAGE_CLASS)) {
            dom.remove(&existing);
        }
        let Some(message_node) = dom.create_element("div") else {
            return;
        };
        dom.add_class(&message_node, ERROR_MESSAGE_CLASS);
        dom.set_text(&message_node, message);
        dom.set_attribute(&message_node, "role", "alert");
        dom.append_child(&container, &message_node);
    }

    fn show_banner<D: Dom>(&self, dom: &D, form: &D::Node, message: &str) {
        let Some(banner) = dom.create_element("div") else {
            return;
        };
        dom.add_class(&banner, ERROR_MESSAGE_CLASS);
        dom.add_class(&banner, FORM_ERROR_CLASS);
        dom.set_text(&banner, message);
        dom.set_attribute(&banner, "role", "alert");
        dom.prepend_child(form, &banner);
    }

    fn show_success<D: Dom>(&self, dom: &D) {
        let form = self.form(dom);
        let success = dom.query(None, &Selector::Id(self.spec.success_id));
        let (Some(form), Some(success)) = (form, success) else {
            debug!("{:?} form has no success panel to show", self.spec.kind);
            return;
        };
        dom.set_style(&form, "display", "none");
        dom.set_style(&success, "display", "block");
        dom.scroll_into_view(&success);
        info!("{:?} form submitted", self.spec.kind);
    }
}
