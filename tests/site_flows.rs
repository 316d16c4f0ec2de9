use std::rc::Rc;

use levelup_site::cta::OPEN_MODAL_HANDLER;
use levelup_site::dom::memory::{MemoryDom, NodeId};
use levelup_site::dom::{Dom, Selector};
use levelup_site::events::{self, Disposition, PageEvent};
use levelup_site::faq::Accordion;
use levelup_site::forms::{FormKind, SubmissionState};
use levelup_site::headless::markup::{self, Page};
use levelup_site::headless::{HeadlessEvents, HeadlessPlatform};
use levelup_site::modal::{InquiryModal, GLOBAL_FUNCTIONS};
use levelup_site::{Site, SiteConfig};

type TestSite = Rc<Site<HeadlessPlatform>>;

const HEADER_CTA: Selector<'static> = Selector::Class("btn-nav-modal");
const FLOATING_CTA: Selector<'static> = Selector::Class("btn-nav-modal-mobile");

fn start(platform: HeadlessPlatform, build: fn(&MemoryDom) -> Page) -> (TestSite, Page) {
    let page = build(&platform.dom);
    let site = Site::new(platform, SiteConfig::default());
    assert_eq!(site.handle(PageEvent::Ready), Disposition::Continue);
    (site, page)
}

fn landing_at(width: f64) -> (TestSite, Page) {
    start(HeadlessPlatform::new(width, 800.0), markup::landing_page)
}

fn scrolled_landing(width: f64, scroll_y: f64) -> (TestSite, Page) {
    let platform = HeadlessPlatform::new(width, 800.0);
    platform.viewport.scroll_to(scroll_y);
    start(platform, markup::landing_page)
}

fn dom(site: &TestSite) -> &MemoryDom {
    &site.platform().dom
}

fn floating(site: &TestSite) -> NodeId {
    dom(site).query(None, &FLOATING_CTA).expect("floating CTA present")
}

fn floating_visible(site: &TestSite) -> bool {
    dom(site).has_class(&floating(site), "visible")
}

fn error_messages(site: &TestSite, form: &NodeId) -> Vec<String> {
    let dom = dom(site);
    dom.query_all(Some(form), &Selector::Class("error-message"))
        .iter()
        .map(|node| dom.text(node))
        .collect()
}

#[test]
fn desktop_keeps_only_the_header_cta() {
    let (site, page) = landing_at(1280.0);
    let dom = dom(&site);
    assert_eq!(dom.count(&HEADER_CTA), 1);
    assert!(dom.is_connected(&page.header_cta));
    assert_eq!(dom.count(&FLOATING_CTA), 0);
}

#[test]
fn tablet_and_mobile_swap_in_the_floating_cta() {
    for width in [1024.0, 900.0, 390.0] {
        let (site, page) = landing_at(width);
        let dom = dom(&site);
        assert_eq!(dom.count(&HEADER_CTA), 0, "width {width}");
        assert!(!dom.is_connected(&page.header_cta));
        assert_eq!(dom.count(&FLOATING_CTA), 1, "width {width}");
        let button = floating(&site);
        assert_eq!(dom.parent(&button), Some(dom.body_id()));
        assert_eq!(dom.attribute(&button, "onclick").as_deref(), Some("openProjectModal()"));
    }
}

#[test]
fn contact_page_never_gets_a_floating_cta() {
    let (site, _page) = start(HeadlessPlatform::new(390.0, 800.0), markup::contact_page);
    site.platform().viewport.resize(700.0);
    let _ = site.handle(PageEvent::Resize);
    site.platform().timers.advance(100);

    let dom = dom(&site);
    assert_eq!(dom.count(&FLOATING_CTA), 0);
    assert_eq!(dom.count(&HEADER_CTA), 0);
}

#[test]
fn second_reconcile_changes_nothing() {
    for width in [390.0, 900.0, 1280.0] {
        let (site, _page) = landing_at(width);
        let before = dom(&site).mutation_count();
        assert!(site.reconcile_ctas().is_noop());
        assert_eq!(dom(&site).mutation_count(), before);
    }
}

#[test]
fn floating_cta_shows_only_when_narrow_and_scrolled() {
    let (site, _page) = scrolled_landing(768.0, 200.0);
    assert!(floating_visible(&site));

    let (site, _page) = scrolled_landing(769.0, 200.0);
    assert!(!floating_visible(&site));

    let (site, _page) = scrolled_landing(768.0, 199.0);
    assert!(!floating_visible(&site));
    site.platform().viewport.scroll_to(200.0);
    let _ = site.handle(PageEvent::Scroll);
    assert!(floating_visible(&site));
    site.platform().viewport.scroll_to(0.0);
    let _ = site.handle(PageEvent::Scroll);
    assert!(!floating_visible(&site));
}

#[test]
fn crossing_the_narrow_boundary_applies_immediately() {
    let (site, _page) = scrolled_landing(900.0, 400.0);
    assert!(!floating_visible(&site));

    site.platform().viewport.resize(600.0);
    let _ = site.handle(PageEvent::Resize);
    assert!(floating_visible(&site));
    assert!(site.visibility().is_mobile_narrow);
}

#[test]
fn resize_reconcile_is_debounced() {
    let (site, page) = landing_at(1280.0);
    let timers = &site.platform().timers;

    site.platform().viewport.resize(500.0);
    let _ = site.handle(PageEvent::Resize);
    timers.advance(50);
    let _ = site.handle(PageEvent::Resize);
    timers.advance(60);
    assert!(dom(&site).is_connected(&page.header_cta));
    assert_eq!(timers.pending(), 1);

    timers.advance(40);
    assert!(!dom(&site).is_connected(&page.header_cta));
    assert_eq!(dom(&site).count(&FLOATING_CTA), 1);
    assert_eq!(timers.pending(), 0);
}

#[test]
fn intersection_reports_drive_header_visibility() {
    let (site, page) = start(
        HeadlessPlatform::new(1280.0, 800.0).with_intersection_observer(),
        markup::landing_page,
    );
    assert_eq!(site.platform().observed(), Some(page.header_cta));

    site.platform().report_intersection(false);
    assert!(!site.visibility().header_cta_in_view);
    site.platform().report_intersection(true);
    assert!(site.visibility().header_cta_in_view);
}

#[test]
fn restored_header_cta_is_observed_again() {
    let (site, page) = start(
        HeadlessPlatform::new(1280.0, 800.0).with_intersection_observer(),
        markup::landing_page,
    );
    let platform = site.platform();

    platform.viewport.resize(500.0);
    let _ = site.handle(PageEvent::Resize);
    platform.timers.advance(100);
    platform.viewport.resize(1280.0);
    let _ = site.handle(PageEvent::Resize);
    platform.timers.advance(100);

    let header = dom(&site).query(None, &HEADER_CTA).expect("header CTA restored");
    assert_ne!(header, page.header_cta);
    assert_eq!(platform.observed(), Some(header));
    assert_eq!(dom(&site).count(&FLOATING_CTA), 0);
}

#[test]
fn absent_header_does_not_hide_the_floating_cta() {
    let (site, _page) = start(
        {
            let platform = HeadlessPlatform::new(1280.0, 800.0).with_intersection_observer();
            platform.viewport.scroll_to(600.0);
            platform
        },
        markup::landing_page,
    );
    site.platform().report_intersection(true);

    site.platform().viewport.resize(400.0);
    let _ = site.handle(PageEvent::Resize);
    site.platform().timers.advance(100);
    assert!(floating_visible(&site));
}

#[test]
fn accordion_keeps_at_most_one_item_open() {
    let (site, page) = landing_at(1280.0);
    let (a, b) = (page.faq_questions[0], page.faq_questions[1]);

    let _ = site.handle(PageEvent::Click(a));
    let _ = site.handle(PageEvent::Click(b));
    assert_eq!(Accordion::open_items(dom(&site)), vec![page.faq_items[1]]);

    let _ = site.handle(PageEvent::Click(a));
    let _ = site.handle(PageEvent::Click(a));
    assert!(Accordion::open_items(dom(&site)).is_empty());
}

#[test]
fn nav_drawer_toggles_and_closes() {
    let (site, page) = landing_at(390.0);
    let dom = dom(&site);

    assert_eq!(site.handle(PageEvent::Click(page.nav_toggle)), Disposition::StopPropagation);
    assert!(dom.has_class(&page.nav, "active"));
    assert!(dom.has_class(&page.nav_toggle, "active"));
    assert_eq!(dom.style(&dom.body_id(), "overflow").as_deref(), Some("hidden"));

    let _ = site.handle(PageEvent::Click(page.nav_link));
    assert!(!dom.has_class(&page.nav, "active"));
    assert_eq!(dom.style(&dom.body_id(), "overflow"), None);

    let _ = site.handle(PageEvent::Click(page.nav_toggle));
    let _ = site.handle(PageEvent::Click(page.main));
    assert!(!dom.has_class(&page.nav, "active"));

    let _ = site.handle(PageEvent::Click(page.nav_toggle));
    let _ = site.handle(PageEvent::KeyDown("Escape".to_string()));
    assert!(!dom.has_class(&page.nav_toggle, "active"));
}

#[test]
fn cta_click_opens_the_modal() {
    let (site, page) = landing_at(1280.0);
    let _ = site.handle(PageEvent::Click(page.header_cta));
    assert!(InquiryModal::is_open(dom(&site)));

    let (site, _page) = landing_at(390.0);
    let button = floating(&site);
    let _ = site.handle(PageEvent::Click(button));
    assert!(InquiryModal::is_open(dom(&site)));
}

#[test]
fn modal_hides_the_floating_cta_until_the_rescan() {
    let (site, _page) = scrolled_landing(390.0, 500.0);
    assert!(floating_visible(&site));

    site.open_modal();
    assert!(!floating_visible(&site));
    let _ = site.handle(PageEvent::Scroll);
    assert!(!floating_visible(&site));

    let _ = site.handle(PageEvent::KeyDown("Escape".to_string()));
    assert!(!InquiryModal::is_open(dom(&site)));
    assert!(!floating_visible(&site));

    site.platform().timers.advance(100);
    assert!(floating_visible(&site));
}

#[test]
fn escape_with_closed_modal_schedules_nothing() {
    let (site, _page) = landing_at(1280.0);
    let _ = site.handle(PageEvent::KeyDown("Escape".to_string()));
    assert_eq!(site.platform().timers.pending(), 0);
}

#[test]
fn empty_inquiry_shows_every_error() {
    let (site, page) = landing_at(1280.0);
    let form = page.inquiry.form;

    assert_eq!(site.handle(PageEvent::Submit(form)), Disposition::PreventDefault);
    assert_eq!(
        error_messages(&site, &form),
        vec!["Name is required", "Email is required", "Business type is required"]
    );
    assert_eq!(dom(&site).focused(), Some(page.inquiry.name));
    assert!(site.platform().transport.requests().is_empty());
}

#[test]
fn malformed_email_is_the_only_error() {
    let (site, page) = landing_at(1280.0);
    markup::fill_inquiry(dom(&site), &page.inquiry, "Jane", "not-an-email", "retail");

    let _ = site.handle(PageEvent::Submit(page.inquiry.form));
    assert_eq!(
        error_messages(&site, &page.inquiry.form),
        vec!["Please enter a valid email address"]
    );
    assert!(dom(&site).has_class(&page.inquiry.email, "error"));
    assert_eq!(dom(&site).focused(), Some(page.inquiry.email));
    assert_eq!(site.submission_state(FormKind::Inquiry), SubmissionState::Idle);
}

#[test]
fn confirmed_inquiry_swaps_in_the_success_panel() {
    let (site, page) = landing_at(1280.0);
    let dom = dom(&site);
    let platform = site.platform();
    platform.transport.push_response(200, "<p>Thank you</p>");
    markup::fill_inquiry(dom, &page.inquiry, "Jane Doe", "jane@example.com", "retail");

    assert_eq!(site.handle(PageEvent::Submit(page.inquiry.form)), Disposition::PreventDefault);
    assert_eq!(site.submission_state(FormKind::Inquiry), SubmissionState::Submitting);
    assert!(dom.is_disabled(&page.inquiry.submit));
    assert_eq!(dom.text(&page.inquiry.submit), "Sending...");

    platform.run_pending();
    assert_eq!(site.submission_state(FormKind::Inquiry), SubmissionState::Succeeded);
    assert_eq!(dom.style(&page.inquiry.form, "display").as_deref(), Some("none"));
    assert_eq!(dom.style(&page.inquiry_success, "display").as_deref(), Some("block"));
    assert_eq!(
        platform.transport.requests(),
        vec![(
            "/".to_string(),
            "form-name=project-inquiry-form&name=Jane%20Doe&email=jane%40example.com&business-type=retail"
                .to_string()
        )]
    );
}

#[test]
fn unconfirmed_inquiry_is_retryable() {
    let (site, page) = landing_at(1280.0);
    let dom = dom(&site);
    site.platform().transport.push_response(204, "");
    markup::fill_inquiry(dom, &page.inquiry, "Jane", "jane@example.com", "services");

    let _ = site.handle(PageEvent::Submit(page.inquiry.form));
    site.platform().run_pending();

    assert_eq!(site.submission_state(FormKind::Inquiry), SubmissionState::Failed);
    assert!(!dom.is_disabled(&page.inquiry.submit));
    assert_eq!(dom.text(&page.inquiry.submit), "Send Inquiry");
    let banner = dom.children(&page.inquiry.form)[0];
    assert!(dom.has_class(&banner, "form-error"));
    assert_eq!(dom.text(&banner), SiteConfig::default().submit_error_message);
    assert_eq!(dom.style(&page.inquiry_success, "display").as_deref(), Some("none"));
}

#[test]
fn submit_while_in_flight_sends_once() {
    let (site, page) = landing_at(1280.0);
    site.platform().transport.push_response(200, "Thank you");
    markup::fill_inquiry(dom(&site), &page.inquiry, "Jane", "jane@example.com", "retail");

    assert_eq!(site.handle(PageEvent::Submit(page.inquiry.form)), Disposition::PreventDefault);
    assert_eq!(site.handle(PageEvent::Submit(page.inquiry.form)), Disposition::PreventDefault);
    site.platform().run_pending();

    assert_eq!(site.platform().transport.requests().len(), 1);
    assert_eq!(site.submission_state(FormKind::Inquiry), SubmissionState::Succeeded);
}

#[test]
fn second_failure_replaces_the_banner() {
    let (site, page) = landing_at(1280.0);
    let dom = dom(&site);
    site.platform().transport.push_failure("offline");
    site.platform().transport.push_response(500, "");
    markup::fill_inquiry(dom, &page.inquiry, "Jane", "jane@example.com", "retail");

    for _ in 0..2 {
        let _ = site.handle(PageEvent::Submit(page.inquiry.form));
        site.platform().run_pending();
    }

    assert_eq!(site.platform().transport.requests().len(), 2);
    let banners = dom.query_all(Some(&page.inquiry.form), &Selector::Class("form-error"));
    assert_eq!(banners.len(), 1);
    assert_eq!(dom.children(&page.inquiry.form)[0], banners[0]);
}

#[test]
fn closing_after_success_resets_the_inquiry_form() {
    let (site, page) = landing_at(1280.0);
    let dom = dom(&site);
    site.platform().transport.push_response(200, "");
    site.open_modal();
    let _ = site.handle(PageEvent::Submit(page.inquiry.form));
    assert_eq!(error_messages(&site, &page.inquiry.form).len(), 3);
    markup::fill_inquiry(dom, &page.inquiry, "Jane", "jane@example.com", "retail");
    let _ = site.handle(PageEvent::Submit(page.inquiry.form));
    site.platform().run_pending();
    assert_eq!(site.submission_state(FormKind::Inquiry), SubmissionState::Succeeded);

    site.close_modal();
    site.open_modal();

    assert_eq!(site.submission_state(FormKind::Inquiry), SubmissionState::Idle);
    assert_eq!(dom.style(&page.inquiry.form, "display").as_deref(), Some("block"));
    assert_eq!(dom.style(&page.inquiry_success, "display").as_deref(), Some("none"));
    assert_eq!(dom.value(&page.inquiry.name), "");
    assert_eq!(dom.value(&page.inquiry.email), "");
    assert!(!dom.is_disabled(&page.inquiry.submit));
    assert_eq!(dom.text(&page.inquiry.submit), "Send Inquiry");
    assert!(error_messages(&site, &page.inquiry.form).is_empty());
    assert!(dom.query_all(Some(&page.inquiry.form), &Selector::Class("error")).is_empty());
}

#[test]
fn closing_after_validation_errors_keeps_the_input() {
    let (site, page) = landing_at(1280.0);
    let dom = dom(&site);
    site.open_modal();
    markup::fill_inquiry(dom, &page.inquiry, "Jane", "", "retail");
    let _ = site.handle(PageEvent::Submit(page.inquiry.form));

    site.close_modal();
    assert_eq!(dom.value(&page.inquiry.name), "Jane");
    assert_eq!(error_messages(&site, &page.inquiry.form), vec!["Email is required"]);
}

#[test]
fn contact_form_keeps_only_the_latest_error() {
    let (site, page) = start(HeadlessPlatform::new(1280.0, 800.0), markup::contact_page);
    let (contact, _) = page.contact.expect("contact form");

    assert_eq!(site.handle(PageEvent::Submit(contact.form)), Disposition::PreventDefault);
    assert_eq!(error_messages(&site, &contact.form), vec!["Business type is required"]);
    assert_eq!(dom(&site).focused(), Some(contact.business_type));
    assert!(!dom(&site).has_class(&contact.name, "error"));
}

#[test]
fn contact_form_accepts_any_2xx() {
    let (site, page) = start(HeadlessPlatform::new(1280.0, 800.0), markup::contact_page);
    let (contact, success) = page.contact.expect("contact form");
    let dom = dom(&site);
    site.platform().transport.push_response(201, "");
    markup::fill_inquiry(dom, &contact, "Sam", "sam@example.org", "hospitality");

    let _ = site.handle(PageEvent::Submit(contact.form));
    site.platform().run_pending();

    assert_eq!(site.submission_state(FormKind::ContactPage), SubmissionState::Succeeded);
    assert_eq!(dom.style(&success, "display").as_deref(), Some("block"));
    let requests = site.platform().transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "/");
    assert!(requests[0].1.starts_with("form-name=contact-page-form&name=Sam&"));
}

#[test]
fn network_failure_on_contact_form_shows_banner() {
    let (site, page) = start(HeadlessPlatform::new(1280.0, 800.0), markup::contact_page);
    let (contact, _) = page.contact.expect("contact form");
    let dom = dom(&site);
    site.platform().transport.push_failure("offline");
    markup::fill_inquiry(dom, &contact, "Sam", "sam@example.org", "retail");

    let _ = site.handle(PageEvent::Submit(contact.form));
    site.platform().run_pending();

    assert_eq!(site.submission_state(FormKind::ContactPage), SubmissionState::Failed);
    assert_eq!(dom.text(&contact.submit), "Send Message");
    assert!(dom.has_class(&dom.children(&contact.form)[0], "form-error"));
}

fn legacy_form(dom: &MemoryDom, netlify: bool, filled: bool) -> NodeId {
    let form = dom.spawn(&dom.body_id(), "form#contact-form");
    if netlify {
        dom.set_attribute(&form, "netlify", "");
    }
    for (name, tag) in [("name", "input"), ("email", "input"), ("message", "textarea")] {
        let field = dom.spawn(&form, tag);
        dom.set_attribute(&field, "name", name);
        if filled {
            dom.set_value(&field, "something");
        }
    }
    form
}

#[test]
fn legacy_form_alerts_on_missing_fields() {
    let (site, _page) = landing_at(1280.0);
    let form = legacy_form(dom(&site), true, false);

    assert_eq!(site.handle(PageEvent::Submit(form)), Disposition::PreventDefault);
    assert_eq!(
        site.platform().viewport.alerts(),
        vec!["Please fill in all required fields.".to_string()]
    );
}

#[test]
fn legacy_form_posts_natively_or_redirects() {
    let (site, _page) = landing_at(1280.0);
    let form = legacy_form(dom(&site), true, true);
    assert_eq!(site.handle(PageEvent::Submit(form)), Disposition::Continue);
    assert!(site.platform().viewport.navigations().is_empty());

    let (site, _page) = landing_at(1280.0);
    let form = legacy_form(dom(&site), false, true);
    assert_eq!(site.handle(PageEvent::Submit(form)), Disposition::PreventDefault);
    assert_eq!(site.platform().viewport.navigations(), vec!["/thank-you.html".to_string()]);
}

#[test]
fn unrelated_forms_submit_natively() {
    let (site, _page) = landing_at(1280.0);
    let form = dom(&site).spawn(&dom(&site).body_id(), "form#newsletter");
    assert_eq!(site.handle(PageEvent::Submit(form)), Disposition::Continue);
}

#[test]
fn bound_listeners_route_into_the_site() {
    let (site, page) = landing_at(1280.0);
    let source = HeadlessEvents::new();
    events::bind(&site, &source);
    assert_eq!(source.listener_count(), 5);

    assert_eq!(source.fire(PageEvent::Click(page.nav_toggle)), Disposition::StopPropagation);
    assert_eq!(source.fire(PageEvent::Submit(page.inquiry.form)), Disposition::PreventDefault);
    assert_eq!(source.fire(PageEvent::Ready), Disposition::Continue);

    drop(site);
    assert_eq!(source.fire(PageEvent::Click(page.nav_toggle)), Disposition::Continue);
}

#[test]
fn window_globals_drive_the_modal() {
    let (site, _page) = landing_at(1280.0);
    assert!(OPEN_MODAL_HANDLER
        .strip_suffix("()")
        .is_some_and(|name| GLOBAL_FUNCTIONS.contains(&name)));

    for name in GLOBAL_FUNCTIONS {
        assert!(site.call_global(name), "{name}");
    }
    assert!(!InquiryModal::is_open(dom(&site)));

    assert!(site.call_global("openProjectModal"));
    assert!(InquiryModal::is_open(dom(&site)));
    assert!(site.call_global("closeProjectModal"));
    assert!(!InquiryModal::is_open(dom(&site)));
    assert!(!site.call_global("openSomethingElse"));
}
