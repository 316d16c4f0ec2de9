//! Client-side behavior for the LevelUp Digital marketing site: the
//! header/floating "Start a Project" CTA, the mobile nav drawer, the FAQ
//! accordion, the inquiry modal and the two lead forms.

pub mod config;
pub mod cta;
pub mod dom;
pub mod events;
pub mod faq;
pub mod forms;
#[cfg(any(test, feature = "headless"))]
pub mod headless;
pub mod modal;
pub mod nav;
pub mod platform;
pub mod site;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::SiteConfig;
pub use site::Site;
