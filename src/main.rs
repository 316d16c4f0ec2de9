#[cfg(target_arch = "wasm32")]
fn main() {
    use levelup_site::{config, web};
    use log::info;

    console_error_panic_hook::set_once();
    console_log::init_with_level(config::log_level()).expect("error initializing log");
    info!("Starting site behaviors");
    web::boot();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("levelup-site runs in the browser; build it for wasm32-unknown-unknown");
}
