//! Login/logout flow in one shared browser context
//!
//! The steps must run in this order: the session cookie set by `login` is
//! what `stays_logged_in` relies on and what `logout_revokes_session` ends.
//! The browser driver blocks, so this is a plain `#[test]`.

use authentik_forward_e2e::browser::BrowserFixture;
use authentik_forward_e2e::scenarios::flow;

use crate::common::SharedSandbox;

#[test]
#[ignore = "requires RUN_E2E=1"]
fn login_logout_flow() {
    let sandbox = SharedSandbox::get_or_init().expect("Sandbox should be ready");
    let config = &sandbox.config;

    let browser = BrowserFixture::launch(&config.browser, &config.timeouts)
        .expect("Chrome should launch");
    let session = browser.shared_session().expect("Shared context should open");

    flow::login(&session, config).expect("should return upstream after login");
    println!("✓ Logged in");

    flow::stays_logged_in(&session, config).expect("should stay logged in on other pages");
    println!("✓ Session carried over");

    flow::logout_revokes_session(&session, config)
        .expect("should return unauthorized after logout");
    println!("✓ Logged out");
}
