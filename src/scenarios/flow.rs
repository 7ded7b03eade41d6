//! Ordered login/logout flow through the identity provider's UI.
//!
//! The three steps share one browser context: `login` leaves a session
//! cookie, `stays_logged_in` relies on it, `logout_revokes_session` removes
//! it. Each step opens and closes its own page. Browser calls block, so run
//! this off the async executor.

use std::time::Instant;

use reqwest::StatusCode;
use tracing::info;

use crate::browser::{BrowserFixture, SharedSession};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::outpost::{echo_line, Endpoint, USERNAME_HEADER};
use crate::scenario_span;

use super::{expect_contains, expect_status, ScenarioOutcome, Suite};

/// Username input of the identification stage
pub const IDENTIFICATION_INPUT: [&str; 2] = ["ak-stage-identification", "input[name=uidField]"];
pub const IDENTIFICATION_SUBMIT: [&str; 2] = ["ak-stage-identification", "button[type=submit]"];
/// Password input of the password stage
pub const PASSWORD_INPUT: [&str; 2] = ["ak-stage-password", "input[name=password]"];
pub const PASSWORD_SUBMIT: [&str; 2] = ["ak-stage-password", "button[type=submit]"];

pub type Step = fn(&SharedSession<'_>, &AppConfig) -> Result<()>;

/// Flow steps in the order they must run
pub const STEPS: [(&str, Step); 3] = [
    ("login", login as Step),
    ("stays_logged_in", stays_logged_in as Step),
    ("logout_revokes_session", logout_revokes_session as Step),
];

/// Line the upstream echoes once the session reaches it
fn identity_line(config: &AppConfig) -> String {
    echo_line(USERNAME_HEADER, &config.credentials.username)
}

/// Unauthenticated → authenticating: sign in through the identity provider
/// and land back on `/login` with the identity header propagated.
pub fn login(session: &SharedSession<'_>, config: &AppConfig) -> Result<()> {
    let page = session.new_page()?;
    let login_url = config.sandbox.upstream("/login")?;

    page.goto(login_url.as_str())?;

    page.fill(&IDENTIFICATION_INPUT, &config.credentials.username)?;
    page.click(&IDENTIFICATION_SUBMIT)?;

    page.fill(&PASSWORD_INPUT, &config.credentials.password)?;
    page.click(&PASSWORD_SUBMIT)?;

    let navigation = page.wait_for_document(login_url.as_str(), config.timeouts.login())?;
    expect_status("response for /login after sign-in", StatusCode::OK, navigation.status)?;
    expect_contains("upstream page after sign-in", &page.content()?, &identity_line(config))?;

    page.close()
}

/// Authenticating → authenticated: the session cookie carries over
pub fn stays_logged_in(session: &SharedSession<'_>, config: &AppConfig) -> Result<()> {
    let page = session.new_page()?;

    let navigation = page.goto(config.sandbox.upstream_url.as_str())?;
    expect_status("GET / with session", StatusCode::OK, navigation.status)?;
    expect_contains("upstream page with session", &page.content()?, &identity_line(config))?;

    page.close()
}

/// Authenticated → unauthenticated: sign-out ends on the identity provider
/// and the upstream refuses the next request.
pub fn logout_revokes_session(session: &SharedSession<'_>, config: &AppConfig) -> Result<()> {
    let page = session.new_page()?;
    let sign_out = config.sandbox.upstream(&Endpoint::SignOut.path())?;

    page.goto(sign_out.as_str())?;
    let landed = page.wait_for_url_prefix(
        &format!("{}/", config.sandbox.identity_origin()),
        session.timeouts().navigation(),
    )?;
    info!(url = %landed, "Signed out");

    let navigation = page.goto(config.sandbox.upstream_url.as_str())?;
    expect_status("GET / after sign-out", StatusCode::UNAUTHORIZED, navigation.status)?;

    page.close()
}

/// Run the steps in order. After a failure the remaining steps are skipped.
pub fn run(session: &SharedSession<'_>, config: &AppConfig) -> Vec<ScenarioOutcome> {
    let mut outcomes = Vec::with_capacity(STEPS.len());
    let mut failed = false;

    for (name, step) in STEPS {
        if failed {
            outcomes.push(ScenarioOutcome::skipped(Suite::Flow, name));
            continue;
        }

        let _span = scenario_span!(name, suite = %Suite::Flow).entered();
        let started = Instant::now();
        let result = step(session, config);
        let outcome = ScenarioOutcome::from_result(Suite::Flow, name, started.elapsed(), result);
        info!(name, passed = outcome.passed(), duration_ms = outcome.duration_ms, "Flow step finished");

        failed = !outcome.passed();
        outcomes.push(outcome);
    }

    outcomes
}

/// Launch a browser, open one shared context and run the flow in it
pub fn run_flow(config: &AppConfig) -> Result<Vec<ScenarioOutcome>> {
    let browser = BrowserFixture::launch(&config.browser, &config.timeouts)?;
    let session = browser.shared_session()?;
    Ok(run(&session, config))
}
