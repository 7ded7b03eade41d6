//! Shared browser context fixture
//!
//! [`BrowserFixture`] owns one headless Chrome process. A [`SharedSession`]
//! is an isolated browser context (its own cookie jar) borrowed from the
//! fixture; pages opened from it see each other's cookies, which is what lets
//! an ordered login → stay-logged-in → logout sequence work. Each step opens
//! its own [`Page`] and closes it when done; the context lives until the
//! session is dropped, and the browser until the fixture is dropped.
//!
//! The DevTools driver is blocking. Async callers should move browser work to
//! `tokio::task::spawn_blocking`.

pub mod dom;

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::browser::context::Context;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{BrowserSettings, TimeoutSettings};
use crate::errors::{Error, Result};
use crate::retry::{poll_blocking, RetryPolicy};

use dom::{deep_action, DomAction, NAVIGATION_STATUS, READY_STATE};

/// Chrome is shut down after this long without DevTools traffic
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(600);

fn driver<E: Display>(action: impl Into<String>) -> impl FnOnce(E) -> Error {
    let action = action.into();
    move |e| Error::browser(format!("{action}: {e}"))
}

/// Compare two URLs after normalisation (`http://h` equals `http://h/`)
fn same_url(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Outcome of a document navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Final URL after redirects
    pub url: String,
    /// Status of the final document response
    pub status: u16,
}

/// Worker-scoped browser process
pub struct BrowserFixture {
    browser: Browser,
    timeouts: TimeoutSettings,
}

impl BrowserFixture {
    pub fn launch(settings: &BrowserSettings, timeouts: &TimeoutSettings) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .sandbox(settings.sandbox)
            .window_size(Some((settings.window_width, settings.window_height)))
            .path(settings.chrome_path.clone())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| Error::browser(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options).map_err(driver("launching Chrome"))?;
        info!(headless = settings.headless, "Browser launched");

        Ok(Self { browser, timeouts: timeouts.clone() })
    }

    /// Create an isolated context shared by an ordered group of steps
    pub fn shared_session(&self) -> Result<SharedSession<'_>> {
        let context = self.browser.new_context().map_err(driver("creating browser context"))?;
        info!(context = context.get_id(), "Shared browser context created");
        Ok(SharedSession { context, timeouts: self.timeouts.clone() })
    }

    /// Page in the browser's default context
    pub fn new_page(&self) -> Result<Page> {
        let tab = self.browser.new_tab().map_err(driver("opening tab"))?;
        Ok(Page::new(tab, &self.timeouts))
    }
}

/// Browser context whose cookie jar persists across pages
pub struct SharedSession<'a> {
    context: Context<'a>,
    timeouts: TimeoutSettings,
}

impl SharedSession<'_> {
    pub fn id(&self) -> &str {
        self.context.get_id()
    }

    pub fn new_page(&self) -> Result<Page> {
        let tab = self.context.new_tab().map_err(driver("opening tab in shared context"))?;
        debug!(context = self.id(), "Opened page in shared context");
        Ok(Page::new(tab, &self.timeouts))
    }

    pub fn timeouts(&self) -> &TimeoutSettings {
        &self.timeouts
    }
}

impl Drop for SharedSession<'_> {
    fn drop(&mut self) {
        debug!(context = self.context.get_id(), "Shared browser context released");
    }
}

/// One tab; closed on drop
pub struct Page {
    tab: Arc<Tab>,
    timeouts: TimeoutSettings,
    closed: bool,
}

impl Page {
    fn new(tab: Arc<Tab>, timeouts: &TimeoutSettings) -> Self {
        tab.set_default_timeout(timeouts.navigation());
        Self { tab, timeouts: timeouts.clone(), closed: false }
    }

    fn eval(&self, expression: &str) -> Result<Value> {
        let object = self.tab.evaluate(expression, false).map_err(driver("evaluating script"))?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    fn dom(&self, chain: &[&str], action: DomAction<'_>) -> Result<bool> {
        Ok(self.eval(&deep_action(chain, &action))? == Value::Bool(true))
    }

    /// Navigate and wait for the final document of the redirect chain
    pub fn goto(&self, url: &str) -> Result<Navigation> {
        debug!(url, "Navigating");
        self.tab.navigate_to(url).map_err(driver(format!("navigating to {url}")))?;
        self.tab.wait_until_navigated().map_err(driver(format!("waiting for {url}")))?;

        let policy = RetryPolicy::browser(self.timeouts.navigation(), format!("document for {url}"));
        let navigation = poll_blocking(&policy, || self.loaded_document())?;
        debug!(requested = url, url = %navigation.url, status = navigation.status, "Navigation finished");
        Ok(navigation)
    }

    /// Navigate once and report whatever status the document got.
    ///
    /// Unlike [`Page::goto`] this does not wait for a non-zero status, so a
    /// refused connection (Chrome's error page) reads as 0 right away.
    pub fn status_of(&self, url: &str) -> Result<u16> {
        self.tab.navigate_to(url).map_err(driver(format!("navigating to {url}")))?;
        self.tab.wait_until_navigated().map_err(driver(format!("waiting for {url}")))?;
        self.status()
    }

    /// Current document once it has finished loading
    fn loaded_document(&self) -> Result<Option<Navigation>> {
        if self.eval(READY_STATE)? != Value::from("complete") {
            return Ok(None);
        }
        let status = self.status()?;
        Ok((status > 0).then(|| Navigation { url: self.url(), status }))
    }

    /// Status of the current document's response (0 while unknown)
    pub fn status(&self) -> Result<u16> {
        let status = self.eval(NAVIGATION_STATUS)?.as_u64().unwrap_or(0);
        Ok(u16::try_from(status).unwrap_or(0))
    }

    pub fn url(&self) -> String {
        self.tab.get_url()
    }

    /// Serialized DOM of the current document
    pub fn content(&self) -> Result<String> {
        self.tab.get_content().map_err(driver("reading page content"))
    }

    /// Wait until the element at the end of `chain` is rendered
    pub fn wait_for_selector(&self, chain: &[&str]) -> Result<()> {
        let policy =
            RetryPolicy::browser(self.timeouts.navigation(), format!("selector {}", chain.join(" ")));
        poll_blocking(&policy, || Ok(self.dom(chain, DomAction::Visible)?.then_some(())))
    }

    pub fn fill(&self, chain: &[&str], value: &str) -> Result<()> {
        self.wait_for_selector(chain)?;
        if !self.dom(chain, DomAction::Fill(value))? {
            return Err(Error::browser(format!("cannot fill {}", chain.join(" "))));
        }
        Ok(())
    }

    pub fn click(&self, chain: &[&str]) -> Result<()> {
        self.wait_for_selector(chain)?;
        if !self.dom(chain, DomAction::Click)? {
            return Err(Error::browser(format!("cannot click {}", chain.join(" "))));
        }
        Ok(())
    }

    /// Whether the element at the end of `chain` exists right now
    pub fn exists(&self, chain: &[&str]) -> Result<bool> {
        self.dom(chain, DomAction::Exists)
    }

    /// Wait until the page URL starts with `prefix`
    pub fn wait_for_url_prefix(&self, prefix: &str, timeout: Duration) -> Result<String> {
        let policy = RetryPolicy::browser(timeout, format!("URL under {prefix}"));
        poll_blocking(&policy, || {
            let url = self.url();
            Ok(url.starts_with(prefix).then_some(url))
        })
    }

    /// Wait until the page has fully loaded a document for `url`
    pub fn wait_for_document(&self, url: &str, timeout: Duration) -> Result<Navigation> {
        let policy = RetryPolicy::browser(timeout, format!("response for {url}"));
        poll_blocking(&policy, || {
            if !same_url(&self.url(), url) {
                return Ok(None);
            }
            self.loaded_document()
        })
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.tab.close(true).map_err(driver("closing tab"))?;
        Ok(())
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.tab.close(true) {
                warn!(error = %e, "Failed to close page");
            }
        }
    }
}
