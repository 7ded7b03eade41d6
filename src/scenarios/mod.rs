//! # Scenarios
//!
//! Assertion scripts run against the sandbox. The stateless scenarios
//! ([`status`], [`paths`]) each take their own HTTP client and may run in any
//! order; [`flow`] is one ordered login/logout sequence sharing a browser
//! context.
//!
//! Every scenario returns [`Result<()>`](crate::errors::Result); a mismatch is
//! an [`Error::Assertion`] with the expected and observed values. The
//! integration tests call scenarios directly, the CLI goes through
//! [`run_suite`] and prints a [`ScenarioReport`].

pub mod flow;
pub mod paths;
pub mod status;

use std::fmt::{self, Display};
use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, Instrument};

use crate::client::SandboxClient;
use crate::config::AppConfig;
use crate::errors::{Error, Result};
use crate::scenario_span;

/// Characters of a body quoted in assertion messages
const EXCERPT_LEN: usize = 200;

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

pub fn expect_status(what: &str, expected: StatusCode, actual: impl Into<u16>) -> Result<()> {
    let actual = actual.into();
    if expected.as_u16() != actual {
        return Err(Error::assertion(what, expected.as_u16(), actual));
    }
    Ok(())
}

pub fn expect_eq<T: PartialEq + Display + ?Sized>(what: &str, expected: &T, actual: &T) -> Result<()> {
    if expected != actual {
        return Err(Error::assertion(what, expected, actual));
    }
    Ok(())
}

pub fn expect_contains(what: &str, haystack: &str, needle: &str) -> Result<()> {
    if !haystack.contains(needle) {
        return Err(Error::assertion(
            what,
            format!("content containing '{needle}'"),
            format!("'{}'", excerpt(haystack)),
        ));
    }
    Ok(())
}

pub fn expect_not_contains(what: &str, haystack: &str, needle: &str) -> Result<()> {
    if let Some(at) = haystack.find(needle) {
        let line = haystack[at..].lines().next().unwrap_or(needle);
        return Err(Error::assertion(what, format!("no '{needle}'"), format!("'{line}'")));
    }
    Ok(())
}

/// Scenario groups selectable from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Status,
    Paths,
    Flow,
    All,
}

impl Suite {
    fn includes(self, other: Suite) -> bool {
        self == Suite::All || self == other
    }
}

impl Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suite::Status => write!(f, "status"),
            Suite::Paths => write!(f, "paths"),
            Suite::Flow => write!(f, "flow"),
            Suite::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed(String),
    /// An earlier step of an ordered group failed
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub suite: Suite,
    pub name: String,
    pub duration_ms: u64,
    pub verdict: Verdict,
}

impl ScenarioOutcome {
    pub fn from_result(suite: Suite, name: impl Into<String>, duration: Duration, result: Result<()>) -> Self {
        let verdict = match result {
            Ok(()) => Verdict::Passed,
            Err(e) => Verdict::Failed(e.to_string()),
        };
        Self { suite, name: name.into(), duration_ms: duration.as_millis() as u64, verdict }
    }

    pub fn skipped(suite: Suite, name: impl Into<String>) -> Self {
        Self { suite, name: name.into(), duration_ms: 0, verdict: Verdict::Skipped }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioReport {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl ScenarioReport {
    pub fn push(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    fn count(&self, verdict: fn(&Verdict) -> bool) -> usize {
        self.outcomes.iter().filter(|o| verdict(&o.verdict)).count()
    }

    pub fn passed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }
}

async fn run_one<F, Fut>(report: &mut ScenarioReport, suite: Suite, name: &str, scenario: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let started = Instant::now();
    let result = scenario().instrument(scenario_span!(name, suite = %suite)).await;
    let outcome = ScenarioOutcome::from_result(suite, name, started.elapsed(), result);
    info!(suite = %suite, name, passed = outcome.passed(), duration_ms = outcome.duration_ms, "Scenario finished");
    report.push(outcome);
}

/// Run the selected scenarios against a sandbox that is already up
pub async fn run_suite(config: &AppConfig, suite: Suite) -> Result<ScenarioReport> {
    let mut report = ScenarioReport::default();
    let sandbox = &config.sandbox;

    if suite.includes(Suite::Status) {
        for scenario in status::StatusScenario::ALL {
            let client = SandboxClient::from_config(config)?;
            run_one(&mut report, Suite::Status, scenario.name(), || async move {
                scenario.run(&client, sandbox).await
            })
            .await;
        }
    }

    if suite.includes(Suite::Paths) {
        for expectation in paths::all_paths() {
            let client = SandboxClient::from_config(config)?;
            let name = expectation.name();
            run_one(&mut report, Suite::Paths, &name, || async move {
                paths::probe_path(&client, sandbox, &expectation).await
            })
            .await;
        }
    }

    if suite.includes(Suite::Flow) {
        let config = config.clone();
        let outcomes = tokio::task::spawn_blocking(move || flow::run_flow(&config))
            .await
            .map_err(|e| Error::browser(format!("login flow task failed: {e}")))??;
        for outcome in outcomes {
            report.push(outcome);
        }
    }

    Ok(report)
}
