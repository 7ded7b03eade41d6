//! Shared sandbox for E2E tests
//!
//! The bootstrap (compose up, then health polling) runs exactly once per test
//! binary. Its result, success or failure, is memoised so every later test
//! sees the same outcome without retrying.
//!
//! The bootstrap runs in a dedicated tokio runtime on its own thread. Each
//! `#[tokio::test]` has a runtime that shuts down when the test completes,
//! and the synchronous browser flow test has none at all.

use std::sync::{Once, OnceLock};

use authentik_forward_e2e::bootstrap::bootstrap;
use authentik_forward_e2e::client::SandboxClient;
use authentik_forward_e2e::{init_logging, AppConfig};
use tracing::info;

/// Shared sandbox singleton
static SHARED_SANDBOX: OnceLock<SharedSandbox> = OnceLock::new();

/// Initialization result for waiting threads
static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

/// Dedicated runtime for the bootstrap
static SHARED_RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// Initialization lock to prevent concurrent bootstrap attempts
static INIT_ONCE: Once = Once::new();

pub fn e2e_enabled() -> bool {
    std::env::var("RUN_E2E").ok().as_deref() == Some("1")
}

/// A bootstrapped sandbox and the configuration it was started with
pub struct SharedSandbox {
    pub config: AppConfig,
}

impl SharedSandbox {
    /// Get the sandbox, bootstrapping it on first use
    pub fn get_or_init() -> anyhow::Result<&'static SharedSandbox> {
        if !e2e_enabled() {
            anyhow::bail!("E2E tests disabled (set RUN_E2E=1 to enable)");
        }

        // Fast path: already initialized
        if let Some(sandbox) = SHARED_SANDBOX.get() {
            return Ok(sandbox);
        }

        INIT_ONCE.call_once(|| {
            // Separate thread avoids "cannot start runtime within runtime"
            let handle = std::thread::spawn(|| {
                let runtime = SHARED_RUNTIME.get_or_init(|| {
                    tokio::runtime::Builder::new_multi_thread()
                        .enable_all()
                        .thread_name("shared-sandbox")
                        .build()
                        .expect("Failed to create shared sandbox runtime")
                });

                match runtime.block_on(Self::initialize()) {
                    Ok(sandbox) => {
                        let _ = SHARED_SANDBOX.set(sandbox);
                        let _ = INIT_RESULT.set(Ok(()));
                    }
                    Err(e) => {
                        let _ = INIT_RESULT.set(Err(format!("{e:#}")));
                    }
                }
            });

            if handle.join().is_err() {
                let _ = INIT_RESULT.set(Err("bootstrap thread panicked".to_string()));
            }
        });

        match INIT_RESULT.get() {
            Some(Ok(())) => Ok(SHARED_SANDBOX.get().expect("Init succeeded but no sandbox")),
            Some(Err(e)) => Err(anyhow::anyhow!("Sandbox bootstrap failed: {}", e)),
            None => Err(anyhow::anyhow!("Sandbox bootstrap incomplete")),
        }
    }

    async fn initialize() -> anyhow::Result<SharedSandbox> {
        let config = AppConfig::load()?;
        init_logging(&config.logging)?;

        info!(
            compose = config.bootstrap.compose,
            probe = %config.bootstrap.probe,
            "Initializing shared E2E sandbox..."
        );
        bootstrap(&config).await?;

        Ok(SharedSandbox { config })
    }

    /// Fresh HTTP fixture; dropped at the end of the test
    pub fn client(&self) -> SandboxClient {
        SandboxClient::from_config(&self.config).expect("Failed to build sandbox client")
    }
}
