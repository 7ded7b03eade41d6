//! Outpost path probes: restricted endpoints answer, the rest fall through

use authentik_forward_e2e::scenarios::paths::{
    allowed_paths, probe_path, restricted_paths, PathExpectation,
};

use crate::common::SharedSandbox;

async fn probe_all(expectations: Vec<PathExpectation>) {
    let sandbox = SharedSandbox::get_or_init().expect("Sandbox should be ready");

    let mut failures = Vec::new();
    for expectation in &expectations {
        let client = sandbox.client();
        match probe_path(&client, &sandbox.config.sandbox, expectation).await {
            Ok(()) => println!("✓ {}", expectation.name()),
            Err(e) => failures.push(format!("{}: {e}", expectation.name())),
        }
    }

    assert!(failures.is_empty(), "path probes failed:\n{}", failures.join("\n"));
}

#[tokio::test]
#[ignore = "requires RUN_E2E=1"]
async fn restricted_paths_are_answered_by_the_outpost() {
    probe_all(restricted_paths()).await;
}

#[tokio::test]
#[ignore = "requires RUN_E2E=1"]
async fn allowed_paths_fall_through_to_not_found() {
    probe_all(allowed_paths()).await;
}
