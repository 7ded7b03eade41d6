//! Stateless status checks through the HTTP fixture
//!
//! Each test owns its client and never follows redirects.

use authentik_forward_e2e::scenarios::status;

use crate::common::SharedSandbox;

#[tokio::test]
#[ignore = "requires RUN_E2E=1"]
async fn allow_is_public() {
    let sandbox = SharedSandbox::get_or_init().expect("Sandbox should be ready");
    let client = sandbox.client();

    status::allow_is_public(&client, &sandbox.config.sandbox)
        .await
        .expect("/allow should reach the upstream without identity headers");
}

#[tokio::test]
#[ignore = "requires RUN_E2E=1"]
async fn deny_is_unauthorized() {
    let sandbox = SharedSandbox::get_or_init().expect("Sandbox should be ready");
    let client = sandbox.client();

    status::deny_is_unauthorized(&client, &sandbox.config.sandbox)
        .await
        .expect("/deny should return 401");
}

#[tokio::test]
#[ignore = "requires RUN_E2E=1"]
async fn login_redirects_to_start() {
    let sandbox = SharedSandbox::get_or_init().expect("Sandbox should be ready");
    let client = sandbox.client();

    status::login_redirects_to_start(&client, &sandbox.config.sandbox)
        .await
        .expect("/login should redirect to the start flow");
}

#[tokio::test]
#[ignore = "requires RUN_E2E=1"]
async fn sign_out_redirects_to_start() {
    let sandbox = SharedSandbox::get_or_init().expect("Sandbox should be ready");
    let client = sandbox.client();

    status::sign_out_redirects_to_start(&client, &sandbox.config.sandbox)
        .await
        .expect("sign_out without a session should redirect to the start flow");
}

#[tokio::test]
#[ignore = "requires RUN_E2E=1"]
async fn invalid_callback_is_bad_request() {
    let sandbox = SharedSandbox::get_or_init().expect("Sandbox should be ready");
    let client = sandbox.client();

    status::invalid_callback_is_bad_request(&client, &sandbox.config.sandbox)
        .await
        .expect("callback without flow state should return 400");
}
