/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_config::provider_config::ProviderConfig;
use aws_types::os_shim_internal::{Env, Fs};
use speke_auth::provider::resolve_credentials_with;
use speke_auth::AwsAuth;
use std::time::{Duration, SystemTime};

const SPEKE_URL: &str = "https://k8s9x0.execute-api.ap-southeast-2.amazonaws.com/prod/copyProtection";

const CONFIG_FILE: &str = "\
[default]
region = ap-southeast-2
aws_access_key_id = AKIDCONFIG
aws_secret_access_key = config-secret
";

const CREDENTIALS_FILE: &str = "\
[speke]
aws_access_key_id = AKIDSPEKE
aws_secret_access_key = speke-secret
aws_session_token = speke-token
";

/// Provider config over a fake home directory; instance metadata is disabled so nothing
/// leaves the process
fn provider_config(env: &[(&str, &str)], files: &[(&str, &str)]) -> ProviderConfig {
    let mut vars = vec![("HOME", "/home/tester"), ("AWS_EC2_METADATA_DISABLED", "true")];
    vars.extend_from_slice(env);
    ProviderConfig::default()
        .with_env(Env::from_slice(&vars))
        .with_fs(Fs::from_slice(files))
}

fn authorization(auth: &AwsAuth) -> String {
    let headers = auth
        .sign_at(
            "POST",
            SPEKE_URL,
            &[("x-speke-version", "2.0")],
            b"<cpix:CPIX/>",
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000),
        )
        .expect("signing succeeds");
    headers
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value)
        .expect("authorization header")
}

#[test]
fn environment_wins_over_profiles() {
    let credentials = resolve_credentials_with(provider_config(
        &[
            ("AWS_ACCESS_KEY_ID", "AKIDENV"),
            ("AWS_SECRET_ACCESS_KEY", "env-secret"),
        ],
        &[("/home/tester/.aws/config", CONFIG_FILE)],
    ))
    .expect("environment credentials");
    let auth = AwsAuth::from_url(SPEKE_URL, &credentials).unwrap();
    assert_eq!(auth.region(), "ap-southeast-2");
    assert!(authorization(&auth)
        .starts_with("AWS4-HMAC-SHA256 Credential=AKIDENV/20200913/ap-southeast-2/execute-api/"));
}

#[test]
fn static_keys_in_shared_config_file() {
    let credentials =
        resolve_credentials_with(provider_config(&[], &[("/home/tester/.aws/config", CONFIG_FILE)]))
            .expect("config file keys resolve");
    assert_eq!(credentials.access_key_id(), "AKIDCONFIG");
    assert_eq!(credentials.secret_access_key(), "config-secret");
}

#[test]
fn selected_profile_from_credentials_file() {
    let credentials = resolve_credentials_with(provider_config(
        &[("AWS_PROFILE", "speke")],
        &[
            ("/home/tester/.aws/config", CONFIG_FILE),
            ("/home/tester/.aws/credentials", CREDENTIALS_FILE),
        ],
    ))
    .expect("profile credentials");
    assert_eq!(credentials.access_key_id(), "AKIDSPEKE");
    assert_eq!(credentials.session_token(), Some("speke-token"));
    let auth = AwsAuth::from_url(SPEKE_URL, &credentials).unwrap();
    assert!(authorization(&auth).contains("Credential=AKIDSPEKE/"));
}

#[test]
fn secrets_are_used_verbatim() {
    let credentials = resolve_credentials_with(provider_config(
        &[
            ("AWS_ACCESS_KEY_ID", "AKIDENV"),
            ("AWS_SECRET_ACCESS_KEY", " padded-secret"),
        ],
        &[],
    ))
    .expect("environment credentials");
    assert_eq!(credentials.secret_access_key(), " padded-secret");
}

#[test]
fn no_credentials_anywhere() {
    let err = resolve_credentials_with(provider_config(&[], &[])).expect_err("nothing to load");
    assert!(!format!("{}", err).is_empty());
}
