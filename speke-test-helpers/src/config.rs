/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::fixture::DEFAULT_REQUESTS_DIR;
use aws_types::os_shim_internal::Env;
use std::path::PathBuf;

/// Endpoint under test, e.g. `https://abc123.execute-api.us-east-1.amazonaws.com/stage/copyProtection`
pub const SPEKE_URL_ENV_VAR: &str = "SPEKE_URL";
/// Overrides the directory request fixtures are loaded from
pub const REQUESTS_DIR_ENV_VAR: &str = "SPEKE_REQUESTS_DIR";

/// Settings for a verification run, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    pub speke_url: Option<String>,
    pub requests_dir: PathBuf,
}

impl Default for TestConfig {
    fn default() -> Self {
        TestConfig {
            speke_url: None,
            requests_dir: PathBuf::from(DEFAULT_REQUESTS_DIR),
        }
    }
}

impl TestConfig {
    pub fn from_env(env: &Env) -> Self {
        let non_empty = |name: &str| env.get(name).ok().filter(|value| !value.trim().is_empty());
        let config = TestConfig {
            speke_url: non_empty(SPEKE_URL_ENV_VAR).map(|url| url.trim().to_string()),
            requests_dir: non_empty(REQUESTS_DIR_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REQUESTS_DIR)),
        };
        tracing::debug!(config = ?config, "loaded test configuration");
        config
    }
}
