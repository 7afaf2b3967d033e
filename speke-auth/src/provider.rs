/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Credential resolution for signed SPEKE requests
//!
//! Credentials come from the SDK's [`DefaultCredentialsChain`]: environment variables, shared
//! config and credentials profiles (including SSO and assume-role), web identity tokens, ECS
//! and EC2 instance metadata. SDK providers are async while the rest of this crate blocks, so
//! each resolution drives the provider on its own current-thread Tokio runtime.
//!
//! None of the functions here may be called from within an async runtime.

use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::provider_config::ProviderConfig;
use aws_credential_types::Credentials;
use std::future::Future;

pub use aws_credential_types::provider::error::CredentialsError;
pub use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};

pub type CredentialsResult = Result<Credentials, CredentialsError>;

fn block_on<F: Future>(future: F) -> Result<F::Output, CredentialsError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CredentialsError::unhandled)?;
    Ok(runtime.block_on(future))
}

/// Resolve credentials with the default provider chain
pub fn resolve_credentials() -> CredentialsResult {
    resolve_credentials_with(ProviderConfig::default())
}

/// Resolve credentials with the default provider chain configured by `config`
///
/// The chain is built and queried on the same runtime; its HTTP clients do not outlive it.
pub fn resolve_credentials_with(config: ProviderConfig) -> CredentialsResult {
    block_on(async move {
        let chain = DefaultCredentialsChain::builder()
            .configure(config)
            .build()
            .await;
        chain.provide_credentials().await
    })?
    .map(|credentials| {
        tracing::debug!(expiry = ?credentials.expiry(), "resolved credentials");
        credentials
    })
}

/// Resolve credentials from any SDK provider
pub fn provide_blocking(provider: &dyn ProvideCredentials) -> CredentialsResult {
    block_on(provider.provide_credentials())?
}

#[cfg(test)]
mod test {
    use super::{
        provide_blocking, resolve_credentials_with, CredentialsError, ProvideCredentials,
        SharedCredentialsProvider,
    };
    use aws_config::provider_config::ProviderConfig;
    use aws_credential_types::provider::future;
    use aws_credential_types::Credentials;
    use aws_types::os_shim_internal::{Env, Fs};
    use tracing_test::traced_test;

    fn assert_send_sync<T: Send + Sync>() {}

    #[derive(Debug)]
    struct Unavailable;

    impl ProvideCredentials for Unavailable {
        fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
        where
            Self: 'a,
        {
            future::ProvideCredentials::ready(Err(CredentialsError::not_loaded("nothing here")))
        }
    }

    #[test]
    fn providers_are_send_sync() {
        assert_send_sync::<Credentials>();
        assert_send_sync::<SharedCredentialsProvider>();
    }

    #[test]
    fn static_credentials_provide_themselves() {
        let creds = Credentials::new("AKID", "SECRET", Some("TOKEN".into()), None, "test");
        let provided = provide_blocking(&creds).expect("static creds never fail");
        assert_eq!(provided.access_key_id(), "AKID");
        assert_eq!(provided.secret_access_key(), "SECRET");
        assert_eq!(provided.session_token(), Some("TOKEN"));
    }

    #[test]
    fn shared_provider_delegates() {
        let shared = SharedCredentialsProvider::new(Credentials::new("AKID", "SECRET", None, None, "test"));
        assert_eq!(provide_blocking(&shared).unwrap().access_key_id(), "AKID");
    }

    #[test]
    fn provider_errors_propagate() {
        let err = provide_blocking(&Unavailable).expect_err("nothing to provide");
        assert!(matches!(err, CredentialsError::CredentialsNotLoaded(..)), "{:?}", err);
    }

    #[test]
    #[traced_test]
    fn default_chain_reads_environment() {
        let config = ProviderConfig::default()
            .with_env(Env::from_slice(&[
                ("AWS_ACCESS_KEY_ID", "AKIDENV"),
                ("AWS_SECRET_ACCESS_KEY", "env-secret"),
                ("AWS_SESSION_TOKEN", "env-token"),
            ]))
            .with_fs(Fs::from_slice(&[]));
        let credentials = resolve_credentials_with(config).expect("environment credentials");
        assert_eq!(credentials.access_key_id(), "AKIDENV");
        assert_eq!(credentials.session_token(), Some("env-token"));
        assert!(logs_contain("resolved credentials"));
    }
}
