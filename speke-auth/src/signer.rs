/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! SigV4 signing bound to an API Gateway host
//!
//! SPEKE v2 endpoints under test are fronted by API Gateway and authorize callers with IAM, so
//! every request carries a SigV4 signature for the `execute-api` service. The signing region is
//! recovered from the default API Gateway domain, `<api-id>.execute-api.<region>.amazonaws.com`.
//! Custom domains do not carry the region and are rejected by [`get_aws_auth`]; build an
//! [`AwsAuth`] with [`AwsAuth::new`] for those.

use crate::provider::{self, CredentialsError, ProvideCredentials};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use http::Uri;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;

/// The signing name for API Gateway
pub const EXECUTE_API_SERVICE: &str = "execute-api";

static API_GATEWAY_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+\.execute-api\.(.+)\.amazonaws\.com").unwrap());

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: http::uri::InvalidUri,
    },
    #[error("url `{url}` has no host")]
    MissingHost { url: String },
    #[error("`{host}` is not an API Gateway host of the form <id>.execute-api.<region>.amazonaws.com")]
    UnrecognizedHost { host: String },
    #[error("failed to resolve credentials")]
    Credentials(#[from] CredentialsError),
    #[error("failed to sign request")]
    Signing(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Returns the region of a default API Gateway host, if `host` is one
///
/// Only the start of the host is anchored, so a trailing port is tolerated.
pub fn region_from_host(host: &str) -> Option<&str> {
    API_GATEWAY_HOST
        .captures(host)
        .and_then(|captures| captures.get(1))
        .map(|region| region.as_str())
}

/// Returns the network location (`host[:port]`) of `url`
pub fn network_location(url: &str) -> Result<String, AuthError> {
    let uri: Uri = url.parse().map_err(|source| AuthError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    let authority = uri.authority().ok_or_else(|| AuthError::MissingHost {
        url: url.to_string(),
    })?;
    Ok(match authority.port_u16() {
        Some(port) => format!("{}:{}", authority.host(), port),
        None => authority.host().to_string(),
    })
}

/// Returns the network location and signing region of an API Gateway `url`
fn api_gateway_binding(url: &str) -> Result<(String, String), AuthError> {
    let host = network_location(url)?;
    let region = region_from_host(&host)
        .ok_or_else(|| AuthError::UnrecognizedHost { host: host.clone() })?
        .to_string();
    tracing::debug!(host = %host, region = %region, "resolved signing parameters");
    Ok((host, region))
}

/// Build a signer for `url` with credentials from the [default provider chain](provider::resolve_credentials)
///
/// The host is checked before any credentials are resolved.
pub fn get_aws_auth(url: &str) -> Result<AwsAuth, AuthError> {
    let (host, region) = api_gateway_binding(url)?;
    let credentials = provider::resolve_credentials()?;
    Ok(AwsAuth::new(host, region, EXECUTE_API_SERVICE, credentials))
}

/// SigV4 signer bound to a host, region and service
#[derive(Clone)]
pub struct AwsAuth {
    host: String,
    region: String,
    service: String,
    credentials: Credentials,
}

impl fmt::Debug for AwsAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsAuth")
            .field("host", &self.host)
            .field("region", &self.region)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl AwsAuth {
    pub fn new(
        host: impl Into<String>,
        region: impl Into<String>,
        service: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        AwsAuth {
            host: host.into(),
            region: region.into(),
            service: service.into(),
            credentials,
        }
    }

    /// Derive host and region from an API Gateway `url` and resolve `credentials`
    pub fn from_url(url: &str, credentials: &dyn ProvideCredentials) -> Result<Self, AuthError> {
        let (host, region) = api_gateway_binding(url)?;
        let credentials = provider::provide_blocking(credentials)?;
        Ok(AwsAuth::new(host, region, EXECUTE_API_SERVICE, credentials))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Compute the signature headers for a request made now
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<Vec<(String, String)>, AuthError> {
        self.sign_at(method, url, headers, body, SystemTime::now())
    }

    /// Compute the signature headers for a request made at `time`
    ///
    /// The returned headers (`authorization`, `x-amz-date` and, with a session token,
    /// `x-amz-security-token`) must be sent alongside `headers`. The bound host is signed as the
    /// `host` header.
    pub fn sign_at(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
        time: SystemTime,
    ) -> Result<Vec<(String, String)>, AuthError> {
        let identity: Identity = self.credentials.clone().into();
        let signing_params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(time)
            .settings(SigningSettings::default())
            .build()
            .map_err(|err| AuthError::Signing(err.into()))?
            .into();

        let signable_headers = std::iter::once(("host", self.host.as_str()))
            .chain(headers.iter().map(|(name, value)| (*name, *value)));
        let signable_request =
            SignableRequest::new(method, url, signable_headers, SignableBody::Bytes(body))
                .map_err(|err| AuthError::Signing(err.into()))?;
        let (instructions, signature) = sign(signable_request, &signing_params)
            .map_err(|err| AuthError::Signing(err.into()))?
            .into_parts();
        tracing::trace!(host = %self.host, signature = %signature, "signed request");

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}
