/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Signed SPEKE v2 requests
//!
//! Requests are sent as-is: no retries, no timeouts beyond the HTTP client defaults, and the
//! response is handed back uninterpreted so test cases can assert on error statuses too.

use crate::constants::SPEKE_V2_REQUEST_HEADERS;
use reqwest::blocking::{Client, Response};
use speke_auth::provider::{ProvideCredentials, SharedCredentialsProvider};
use speke_auth::{get_aws_auth, AuthError, AwsAuth};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RequestError {
    #[error("failed to sign SPEKE request")]
    Auth(#[from] AuthError),
    #[error("failed to send SPEKE request")]
    Http(#[from] reqwest::Error),
}

/// POST `request_data` to `speke_url`, signed with credentials from the default provider chain
pub fn speke_v2_request(
    speke_url: &str,
    request_data: impl Into<Vec<u8>>,
) -> Result<Response, RequestError> {
    SpekeClient::new().send(speke_url, request_data)
}

/// Sends SigV4 signed SPEKE v2 requests
pub struct SpekeClient {
    http: Client,
    // default provider chain when unset, resolved afresh for every request
    credentials: Option<SharedCredentialsProvider>,
}

impl Default for SpekeClient {
    fn default() -> Self {
        SpekeClient::new()
    }
}

impl SpekeClient {
    pub fn new() -> Self {
        SpekeClient {
            http: Client::new(),
            credentials: None,
        }
    }

    pub fn with_credentials(credentials: impl ProvideCredentials + 'static) -> Self {
        SpekeClient {
            http: Client::new(),
            credentials: Some(SharedCredentialsProvider::new(credentials)),
        }
    }

    /// Replace the underlying HTTP client, e.g. to pin DNS resolution in tests
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Sign for the API Gateway host in `speke_url` and send
    pub fn send(
        &self,
        speke_url: &str,
        request_data: impl Into<Vec<u8>>,
    ) -> Result<Response, RequestError> {
        let auth = match &self.credentials {
            Some(credentials) => AwsAuth::from_url(speke_url, credentials)?,
            None => get_aws_auth(speke_url)?,
        };
        self.send_with_auth(speke_url, request_data, &auth)
    }

    /// Send with a caller-built signer, for endpoints on custom domains
    pub fn send_with_auth(
        &self,
        speke_url: &str,
        request_data: impl Into<Vec<u8>>,
        auth: &AwsAuth,
    ) -> Result<Response, RequestError> {
        let body = request_data.into();
        let _span = tracing::debug_span!("speke_v2_request", url = %speke_url).entered();
        let signature = auth.sign("POST", speke_url, SPEKE_V2_REQUEST_HEADERS, &body)?;

        let mut request = self.http.post(speke_url);
        for (name, value) in SPEKE_V2_REQUEST_HEADERS {
            request = request.header(*name, *value);
        }
        for (name, value) in &signature {
            request = request.header(name.as_str(), value.as_str());
        }
        tracing::debug!(bytes = body.len(), "sending SPEKE request");
        let response = request.body(body).send()?;
        tracing::debug!(status = %response.status(), "received SPEKE response");
        Ok(response)
    }
}
