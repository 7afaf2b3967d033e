/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! AWS authentication for SPEKE v2 verification requests
//!
//! - [`provider`]: where credentials come from
//! - [`signer`]: SigV4 signing bound to an API Gateway host

pub mod provider;
pub mod signer;

pub use aws_credential_types::Credentials;
pub use signer::{get_aws_auth, AuthError, AwsAuth};
