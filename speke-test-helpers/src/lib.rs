/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Helpers for verifying SPEKE v2 key providers against the CPIX schema
//!
//! A typical test loads a canned request, sends it signed to the endpoint under test, and
//! inspects the response:
//!
//! ```no_run
//! use speke_test_helpers::constants::{cpix_tag, GENERIC_WIDEVINE_TEST_FILE};
//! use speke_test_helpers::{count_tags, read_xml_file_contents, speke_v2_request};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = read_xml_file_contents(GENERIC_WIDEVINE_TEST_FILE)?;
//! let response = speke_v2_request(
//!     "https://abc123.execute-api.us-east-1.amazonaws.com/stage/copyProtection",
//!     request,
//! )?;
//! let tags = count_tags(&response.text()?)?;
//! assert_eq!(tags.get(&cpix_tag("ContentKey")), Some(&1));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod fixture;
pub mod hls;
pub mod request;
pub mod xml;

pub use fixture::read_xml_file_contents;
pub use hls::{
    decode_b64_bytes, parse_ext_x_key_contents, parse_ext_x_session_key_contents, Playlist,
};
pub use request::{speke_v2_request, RequestError, SpekeClient};
pub use speke_auth::get_aws_auth;
pub use xml::{count_child_element_tags_for_element, count_tags, TagCounts, XmlError};
