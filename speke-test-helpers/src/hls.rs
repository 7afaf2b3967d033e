/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Decoding of `HLSSignalingData` payloads
//!
//! CPIX carries HLS key tags base64 encoded inside `HLSSignalingData` elements: an
//! `#EXT-X-KEY` for media playlists and an `#EXT-X-SESSION-KEY` for master playlists. The two
//! tags share one attribute grammar, so session keys are rewritten into `#EXT-X-KEY` before
//! parsing and both end up in [`Playlist::keys`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use std::str::FromStr;
use std::string::FromUtf8Error;
use thiserror::Error;

const EXT_X_KEY: &str = "#EXT-X-KEY:";
const EXT_X_SESSION_KEY: &str = "#EXT-X-SESSION-KEY:";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("payload is not valid base64")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded payload is not valid utf-8")]
    Utf8(#[from] FromUtf8Error),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaylistError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("invalid {tag} tag on line {line}: {reason}")]
    InvalidKey {
        tag: &'static str,
        line: usize,
        reason: String,
    },
}

/// Base64 decode `text_in_bytes`, then decode the result as UTF-8
///
/// ASCII whitespace is skipped, since payloads copied out of XML text nodes are often wrapped.
pub fn decode_b64_bytes(text_in_bytes: impl AsRef<[u8]>) -> Result<String, DecodeError> {
    let compact: Vec<u8> = text_in_bytes
        .as_ref()
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let decoded = STANDARD.decode(compact)?;
    Ok(String::from_utf8(decoded)?)
}

/// Decode a base64 `#EXT-X-KEY` payload and parse it
pub fn parse_ext_x_key_contents(text_in_bytes: impl AsRef<[u8]>) -> Result<Playlist, PlaylistError> {
    let decoded = decode_b64_bytes(text_in_bytes)?;
    Playlist::parse(&decoded)
}

/// Decode a base64 `#EXT-X-SESSION-KEY` payload and parse it as if it were `#EXT-X-KEY`
pub fn parse_ext_x_session_key_contents(
    text_in_bytes: impl AsRef<[u8]>,
) -> Result<Playlist, PlaylistError> {
    let decoded = decode_b64_bytes(text_in_bytes)?
        .replace("#EXT-X-SESSION-KEY:METHOD", "#EXT-X-KEY:METHOD");
    Playlist::parse(&decoded)
}

/// Key tags of a playlist or playlist fragment
///
/// Lines other than `#EXT-X-KEY` and `#EXT-X-SESSION-KEY` are ignored, and the `#EXTM3U`
/// header is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    pub keys: Vec<Key>,
    pub session_keys: Vec<Key>,
}

impl Playlist {
    pub fn parse(text: &str) -> Result<Self, PlaylistError> {
        let mut playlist = Playlist::default();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if let Some(attributes) = line.strip_prefix(EXT_X_SESSION_KEY) {
                playlist
                    .session_keys
                    .push(Key::from_attributes("EXT-X-SESSION-KEY", index + 1, attributes)?);
            } else if let Some(attributes) = line.strip_prefix(EXT_X_KEY) {
                playlist
                    .keys
                    .push(Key::from_attributes("EXT-X-KEY", index + 1, attributes)?);
            }
        }
        tracing::trace!(
            keys = playlist.keys.len(),
            session_keys = playlist.session_keys.len(),
            "parsed playlist"
        );
        Ok(playlist)
    }
}

impl FromStr for Playlist {
    type Err = PlaylistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Playlist::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMethod {
    None,
    Aes128,
    SampleAes,
    SampleAesCtr,
    Other(String),
}

impl KeyMethod {
    pub fn as_str(&self) -> &str {
        match self {
            KeyMethod::None => "NONE",
            KeyMethod::Aes128 => "AES-128",
            KeyMethod::SampleAes => "SAMPLE-AES",
            KeyMethod::SampleAesCtr => "SAMPLE-AES-CTR",
            KeyMethod::Other(method) => method,
        }
    }
}

impl From<&str> for KeyMethod {
    fn from(method: &str) -> Self {
        match method {
            "NONE" => KeyMethod::None,
            "AES-128" => KeyMethod::Aes128,
            "SAMPLE-AES" => KeyMethod::SampleAes,
            "SAMPLE-AES-CTR" => KeyMethod::SampleAesCtr,
            other => KeyMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for KeyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of an `#EXT-X-KEY` or `#EXT-X-SESSION-KEY` tag, quotes removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub method: KeyMethod,
    pub uri: Option<String>,
    pub iv: Option<String>,
    pub keyformat: Option<String>,
    pub keyformatversions: Option<String>,
}

impl Key {
    fn from_attributes(tag: &'static str, line: usize, attributes: &str) -> Result<Self, PlaylistError> {
        let invalid = |reason: String| PlaylistError::InvalidKey { tag, line, reason };
        let mut method = None;
        let mut key = Key {
            method: KeyMethod::None,
            uri: None,
            iv: None,
            keyformat: None,
            keyformatversions: None,
        };
        for attribute in split_attributes(attributes) {
            let (name, value) = attribute
                .split_once('=')
                .ok_or_else(|| invalid(format!("attribute `{}` has no value", attribute)))?;
            let value = unquote(value.trim());
            match name.trim() {
                "METHOD" => method = Some(KeyMethod::from(value)),
                "URI" => key.uri = Some(value.to_string()),
                "IV" => key.iv = Some(value.to_string()),
                "KEYFORMAT" => key.keyformat = Some(value.to_string()),
                "KEYFORMATVERSIONS" => key.keyformatversions = Some(value.to_string()),
                other => tracing::debug!(attribute = %other, tag, "ignoring unknown key attribute"),
            }
        }
        key.method = method.ok_or_else(|| invalid("METHOD attribute is required".to_string()))?;
        Ok(key)
    }
}

/// Split an attribute list on commas that are not inside a quoted string
fn split_attributes(attributes: &str) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in attributes.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&attributes[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&attributes[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
