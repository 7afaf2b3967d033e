/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Canned CPIX requests
//!
//! Fixtures live in `./spekev2_requests`, relative to the working directory of the test run.
//! Under `cargo test` that is the crate root, where the named fixtures in
//! [`constants`](crate::constants) ship.

use crate::config::TestConfig;
use aws_types::os_shim_internal::Env;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_REQUESTS_DIR: &str = "./spekev2_requests";

/// Read `./spekev2_requests/<filename>` and return its contents as UTF-8 bytes
///
/// Surrounding whitespace in `filename` is ignored. A missing, unreadable, or non UTF-8 file is
/// an error.
pub fn read_xml_file_contents(filename: &str) -> io::Result<Vec<u8>> {
    FixtureLoader::default().read_xml_file_contents(filename)
}

/// Loads request fixtures from a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLoader {
    dir: PathBuf,
}

impl Default for FixtureLoader {
    fn default() -> Self {
        FixtureLoader::new(DEFAULT_REQUESTS_DIR)
    }
}

impl FixtureLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FixtureLoader { dir: dir.into() }
    }

    /// Honours `SPEKE_REQUESTS_DIR`, falling back to the default directory
    pub fn from_env(env: &Env) -> Self {
        FixtureLoader::from_config(&TestConfig::from_env(env))
    }

    pub fn from_config(config: &TestConfig) -> Self {
        FixtureLoader::new(config.requests_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename.trim())
    }

    pub fn read_xml_file_contents(&self, filename: &str) -> io::Result<Vec<u8>> {
        let path = self.path_of(filename);
        tracing::debug!(path = %path.display(), "loading request fixture");
        let contents = std::fs::read_to_string(&path)?;
        Ok(contents.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::{read_xml_file_contents, FixtureLoader};
    use crate::constants::GENERIC_WIDEVINE_TEST_FILE;
    use aws_types::os_shim_internal::Env;
    use std::io::ErrorKind;
    use std::path::Path;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn reads_fixture_bytes() {
        let bytes = read_xml_file_contents(GENERIC_WIDEVINE_TEST_FILE).expect("fixture exists");
        let on_disk = std::fs::read(Path::new("spekev2_requests").join(GENERIC_WIDEVINE_TEST_FILE))
            .expect("fixture exists");
        assert_eq!(bytes, on_disk);
        assert!(logs_contain("loading request fixture"));
    }

    #[test]
    fn whitespace_around_name_is_ignored() {
        let padded = format!("  {}\n", GENERIC_WIDEVINE_TEST_FILE);
        assert_eq!(
            read_xml_file_contents(&padded).unwrap(),
            read_xml_file_contents(GENERIC_WIDEVINE_TEST_FILE).unwrap()
        );
    }

    #[test]
    fn missing_fixture_is_not_found() {
        let err = read_xml_file_contents("does_not_exist.xml").expect_err("no such fixture");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn loader_directory() {
        let loader = FixtureLoader::new("/tmp/requests");
        assert_eq!(loader.dir(), Path::new("/tmp/requests"));
        assert_eq!(
            loader.path_of(" a.xml "),
            Path::new("/tmp/requests").join("a.xml")
        );
        let err = loader
            .read_xml_file_contents("missing-in-tmp.xml")
            .expect_err("directory has no fixtures");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn directory_from_environment() {
        let loader = FixtureLoader::from_env(&Env::from_slice(&[(
            "SPEKE_REQUESTS_DIR",
            "/data/requests",
        )]));
        assert_eq!(loader.dir(), Path::new("/data/requests"));
        assert_eq!(FixtureLoader::from_env(&Env::from_slice(&[])), FixtureLoader::default());
    }
}
