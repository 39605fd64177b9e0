//! NullVersion - no version found

use std::fmt;

use indexmap::IndexMap;

use super::version::{FormatMode, MAP_KEYS};
use super::VersionInterface;

/// A version that could not be located. Every accessor returns `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NullVersion;

impl NullVersion {
    pub fn new() -> Self {
        NullVersion
    }
}

impl VersionInterface for NullVersion {
    fn major(&self) -> Option<&str> {
        None
    }

    fn minor(&self) -> Option<&str> {
        None
    }

    fn micro(&self) -> Option<&str> {
        None
    }

    fn patch(&self) -> Option<&str> {
        None
    }

    fn micropatch(&self) -> Option<&str> {
        None
    }

    fn stability(&self) -> Option<&str> {
        None
    }

    fn build(&self) -> Option<&str> {
        None
    }

    fn is_alpha(&self) -> Option<bool> {
        None
    }

    fn is_beta(&self) -> Option<bool> {
        None
    }

    fn to_map(&self) -> IndexMap<String, Option<String>> {
        MAP_KEYS.iter().map(|key| (key.to_string(), None)).collect()
    }

    fn version(&self, _mode: FormatMode) -> Option<String> {
        None
    }

    fn clone_box(&self) -> Box<dyn VersionInterface> {
        Box::new(*self)
    }

    fn is_null(&self) -> bool {
        true
    }
}

impl fmt::Display for NullVersion {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}
