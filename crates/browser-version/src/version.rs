//! Structured version value and its canonical string rendering

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::{NotNumericError, VersionError};
use crate::version_interface::VersionInterface;

lazy_static! {
    // Numeric string: optional ASCII whitespace, sign, digits with optional fraction and exponent
    static ref NUMERIC_RE: Regex = Regex::new(
        r"^[ \t\n\r\x0B\x0C]*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?[ \t\n\r\x0B\x0C]*$"
    ).unwrap();
}

/// Keys of the map interchange format, in order
pub(crate) const MAP_KEYS: [&str; 7] = ["major", "minor", "micro", "patch", "micropatch", "stability", "build"];

/// Flags controlling which trailing components are suppressed by [`Version::format`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FormatMode(u8);

impl FormatMode {
    /// No suppression
    pub const COMPLETE: FormatMode = FormatMode(0);
    /// Drop minor and everything finer
    pub const IGNORE_MINOR: FormatMode = FormatMode(1);
    /// Drop micro and everything finer
    pub const IGNORE_MICRO: FormatMode = FormatMode(2);
    /// Drop minor and everything finer if minor and micro are empty
    pub const IGNORE_MINOR_IF_EMPTY: FormatMode = FormatMode(4);
    /// Drop micro and everything finer if micro is empty
    pub const IGNORE_MICRO_IF_EMPTY: FormatMode = FormatMode(8);
    /// Drop everything if major, minor and micro are empty
    pub const IGNORE_MAJOR_IF_EMPTY: FormatMode = FormatMode(16);
    /// Render "0" instead of an empty string when major was dropped
    pub const GET_ZERO_IF_EMPTY: FormatMode = FormatMode(32);

    pub const fn from_bits(bits: u8) -> Self {
        FormatMode(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if any of the flags in `other` are set
    pub const fn intersects(self, other: FormatMode) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for FormatMode {
    type Output = FormatMode;

    fn bitor(self, rhs: FormatMode) -> FormatMode {
        FormatMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for FormatMode {
    fn bitor_assign(&mut self, rhs: FormatMode) {
        self.0 |= rhs.0;
    }
}

/// A parsed version. Fields never change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    major: String,
    minor: String,
    micro: String,
    patch: Option<String>,
    micropatch: Option<String>,
    stability: String,
    build: Option<String>,
}

impl Version {
    /// Create a stable version without patch, micropatch or build
    pub fn new(major: &str, minor: &str, micro: &str) -> Result<Self, NotNumericError> {
        Self::with_details(major, minor, micro, None, None, "stable", None)
    }

    /// Create a version from all of its components.
    ///
    /// A dotted `micro` is split: its first segment becomes the micro version and,
    /// unless `patch` is given, the second and third segments become patch and
    /// micropatch.
    #[allow(clippy::too_many_arguments)]
    pub fn with_details(
        major: &str,
        minor: &str,
        micro: &str,
        patch: Option<&str>,
        micropatch: Option<&str>,
        stability: &str,
        build: Option<&str>,
    ) -> Result<Self, NotNumericError> {
        if !is_non_negative_number(major) {
            return Err(NotNumericError::Major(major.to_string()));
        }

        if !is_non_negative_number(minor) {
            return Err(NotNumericError::Minor(minor.to_string()));
        }

        let mut micro = micro;
        let mut patch = patch;
        let mut micropatch = micropatch;

        if micro.contains('.') {
            let mut parts = micro.split('.');
            let first = parts.next().unwrap_or_default();

            if patch.is_none() {
                patch = parts.next();
                micropatch = parts.next();
            }

            micro = first;
        }

        if !is_non_negative_number(micro) {
            return Err(NotNumericError::Micro(micro.to_string()));
        }

        Ok(Version {
            major: major.to_string(),
            minor: minor.to_string(),
            micro: micro.to_string(),
            patch: patch.map(str::to_string),
            micropatch: micropatch.map(str::to_string),
            stability: stability.to_string(),
            build: build.map(str::to_string),
        })
    }

    /// Rebuild a version from the seven-key map produced by [`VersionInterface::to_map`]
    pub fn from_map(data: &IndexMap<String, Option<String>>) -> Result<Self, VersionError> {
        for key in MAP_KEYS {
            if !data.contains_key(key) {
                return Err(VersionError::MissingProperty(key));
            }
        }

        Ok(Self::with_details(
            required_property(data, "major")?,
            required_property(data, "minor")?,
            required_property(data, "micro")?,
            optional_property(data, "patch"),
            optional_property(data, "micropatch"),
            required_property(data, "stability")?,
            optional_property(data, "build"),
        )?)
    }

    /// Rebuild a version from a JSON object using the map interchange keys
    pub fn from_json(json: &str) -> Result<Self, VersionError> {
        let data: IndexMap<String, Option<String>> = serde_json::from_str(json)?;
        Self::from_map(&data)
    }

    /// Serialize the version as a JSON object with the map interchange keys
    pub fn to_json(&self) -> Result<String, VersionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn minor(&self) -> &str {
        &self.minor
    }

    pub fn micro(&self) -> &str {
        &self.micro
    }

    pub fn patch(&self) -> Option<&str> {
        self.patch.as_deref()
    }

    pub fn micropatch(&self) -> Option<&str> {
        self.micropatch.as_deref()
    }

    pub fn stability(&self) -> &str {
        &self.stability
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    pub fn is_alpha(&self) -> bool {
        self.stability == "alpha"
    }

    pub fn is_beta(&self) -> bool {
        self.stability == "beta"
    }

    /// Render the version, suppressing components as requested by `mode`.
    ///
    /// An outer component only counts as empty once every finer component was
    /// found empty: minor is checked only after micro, major only after minor.
    pub fn format(&self, mode: FormatMode) -> String {
        let mut parts = Components::from(self);

        let mut micro_is_empty = false;

        if mode.intersects(FormatMode::IGNORE_MICRO) {
            parts.drop_micro();
            micro_is_empty = true;
        } else if mode.intersects(
            FormatMode::IGNORE_MICRO_IF_EMPTY | FormatMode::IGNORE_MINOR_IF_EMPTY | FormatMode::IGNORE_MAJOR_IF_EMPTY,
        ) {
            micro_is_empty = is_empty_component(parts.micro);

            if micro_is_empty && mode.intersects(FormatMode::IGNORE_MICRO_IF_EMPTY) {
                parts.drop_micro();
            }
        }

        let mut minor_is_empty = false;

        if mode.intersects(FormatMode::IGNORE_MINOR) {
            parts.drop_minor();
            minor_is_empty = true;
        } else if mode.intersects(FormatMode::IGNORE_MINOR_IF_EMPTY | FormatMode::IGNORE_MAJOR_IF_EMPTY) {
            minor_is_empty = micro_is_empty && is_empty_component(parts.minor);

            if minor_is_empty && mode.intersects(FormatMode::IGNORE_MINOR_IF_EMPTY) {
                parts.drop_minor();
            }
        }

        if mode.intersects(FormatMode::IGNORE_MAJOR_IF_EMPTY) && minor_is_empty && is_empty_component(parts.major) {
            parts.drop_major();
        }

        parts.render(mode)
    }
}

impl VersionInterface for Version {
    fn major(&self) -> Option<&str> {
        Some(&self.major)
    }

    fn minor(&self) -> Option<&str> {
        Some(&self.minor)
    }

    fn micro(&self) -> Option<&str> {
        Some(&self.micro)
    }

    fn patch(&self) -> Option<&str> {
        self.patch.as_deref()
    }

    fn micropatch(&self) -> Option<&str> {
        self.micropatch.as_deref()
    }

    fn stability(&self) -> Option<&str> {
        Some(&self.stability)
    }

    fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    fn is_alpha(&self) -> Option<bool> {
        Some(Version::is_alpha(self))
    }

    fn is_beta(&self) -> Option<bool> {
        Some(Version::is_beta(self))
    }

    fn to_map(&self) -> IndexMap<String, Option<String>> {
        let values = [
            Some(self.major.clone()),
            Some(self.minor.clone()),
            Some(self.micro.clone()),
            self.patch.clone(),
            self.micropatch.clone(),
            Some(self.stability.clone()),
            self.build.clone(),
        ];

        MAP_KEYS.iter().map(|key| key.to_string()).zip(values).collect()
    }

    fn version(&self, mode: FormatMode) -> Option<String> {
        Some(self.format(mode))
    }

    fn clone_box(&self) -> Box<dyn VersionInterface> {
        Box::new(self.clone())
    }

    fn as_version(&self) -> Option<&Version> {
        Some(self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(FormatMode::COMPLETE))
    }
}

/// Working copy of the components while formatting
struct Components<'a> {
    major: Option<&'a str>,
    minor: Option<&'a str>,
    micro: Option<&'a str>,
    patch: Option<&'a str>,
    micropatch: Option<&'a str>,
    stability: Option<&'a str>,
    build: Option<&'a str>,
}

impl<'a> From<&'a Version> for Components<'a> {
    fn from(version: &'a Version) -> Self {
        Components {
            major: Some(&version.major),
            minor: Some(&version.minor),
            micro: Some(&version.micro),
            patch: version.patch.as_deref(),
            micropatch: version.micropatch.as_deref(),
            stability: Some(&version.stability),
            build: version.build.as_deref(),
        }
    }
}

impl Components<'_> {
    fn drop_micro(&mut self) {
        self.micro = None;
        self.patch = None;
        self.micropatch = None;
        self.stability = None;
        self.build = None;
    }

    fn drop_minor(&mut self) {
        self.minor = None;
        self.drop_micro();
    }

    fn drop_major(&mut self) {
        self.major = None;
        self.drop_minor();
    }

    fn render(&self, mode: FormatMode) -> String {
        let Some(major) = self.major else {
            return if mode.intersects(FormatMode::GET_ZERO_IF_EMPTY) {
                "0".to_string()
            } else {
                String::new()
            };
        };

        let mut result = major.to_string();

        if let Some(minor) = self.minor {
            result.push('.');
            result.push_str(minor);
        }

        if let Some(micro) = self.micro {
            result.push('.');
            result.push_str(micro);

            if let Some(patch) = self.patch {
                result.push('.');
                result.push_str(patch);

                if let Some(micropatch) = self.micropatch {
                    result.push('.');
                    result.push_str(micropatch);
                }
            }
        }

        if let Some(stability) = self.stability.filter(|s| *s != "stable") {
            result.push('-');
            result.push_str(stability);
        }

        if let Some(build) = self.build {
            result.push('+');
            result.push_str(build);
        }

        result
    }
}

fn required_property<'a>(
    data: &'a IndexMap<String, Option<String>>,
    key: &'static str,
) -> Result<&'a str, VersionError> {
    optional_property(data, key).ok_or(VersionError::NullProperty(key))
}

fn optional_property<'a>(data: &'a IndexMap<String, Option<String>>, key: &str) -> Option<&'a str> {
    data.get(key).and_then(|value| value.as_deref())
}

fn is_empty_component(value: Option<&str>) -> bool {
    matches!(value, None | Some("") | Some("0") | Some("00"))
}

fn is_non_negative_number(value: &str) -> bool {
    if !NUMERIC_RE.is_match(value) {
        return false;
    }

    value
        .trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0B')
        .parse::<f64>()
        .map_or(false, |number| number >= 0.0)
}
