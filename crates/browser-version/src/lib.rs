//! Version extraction and formatting for user-agent strings
//!
//! This crate turns free-form text such as a user-agent header into a structured
//! version (major, minor, micro, patch, micropatch, stability and build) and renders
//! that structure back into a canonical string under caller-selected rules.

mod error;
mod factory;
mod null_version;
mod version;
mod version_interface;
mod version_parser;

pub use error::{NotNumericError, VersionError};
pub use factory::VersionParserFactory;
pub use null_version::NullVersion;
pub use version::{FormatMode, Version};
pub use version_interface::VersionInterface;
pub use version_parser::{normalize_stability, Stability, VersionParser, DEFAULT_PATTERN};
