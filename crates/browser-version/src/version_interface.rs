//! Version interface trait

use indexmap::IndexMap;

use crate::version::{FormatMode, Version};

/// Read capabilities shared by detected and absent versions
pub trait VersionInterface: std::fmt::Debug + std::fmt::Display + Send + Sync {
    fn major(&self) -> Option<&str>;

    fn minor(&self) -> Option<&str>;

    fn micro(&self) -> Option<&str>;

    fn patch(&self) -> Option<&str>;

    fn micropatch(&self) -> Option<&str>;

    fn stability(&self) -> Option<&str>;

    fn build(&self) -> Option<&str>;

    fn is_alpha(&self) -> Option<bool>;

    fn is_beta(&self) -> Option<bool>;

    /// All seven components keyed by name, in order
    fn to_map(&self) -> IndexMap<String, Option<String>>;

    /// Render the version. `None` means no version was found at all.
    fn version(&self, mode: FormatMode) -> Option<String>;

    /// Clone this version into a boxed trait object
    fn clone_box(&self) -> Box<dyn VersionInterface>;

    /// Check if this is a detected Version
    fn as_version(&self) -> Option<&Version> {
        None
    }

    /// Check if this is the absent version
    fn is_null(&self) -> bool {
        false
    }
}

impl Clone for Box<dyn VersionInterface> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
