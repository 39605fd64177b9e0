//! Version extraction from version tokens and user-agent strings

use std::borrow::Cow;

use fancy_regex::Regex;

use crate::error::VersionError;
use crate::null_version::NullVersion;
use crate::version::Version;
use crate::version_interface::VersionInterface;

/// Pattern used when no custom pattern is configured
pub const DEFAULT_PATTERN: &str = r"(?i)^v?(?P<major>[0-9]+)(?:[-.](?P<minor>[0-9]+))?(?:[-.](?P<micro>[0-9]+))?(?:[-.(](?P<patch>[0-9]+))?(?:[-.](?P<micropatch>[0-9]+))?(?:(?:[-_+~]?(?P<stability>rc|alpha|a|beta|b|patch|pre|pl?|stable|dev|d)[-_.+ (]?| build |\+|[_.]r)(?P<build>[0-9]*))?.*\n?$";

// Numbers followed by stability letters; stops before "li" and "CFNetwork"
const NUMBERS_AND_STABILITY: &str = r"(?P<version>[0-9]+(?![:x])(?:[0-9._\-+~ abdehprstv]|l(?!i)|c(?!fnetwork))*)";

const NUMBERS_AND_STABILITY_NOT: &str = r"(?P<version>[0-9]+[:x](?:[0-9._\-+~ abdehprstv]|l(?!i)|c(?!fnetwork))*)";

// e.g. "Name/1.2.3(456)"
const NUMBERS_ONLY: &str = r"(?P<version>[0-9]+[0-9.]+\([0-9]+(?![:x]))";

/// Delimiters between a product name and its version, in priority order
const MODIFIERS: [&str; 5] = [r"/[0-9.]+ ?\(", "/", r"\(", r" \(", " ?"];

/// Canonical stability tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Alpha,
    Beta,
    RC,
    Dev,
    Patch,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Stable => "stable",
            Stability::Alpha => "alpha",
            Stability::Beta => "beta",
            Stability::RC => "RC",
            Stability::Dev => "dev",
            Stability::Patch => "patch",
        }
    }

    /// Map a raw stability abbreviation to its canonical tag
    pub fn from_token(token: &str) -> Option<Stability> {
        match token.to_lowercase().as_str() {
            "stable" => Some(Stability::Stable),
            "alpha" | "a" => Some(Stability::Alpha),
            "beta" | "b" => Some(Stability::Beta),
            "rc" => Some(Stability::RC),
            "dev" | "d" | "pre" => Some(Stability::Dev),
            "patch" | "pl" | "p" => Some(Stability::Patch),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize a matched stability; missing or empty means stable, unknown tokens are lower-cased
pub fn normalize_stability(stability: Option<&str>) -> String {
    match stability.filter(|s| !s.is_empty()) {
        None => Stability::Stable.as_str().to_string(),
        Some(raw) => match Stability::from_token(raw) {
            Some(stability) => stability.as_str().to_string(),
            None => raw.to_lowercase(),
        },
    }
}

/// Builds versions from version tokens and detects them in user-agent strings
#[derive(Debug)]
pub struct VersionParser {
    pattern: String,
    regex: Option<Regex>,
}

impl VersionParser {
    /// Create a parser using [`DEFAULT_PATTERN`]
    pub fn new() -> Self {
        Self::with_pattern(DEFAULT_PATTERN)
    }

    /// Create a parser with a custom pattern.
    ///
    /// The pattern should provide the named groups `major`, `minor`, `micro`, `patch`,
    /// `micropatch`, `stability` and `build`; missing groups are treated as unmatched.
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        let mut parser = VersionParser {
            pattern: String::new(),
            regex: None,
        };
        parser.set_pattern(pattern);
        parser
    }

    /// Replace the pattern. An invalid pattern is reported when the parser is next used.
    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        self.pattern = pattern.into();
        self.regex = Regex::new(&self.pattern).ok();
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Build a version from a version token such as "4.0b8".
    ///
    /// Returns [`NullVersion`] if the pattern does not match or captures nothing.
    pub fn parse_token(&self, version: &str) -> Result<Box<dyn VersionInterface>, VersionError> {
        let compiled;
        let regex = match &self.regex {
            Some(regex) => regex,
            None => {
                compiled = Regex::new(&self.pattern)?;
                &compiled
            }
        };

        let Some(caps) = regex.captures(version)? else {
            log::trace!("Version pattern does not match \"{}\"", version);
            return Ok(Box::new(NullVersion));
        };

        let group = |name: &str| caps.name(name).map(|m| m.as_str()).filter(|s| !s.is_empty());

        let major = group("major");
        let minor = group("minor");
        let micro = group("micro");
        let patch = group("patch");
        let micropatch = group("micropatch");
        let stability = group("stability");
        let build = group("build");

        if [major, minor, micro, patch, micropatch, stability, build]
            .iter()
            .all(Option::is_none)
        {
            return Ok(Box::new(NullVersion));
        }

        let (micro, patch, micropatch) = match micro {
            Some(micro) => (micro, patch, micropatch),
            None => ("0", None, None),
        };

        let stability = normalize_stability(stability);

        let version = Version::with_details(
            major.unwrap_or("0"),
            minor.unwrap_or("0"),
            micro,
            patch,
            micropatch,
            &stability,
            build,
        )?;

        Ok(Box::new(version))
    }

    /// Detect the version following the first matching product name in a user-agent.
    ///
    /// Searches are regular expression fragments tried in order; `None` entries are
    /// skipped. For each search the "numbers in parentheses" shape is tried first,
    /// then every delimiter modifier in priority order. The first accepted match wins.
    pub fn detect_version(
        &self,
        useragent: &str,
        searches: &[Option<&str>],
    ) -> Result<Box<dyn VersionInterface>, VersionError> {
        let useragent = url_decode(useragent);

        for search in searches.iter().flatten() {
            let search = url_decode(search);
            log::trace!("Searching version for \"{}\"", search);

            let numbers_only = Regex::new(&format!("(?i){}/{}[;)]", search, NUMBERS_ONLY))?;

            if let Some(version) = capture_version(&numbers_only, &useragent)? {
                log::debug!("Detected version \"{}\" for \"{}\"", version, search);
                return self.parse_token(&version);
            }

            for modifier in MODIFIERS {
                let negative = Regex::new(&format!("(?i){}{}{}", search, modifier, NUMBERS_AND_STABILITY_NOT))?;
                let positive = Regex::new(&format!("(?i){}{}{}", search, modifier, NUMBERS_AND_STABILITY))?;

                if negative.is_match(&useragent)? {
                    continue;
                }

                if let Some(version) = capture_version(&positive, &useragent)? {
                    log::debug!("Detected version \"{}\" for \"{}\"", version, search);
                    return self.parse_token(&version);
                }
            }
        }

        Ok(Box::new(NullVersion))
    }
}

impl Default for VersionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the `version` group, trimmed, lower-cased, with underscores as dots
fn capture_version(regex: &Regex, haystack: &str) -> Result<Option<String>, VersionError> {
    let version = regex
        .captures(haystack)?
        .and_then(|caps| caps.name("version").map(|m| m.as_str().trim().replace('_', ".").to_lowercase()));

    Ok(version)
}

/// Percent-decode like PHP's urldecode; only applied when the input contains '%'
fn url_decode(value: &str) -> Cow<'_, str> {
    if !value.contains('%') {
        return Cow::Borrowed(value);
    }

    let spaced = value.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());

    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::FormatMode;

    fn parse(version: &str) -> Box<dyn VersionInterface> {
        VersionParser::new().parse_token(version).unwrap()
    }

    #[test]
    fn test_normalize_stability() {
        let cases = [
            (None, "stable"),
            (Some(""), "stable"),
            (Some("rc"), "RC"),
            (Some("RC"), "RC"),
            (Some("pl"), "patch"),
            (Some("p"), "patch"),
            (Some("b"), "beta"),
            (Some("a"), "alpha"),
            (Some("d"), "dev"),
            (Some("pre"), "dev"),
            (Some("Beta"), "beta"),
            (Some("stable"), "stable"),
            (Some("Nightly"), "nightly"),
        ];

        for (raw, expected) in cases {
            assert_eq!(normalize_stability(raw), expected, "Failed for {:?}", raw);
        }
    }

    #[test]
    fn test_parse_token() {
        let cases = [
            ("34.0.1760.0", "34", "0", "1760", "stable", None, "34.0.1760.0"),
            ("3.9.0.0.22", "3", "9", "0", "stable", None, "3.9.0.0.22"),
            ("4.1.1", "4", "1", "1", "stable", None, "4.1.1"),
            ("7.0", "7", "0", "0", "stable", None, "7.0.0"),
            ("1.17.0-rc", "1", "17", "0", "RC", None, "1.17.0-RC"),
            ("4.3.2f1", "4", "3", "2", "stable", None, "4.3.2"),
            ("v0.1.4", "0", "1", "4", "stable", None, "0.1.4"),
            ("2.0b8", "2", "0", "0", "beta", Some("8"), "2.0.0-beta+8"),
            ("4.0b8", "4", "0", "0", "beta", Some("8"), "4.0.0-beta+8"),
            ("4.0a1", "4", "0", "0", "alpha", Some("1"), "4.0.0-alpha+1"),
            ("4.0dev2", "4", "0", "0", "dev", Some("2"), "4.0.0-dev+2"),
            ("0.0.0", "0", "0", "0", "stable", None, "0.0.0"),
            ("2.0p12", "2", "0", "0", "patch", Some("12"), "2.0.0-patch+12"),
            ("2.0.0-patch+12", "2", "0", "0", "patch", Some("12"), "2.0.0-patch+12"),
            ("2.0.0-pl+12", "2", "0", "0", "patch", Some("12"), "2.0.0-patch+12"),
            ("2.0.0-p+12", "2", "0", "0", "patch", Some("12"), "2.0.0-patch+12"),
            ("4.0.0-beta+8", "4", "0", "0", "beta", Some("8"), "4.0.0-beta+8"),
            ("4.0.0-b+8", "4", "0", "0", "beta", Some("8"), "4.0.0-beta+8"),
            ("4.0.0-alpha+1", "4", "0", "0", "alpha", Some("1"), "4.0.0-alpha+1"),
            ("4.0.0-a+1", "4", "0", "0", "alpha", Some("1"), "4.0.0-alpha+1"),
            ("3.4.3-dev-1191", "3", "4", "3", "dev", Some("1191"), "3.4.3-dev+1191"),
            ("3.4.3-d-1191", "3", "4", "3", "dev", Some("1191"), "3.4.3-dev+1191"),
            ("3.4.3-dev+1191", "3", "4", "3", "dev", Some("1191"), "3.4.3-dev+1191"),
            ("1.4 build 2", "1", "4", "0", "stable", Some("2"), "1.4.0+2"),
            ("1.4.0+2", "1", "4", "0", "stable", Some("2"), "1.4.0+2"),
            ("2.3.1_r747", "2", "3", "1", "stable", Some("747"), "2.3.1+747"),
            ("6~b1", "6", "0", "0", "beta", Some("1"), "6.0.0-beta+1"),
            ("11.3.2(396", "11", "3", "2", "stable", None, "11.3.2.396"),
            ("1.0\n", "1", "0", "0", "stable", None, "1.0.0"),
        ];

        for (input, major, minor, micro, stability, build, complete) in cases {
            let version = parse(input);
            let version = version
                .as_version()
                .unwrap_or_else(|| panic!("Expected a version for {}", input));

            assert_eq!(version.major(), major, "major is wrong for {}", input);
            assert_eq!(version.minor(), minor, "minor is wrong for {}", input);
            assert_eq!(version.micro(), micro, "micro is wrong for {}", input);
            assert_eq!(version.stability(), stability, "stability is wrong for {}", input);
            assert_eq!(version.build(), build, "build is wrong for {}", input);
            assert_eq!(version.to_string(), complete, "complete is wrong for {}", input);
        }
    }

    #[test]
    fn test_parse_token_returns_null_version() {
        for input in ["abc", "x6~b1", "", "XP", "\u{664}.0", "\u{664}\u{665}"] {
            let version = parse(input);

            assert!(version.is_null(), "Expected no version for {:?}", input);
            assert_eq!(version.major(), None);
            assert_eq!(version.stability(), None);
            assert_eq!(version.version(FormatMode::COMPLETE), None);
            assert_eq!(version.is_beta(), None);
            assert_eq!(version.is_alpha(), None);
        }
    }

    #[test]
    fn test_parse_token_with_only_optional_groups() {
        let parser = VersionParser::with_pattern(r"^(?:(?P<major>\d+)\.)?(?P<minor>\d+)$");

        let version = parser.parse_token("5").unwrap();
        let version = version.as_version().unwrap();
        assert_eq!(version.major(), "0");
        assert_eq!(version.minor(), "5");
        assert_eq!(version.micro(), "0");
    }

    #[test]
    fn test_custom_pattern_may_skip_micro() {
        // patch and micropatch are only taken together with micro
        let parser = VersionParser::with_pattern(r"^(?P<major>\d+)(?:\.(?P<patch>\d+))?$");

        let version = parser.parse_token("3.9").unwrap();
        let version = version.as_version().unwrap();
        assert_eq!(version.to_string(), "3.0.0");
        assert_eq!(version.patch(), None);
    }

    #[test]
    fn test_pattern_accessors() {
        let custom = r"(?i)^v?(?P<major>\d+)(?:[-.](?P<minor>\d+))?.*$";

        let mut parser = VersionParser::new();
        assert_eq!(parser.pattern(), DEFAULT_PATTERN);
        assert_ne!(parser.pattern(), custom);

        parser.set_pattern(custom);
        assert_eq!(parser.pattern(), custom);

        let version = parser.parse_token("4.2.1").unwrap();
        assert_eq!(version.version(FormatMode::COMPLETE).as_deref(), Some("4.2.0"));
    }

    #[test]
    fn test_invalid_pattern_fails_on_use() {
        let mut parser = VersionParser::new();
        parser.set_pattern("(?P<major>\\d+");

        assert!(matches!(parser.parse_token("1.0"), Err(VersionError::Pattern(_))));
    }

    #[test]
    fn test_not_numeric_from_custom_pattern() {
        let parser = VersionParser::with_pattern(r"^(?P<major>-?\d+)$");

        assert!(matches!(
            parser.parse_token("-3"),
            Err(VersionError::NotNumeric(crate::NotNumericError::Major(_)))
        ));
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("Firefox/4.0"), "Firefox/4.0");
        assert_eq!(url_decode("Opera%20Coast"), "Opera Coast");
        assert_eq!(url_decode("a+b%2Bc"), "a b+c");
        assert_eq!(url_decode("100%"), "100%");
    }

    #[test]
    fn test_detect_version_basic() {
        let parser = VersionParser::new();

        let version = parser.detect_version("Firefox/4.0b8", &[Some("Firefox")]).unwrap();
        assert_eq!(version.version(FormatMode::COMPLETE).as_deref(), Some("4.0.0-beta+8"));

        let version = parser.detect_version("Firefox/4.0b8", &[Some("Chrome")]).unwrap();
        assert!(version.is_null());
    }

    #[test]
    fn test_detect_version_skips_missing_searches() {
        let parser = VersionParser::new();

        let detected = parser
            .detect_version("Firefox/4.0b8", &[None, None, Some("Firefox")])
            .unwrap();
        let direct = parser.parse_token("4.0b8").unwrap();

        assert_eq!(detected.as_version(), direct.as_version());
        assert!(detected.as_version().is_some());
    }

    #[test]
    fn test_detect_version_search_order_wins() {
        let parser = VersionParser::new();
        let useragent = "Chrome/30.0 Firefox/4.0";

        let version = parser
            .detect_version(useragent, &[Some("Firefox"), Some("Chrome")])
            .unwrap();
        assert_eq!(version.major(), Some("4"));

        let version = parser
            .detect_version(useragent, &[Some("Chrome"), Some("Firefox")])
            .unwrap();
        assert_eq!(version.major(), Some("30"));
    }

    #[test]
    fn test_detect_version_modifier_order_wins() {
        // "/x.y (" is tried before the bare slash
        let parser = VersionParser::new();

        let version = parser.detect_version("Foo/1.0 (2.5; bar)", &[Some("Foo")]).unwrap();
        assert_eq!(version.version(FormatMode::COMPLETE).as_deref(), Some("2.5.0"));
    }

    #[test]
    fn test_detect_version_invalid_search() {
        let parser = VersionParser::new();

        assert!(matches!(
            parser.detect_version("Foo/1.0", &[Some("Foo(")]),
            Err(VersionError::Pattern(_))
        ));
    }
}
