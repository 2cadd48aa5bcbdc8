use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Cosmetic prefix carried by some catalogs and customer-supplied versions.
pub const VERSION_PREFIX: &str = "v";

/// Removes a single leading `v` so `v1.2.3` and `1.2.3` compare equal.
pub fn normalize_version(input: &str) -> &str {
    input.strip_prefix(VERSION_PREFIX).unwrap_or(input)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("version is empty")]
    Empty,
    #[error("invalid version '{input}': {reason}")]
    Invalid { input: String, reason: &'static str },
}

/// Parsed semantic version. Missing minor/patch components default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<String>,
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre_release) = &self.pre_release {
            write!(f, "-{pre_release}")?;
        }
        Ok(())
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => left.cmp(right),
            })
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parses `[v]MAJOR[.MINOR[.PATCH]][-PRE][+BUILD]`. Build metadata is dropped.
pub fn parse_semver(input: &str) -> Result<SemVer, VersionParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(VersionParseError::Empty);
    }
    let invalid = |reason| VersionParseError::Invalid {
        input: input.to_string(),
        reason,
    };

    let without_build = trimmed.split('+').next().unwrap_or_default();
    let (core, pre_release) = match without_build.split_once('-') {
        Some((_, "")) => return Err(invalid("empty pre-release")),
        Some((core, pre)) => (core, Some(pre.to_string())),
        None => (without_build, None),
    };

    let core = normalize_version(core);
    let mut segments = [0_u64; 3];
    let mut count = 0;
    for raw in core.split('.') {
        if count == segments.len() {
            return Err(invalid("too many numeric components"));
        }
        if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid("non-numeric component"));
        }
        segments[count] = raw.parse().map_err(|_| invalid("component out of range"))?;
        count += 1;
    }

    Ok(SemVer {
        major: segments[0],
        minor: segments[1],
        patch: segments[2],
        pre_release,
    })
}

/// Orders two version strings semantically; `None` when either fails to parse.
pub fn compare_versions(left: &str, right: &str) -> Option<Ordering> {
    let left = parse_semver(left).ok()?;
    let right = parse_semver(right).ok()?;
    Some(left.cmp(&right))
}
