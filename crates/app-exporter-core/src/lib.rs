//! Foundational version and time utilities shared across app-exporter crates.
//!
//! Provides version-prefix normalization, lenient semantic-version parsing used
//! for operator compatibility checks, and the cordon-until timestamp parser.

pub mod time_utils;
pub mod version;

pub use time_utils::{parse_cordon_until, CordonTimeError, CORDON_UNTIL_LAYOUT};
pub use version::{
    compare_versions, normalize_version, parse_semver, SemVer, VersionParseError, VERSION_PREFIX,
};
