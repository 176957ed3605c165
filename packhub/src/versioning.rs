//! Semantic version ordering and version resolution.
//!
//! Version names are strict semver. Ordering uses semver *precedence*, so
//! `1.0.0+build.1` and `1.0.0+build.2` are equal; when two candidates have
//! equal precedence the one listed first wins.
//!
//! # Example
//!
//! ```
//! use packhub::model::PackVersion;
//! use packhub::versioning::{latest, resolve_for_game};
//!
//! let versions = vec![
//!     PackVersion::new("1.0.0").with_support("1.19"),
//!     PackVersion::new("1.2.0").with_support("1.20"),
//!     PackVersion::new("1.1.0").with_support("1.19"),
//! ];
//!
//! assert_eq!(latest(&versions).unwrap().name, "1.2.0");
//! assert_eq!(resolve_for_game(&versions, "1.19").unwrap().name, "1.1.0");
//! assert!(resolve_for_game(&versions, "1.18").is_none());
//! ```

use std::cmp::Ordering;

use semver::Version;

use crate::model::PackVersion;

/// Parse a version name as strict semver.
pub fn parse_version(name: &str) -> Result<Version, semver::Error> {
    Version::parse(name)
}

/// Whether a version name parses as semver.
pub fn is_valid_version(name: &str) -> bool {
    parse_version(name).is_ok()
}

/// The version with the greatest precedence.
///
/// Versions whose names do not parse are ignored.
pub fn latest(versions: &[PackVersion]) -> Option<&PackVersion> {
    highest(versions.iter())
}

/// The greatest-precedence version whose `supports` list contains
/// `game_version`.
///
/// Returns `None` when no version supports the game version.
pub fn resolve_for_game<'a>(
    versions: &'a [PackVersion],
    game_version: &str,
) -> Option<&'a PackVersion> {
    highest(versions.iter().filter(|v| v.supports(game_version)))
}

/// Whether any version supports `game_version`.
pub fn supports_game(versions: &[PackVersion], game_version: &str) -> bool {
    versions.iter().any(|v| v.supports(game_version))
}

/// Compare two version names by precedence.
///
/// Names that do not parse sort below every valid name.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Ok(a), Ok(b)) => a.cmp_precedence(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

fn highest<'a>(candidates: impl Iterator<Item = &'a PackVersion>) -> Option<&'a PackVersion> {
    let mut best: Option<(&PackVersion, Version)> = None;
    for candidate in candidates {
        let Ok(parsed) = parse_version(&candidate.name) else {
            continue;
        };
        let replace = match &best {
            Some((_, current)) => parsed.cmp_precedence(current) == Ordering::Greater,
            None => true,
        };
        if replace {
            best = Some((candidate, parsed));
        }
    }
    best.map(|(version, _)| version)
}
