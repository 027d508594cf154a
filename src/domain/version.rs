//! Version comparison and range satisfaction
//!
//! Versions are dot-separated non-negative integers of possibly unequal
//! length; missing trailing components are treated as 0, so `1.2` and
//! `1.2.0` compare equal. Pre-release and build-metadata suffixes
//! (`-beta`, `+build`) are a known limitation: they are rejected as
//! [`VersionError::UnsupportedSuffix`] rather than silently mis-ordered.
//!
//! Range satisfaction follows npm semantics for caret, tilde, exact and
//! comparator operators, delegated to the semver crate after normalizing
//! npm's notation (bare versions are exact matches, space-separated
//! comparators become a comma list).

use crate::error::VersionError;
use std::cmp::Ordering;

/// Parse a bare version string into its numeric components.
///
/// Accepts a leading `v` or `=` (both appear in npm manifests), rejects
/// empty strings, pre-release/build suffixes, and non-numeric components.
pub fn parse_components(version: &str) -> Result<Vec<u64>, VersionError> {
    let trimmed = version.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);

    if bare.is_empty() {
        return Err(VersionError::Empty);
    }
    if bare.contains('-') || bare.contains('+') {
        return Err(VersionError::UnsupportedSuffix {
            version: version.to_string(),
        });
    }

    bare.split('.')
        .map(|component| {
            component
                .parse::<u64>()
                .map_err(|_| VersionError::InvalidComponent {
                    version: version.to_string(),
                    component: component.to_string(),
                })
        })
        .collect()
}

/// Compare two version strings component by component, left to right.
///
/// The first non-equal component decides; missing trailing components
/// count as 0, so `compare("1.2", "1.2.0")` is `Equal`.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let parts_a = parse_components(a)?;
    let parts_b = parse_components(b)?;

    let len = parts_a.len().max(parts_b.len());
    for i in 0..len {
        let pa = parts_a.get(i).copied().unwrap_or(0);
        let pb = parts_b.get(i).copied().unwrap_or(0);
        match pa.cmp(&pb) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }

    Ok(Ordering::Equal)
}

/// Strip a leading range operator (`^`, `~`, `=`, `v`) from a declared
/// version, yielding a bare comparable version.
pub fn strip_range_prefix(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed.trim_start_matches(['^', '~', '=', 'v'])
}

/// Returns true iff `candidate` is strictly newer than `current`.
///
/// `current` may carry a range operator prefix as declared in the
/// manifest; it is stripped before comparing.
pub fn is_upgrade(candidate: &str, current: &str) -> Result<bool, VersionError> {
    Ok(compare(candidate, strip_range_prefix(current))? == Ordering::Greater)
}

/// Returns true iff `installed` falls within the semantic range `range`.
///
/// Supported range forms: `^1.2.3` (caret, with the leading-zero
/// narrowing: `^0.2.3` allows `>=0.2.3 <0.3.0`), `~1.2.3` (tilde),
/// exact versions, comparators (`>=`, `>`, `<=`, `<`, `=`), wildcards
/// (`*`, `1.x`) and space-separated comparator lists. Hyphen ranges and
/// `||` alternatives are not supported and yield
/// [`VersionError::InvalidRange`].
pub fn satisfies(installed: &str, range: &str) -> Result<bool, VersionError> {
    let components = parse_components(installed)?;
    let installed_version = semver::Version::new(
        components.first().copied().unwrap_or(0),
        components.get(1).copied().unwrap_or(0),
        components.get(2).copied().unwrap_or(0),
    );

    let req = parse_range(range)?;
    match req {
        Some(req) => Ok(req.matches(&installed_version)),
        // Unconstrained range accepts anything
        None => Ok(true),
    }
}

/// Normalize an npm range expression into a semver requirement.
///
/// `None` means the range is unconstrained (`*`, `latest`, empty).
fn parse_range(range: &str) -> Result<Option<semver::VersionReq>, VersionError> {
    let trimmed = range.trim();
    if trimmed.is_empty() || trimmed == "*" || trimmed == "x" || trimmed == "latest" {
        return Ok(None);
    }
    if trimmed.contains("||") || trimmed.contains(" - ") {
        return Err(VersionError::InvalidRange {
            range: range.to_string(),
        });
    }

    // npm separates comparators with spaces; semver wants commas.
    let parts: Vec<String> = trimmed
        .split_whitespace()
        .map(normalize_comparator)
        .collect();

    semver::VersionReq::parse(&parts.join(", "))
        .map(Some)
        .map_err(|_| VersionError::InvalidRange {
            range: range.to_string(),
        })
}

/// A bare version in npm means an exact match, while the semver crate
/// would read it as a caret requirement; make the exactness explicit.
/// Wildcard components (`1.x`) already parse as wildcard requirements
/// and stay bare.
fn normalize_comparator(part: &str) -> String {
    let bare = part.strip_prefix('v').unwrap_or(part);
    let first = bare.chars().next().unwrap_or(' ');
    if !first.is_ascii_digit() {
        return part.to_string();
    }
    if bare.contains(['x', 'X', '*']) {
        bare.to_string()
    } else {
        format!("={}", bare)
    }
}
