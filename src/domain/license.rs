//! License compliance structures and the reference license table
//!
//! The table is a closed allow-list of SPDX identifiers: a license string
//! not present as a key is classified `Unknown` even if it looks valid,
//! and a missing license field is `Missing`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known SPDX-style license identifiers and their full names
const KNOWN_LICENSES: &[(&str, &str)] = &[
    ("MIT", "MIT License"),
    ("ISC", "ISC License"),
    ("BSD-2-Clause", "BSD 2-Clause \"Simplified\" License"),
    ("BSD-3-Clause", "BSD 3-Clause \"New\" or \"Revised\" License"),
    ("Apache-2.0", "Apache License 2.0"),
    ("GPL-2.0-only", "GNU General Public License v2.0 only"),
    ("GPL-2.0-or-later", "GNU General Public License v2.0 or later"),
    ("GPL-3.0-only", "GNU General Public License v3.0 only"),
    ("GPL-3.0-or-later", "GNU General Public License v3.0 or later"),
    ("LGPL-2.1-only", "GNU Lesser General Public License v2.1 only"),
    ("LGPL-3.0-only", "GNU Lesser General Public License v3.0 only"),
    ("MPL-2.0", "Mozilla Public License 2.0"),
    ("AGPL-3.0-only", "GNU Affero General Public License v3.0 only"),
    ("Unlicense", "The Unlicense"),
    ("CC0-1.0", "Creative Commons Zero v1.0 Universal"),
    ("CC-BY-4.0", "Creative Commons Attribution 4.0 International"),
    ("0BSD", "BSD Zero Clause License"),
    ("Zlib", "zlib License"),
    ("Artistic-2.0", "Artistic License 2.0"),
    ("EPL-2.0", "Eclipse Public License 2.0"),
    ("WTFPL", "Do What The F*ck You Want To Public License"),
    ("BlueOak-1.0.0", "Blue Oak Model License 1.0.0"),
    ("Python-2.0", "Python License 2.0"),
];

/// Look up the full name for a license identifier, if it is known
pub fn license_name(identifier: &str) -> Option<&'static str> {
    KNOWN_LICENSES
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, name)| *name)
}

/// Compliance classification of one package's declared license
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// License identifier is in the reference table
    Compliant,
    /// License field present but not a known identifier
    Unknown,
    /// No license field declared
    Missing,
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LicenseStatus::Compliant => "compliant",
            LicenseStatus::Unknown => "unknown",
            LicenseStatus::Missing => "missing",
        };
        write!(f, "{}", label)
    }
}

/// Verdict for one installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseVerdict {
    /// Package name
    pub package: String,
    /// The declared license string, if any
    pub license: Option<String>,
    /// Classification against the reference table
    pub status: LicenseStatus,
}

impl LicenseVerdict {
    /// Classify a package's declared license against the reference table
    pub fn classify(package: impl Into<String>, license: Option<String>) -> Self {
        let status = match license.as_deref() {
            None => LicenseStatus::Missing,
            Some(id) if license_name(id).is_some() => LicenseStatus::Compliant,
            Some(_) => LicenseStatus::Unknown,
        };
        Self {
            package: package.into(),
            license,
            status,
        }
    }

    /// True if the verdict is compliant
    pub fn is_compliant(&self) -> bool {
        self.status == LicenseStatus::Compliant
    }
}

impl fmt::Display for LicenseVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.package,
            self.license.as_deref().unwrap_or("<none>"),
            self.status
        )
    }
}
