//! License compliance checking over the installed package set
//!
//! Every installed package (transitively) is classified against the
//! closed reference table; the result carries only the non-compliant
//! verdicts, so an empty result signals full compliance.

use crate::domain::LicenseVerdict;
use std::collections::BTreeMap;

/// Classify every installed package and keep only the non-compliant
/// verdicts, ordered by package name.
pub fn check_compliance(installed: &BTreeMap<String, Option<String>>) -> Vec<LicenseVerdict> {
    installed
        .iter()
        .map(|(package, license)| LicenseVerdict::classify(package, license.clone()))
        .filter(|verdict| !verdict.is_compliant())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LicenseStatus;

    fn installed(entries: &[(&str, Option<&str>)]) -> BTreeMap<String, Option<String>> {
        entries
            .iter()
            .map(|(name, license)| (name.to_string(), license.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_fully_compliant_is_empty() {
        let verdicts = check_compliance(&installed(&[
            ("a", Some("MIT")),
            ("b", Some("Apache-2.0")),
            ("c", Some("ISC")),
        ]));
        assert!(verdicts.is_empty());
    }

    #[test]
    fn test_unknown_and_missing_are_reported() {
        let verdicts = check_compliance(&installed(&[
            ("good", Some("MIT")),
            ("odd", Some("Foo-Bar-9000")),
            ("bare", None),
        ]));
        assert_eq!(verdicts.len(), 2);
        // BTreeMap ordering: "bare" before "odd"
        assert_eq!(verdicts[0].package, "bare");
        assert_eq!(verdicts[0].status, LicenseStatus::Missing);
        assert_eq!(verdicts[1].package, "odd");
        assert_eq!(verdicts[1].status, LicenseStatus::Unknown);
    }

    #[test]
    fn test_empty_installed_set() {
        assert!(check_compliance(&BTreeMap::new()).is_empty());
    }
}
