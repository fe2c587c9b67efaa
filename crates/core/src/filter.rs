//! Control-file filtering policy.
//!
//! Control files (blanks, background runs) are acquired like any other data
//! file but never count towards sequence completion. They are left out of the
//! ledger when it is seeded, and an invocation triggered by one exits without
//! touching the ledger.

/// Returns true when `name` is a control file that should be ignored.
///
/// The match is a case-insensitive substring test of `control_marker` in
/// `name`, gated by `enabled`. An empty marker never matches.
pub fn is_control_file(name: &str, control_marker: &str, enabled: bool) -> bool {
    if !enabled || control_marker.is_empty() {
        return false;
    }
    name.to_lowercase()
        .contains(&control_marker.to_lowercase())
}

/// Filtering policy resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFilter {
    marker: String,
    enabled: bool,
}

impl ControlFilter {
    pub fn new(marker: impl Into<String>, enabled: bool) -> Self {
        Self {
            marker: marker.into(),
            enabled,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        is_control_file(name, &self.marker, self.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_case_insensitive_substring() {
        assert!(is_control_file("Sample_POSTBLANK_01", "PostBlank", true));
        assert!(is_control_file("postblank", "PostBlank", true));
        assert!(!is_control_file("Sample_01", "PostBlank", true));
    }

    #[test]
    fn test_disabled_never_matches() {
        assert!(!is_control_file("Sample_PostBlank_01", "PostBlank", false));
    }

    #[test]
    fn test_empty_marker_never_matches() {
        assert!(!is_control_file("anything", "", true));
    }

    #[test]
    fn test_control_filter_wraps_predicate() {
        let filter = ControlFilter::new("blank", true);
        assert!(filter.matches("run_Blank_3.raw"));
        assert!(!filter.matches("run_3.raw"));
        assert!(!ControlFilter::new("blank", false).matches("run_Blank_3.raw"));
    }
}
