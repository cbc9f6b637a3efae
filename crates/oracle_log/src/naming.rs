//! File naming for reference traces, defect traces and reports.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest sanitized name kept before truncation
pub const MAX_NAME_LEN: usize = 100;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("unsafe-char pattern is valid"));

static DEFECT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)_BUG_.*\.json$").expect("defect-name pattern is valid"));

/// Turn a scenario or function name into a safe file-name fragment
#[must_use]
pub fn sanitize_for_filename(name: &str) -> String {
    if name.is_empty() {
        return "_empty_or_none_".to_string();
    }
    let replaced = name.replace("::", "_NS_");
    let replaced = UNSAFE_CHARS.replace_all(&replaced, "_");
    let trimmed = replaced.trim_matches(|c: char| matches!(c, '_' | '.' | '-' | ' '));

    if trimmed.is_empty() {
        "_sanitized_empty_".to_string()
    } else if trimmed.chars().count() > MAX_NAME_LEN {
        let kept: String = trimmed.chars().take(MAX_NAME_LEN).collect();
        format!("{kept}_TRUNC")
    } else {
        trimmed.to_string()
    }
}

/// `<sanitized scenario>_path<i>.json`
#[must_use]
pub fn reference_file_name(scenario: &str, path_index: usize) -> String {
    format!("{}_path{}.json", sanitize_for_filename(scenario), path_index)
}

/// `<reference stem>_BUG_<kind>.json`
#[must_use]
pub fn defect_file_name(reference_stem: &str, kind: &str) -> String {
    format!("{reference_stem}_BUG_{kind}.json")
}

/// Reference file a trace should be compared against.
///
/// A defect file maps back to the reference it was derived from; any other
/// file is its own reference.
#[must_use]
pub fn reference_for(file_name: &str) -> String {
    DEFECT_NAME
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| file_name.to_string(), |base| format!("{}.json", base.as_str()))
}

/// Whether `file_name` names a defect trace
#[must_use]
pub fn is_defect_file(file_name: &str) -> bool {
    DEFECT_NAME.is_match(file_name)
}

/// `report_for_<stem>.json`
#[must_use]
pub fn report_file_name(trace_stem: &str) -> String {
    format!("report_for_{trace_stem}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_and_symbols() {
        assert_eq!(sanitize_for_filename("Vehicle::init"), "Vehicle_NS_init");
        assert_eq!(sanitize_for_filename("run(int, char*)"), "run_int__char");
        assert_eq!(sanitize_for_filename("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_for_filename("WAD_Normal-Startup.v2"), "WAD_Normal-Startup.v2");
    }

    #[test]
    fn test_trimming_and_empty() {
        assert_eq!(sanitize_for_filename("__x__"), "x");
        assert_eq!(sanitize_for_filename("..--"), "_sanitized_empty_");
        assert_eq!(sanitize_for_filename(""), "_empty_or_none_");
    }

    #[test]
    fn test_truncation() {
        let long = "a".repeat(150);
        let name = sanitize_for_filename(&long);
        assert_eq!(name.len(), MAX_NAME_LEN + "_TRUNC".len());
        assert!(name.ends_with("_TRUNC"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(reference_file_name("Door::open", 2), "Door_NS_open_path2.json");
        assert_eq!(
            defect_file_name("Door_NS_open_path2", "MissingLog"),
            "Door_NS_open_path2_BUG_MissingLog.json"
        );
        assert_eq!(report_file_name("x_path0"), "report_for_x_path0.json");
    }

    #[test]
    fn test_reference_for() {
        assert_eq!(
            reference_for("Door_NS_open_path2_BUG_MissingLog.json"),
            "Door_NS_open_path2.json"
        );
        assert_eq!(reference_for("Door_NS_open_path2.json"), "Door_NS_open_path2.json");
        assert!(is_defect_file("a_BUG_ExtraLog.json"));
        assert!(!is_defect_file("a_path0.json"));
    }
}
