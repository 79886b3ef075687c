use std::{collections::BTreeSet, sync::OnceLock};

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// What could be recovered from one job log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedLog {
    pub version: Option<String>,
    /// Failing test identifiers in the order they appear. Repeats are kept.
    pub failures: Vec<String>,
    /// Distinct error type names from the failure summaries, sorted.
    pub error_types: Vec<String>,
}

fn build(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .unwrap()
}

fn ansi_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    /* Full CSI colour codes, and the same codes with the escape byte already stripped */
    REGEX.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m|\[[0-9;]*m").unwrap())
}

/// Version shapes in order of preference. The `zarr: x.y.z` line comes from xarray's
/// `show_versions` output; the rest are install logs.
fn version_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            r"zarr:\s+(\d+\.\d+\.\d+(?:[.\w\-+]+)?)",
            r"zarr\s+(\d+\.\d+\.\d+(?:[.\w\-+]+)?)",
            r"Installing.*zarr[_-]?python?.*?(\d+\.\d+\.\d+(?:[.\w\-+]+)?)",
            r"(?:Successfully installed|Requirement already satisfied).*zarr[_-]?python?[^\d]*(\d+\.\d+\.\d+(?:[.\w\-+]+)?)",
        ]
        .into_iter()
        .map(build)
        .collect()
    })
}

fn failure_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    /* The identifier stops at the first hyphen, which starts the " - reason" suffix */
    REGEX.get_or_init(|| build(r"FAILED\s+([^:\n]+::[^\-\n]+)"))
}

fn error_type_regexes() -> &'static [Regex] {
    static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            r"FAILED\s+[^\-\n]+ - (\w+(?:Error|Exception)):",
            r"FAILED\s+[^\-\n]+ - (assert)",
        ]
        .into_iter()
        .map(build)
        .collect()
    })
}

/// Remove terminal colour codes. Stripping twice is the same as stripping once.
pub fn strip_ansi(text: &str) -> String {
    ansi_regex().replace_all(text, "").into_owned()
}

pub fn extract_version(text: &str) -> Option<String> {
    version_regexes()
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

pub fn extract_failures(text: &str) -> Vec<String> {
    failure_regex()
        .captures_iter(text)
        .map(|caps| caps[1].trim_end().to_string())
        .collect()
}

pub fn extract_error_types(text: &str) -> Vec<String> {
    let mut types = BTreeSet::new();
    for re in error_type_regexes() {
        for caps in re.captures_iter(text) {
            let name = &caps[1];
            if name.eq_ignore_ascii_case("assert") {
                types.insert("AssertionError".to_string());
            } else {
                types.insert(name.to_string());
            }
        }
    }
    types.into_iter().collect()
}

/// Parse a raw job log. Never fails: anything that doesn't match is simply absent.
pub fn parse(log: &str) -> ParsedLog {
    let clean = strip_ansi(log);

    ParsedLog {
        version: extract_version(&clean),
        failures: extract_failures(&clean),
        error_types: extract_error_types(&clean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
2025-09-30T00:31:02.1Z \x1b[36;1mpython -m xarray.util.print_versions\x1b[0m
2025-09-30T00:31:04.2Z numpy: 2.4.0.dev0
2025-09-30T00:31:04.2Z zarr: 3.1.3.dev23+g62d1a6abc
2025-09-30T00:31:04.3Z numcodecs: 0.16.1
2025-09-30T01:01:10.5Z [31mFAILED[0m xarray/tests/test_backends.py::TestZarrDictStore::test_roundtrip_coordinates - AssertionError: Left and right Dataset objects are not identical
2025-09-30T01:01:10.5Z FAILED xarray/tests/test_extensions.py::test_pandas_array - TypeError: unhashable type
2025-09-30T01:01:10.6Z FAILED xarray/tests/test_backends.py::TestZarrDictStore::test_roundtrip_coordinates - AssertionError: again
2025-09-30T01:01:10.6Z FAILED xarray/tests/test_plot.py::test_label - assert 1 == 2
";

    #[test]
    fn test_strip_ansi() {
        let clean = strip_ansi("\x1b[31mFAILED\x1b[0m and [1;31mbold[0m");
        assert_eq!(clean, "FAILED and bold");
        assert_eq!(strip_ansi(&clean), clean);
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("zarr: 3.1.3.dev23+g62d1a6abc").as_deref(),
            Some("3.1.3.dev23+g62d1a6abc")
        );
        assert_eq!(
            extract_version("Successfully installed numcodecs-0.16.1 zarr-python-2.18.3").as_deref(),
            Some("2.18.3")
        );
        assert_eq!(extract_version("nothing to see here"), None);
    }

    #[test]
    fn test_extract_failure_identifier() {
        assert_eq!(
            extract_failures(
                "FAILED tests/test_backends.py::TestZarrStore::test_roundtrip - AssertionError"
            ),
            vec!["tests/test_backends.py::TestZarrStore::test_roundtrip"]
        );
    }

    #[test]
    fn test_hyphenated_parameters_are_truncated() {
        assert_eq!(
            extract_failures("FAILED tests/test_a.py::test_foo[case-a] - ValueError: x"),
            vec!["tests/test_a.py::test_foo[case"]
        );
    }

    #[test]
    fn test_parse() {
        let parsed = parse(LOG);

        assert_eq!(parsed.version.as_deref(), Some("3.1.3.dev23+g62d1a6abc"));
        assert_eq!(
            parsed.failures,
            vec![
                "xarray/tests/test_backends.py::TestZarrDictStore::test_roundtrip_coordinates",
                "xarray/tests/test_extensions.py::test_pandas_array",
                "xarray/tests/test_backends.py::TestZarrDictStore::test_roundtrip_coordinates",
                "xarray/tests/test_plot.py::test_label",
            ]
        );
        assert_eq!(
            parsed.error_types,
            vec!["AssertionError", "TypeError"]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse(""), ParsedLog::default());
        assert_eq!(parse("=== 1200 passed in 300s ===\n"), ParsedLog::default());
    }
}
