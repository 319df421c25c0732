// LogTail - core/classify.rs
//
// Keyword-based severity classification for display colouring.
//
// Only the first CLASSIFY_PREFIX_CHARS characters are inspected, so a
// megabyte-long line costs the same as a short one. Severity keywords in
// ordinary log formats appear near the start (after a timestamp at most).

use super::model::Severity;
use crate::util::constants::CLASSIFY_PREFIX_CHARS;

/// Keyword groups in priority order; the first group with a hit wins.
const KEYWORDS: &[(Severity, &[&str])] = &[
    (Severity::Error, &["ERROR", "FATAL", "CRIT", "EMERG", "ALERT"]),
    (Severity::Warn, &["WARN"]),
    (Severity::Debug, &["DEBUG", "TRACE", "VERBOSE"]),
    (Severity::Info, &["INFO", "NOTICE"]),
];

/// Classify a line by the severity keywords in its leading characters.
///
/// Matching is a case-insensitive substring search, so `[warning]`,
/// `<crit>` and `E/CRITICAL` all match.
pub fn classify(line: &str) -> Severity {
    let head: String = line
        .chars()
        .take(CLASSIFY_PREFIX_CHARS)
        .flat_map(char::to_uppercase)
        .collect();

    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| head.contains(w)))
        .map(|(severity, _)| *severity)
        .unwrap_or(Severity::Plain)
}
