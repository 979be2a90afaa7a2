// src/crawler/heuristics.rs
//
// Pure text heuristics shared by the extractor and the validation step.
// Directory pages fill contact fields with all kinds of junk ("N/A",
// "Under construction", bare URLs), so everything here errs on the side
// of rejecting garbage names while staying permissive about headcount.

const NAME_DENY_LIST: &[&str] = &[
    "n/a",
    "na",
    "none",
    "admin",
    "staff",
    "team",
    "info",
    "contact",
    "available",
    "tba",
    "tbd",
];

const NAME_DENY_PREFIXES: &[&str] = &["closed", "under construction", "for sale", "no longer"];

const HONORIFIC_PREFIXES: &[&str] = &["mr", "mrs", "ms", "dr", "engr", "atty", "prof", "hon"];

const GENERATIONAL_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

/// Non-numeric size descriptors some listings use instead of a range.
/// All of them describe the 10-500 band we are after.
const KNOWN_RANGE_LITERALS: &[&str] = &["small", "medium", "mid-sized", "midsize", "smb"];

/// Returns true when `text` plausibly names a person.
pub fn is_valid_name(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() < 3 {
        return false;
    }

    let lower = trimmed.to_lowercase();
    if lower.contains('@') || lower.contains("http") || lower.contains("www.") || lower.contains(".com")
    {
        return false;
    }
    if NAME_DENY_LIST.contains(&lower.as_str()) {
        return false;
    }
    if NAME_DENY_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    if trimmed.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        return false;
    }
    if trimmed.chars().filter(|c| c.is_alphabetic()).count() < 2 {
        return false;
    }

    true
}

/// Splits a free-text person name into (first, last), stripping honorifics
/// and generational suffixes. Returns two empty strings when no usable name
/// remains; callers treat that as "no name found", not an error.
pub fn parse_name(full_text: &str) -> (String, String) {
    let collapsed = full_text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut tokens: Vec<&str> = collapsed.split(' ').filter(|t| !t.is_empty()).collect();

    while let Some(first) = tokens.first() {
        let bare = first.trim_end_matches('.').to_lowercase();
        if HONORIFIC_PREFIXES.contains(&bare.as_str()) {
            tokens.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = tokens.last() {
        let bare = last.trim_end_matches('.').to_lowercase();
        if GENERATIONAL_SUFFIXES.contains(&bare.as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }

    let candidate = tokens.join(" ");
    if !is_valid_name(&candidate) {
        return (String::new(), String::new());
    }

    let first = tokens[0].to_string();
    let last = tokens[1..].join(" ");
    (first, last)
}

/// Classifies a free-text headcount string against the 10-500 band.
///
/// Deliberately permissive: ambiguous text is accepted rather than
/// rejected. The record-validation layer never calls this for an empty
/// range (range unknown passes outright); only a present, out-of-band
/// range rejects a record.
pub fn employee_range_matches(text: &str) -> bool {
    let numbers: Vec<u32> = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .take(2)
        .collect();

    match numbers.as_slice() {
        [lo, hi] => *lo >= 10 && *hi <= 500,
        [n] => (10..=500).contains(n),
        _ => KNOWN_RANGE_LITERALS.contains(&text.trim().to_lowercase().as_str()),
    }
}

/// Stable identifier segment of a detail-page URL, used as the dedup key.
/// Query string and fragment never participate in identity.
pub fn dedup_key(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(without_query)
        .to_string()
}
