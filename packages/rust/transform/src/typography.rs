//! Typographic normalization passes.
//!
//! Converts typewriter punctuation to its typographic equivalents:
//! straight quotes to curly quotes, hyphen runs to dashes, three dots to
//! an ellipsis. Each pass is a function `&str -> String` applied in
//! sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full typography pipeline on a field value.
pub fn typography(text: &str) -> String {
    let mut result = text.to_string();

    result = convert_ellipses(&result);
    result = convert_dashes(&result);
    result = convert_double_quotes(&result);
    result = convert_single_quotes(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Ellipses
// ---------------------------------------------------------------------------

/// Replace three consecutive dots with a single ellipsis character.
fn convert_ellipses(text: &str) -> String {
    static ELLIPSIS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\.\.\.").expect("valid regex"));

    ELLIPSIS_RE.replace_all(text, "\u{2026}").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Dashes
// ---------------------------------------------------------------------------

/// Replace `---` with an em dash and `--` with an en dash.
///
/// The triple-hyphen rule must run first or it would be eaten by the
/// double-hyphen rule.
fn convert_dashes(text: &str) -> String {
    static EM_DASH_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"---").expect("valid regex"));
    static EN_DASH_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"--").expect("valid regex"));

    let result = EM_DASH_RE.replace_all(text, "\u{2014}");
    EN_DASH_RE.replace_all(&result, "\u{2013}").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Double quotes
// ---------------------------------------------------------------------------

/// Curl double quotes. A quote at the start of a line or after
/// whitespace/opening brackets opens; everything else closes.
fn convert_double_quotes(text: &str) -> String {
    static OPENING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?m)(^|[\s(\[{])""#).expect("valid regex"));

    let result = OPENING_RE.replace_all(text, "${1}\u{201c}");
    result.replace('"', "\u{201d}")
}

// ---------------------------------------------------------------------------
// Pass 4: Single quotes and apostrophes
// ---------------------------------------------------------------------------

/// Curl single quotes. A quote at the start of a line or after
/// whitespace/opening brackets opens; the rest (including apostrophes)
/// close.
fn convert_single_quotes(text: &str) -> String {
    static OPENING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)(^|[\s(\[{])'").expect("valid regex"));

    let result = OPENING_RE.replace_all(text, "${1}\u{2018}");
    result.replace('\'', "\u{2019}")
}
