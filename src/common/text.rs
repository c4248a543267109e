//! Label text normalisation: escape resolution followed by script folding.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Code-point escapes, longest form first so `\UXXXXXXXX` is not read as `U+`.
static ESCAPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\U([0-9A-Fa-f]{8})|\\u([0-9A-Fa-f]{4})|\\?U\+([0-9A-Fa-f]{4,6})")
        .expect("escape pattern is valid")
});

/// Prepare a string for label rendering: resolve literal code-point escapes,
/// then fold locale-specific letters to ASCII.
///
/// Folding can expose a new escape (`Ü+00E7` becomes `U+00E7`), so both passes
/// repeat until the text is stable. Each further round resolves at least one
/// escape and shortens the text.
pub fn normalize_label(text: &str) -> String {
    let mut current = fold_script(&resolve_escapes(text));
    loop {
        let next = fold_script(&resolve_escapes(&current));
        if next == current { return current }
        current = next;
    }
}

/// Replace `U+XXXX`, `\U+XXXX`, `\uXXXX` and `\UXXXXXXXX` escapes with the
/// character they name. Escapes that do not name a Unicode scalar value are
/// left untouched.
pub fn resolve_escapes(text: &str) -> String {
    if !text.contains('U') && !text.contains("\\u") { return text.to_string() }

    ESCAPES.replace_all(text, |caps: &Captures| {
        let hex = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();

        u32::from_str_radix(hex, 16).ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    }).into_owned()
}

/// Fold Turkish letters to their closest ASCII counterparts, one char for one.
pub fn fold_script(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

#[inline]
fn fold_char(c: char) -> char {
    match c {
        'ç' => 'c', 'Ç' => 'C',
        'ğ' => 'g', 'Ğ' => 'G',
        'ı' => 'i', 'İ' => 'I',
        'ö' => 'o', 'Ö' => 'O',
        'ş' => 's', 'Ş' => 'S',
        'ü' => 'u', 'Ü' => 'U',
        'â' => 'a', 'Â' => 'A',
        'î' => 'i', 'Î' => 'I',
        'û' => 'u', 'Û' => 'U',
        other => other,
    }
}

/// Letters rewritten by [`fold_script`].
pub const FOLDED_LETTERS: &[char] = &[
    'ç', 'Ç', 'ğ', 'Ğ', 'ı', 'İ', 'ö', 'Ö', 'ş', 'Ş', 'ü', 'Ü', 'â', 'Â', 'î', 'Î', 'û', 'Û',
];
