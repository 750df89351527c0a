//! Keyword matching with pinyin support
//!
//! Matching is a deterministic boolean, not a ranked score, and is cheap
//! enough to run on every keystroke. A keyword matches a text either as a
//! case-insensitive literal substring or phonetically: Han characters are
//! transliterated syllable-by-syllable and the keyword must cover a
//! contiguous run of syllables, each contributing its full pinyin or its
//! initial. Partial-syllable splits never match.

use pinyin::ToPinyin;

/// One matchable unit of a text: a Han character's pinyin, or a
/// non-Han character passed through verbatim
#[derive(Debug, Clone)]
struct Syllable {
    full: String,
    initial: String,
}

/// Check whether a search keyword matches a text
///
/// Empty text or empty keyword never match.
pub fn matches(text: &str, keyword: &str) -> bool {
    if text.is_empty() || keyword.is_empty() {
        return false;
    }

    let keyword = keyword.to_lowercase();

    // 1. Literal substring, case-insensitive
    if text.to_lowercase().contains(&keyword) {
        return true;
    }

    // 2. Continuous phonetic match at syllable boundaries
    continuous_match(&syllables(text), &keyword)
}

/// Transliterate a text into matchable syllables
///
/// Whitespace is dropped; non-Han characters become single-character
/// syllables whose full form and initial coincide.
fn syllables(text: &str) -> Vec<Syllable> {
    let mut result = Vec::new();

    for (ch, pinyin) in text.chars().zip(text.to_pinyin()) {
        match pinyin {
            Some(py) => {
                let full = py.plain().to_lowercase();
                let initial = full.chars().take(1).collect();
                result.push(Syllable { full, initial });
            }
            None => {
                if ch.is_whitespace() {
                    continue;
                }
                let full: String = ch.to_lowercase().collect();
                result.push(Syllable {
                    initial: full.clone(),
                    full,
                });
            }
        }
    }

    result
}

/// True if the keyword covers a contiguous syllable run starting anywhere
fn continuous_match(syllables: &[Syllable], keyword: &str) -> bool {
    (0..syllables.len()).any(|start| consumes(&syllables[start..], keyword))
}

/// True if the keyword is consumed exactly at a syllable boundary, each
/// syllable contributing its full form or its initial
fn consumes(syllables: &[Syllable], keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }
    let Some(first) = syllables.first() else {
        return false;
    };

    if let Some(rest) = keyword.strip_prefix(first.full.as_str()) {
        if consumes(&syllables[1..], rest) {
            return true;
        }
    }
    if first.initial != first.full {
        if let Some(rest) = keyword.strip_prefix(first.initial.as_str()) {
            if consumes(&syllables[1..], rest) {
                return true;
            }
        }
    }

    false
}
