//! Name cleaning applied by the offline builder before names are embedded.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-case, fold accents to ASCII, replace anything outside `[a-z0-9 ]`
/// with a space and collapse runs of whitespace.
pub fn clean_text(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::clean_text;

    #[test]
    fn folds_accents_and_punctuation() {
        assert_eq!(clean_text("  Bomba Centrífuga  (3/4\") "), "bomba centrifuga 3 4");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean_text("--"), "");
    }
}
