/// Lower-case and split on whitespace. No stemming, no stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::tokenize;

    #[test]
    fn lowercases_and_splits() {
        assert_eq!(tokenize("  Centrifugal\tPUMP  "), vec!["centrifugal", "pump"]);
        assert!(tokenize("   ").is_empty());
    }
}
