use unicode_normalization::UnicodeNormalization;

/// Case- and diacritic-insensitive fold: lower-case, NFD, then drop the
/// combining diacritical marks block (U+0300..=U+036F).
pub fn fold(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect()
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_accents() {
        assert_eq!(fold("Café"), "cafe");
        assert_eq!(fold("CAFÉ"), "cafe");
        assert_eq!(fold("Ærøskøbing Ñandú"), "ærøskøbing nandu");
    }

    #[test]
    fn precomposed_and_decomposed_fold_alike() {
        assert_eq!(fold("e\u{0301}t\u{00e9}"), fold("\u{00e9}te\u{0301}"));
    }

    #[test]
    fn idempotent() {
        for s in ["Crème Brûlée", "ÅNGSTRÖM", "plain", "", "Ωμέγα"] {
            let once = fold(s);
            assert_eq!(fold(&once), once);
        }
    }
}
