//! String similarity between names
//!
//! Jaro-Winkler: shared characters in matching order, boosted by a common
//! prefix of up to four characters once the Jaro score exceeds 0.7.
//! Comparison is case-sensitive.

/// Normalised similarity in [0.0, 1.0]; 1.0 for identical strings
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        for name in ["Jon", "Smith", "Alexandria", "Ñoño"] {
            assert_eq!(similarity(name, name), 1.0);
        }
    }

    #[test]
    fn test_symmetric() {
        let pairs = [("Jon", "John"), ("Smith", "Smyth"), ("Rob", "Robert"), ("Ann", "Xu")];
        for (a, b) in pairs {
            assert!((similarity(a, b) - similarity(b, a)).abs() < 1e-12, "{} / {}", a, b);
        }
    }

    #[test]
    fn test_disjoint_alphabets_score_zero() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_reference_values() {
        assert!((similarity("Jon", "John") - 0.9333).abs() < 1e-3);
        assert!((similarity("Smith", "Smyth") - 0.8933).abs() < 1e-3);
        assert!((similarity("Rob", "Robert") - 0.8833).abs() < 1e-3);
    }

    #[test]
    fn test_case_sensitive() {
        assert!(similarity("smith", "SMITH") < 1.0);
    }
}
