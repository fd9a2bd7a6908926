//! Tiered match classification
//!
//! A query/candidate pair matches when its string similarity clears the
//! threshold for its level of phonetic agreement:
//!
//! | Tier | Phonetic agreement           | Default minimum similarity |
//! |------|------------------------------|----------------------------|
//! | A    | primary and alternate equal  | 0.60                       |
//! | B    | primary or alternate equal   | 0.70                       |
//! | C    | none required                | 0.82                       |
//!
//! Tiers are tried in order; the first satisfied tier wins.

use namesake_common::config::MatchingConfig;
use serde::Serialize;

use crate::phonetic::{PhoneticCode, PhoneticEncoder};
use crate::similarity::similarity;

/// How many of the two phonetic keys agree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PhoneticAgreement {
    None,
    One,
    Both,
}

impl PhoneticAgreement {
    pub fn between(query: &PhoneticCode, candidate: &PhoneticCode) -> Self {
        let primary = query.primary == candidate.primary;
        let alternate = query.alternate == candidate.alternate;
        match (primary, alternate) {
            (true, true) => PhoneticAgreement::Both,
            (true, false) | (false, true) => PhoneticAgreement::One,
            (false, false) => PhoneticAgreement::None,
        }
    }
}

/// Tier that accepted a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchTier {
    /// Both phonetic keys agree
    BothCodes,
    /// One phonetic key agrees
    OneCode,
    /// Orthographic fallback
    Orthographic,
}

/// Minimum similarity per tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    pub both_codes: f64,
    pub one_code: f64,
    pub orthographic: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            both_codes: 0.60,
            one_code: 0.70,
            orthographic: 0.82,
        }
    }
}

impl From<&MatchingConfig> for MatchThresholds {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            both_codes: config.both_codes_threshold,
            one_code: config.one_code_threshold,
            orthographic: config.orthographic_threshold,
        }
    }
}

impl MatchThresholds {
    /// Apply the tier ladder to an agreement level and similarity score
    pub fn decide(&self, agreement: PhoneticAgreement, score: f64) -> Option<MatchTier> {
        if agreement == PhoneticAgreement::Both && score >= self.both_codes {
            Some(MatchTier::BothCodes)
        } else if agreement >= PhoneticAgreement::One && score >= self.one_code {
            Some(MatchTier::OneCode)
        } else if score >= self.orthographic {
            Some(MatchTier::Orthographic)
        } else {
            None
        }
    }
}

/// A query name encoded once and compared against many candidates
#[derive(Debug, Clone)]
pub struct EncodedQuery<'a> {
    pub name: &'a str,
    pub code: PhoneticCode,
}

/// Combines the phonetic encoder and the similarity scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchClassifier {
    encoder: PhoneticEncoder,
    thresholds: MatchThresholds,
}

impl MatchClassifier {
    pub fn new(encoder: PhoneticEncoder, thresholds: MatchThresholds) -> Self {
        Self {
            encoder,
            thresholds,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(
            PhoneticEncoder::new(config.max_code_length),
            MatchThresholds::from(config),
        )
    }

    pub fn encoder(&self) -> &PhoneticEncoder {
        &self.encoder
    }

    pub fn encode_query<'a>(&self, name: &'a str) -> EncodedQuery<'a> {
        EncodedQuery {
            name,
            code: self.encoder.encode(name),
        }
    }

    /// Classify a pre-encoded query against one candidate
    pub fn classify(
        &self,
        query: &EncodedQuery<'_>,
        candidate: &str,
        candidate_code: &PhoneticCode,
    ) -> Option<MatchTier> {
        let agreement = PhoneticAgreement::between(&query.code, candidate_code);
        let score = similarity(query.name, candidate);
        self.thresholds.decide(agreement, score)
    }

    /// Whether `query_name` and `candidate` are the same name
    pub fn is_match(&self, query_name: &str, candidate: &str, candidate_code: &PhoneticCode) -> bool {
        let query = self.encode_query(query_name);
        self.classify(&query, candidate, candidate_code).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonetic::encode;

    fn classifier() -> MatchClassifier {
        MatchClassifier::default()
    }

    #[test]
    fn test_smith_smyth_matches_on_both_codes() {
        let c = classifier();
        let query = c.encode_query("Smith");
        assert_eq!(
            c.classify(&query, "Smyth", &encode("Smyth")),
            Some(MatchTier::BothCodes)
        );
        assert!(c.is_match("Smith", "Smyth", &encode("Smyth")));
    }

    #[test]
    fn test_primary_only_agreement_uses_one_code_tier() {
        let c = classifier();
        let query = c.encode_query("Jon");
        let candidate_code = PhoneticCode::new(query.code.primary.clone(), "QQQ");
        assert_eq!(
            c.classify(&query, "John", &candidate_code),
            Some(MatchTier::OneCode)
        );
    }

    #[test]
    fn test_orthographic_fallback_without_phonetic_agreement() {
        let c = classifier();
        // Rob (RP) vs Robert (RPRT): no key agrees, similarity ~0.88
        assert_eq!(
            c.classify(&c.encode_query("Rob"), "Robert", &encode("Robert")),
            Some(MatchTier::Orthographic)
        );
    }

    #[test]
    fn test_dissimilar_names_do_not_match() {
        let c = classifier();
        assert!(!c.is_match("Smith", "Jones", &encode("Jones")));
        assert!(!c.is_match("Ann", "Bartholomew", &encode("Bartholomew")));
    }

    #[test]
    fn test_empty_query_does_not_match() {
        let c = classifier();
        assert!(!c.is_match("", "Smith", &encode("Smith")));
    }

    #[test]
    fn test_decide_boundaries() {
        let t = MatchThresholds::default();
        assert_eq!(t.decide(PhoneticAgreement::Both, 0.60), Some(MatchTier::BothCodes));
        assert_eq!(t.decide(PhoneticAgreement::Both, 0.59), None);
        assert_eq!(t.decide(PhoneticAgreement::One, 0.70), Some(MatchTier::OneCode));
        assert_eq!(t.decide(PhoneticAgreement::One, 0.69), None);
        assert_eq!(t.decide(PhoneticAgreement::None, 0.82), Some(MatchTier::Orthographic));
        assert_eq!(t.decide(PhoneticAgreement::None, 0.81), None);
    }

    #[test]
    fn test_more_agreement_never_loses_a_match() {
        let t = MatchThresholds::default();
        let levels = [
            PhoneticAgreement::None,
            PhoneticAgreement::One,
            PhoneticAgreement::Both,
        ];
        for step in 0..=100 {
            let score = step as f64 / 100.0;
            for pair in levels.windows(2) {
                let weaker = t.decide(pair[0], score).is_some();
                let stronger = t.decide(pair[1], score).is_some();
                assert!(
                    !weaker || stronger,
                    "score {} accepted at {:?} but rejected at {:?}",
                    score,
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn test_orthographic_threshold_is_tunable() {
        let strict = MatchClassifier::new(
            PhoneticEncoder::default(),
            MatchThresholds {
                orthographic: 0.90,
                ..MatchThresholds::default()
            },
        );
        assert!(!strict.is_match("Rob", "Robert", &encode("Robert")));
        assert!(classifier().is_match("Rob", "Robert", &encode("Robert")));
    }
}
