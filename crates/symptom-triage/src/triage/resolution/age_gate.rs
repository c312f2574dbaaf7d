use super::super::domain::{Disease, RecommendationRule, Rejection};

/// Result of checking the winning rule's age band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AgeVerdict {
    Accepted,
    Rejected(Rejection),
}

pub(crate) fn check_age(rule: &RecommendationRule, disease: &Disease, age: u32) -> AgeVerdict {
    if rule.covers_age(age) {
        AgeVerdict::Accepted
    } else {
        AgeVerdict::Rejected(Rejection::AgeOutOfRange {
            min_age: rule.min_age,
            max_age: rule.max_age,
            disease_name: disease.name.clone(),
        })
    }
}
