use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::super::domain::{DiseaseId, RecommendationRule};

/// Winning (disease, rule) pair with the overlap that earned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RankedMatch<'a> {
    pub disease_id: DiseaseId,
    pub rule: &'a RecommendationRule,
    pub coincidences: u32,
}

/// Filters candidate rules by their duration operator and picks the best one.
///
/// Ordering is coincidences descending, then distance between the reported duration and the
/// rule threshold ascending. The sort is stable over `rules`, so remaining ties go to the rule
/// that appears first (creation order).
pub(crate) fn rank_rules<'a>(
    candidates: &BTreeMap<DiseaseId, u32>,
    rules: &'a [RecommendationRule],
    days_since_onset: u32,
) -> Option<RankedMatch<'a>> {
    let mut passing: Vec<RankedMatch<'a>> = rules
        .iter()
        .filter_map(|rule| {
            let coincidences = *candidates.get(&rule.disease_id)?;
            rule.operator
                .admits(days_since_onset, rule.duration_threshold)
                .then_some(RankedMatch {
                    disease_id: rule.disease_id,
                    rule,
                    coincidences,
                })
        })
        .collect();

    passing.sort_by_key(|candidate| {
        (
            Reverse(candidate.coincidences),
            candidate.rule.duration_distance(days_since_onset),
        )
    });

    passing.into_iter().next()
}
