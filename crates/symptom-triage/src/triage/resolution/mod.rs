mod age_gate;
mod ranker;
mod scorer;

use super::domain::{CatalogSnapshot, Recommendation, Rejection, Resolution, SelectionInput};
use age_gate::{check_age, AgeVerdict};
use ranker::rank_rules;
use scorer::score_candidates;

/// Stateless resolver composing scoring, ranking, and the age gate over one snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionEngine;

impl ResolutionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, input: &SelectionInput, snapshot: &CatalogSnapshot) -> Resolution {
        let candidates = score_candidates(input.selected_symptoms(), snapshot);

        let Some(winner) = rank_rules(&candidates, &snapshot.rules, input.days_since_onset())
        else {
            return Resolution::Rejected(Rejection::NoMatch);
        };

        // Candidates only contain diseases present in the snapshot.
        let Some(disease) = snapshot.disease(winner.disease_id) else {
            return Resolution::Rejected(Rejection::NoMatch);
        };

        match check_age(winner.rule, disease, input.age()) {
            AgeVerdict::Rejected(rejection) => Resolution::Rejected(rejection),
            AgeVerdict::Accepted => Resolution::Recommended(Recommendation {
                disease_id: disease.id,
                disease_name: disease.name.clone(),
                recommendation_text: winner.rule.recommendation.clone(),
                duration_threshold: winner.rule.duration_threshold,
                age_min: winner.rule.min_age,
                age_max: winner.rule.max_age,
                coincidences: winner.coincidences,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) fn rank_for_tests<'a>(
    input: &SelectionInput,
    snapshot: &'a CatalogSnapshot,
) -> Option<ranker::RankedMatch<'a>> {
    let candidates = score_candidates(input.selected_symptoms(), snapshot);
    rank_rules(&candidates, &snapshot.rules, input.days_since_onset())
}

#[cfg(test)]
pub(crate) fn score_for_tests(
    input: &SelectionInput,
    snapshot: &CatalogSnapshot,
) -> std::collections::BTreeMap<super::domain::DiseaseId, u32> {
    score_candidates(input.selected_symptoms(), snapshot)
}
