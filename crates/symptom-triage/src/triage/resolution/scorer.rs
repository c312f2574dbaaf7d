use std::collections::{BTreeMap, BTreeSet};

use super::super::domain::{CatalogSnapshot, DiseaseId, SymptomId};

/// Counts, per disease, how many selected symptoms are linked to it.
///
/// Diseases without overlap are absent, as are links whose disease is not in the snapshot.
pub(crate) fn score_candidates(
    selected: &BTreeSet<SymptomId>,
    snapshot: &CatalogSnapshot,
) -> BTreeMap<DiseaseId, u32> {
    let known: BTreeSet<DiseaseId> = snapshot.diseases.iter().map(|disease| disease.id).collect();
    let mut coincidences = BTreeMap::new();

    for link in &snapshot.links {
        if selected.contains(&link.symptom_id) && known.contains(&link.disease_id) {
            *coincidences.entry(link.disease_id).or_insert(0) += 1;
        }
    }

    coincidences
}
