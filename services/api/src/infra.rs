use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use symptom_triage::catalog::CatalogSeed;
use symptom_triage::triage::{
    CatalogSnapshot, Category, CategoryId, Disease, DiseaseId, DiseaseSymptomLink,
    NewRecommendationRule, NewSymptom, RecommendationRule, RecordStore, RepositoryError, RuleId,
    Symptom, SymptomId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local record store. Ids are assigned after the highest id already held so seeded
/// catalogs keep their own numbering.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordStore {
    catalog: Arc<Mutex<CatalogSeed>>,
}

impl InMemoryRecordStore {
    pub(crate) fn from_seed(seed: CatalogSeed) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(seed)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogSeed>, RepositoryError> {
        self.catalog
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store mutex poisoned".to_string()))
    }
}

fn next_id(ids: impl Iterator<Item = u64>) -> Result<u64, RepositoryError> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| RepositoryError::Unavailable("record id space exhausted".to_string()))
}

impl RecordStore for InMemoryRecordStore {
    fn insert_category(&self, name: String) -> Result<Category, RepositoryError> {
        let mut guard = self.lock()?;
        let category = Category {
            id: CategoryId(next_id(guard.categories.iter().map(|c| c.id.0))?),
            name,
        };
        guard.categories.push(category.clone());
        Ok(category)
    }

    fn insert_symptom(&self, symptom: NewSymptom) -> Result<Symptom, RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.categories.iter().any(|c| c.id == symptom.category_id) {
            return Err(RepositoryError::UnknownCategory(symptom.category_id));
        }
        let stored = Symptom {
            id: SymptomId(next_id(guard.symptoms.iter().map(|s| s.id.0))?),
            name: symptom.name,
            category_id: symptom.category_id,
        };
        guard.symptoms.push(stored.clone());
        Ok(stored)
    }

    fn insert_disease(&self, name: String) -> Result<Disease, RepositoryError> {
        let mut guard = self.lock()?;
        let disease = Disease {
            id: DiseaseId(next_id(guard.diseases.iter().map(|d| d.id.0))?),
            name,
        };
        guard.diseases.push(disease.clone());
        Ok(disease)
    }

    fn link_symptoms(
        &self,
        disease_id: DiseaseId,
        symptom_ids: &[SymptomId],
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.diseases.iter().any(|d| d.id == disease_id) {
            return Err(RepositoryError::UnknownDisease(disease_id));
        }
        if let Some(missing) = symptom_ids
            .iter()
            .find(|id| !guard.symptoms.iter().any(|s| s.id == **id))
        {
            return Err(RepositoryError::UnknownSymptom(*missing));
        }

        let mut linked = 0;
        for symptom_id in symptom_ids {
            let pair = DiseaseSymptomLink {
                disease_id,
                symptom_id: *symptom_id,
            };
            if !guard.links.contains(&pair) {
                guard.links.push(pair);
                linked += 1;
            }
        }
        Ok(linked)
    }

    fn insert_rule(
        &self,
        rule: NewRecommendationRule,
    ) -> Result<RecommendationRule, RepositoryError> {
        let mut guard = self.lock()?;
        if !guard.diseases.iter().any(|d| d.id == rule.disease_id) {
            return Err(RepositoryError::UnknownDisease(rule.disease_id));
        }
        let stored = RecommendationRule {
            id: RuleId(next_id(guard.rules.iter().map(|r| r.id.0))?),
            disease_id: rule.disease_id,
            min_age: rule.min_age,
            max_age: rule.max_age,
            duration_threshold: rule.duration_threshold,
            operator: rule.operator,
            recommendation: rule.recommendation,
        };
        guard.rules.push(stored.clone());
        Ok(stored)
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.lock()?.categories.clone())
    }

    fn symptoms(&self) -> Result<Vec<Symptom>, RepositoryError> {
        Ok(self.lock()?.symptoms.clone())
    }

    fn diseases(&self) -> Result<Vec<Disease>, RepositoryError> {
        Ok(self.lock()?.diseases.clone())
    }

    fn links(&self) -> Result<Vec<DiseaseSymptomLink>, RepositoryError> {
        Ok(self.lock()?.links.clone())
    }

    fn rules(&self) -> Result<Vec<RecommendationRule>, RepositoryError> {
        Ok(self.lock()?.rules.clone())
    }

    // Single lock: a snapshot never mixes two catalog versions.
    fn snapshot(&self) -> Result<CatalogSnapshot, RepositoryError> {
        Ok(self.lock()?.snapshot())
    }
}
