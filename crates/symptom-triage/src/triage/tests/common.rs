use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::triage::domain::{
    CatalogSnapshot, Category, CategoryId, Disease, DiseaseId, DiseaseSymptomLink,
    DurationOperator, NewRecommendationRule, NewSymptom, RecommendationRule, RuleId,
    SelectionInput, Symptom, SymptomId,
};
use crate::triage::repository::{RecordStore, RepositoryError};
use crate::triage::{triage_router, TriageService};

pub(super) const FEVER: SymptomId = SymptomId(1);
pub(super) const COUGH: SymptomId = SymptomId(2);
pub(super) const RASH: SymptomId = SymptomId(3);
pub(super) const FLU: DiseaseId = DiseaseId(1);

pub(super) fn disease(id: u64, name: &str) -> Disease {
    Disease {
        id: DiseaseId(id),
        name: name.to_string(),
    }
}

pub(super) fn link(disease_id: DiseaseId, symptom_id: SymptomId) -> DiseaseSymptomLink {
    DiseaseSymptomLink {
        disease_id,
        symptom_id,
    }
}

pub(super) fn rule(
    id: u64,
    disease_id: DiseaseId,
    ages: (u32, u32),
    threshold: u32,
    operator: DurationOperator,
    text: &str,
) -> RecommendationRule {
    RecommendationRule {
        id: RuleId(id),
        disease_id,
        min_age: ages.0,
        max_age: ages.1,
        duration_threshold: threshold,
        operator,
        recommendation: text.to_string(),
    }
}

/// "Flu" linked to fever and cough with a single `<= 3` rule for ages 0-120.
pub(super) fn flu_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        diseases: vec![disease(1, "Flu")],
        links: vec![link(FLU, FEVER), link(FLU, COUGH)],
        rules: vec![rule(
            1,
            FLU,
            (0, 120),
            3,
            DurationOperator::AtMost,
            "Rest and fluids",
        )],
    }
}

pub(super) fn selection(symptoms: &[SymptomId], age: u32, days: u32) -> SelectionInput {
    SelectionInput::new(symptoms.iter().copied(), age, days).expect("valid selection")
}

#[derive(Default)]
struct MemoryState {
    categories: Vec<Category>,
    symptoms: Vec<Symptom>,
    diseases: Vec<Disease>,
    links: Vec<DiseaseSymptomLink>,
    rules: Vec<RecommendationRule>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Store holding the flu catalog plus a "Respiratory" category for fever and cough and an
    /// empty "Skin" category.
    pub(super) fn with_flu() -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().expect("store mutex poisoned");
            let snapshot = flu_snapshot();
            state.categories = vec![
                Category {
                    id: CategoryId(1),
                    name: "Respiratory".to_string(),
                },
                Category {
                    id: CategoryId(2),
                    name: "Skin".to_string(),
                },
            ];
            state.symptoms = vec![
                Symptom {
                    id: FEVER,
                    name: "Fever".to_string(),
                    category_id: CategoryId(1),
                },
                Symptom {
                    id: COUGH,
                    name: "Dry cough".to_string(),
                    category_id: CategoryId(1),
                },
            ];
            state.diseases = snapshot.diseases;
            state.links = snapshot.links;
            state.rules = snapshot.rules;
        }
        store
    }
}

impl RecordStore for MemoryStore {
    fn insert_category(&self, name: String) -> Result<Category, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let category = Category {
            id: CategoryId(state.categories.len() as u64 + 1),
            name,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    fn insert_symptom(&self, symptom: NewSymptom) -> Result<Symptom, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.categories.iter().any(|c| c.id == symptom.category_id) {
            return Err(RepositoryError::UnknownCategory(symptom.category_id));
        }
        let symptom = Symptom {
            id: SymptomId(state.symptoms.len() as u64 + 1),
            name: symptom.name,
            category_id: symptom.category_id,
        };
        state.symptoms.push(symptom.clone());
        Ok(symptom)
    }

    fn insert_disease(&self, name: String) -> Result<Disease, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let disease = Disease {
            id: DiseaseId(state.diseases.len() as u64 + 1),
            name,
        };
        state.diseases.push(disease.clone());
        Ok(disease)
    }

    fn link_symptoms(
        &self,
        disease_id: DiseaseId,
        symptom_ids: &[SymptomId],
    ) -> Result<usize, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.diseases.iter().any(|d| d.id == disease_id) {
            return Err(RepositoryError::UnknownDisease(disease_id));
        }
        if let Some(missing) = symptom_ids
            .iter()
            .find(|id| !state.symptoms.iter().any(|s| s.id == **id))
        {
            return Err(RepositoryError::UnknownSymptom(*missing));
        }

        let mut linked = 0;
        for symptom_id in symptom_ids {
            let pair = link(disease_id, *symptom_id);
            if !state.links.contains(&pair) {
                state.links.push(pair);
                linked += 1;
            }
        }
        Ok(linked)
    }

    fn insert_rule(
        &self,
        rule: NewRecommendationRule,
    ) -> Result<RecommendationRule, RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        if !state.diseases.iter().any(|d| d.id == rule.disease_id) {
            return Err(RepositoryError::UnknownDisease(rule.disease_id));
        }
        let stored = RecommendationRule {
            id: RuleId(state.rules.len() as u64 + 1),
            disease_id: rule.disease_id,
            min_age: rule.min_age,
            max_age: rule.max_age,
            duration_threshold: rule.duration_threshold,
            operator: rule.operator,
            recommendation: rule.recommendation,
        };
        state.rules.push(stored.clone());
        Ok(stored)
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.state.lock().expect("store mutex poisoned").categories.clone())
    }

    fn symptoms(&self) -> Result<Vec<Symptom>, RepositoryError> {
        Ok(self.state.lock().expect("store mutex poisoned").symptoms.clone())
    }

    fn diseases(&self) -> Result<Vec<Disease>, RepositoryError> {
        Ok(self.state.lock().expect("store mutex poisoned").diseases.clone())
    }

    fn links(&self) -> Result<Vec<DiseaseSymptomLink>, RepositoryError> {
        Ok(self.state.lock().expect("store mutex poisoned").links.clone())
    }

    fn rules(&self) -> Result<Vec<RecommendationRule>, RepositoryError> {
        Ok(self.state.lock().expect("store mutex poisoned").rules.clone())
    }
}

pub(super) struct UnavailableStore;

impl UnavailableStore {
    fn offline<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl RecordStore for UnavailableStore {
    fn insert_category(&self, _name: String) -> Result<Category, RepositoryError> {
        Self::offline()
    }

    fn insert_symptom(&self, _symptom: NewSymptom) -> Result<Symptom, RepositoryError> {
        Self::offline()
    }

    fn insert_disease(&self, _name: String) -> Result<Disease, RepositoryError> {
        Self::offline()
    }

    fn link_symptoms(
        &self,
        _disease_id: DiseaseId,
        _symptom_ids: &[SymptomId],
    ) -> Result<usize, RepositoryError> {
        Self::offline()
    }

    fn insert_rule(
        &self,
        _rule: NewRecommendationRule,
    ) -> Result<RecommendationRule, RepositoryError> {
        Self::offline()
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Self::offline()
    }

    fn symptoms(&self) -> Result<Vec<Symptom>, RepositoryError> {
        Self::offline()
    }

    fn diseases(&self) -> Result<Vec<Disease>, RepositoryError> {
        Self::offline()
    }

    fn links(&self) -> Result<Vec<DiseaseSymptomLink>, RepositoryError> {
        Self::offline()
    }

    fn rules(&self) -> Result<Vec<RecommendationRule>, RepositoryError> {
        Self::offline()
    }
}

pub(super) fn build_service() -> (TriageService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_flu());
    let service = TriageService::new(store.clone());
    (service, store)
}

pub(super) fn router_with_flu() -> axum::Router {
    let (service, _) = build_service();
    triage_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
