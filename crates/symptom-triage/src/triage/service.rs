use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    Category, CategoryId, Disease, DiseaseId, NewRecommendationRule, NewSymptom,
    RecommendationRule, Resolution, SelectionError, SelectionInput, Symptom, SymptomId,
};
use super::repository::{RecordStore, RepositoryError};
use super::resolution::ResolutionEngine;
use crate::grouping::group_flat_rows;

/// Service composing the record store with the resolution engine and catalog upkeep.
pub struct TriageService<S> {
    store: Arc<S>,
    engine: ResolutionEngine,
}

impl<S> TriageService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            engine: ResolutionEngine::new(),
        }
    }

    /// Resolve the best recommendation for a validated selection.
    ///
    /// Domain rejections come back inside `Ok`; only store failures are errors.
    pub fn resolve(&self, input: &SelectionInput) -> Result<Resolution, TriageServiceError> {
        let snapshot = self.store.snapshot().map_err(|err| {
            warn!(error = %err, "record store snapshot failed");
            err
        })?;

        let resolution = self.engine.resolve(input, &snapshot);
        debug!(
            outcome = resolution.label(),
            symptoms = input.selected_symptoms().len(),
            age = input.age(),
            days_since_onset = input.days_since_onset(),
            "resolved triage selection"
        );
        Ok(resolution)
    }

    pub fn register_category(&self, name: &str) -> Result<Category, TriageServiceError> {
        let name = required_name(name, "category")?;
        let category = self.store.insert_category(name)?;
        info!(id = %category.id, name = %category.name, "registered symptom category");
        Ok(category)
    }

    pub fn register_symptom(&self, symptom: NewSymptom) -> Result<Symptom, TriageServiceError> {
        let name = required_name(&symptom.name, "symptom")?;
        let symptom = self.store.insert_symptom(NewSymptom {
            name,
            category_id: symptom.category_id,
        })?;
        info!(id = %symptom.id, category = %symptom.category_id, "registered symptom");
        Ok(symptom)
    }

    pub fn register_disease(&self, name: &str) -> Result<Disease, TriageServiceError> {
        let name = required_name(name, "disease")?;
        let disease = self.store.insert_disease(name)?;
        info!(id = %disease.id, name = %disease.name, "registered disease");
        Ok(disease)
    }

    /// Mark symptoms as characteristic of a disease; existing pairs are left untouched.
    pub fn link_symptoms(
        &self,
        disease_id: DiseaseId,
        symptom_ids: &[SymptomId],
    ) -> Result<usize, TriageServiceError> {
        if symptom_ids.is_empty() {
            return Err(CatalogViolation::EmptySymptomList.into());
        }

        let linked = self.store.link_symptoms(disease_id, symptom_ids)?;
        info!(
            disease = %disease_id,
            requested = symptom_ids.len(),
            linked,
            "linked disease symptoms"
        );
        Ok(linked)
    }

    pub fn register_rule(
        &self,
        rule: NewRecommendationRule,
    ) -> Result<RecommendationRule, TriageServiceError> {
        if rule.min_age > rule.max_age {
            return Err(CatalogViolation::InvalidAgeBand {
                min_age: rule.min_age,
                max_age: rule.max_age,
            }
            .into());
        }
        if rule.recommendation.trim().is_empty() {
            return Err(CatalogViolation::BlankRecommendation.into());
        }

        let rule = self.store.insert_rule(rule)?;
        info!(
            id = %rule.id,
            disease = %rule.disease_id,
            operator = %rule.operator,
            threshold = rule.duration_threshold,
            "registered recommendation rule"
        );
        Ok(rule)
    }

    /// Categories in creation order, each with its symptoms; empty categories included.
    pub fn category_tree(&self) -> Result<Vec<CategoryView>, TriageServiceError> {
        let categories = self.store.categories()?;
        let symptoms = self.store.symptoms()?;

        let mut rows = Vec::new();
        for category in &categories {
            let mut matched = false;
            for symptom in symptoms.iter().filter(|s| s.category_id == category.id) {
                matched = true;
                rows.push((category, Some(symptom)));
            }
            if !matched {
                rows.push((category, None));
            }
        }

        let grouped = group_flat_rows(
            rows,
            |&(category, _)| (category.id, (category.id, category.name.clone())),
            |&(_, symptom)| symptom.map(SymptomView::from),
        );

        Ok(grouped
            .into_iter()
            .map(|((id, name), symptoms)| CategoryView { id, name, symptoms })
            .collect())
    }

    pub fn symptoms_in_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Symptom>, TriageServiceError> {
        Ok(self
            .store
            .symptoms()?
            .into_iter()
            .filter(|symptom| symptom.category_id == category_id)
            .collect())
    }

    /// Case-insensitive substring search over symptom names.
    pub fn search_symptoms(&self, term: &str) -> Result<Vec<Symptom>, TriageServiceError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Err(CatalogViolation::BlankSearchTerm.into());
        }

        Ok(self
            .store
            .symptoms()?
            .into_iter()
            .filter(|symptom| symptom.name.to_lowercase().contains(&needle))
            .collect())
    }
}

fn required_name(raw: &str, entity: &'static str) -> Result<String, CatalogViolation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(CatalogViolation::BlankName { entity })
    } else {
        Ok(trimmed.to_string())
    }
}

/// Category with its symptoms, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub symptoms: Vec<SymptomView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomView {
    pub id: SymptomId,
    pub name: String,
}

impl From<&Symptom> for SymptomView {
    fn from(symptom: &Symptom) -> Self {
        Self {
            id: symptom.id,
            name: symptom.name.clone(),
        }
    }
}

/// Validation errors raised by catalog upkeep operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogViolation {
    #[error("{entity} name is required")]
    BlankName { entity: &'static str },
    #[error("at least one symptom id is required")]
    EmptySymptomList,
    #[error("minAge ({min_age}) must not exceed maxAge ({max_age})")]
    InvalidAgeBand { min_age: u32, max_age: u32 },
    #[error("recommendation text is required")]
    BlankRecommendation,
    #[error("search term is required")]
    BlankSearchTerm,
}

/// Error raised by the triage service.
#[derive(Debug, thiserror::Error)]
pub enum TriageServiceError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Catalog(#[from] CatalogViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
