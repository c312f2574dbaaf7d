use super::domain::{
    CatalogSnapshot, Category, CategoryId, Disease, DiseaseId, DiseaseSymptomLink,
    NewRecommendationRule, NewSymptom, RecommendationRule, Symptom, SymptomId,
};

/// Storage abstraction for triage records so the service can be exercised in isolation.
///
/// Listing methods return records in creation order.
pub trait RecordStore: Send + Sync {
    fn insert_category(&self, name: String) -> Result<Category, RepositoryError>;
    fn insert_symptom(&self, symptom: NewSymptom) -> Result<Symptom, RepositoryError>;
    fn insert_disease(&self, name: String) -> Result<Disease, RepositoryError>;
    /// Links symptoms to a disease, returning how many pairs were newly created.
    fn link_symptoms(
        &self,
        disease_id: DiseaseId,
        symptom_ids: &[SymptomId],
    ) -> Result<usize, RepositoryError>;
    fn insert_rule(&self, rule: NewRecommendationRule)
        -> Result<RecommendationRule, RepositoryError>;

    fn categories(&self) -> Result<Vec<Category>, RepositoryError>;
    fn symptoms(&self) -> Result<Vec<Symptom>, RepositoryError>;
    fn diseases(&self) -> Result<Vec<Disease>, RepositoryError>;
    fn links(&self) -> Result<Vec<DiseaseSymptomLink>, RepositoryError>;
    fn rules(&self) -> Result<Vec<RecommendationRule>, RepositoryError>;

    /// Consistent read of everything a resolution needs. Stores that can read atomically
    /// should override this.
    fn snapshot(&self) -> Result<CatalogSnapshot, RepositoryError> {
        Ok(CatalogSnapshot {
            diseases: self.diseases()?,
            links: self.links()?,
            rules: self.rules()?,
        })
    }
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("category {0} not found")]
    UnknownCategory(CategoryId),
    #[error("disease {0} not found")]
    UnknownDisease(DiseaseId),
    #[error("symptom {0} not found")]
    UnknownSymptom(SymptomId),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        !matches!(self, RepositoryError::Unavailable(_))
    }
}
