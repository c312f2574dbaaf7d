//! Symptom triage: record store contract, the recommendation resolution engine, and the
//! service/router pair that exposes it over HTTP.

pub mod domain;
pub mod repository;
pub(crate) mod resolution;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CatalogSnapshot, Category, CategoryId, Disease, DiseaseId, DiseaseSymptomLink,
    DurationOperator, NewRecommendationRule, NewSymptom, Recommendation, RecommendationRule,
    Rejection, Resolution, RuleId, SelectionError, SelectionInput, Symptom, SymptomId,
    UnknownOperator,
};
pub use repository::{RecordStore, RepositoryError};
pub use resolution::ResolutionEngine;
pub use router::{triage_router, RecommendationRequest};
pub use service::{CatalogViolation, CategoryView, SymptomView, TriageService, TriageServiceError};
