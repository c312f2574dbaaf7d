use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CategoryId, DiseaseId, NewRecommendationRule, NewSymptom, Rejection, Resolution,
    SelectionInput, SymptomId,
};
use super::repository::RecordStore;
use super::service::{TriageService, TriageServiceError};

/// Router builder exposing the resolution endpoint and catalog upkeep endpoints.
pub fn triage_router<S>(service: Arc<TriageService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/triage/recommendation",
            post(recommendation_handler::<S>),
        )
        .route(
            "/api/v1/triage/categories",
            get(list_categories_handler::<S>).post(create_category_handler::<S>),
        )
        .route(
            "/api/v1/triage/categories/:category_id/symptoms",
            get(category_symptoms_handler::<S>),
        )
        .route("/api/v1/triage/symptoms", post(create_symptom_handler::<S>))
        .route(
            "/api/v1/triage/symptoms/search",
            get(search_symptoms_handler::<S>),
        )
        .route("/api/v1/triage/diseases", post(create_disease_handler::<S>))
        .route(
            "/api/v1/triage/diseases/:disease_id/symptoms",
            post(link_symptoms_handler::<S>),
        )
        .route(
            "/api/v1/triage/recommendations",
            post(create_rule_handler::<S>),
        )
        .with_state(service)
}

/// Resolution request as submitted by clients; every field is optional so that missing
/// fields can be reported together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub selected_symptoms: Option<Vec<SymptomId>>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub days_since_onset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamePayload {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinkPayload {
    #[serde(default)]
    symptom_ids: Vec<SymptomId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    term: Option<String>,
}

pub(crate) async fn recommendation_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Response
where
    S: RecordStore + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_payload(rejection),
    };

    let input = match SelectionInput::from_request(
        request.selected_symptoms,
        request.age,
        request.days_since_onset,
    ) {
        Ok(input) => input,
        Err(error) => return error_response(error.into()),
    };

    match service.resolve(&input) {
        Ok(Resolution::Recommended(recommendation)) => {
            (StatusCode::OK, Json(recommendation)).into_response()
        }
        Ok(Resolution::Rejected(rejection)) => {
            let status = match rejection {
                Rejection::NoMatch => StatusCode::NOT_FOUND,
                Rejection::AgeOutOfRange { .. } => StatusCode::BAD_REQUEST,
            };
            message_response(status, rejection.message())
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_categories_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.category_tree() {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_category_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    payload: Result<Json<NamePayload>, JsonRejection>,
) -> Response
where
    S: RecordStore + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_payload(rejection),
    };

    match service.register_category(&payload.name) {
        Ok(category) => created("category saved", category.id.0),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn category_symptoms_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    Path(category_id): Path<u64>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.symptoms_in_category(CategoryId(category_id)) {
        Ok(symptoms) if symptoms.is_empty() => message_response(
            StatusCode::NOT_FOUND,
            format!("no symptoms found for category {category_id}"),
        ),
        Ok(symptoms) => (StatusCode::OK, Json(symptoms)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_symptom_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    payload: Result<Json<NewSymptom>, JsonRejection>,
) -> Response
where
    S: RecordStore + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_payload(rejection),
    };

    match service.register_symptom(payload) {
        Ok(symptom) => created("symptom saved", symptom.id.0),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn search_symptoms_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: RecordStore + 'static,
{
    let term = params.term.unwrap_or_default();
    match service.search_symptoms(&term) {
        Ok(symptoms) => (StatusCode::OK, Json(symptoms)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_disease_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    payload: Result<Json<NamePayload>, JsonRejection>,
) -> Response
where
    S: RecordStore + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_payload(rejection),
    };

    match service.register_disease(&payload.name) {
        Ok(disease) => created("disease saved", disease.id.0),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn link_symptoms_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    Path(disease_id): Path<u64>,
    payload: Result<Json<LinkPayload>, JsonRejection>,
) -> Response
where
    S: RecordStore + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_payload(rejection),
    };

    match service.link_symptoms(DiseaseId(disease_id), &payload.symptom_ids) {
        Ok(linked) => {
            let body = json!({
                "message": "symptoms linked to disease",
                "linked": linked,
            });
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_rule_handler<S>(
    State(service): State<Arc<TriageService<S>>>,
    payload: Result<Json<NewRecommendationRule>, JsonRejection>,
) -> Response
where
    S: RecordStore + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_payload(rejection),
    };

    match service.register_rule(payload) {
        Ok(rule) => created("recommendation saved", rule.id.0),
        Err(error) => error_response(error),
    }
}

fn created(message: &str, id: u64) -> Response {
    let body = json!({ "message": message, "id": id });
    (StatusCode::CREATED, Json(body)).into_response()
}

fn message_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn malformed_payload(rejection: JsonRejection) -> Response {
    message_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

fn error_response(error: TriageServiceError) -> Response {
    let status = match &error {
        TriageServiceError::Selection(_) | TriageServiceError::Catalog(_) => {
            StatusCode::BAD_REQUEST
        }
        TriageServiceError::Repository(err) if err.is_not_found() => StatusCode::NOT_FOUND,
        TriageServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    message_response(status, error.to_string())
}
