//! End-to-end scenarios driven through the public service facade and HTTP router, starting from an
//! empty catalog that is populated over the admin endpoints.

mod common {
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::response::Response;
    use serde_json::Value;

    use symptom_triage::catalog::CatalogSeed;
    use symptom_triage::triage::{
        Category, CategoryId, Disease, DiseaseId, DiseaseSymptomLink, NewRecommendationRule,
        NewSymptom, RecommendationRule, RecordStore, RepositoryError, RuleId, Symptom, SymptomId,
    };

    #[derive(Default, Clone)]
    pub(super) struct SeedStore {
        seed: Arc<Mutex<CatalogSeed>>,
    }

    impl RecordStore for SeedStore {
        fn insert_category(&self, name: String) -> Result<Category, RepositoryError> {
            let mut seed = self.seed.lock().expect("store mutex poisoned");
            let category = Category {
                id: CategoryId(seed.categories.len() as u64 + 1),
                name,
            };
            seed.categories.push(category.clone());
            Ok(category)
        }

        fn insert_symptom(&self, symptom: NewSymptom) -> Result<Symptom, RepositoryError> {
            let mut seed = self.seed.lock().expect("store mutex poisoned");
            if !seed.categories.iter().any(|c| c.id == symptom.category_id) {
                return Err(RepositoryError::UnknownCategory(symptom.category_id));
            }
            let stored = Symptom {
                id: SymptomId(seed.symptoms.len() as u64 + 1),
                name: symptom.name,
                category_id: symptom.category_id,
            };
            seed.symptoms.push(stored.clone());
            Ok(stored)
        }

        fn insert_disease(&self, name: String) -> Result<Disease, RepositoryError> {
            let mut seed = self.seed.lock().expect("store mutex poisoned");
            let disease = Disease {
                id: DiseaseId(seed.diseases.len() as u64 + 1),
                name,
            };
            seed.diseases.push(disease.clone());
            Ok(disease)
        }

        fn link_symptoms(
            &self,
            disease_id: DiseaseId,
            symptom_ids: &[SymptomId],
        ) -> Result<usize, RepositoryError> {
            let mut seed = self.seed.lock().expect("store mutex poisoned");
            if !seed.diseases.iter().any(|d| d.id == disease_id) {
                return Err(RepositoryError::UnknownDisease(disease_id));
            }
            let mut linked = 0;
            for symptom_id in symptom_ids {
                if !seed.symptoms.iter().any(|s| s.id == *symptom_id) {
                    return Err(RepositoryError::UnknownSymptom(*symptom_id));
                }
                let pair = DiseaseSymptomLink {
                    disease_id,
                    symptom_id: *symptom_id,
                };
                if !seed.links.contains(&pair) {
                    seed.links.push(pair);
                    linked += 1;
                }
            }
            Ok(linked)
        }

        fn insert_rule(
            &self,
            rule: NewRecommendationRule,
        ) -> Result<RecommendationRule, RepositoryError> {
            let mut seed = self.seed.lock().expect("store mutex poisoned");
            if !seed.diseases.iter().any(|d| d.id == rule.disease_id) {
                return Err(RepositoryError::UnknownDisease(rule.disease_id));
            }
            let stored = RecommendationRule {
                id: RuleId(seed.rules.len() as u64 + 1),
                disease_id: rule.disease_id,
                min_age: rule.min_age,
                max_age: rule.max_age,
                duration_threshold: rule.duration_threshold,
                operator: rule.operator,
                recommendation: rule.recommendation,
            };
            seed.rules.push(stored.clone());
            Ok(stored)
        }

        fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
            Ok(self.seed.lock().expect("store mutex poisoned").categories.clone())
        }

        fn symptoms(&self) -> Result<Vec<Symptom>, RepositoryError> {
            Ok(self.seed.lock().expect("store mutex poisoned").symptoms.clone())
        }

        fn diseases(&self) -> Result<Vec<Disease>, RepositoryError> {
            Ok(self.seed.lock().expect("store mutex poisoned").diseases.clone())
        }

        fn links(&self) -> Result<Vec<DiseaseSymptomLink>, RepositoryError> {
            Ok(self.seed.lock().expect("store mutex poisoned").links.clone())
        }

        fn rules(&self) -> Result<Vec<RecommendationRule>, RepositoryError> {
            Ok(self.seed.lock().expect("store mutex poisoned").rules.clone())
        }
    }

    pub(super) fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    pub(super) async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use common::{post_json, read_json_body, SeedStore};
use symptom_triage::triage::{triage_router, TriageService};

async fn send(router: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(post_json(uri, body))
        .await
        .expect("route executes");
    let status = response.status();
    (status, read_json_body(response).await)
}

#[tokio::test]
async fn catalog_built_over_http_drives_recommendations() {
    let router = triage_router(Arc::new(TriageService::new(Arc::new(SeedStore::default()))));

    let (status, body) = send(&router, "/api/v1/triage/categories", json!({ "name": "Digestive" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let category = body["id"].clone();

    for name in ["Nausea", "Diarrhea"] {
        let (status, _) = send(
            &router,
            "/api/v1/triage/symptoms",
            json!({ "name": name, "categoryId": category }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&router, "/api/v1/triage/diseases", json!({ "name": "Gastroenteritis" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], json!(1));

    let (status, body) = send(
        &router,
        "/api/v1/triage/diseases/1/symptoms",
        json!({ "symptomIds": [1, 2, 2] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["linked"], json!(2));

    let (status, _) = send(
        &router,
        "/api/v1/triage/recommendations",
        json!({
            "diseaseId": 1,
            "minAge": 5,
            "maxAge": 120,
            "durationThreshold": 2,
            "operator": "<=",
            "recommendation": "Oral rehydration and a bland diet"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        "/api/v1/triage/recommendation",
        json!({ "selectedSymptoms": [1, 2], "age": 40, "daysSinceOnset": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diseaseName"], json!("Gastroenteritis"));
    assert_eq!(body["coincidences"], json!(2));

    let (status, body) = send(
        &router,
        "/api/v1/triage/recommendation",
        json!({ "selectedSymptoms": [1], "age": 3, "daysSinceOnset": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("age must be between 5 and 120 for Gastroenteritis")
    );

    let (status, body) = send(
        &router,
        "/api/v1/triage/recommendation",
        json!({ "selectedSymptoms": [1, 2], "age": 40, "daysSinceOnset": 6 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("no recommendation found"));
}

#[tokio::test]
async fn symptoms_require_an_existing_category() {
    let router = triage_router(Arc::new(TriageService::new(Arc::new(SeedStore::default()))));

    let (status, body) = send(
        &router,
        "/api/v1/triage/symptoms",
        json!({ "name": "Fever", "categoryId": 7 }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("category 7 not found"));
}
