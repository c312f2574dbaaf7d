use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::triage::{
    Category, CategoryId, Disease, DiseaseId, DiseaseSymptomLink, DurationOperator,
    RecommendationRule, RuleId, Symptom, SymptomId,
};

pub(crate) fn read_rows<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<T>().collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryRow {
    id: u64,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId(row.id),
            name: row.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SymptomRow {
    id: u64,
    name: String,
    category_id: u64,
}

impl From<SymptomRow> for Symptom {
    fn from(row: SymptomRow) -> Self {
        Symptom {
            id: SymptomId(row.id),
            name: row.name,
            category_id: CategoryId(row.category_id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DiseaseRow {
    id: u64,
    name: String,
}

impl From<DiseaseRow> for Disease {
    fn from(row: DiseaseRow) -> Self {
        Disease {
            id: DiseaseId(row.id),
            name: row.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkRow {
    disease_id: u64,
    symptom_id: u64,
}

impl From<LinkRow> for DiseaseSymptomLink {
    fn from(row: LinkRow) -> Self {
        DiseaseSymptomLink {
            disease_id: DiseaseId(row.disease_id),
            symptom_id: SymptomId(row.symptom_id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuleRow {
    id: u64,
    disease_id: u64,
    min_age: u32,
    max_age: u32,
    duration_threshold: u32,
    #[serde(default, deserialize_with = "operator_or_default")]
    operator: DurationOperator,
    recommendation: String,
}

impl From<RuleRow> for RecommendationRule {
    fn from(row: RuleRow) -> Self {
        RecommendationRule {
            id: RuleId(row.id),
            disease_id: DiseaseId(row.disease_id),
            min_age: row.min_age,
            max_age: row.max_age,
            duration_threshold: row.duration_threshold,
            operator: row.operator,
            recommendation: row.recommendation,
        }
    }
}

fn operator_or_default<'de, D>(deserializer: D) -> Result<DurationOperator, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(serde::de::Error::custom)
}
