use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for symptom categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Identifier wrapper for symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomId(pub u64);

/// Identifier wrapper for diseases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseId(pub u64);

/// Identifier wrapper for recommendation rules. Assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

macro_rules! display_id {
    ($($id:ty),* $(,)?) => {
        $(
            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

display_id!(CategoryId, SymptomId, DiseaseId, RuleId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    pub id: SymptomId,
    pub name: String,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub id: DiseaseId,
    pub name: String,
}

/// Marks a symptom as characteristic of a disease. Unique per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseSymptomLink {
    pub disease_id: DiseaseId,
    pub symptom_id: SymptomId,
}

/// Relational operator comparing the reported days since onset against a rule threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationOperator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    AtMost,
    #[default]
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    AtLeast,
}

impl DurationOperator {
    /// Whether `days_since_onset` satisfies this operator against `threshold`.
    ///
    /// `<=` never admits a zero threshold, so a `<= 0` rule cannot match any report.
    pub fn admits(self, days_since_onset: u32, threshold: u32) -> bool {
        match self {
            DurationOperator::LessThan => days_since_onset < threshold,
            DurationOperator::AtMost => days_since_onset <= threshold && threshold > 0,
            DurationOperator::Equal => days_since_onset == threshold,
            DurationOperator::GreaterThan => days_since_onset > threshold,
            DurationOperator::AtLeast => days_since_onset >= threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DurationOperator::LessThan => "<",
            DurationOperator::AtMost => "<=",
            DurationOperator::Equal => "=",
            DurationOperator::GreaterThan => ">",
            DurationOperator::AtLeast => ">=",
        }
    }
}

impl fmt::Display for DurationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown duration operator '{0}' (expected one of <, <=, =, >, >=)")]
pub struct UnknownOperator(pub String);

impl FromStr for DurationOperator {
    type Err = UnknownOperator;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "=" => Ok(DurationOperator::Equal),
            "<" => Ok(DurationOperator::LessThan),
            "<=" => Ok(DurationOperator::AtMost),
            ">" => Ok(DurationOperator::GreaterThan),
            ">=" => Ok(DurationOperator::AtLeast),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Recommendation attached to a disease for one age band and duration condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRule {
    pub id: RuleId,
    pub disease_id: DiseaseId,
    pub min_age: u32,
    pub max_age: u32,
    pub duration_threshold: u32,
    pub operator: DurationOperator,
    pub recommendation: String,
}

impl RecommendationRule {
    pub fn covers_age(&self, age: u32) -> bool {
        self.min_age <= age && age <= self.max_age
    }

    pub fn duration_distance(&self, days_since_onset: u32) -> u32 {
        days_since_onset.abs_diff(self.duration_threshold)
    }
}

/// Validated resolver input: a non-empty symptom set plus age and duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionInput {
    selected_symptoms: BTreeSet<SymptomId>,
    age: u32,
    days_since_onset: u32,
}

impl SelectionInput {
    pub fn new(
        selected_symptoms: impl IntoIterator<Item = SymptomId>,
        age: u32,
        days_since_onset: u32,
    ) -> Result<Self, SelectionError> {
        let selected_symptoms: BTreeSet<SymptomId> = selected_symptoms.into_iter().collect();
        if selected_symptoms.is_empty() {
            return Err(SelectionError::MissingFields(vec!["selectedSymptoms"]));
        }

        Ok(Self {
            selected_symptoms,
            age,
            days_since_onset,
        })
    }

    /// Validates loosely typed request fields, reporting every missing field at once.
    pub fn from_request(
        selected_symptoms: Option<Vec<SymptomId>>,
        age: Option<i64>,
        days_since_onset: Option<i64>,
    ) -> Result<Self, SelectionError> {
        let mut missing = Vec::new();
        let symptoms = selected_symptoms.filter(|ids| !ids.is_empty());
        if symptoms.is_none() {
            missing.push("selectedSymptoms");
        }
        if age.is_none() {
            missing.push("age");
        }
        if days_since_onset.is_none() {
            missing.push("daysSinceOnset");
        }

        match (symptoms, age, days_since_onset) {
            (Some(symptoms), Some(age), Some(days)) => {
                let age = non_negative("age", age)?;
                let days = non_negative("daysSinceOnset", days)?;
                Self::new(symptoms, age, days)
            }
            _ => Err(SelectionError::MissingFields(missing)),
        }
    }

    pub fn selected_symptoms(&self) -> &BTreeSet<SymptomId> {
        &self.selected_symptoms
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn days_since_onset(&self) -> u32 {
        self.days_since_onset
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, SelectionError> {
    u32::try_from(value).map_err(|_| SelectionError::InvalidValue { field, value })
}

/// Input validation failures raised before any resolution logic runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{field} must be a non-negative integer within range (found {value})")]
    InvalidValue { field: &'static str, value: i64 },
}

/// Successful resolution returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub disease_id: DiseaseId,
    pub disease_name: String,
    pub recommendation_text: String,
    pub duration_threshold: u32,
    pub age_min: u32,
    pub age_max: u32,
    pub coincidences: u32,
}

/// Expected, non-exceptional outcomes where no recommendation applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    AgeOutOfRange {
        min_age: u32,
        max_age: u32,
        disease_name: String,
    },
    NoMatch,
}

impl Rejection {
    pub fn message(&self) -> String {
        match self {
            Rejection::AgeOutOfRange {
                min_age,
                max_age,
                disease_name,
            } => format!("age must be between {min_age} and {max_age} for {disease_name}"),
            Rejection::NoMatch => "no recommendation found".to_string(),
        }
    }
}

/// Outcome of one resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Recommended(Recommendation),
    Rejected(Rejection),
}

impl Resolution {
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Recommended(_) => "recommended",
            Resolution::Rejected(Rejection::AgeOutOfRange { .. }) => "age_out_of_range",
            Resolution::Rejected(Rejection::NoMatch) => "no_match",
        }
    }
}

/// Read-only view of the records one resolution needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub diseases: Vec<Disease>,
    pub links: Vec<DiseaseSymptomLink>,
    pub rules: Vec<RecommendationRule>,
}

impl CatalogSnapshot {
    pub fn disease(&self, id: DiseaseId) -> Option<&Disease> {
        self.diseases.iter().find(|disease| disease.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSymptom {
    pub name: String,
    pub category_id: CategoryId,
}

/// Administrative payload for a new recommendation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecommendationRule {
    pub disease_id: DiseaseId,
    pub min_age: u32,
    pub max_age: u32,
    pub duration_threshold: u32,
    #[serde(default)]
    pub operator: DurationOperator,
    pub recommendation: String,
}
