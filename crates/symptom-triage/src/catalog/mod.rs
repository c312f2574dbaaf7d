//! Seed catalog import from a directory of CSV exports.

mod parser;

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::triage::{
    CatalogSnapshot, Category, Disease, DiseaseSymptomLink, RecommendationRule, Symptom,
};
use parser::{read_rows, CategoryRow, DiseaseRow, LinkRow, RuleRow, SymptomRow};

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const SYMPTOMS_FILE: &str = "symptoms.csv";
pub const DISEASES_FILE: &str = "diseases.csv";
pub const LINKS_FILE: &str = "disease_symptoms.csv";
pub const RULES_FILE: &str = "recommendations.csv";

#[derive(Debug)]
pub enum CatalogImportError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { path: PathBuf, source: csv::Error },
    Invalid { file: &'static str, detail: String },
}

impl fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogImportError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            CatalogImportError::Csv { path, source } => {
                write!(f, "invalid CSV data in {}: {}", path.display(), source)
            }
            CatalogImportError::Invalid { file, detail } => {
                write!(f, "inconsistent catalog data in {file}: {detail}")
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io { source, .. } => Some(source),
            CatalogImportError::Csv { source, .. } => Some(source),
            CatalogImportError::Invalid { .. } => None,
        }
    }
}

/// Complete catalog as loaded from seed files, every list in creation (id) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSeed {
    pub categories: Vec<Category>,
    pub symptoms: Vec<Symptom>,
    pub diseases: Vec<Disease>,
    pub links: Vec<DiseaseSymptomLink>,
    pub rules: Vec<RecommendationRule>,
}

impl CatalogSeed {
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            diseases: self.diseases.clone(),
            links: self.links.clone(),
            rules: self.rules.clone(),
        }
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<CatalogSeed, CatalogImportError> {
        let dir = dir.as_ref();

        let mut categories: Vec<Category> = load::<CategoryRow, _>(dir, CATEGORIES_FILE)?;
        let mut symptoms: Vec<Symptom> = load::<SymptomRow, _>(dir, SYMPTOMS_FILE)?;
        let mut diseases: Vec<Disease> = load::<DiseaseRow, _>(dir, DISEASES_FILE)?;
        let links: Vec<DiseaseSymptomLink> = load::<LinkRow, _>(dir, LINKS_FILE)?;
        let mut rules: Vec<RecommendationRule> = load::<RuleRow, _>(dir, RULES_FILE)?;

        categories.sort_by_key(|category| category.id);
        symptoms.sort_by_key(|symptom| symptom.id);
        diseases.sort_by_key(|disease| disease.id);
        rules.sort_by_key(|rule| rule.id);

        let seed = CatalogSeed {
            categories,
            symptoms,
            diseases,
            links: dedupe_links(links),
            rules,
        };
        validate(&seed)?;
        Ok(seed)
    }
}

fn load<Row, T>(dir: &Path, file: &'static str) -> Result<Vec<T>, CatalogImportError>
where
    Row: serde::de::DeserializeOwned + Into<T>,
{
    let path = dir.join(file);
    let handle = File::open(&path).map_err(|source| CatalogImportError::Io {
        path: path.clone(),
        source,
    })?;
    let rows: Vec<Row> =
        read_rows(handle).map_err(|source| CatalogImportError::Csv { path, source })?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Keeps the first occurrence of each (disease, symptom) pair.
fn dedupe_links(links: Vec<DiseaseSymptomLink>) -> Vec<DiseaseSymptomLink> {
    let mut seen = BTreeSet::new();
    links.into_iter().filter(|link| seen.insert(*link)).collect()
}

/// Rejects the first id that appears more than once in `ids`.
fn unique_ids<T: Ord + Copy + fmt::Display>(
    file: &'static str,
    ids: impl IntoIterator<Item = T>,
) -> Result<(), CatalogImportError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogImportError::Invalid {
                file,
                detail: format!("duplicate id {id}"),
            });
        }
    }
    Ok(())
}

fn validate(seed: &CatalogSeed) -> Result<(), CatalogImportError> {
    unique_ids(CATEGORIES_FILE, seed.categories.iter().map(|c| c.id))?;
    unique_ids(SYMPTOMS_FILE, seed.symptoms.iter().map(|s| s.id))?;
    unique_ids(DISEASES_FILE, seed.diseases.iter().map(|d| d.id))?;
    unique_ids(RULES_FILE, seed.rules.iter().map(|r| r.id))?;

    let categories: BTreeSet<_> = seed.categories.iter().map(|c| c.id).collect();
    let symptoms: BTreeSet<_> = seed.symptoms.iter().map(|s| s.id).collect();
    let diseases: BTreeSet<_> = seed.diseases.iter().map(|d| d.id).collect();

    if let Some(symptom) = seed
        .symptoms
        .iter()
        .find(|symptom| !categories.contains(&symptom.category_id))
    {
        return Err(CatalogImportError::Invalid {
            file: SYMPTOMS_FILE,
            detail: format!(
                "symptom {} references unknown category {}",
                symptom.id, symptom.category_id
            ),
        });
    }

    for link in &seed.links {
        if !diseases.contains(&link.disease_id) || !symptoms.contains(&link.symptom_id) {
            return Err(CatalogImportError::Invalid {
                file: LINKS_FILE,
                detail: format!(
                    "link ({}, {}) references an unknown disease or symptom",
                    link.disease_id, link.symptom_id
                ),
            });
        }
    }

    for rule in &seed.rules {
        if !diseases.contains(&rule.disease_id) {
            return Err(CatalogImportError::Invalid {
                file: RULES_FILE,
                detail: format!(
                    "rule {} references unknown disease {}",
                    rule.id, rule.disease_id
                ),
            });
        }
        if rule.min_age > rule.max_age {
            return Err(CatalogImportError::Invalid {
                file: RULES_FILE,
                detail: format!(
                    "rule {} has min_age {} above max_age {}",
                    rule.id, rule.min_age, rule.max_age
                ),
            });
        }
    }

    Ok(())
}
