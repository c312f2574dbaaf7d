use clap::Args;
use std::path::PathBuf;
use symptom_triage::catalog::CatalogImporter;
use symptom_triage::error::AppError;
use symptom_triage::triage::{
    Rejection, Resolution, ResolutionEngine, SelectionInput, SymptomId, TriageServiceError,
};

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    /// Directory holding the CSV seed catalog
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Selected symptom id (repeat for several symptoms)
    #[arg(long, required = true)]
    pub(crate) symptom: Vec<u64>,
    /// Patient age in years
    #[arg(long)]
    pub(crate) age: u32,
    /// Days since the symptoms started
    #[arg(long)]
    pub(crate) days: u32,
}

pub(crate) fn run_resolve(args: ResolveArgs) -> Result<(), AppError> {
    let seed = CatalogImporter::from_dir(&args.catalog)?;
    let input = SelectionInput::new(args.symptom.into_iter().map(SymptomId), args.age, args.days)
        .map_err(TriageServiceError::from)?;

    let resolution = ResolutionEngine::new().resolve(&input, &seed.snapshot());
    println!("{}", render_resolution(&resolution));
    Ok(())
}

fn render_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Recommended(recommendation) => format!(
            "{} ({} matching symptom(s), ages {}-{}, threshold {} day(s))\n  {}",
            recommendation.disease_name,
            recommendation.coincidences,
            recommendation.age_min,
            recommendation.age_max,
            recommendation.duration_threshold,
            recommendation.recommendation_text,
        ),
        Resolution::Rejected(rejection @ Rejection::AgeOutOfRange { .. }) => {
            format!("Rejected: {}", rejection.message())
        }
        Resolution::Rejected(Rejection::NoMatch) => Rejection::NoMatch.message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symptom_triage::triage::{DiseaseId, Recommendation};

    #[test]
    fn recommendation_rendering_includes_text_and_band() {
        let rendered = render_resolution(&Resolution::Recommended(Recommendation {
            disease_id: DiseaseId(1),
            disease_name: "Flu".to_string(),
            recommendation_text: "Rest and fluids".to_string(),
            duration_threshold: 3,
            age_min: 0,
            age_max: 120,
            coincidences: 2,
        }));

        assert!(rendered.starts_with("Flu (2 matching symptom(s), ages 0-120"));
        assert!(rendered.ends_with("Rest and fluids"));
    }

    #[test]
    fn rejections_render_their_message() {
        let rendered = render_resolution(&Resolution::Rejected(Rejection::AgeOutOfRange {
            min_age: 5,
            max_age: 120,
            disease_name: "Gastroenteritis".to_string(),
        }));
        assert_eq!(
            rendered,
            "Rejected: age must be between 5 and 120 for Gastroenteritis"
        );

        assert_eq!(
            render_resolution(&Resolution::Rejected(Rejection::NoMatch)),
            "no recommendation found"
        );
    }

    #[test]
    fn resolve_command_reports_missing_catalog() {
        let args = ResolveArgs {
            catalog: PathBuf::from("/nonexistent/triage/catalog"),
            symptom: vec![1],
            age: 30,
            days: 2,
        };

        assert!(matches!(run_resolve(args), Err(AppError::Catalog(_))));
    }
}
