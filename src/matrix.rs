use std::collections::{HashMap, HashSet};

use anyhow::Result;
use itertools::Itertools;
use log::debug;

use crate::{
    abundance::{self, ABUNDANCE_COLUMN, STRATUM_COLUMN, Stratum, SurveyType, TAXON_COLUMN},
    pivot,
    table::{SURVEY_ID_COLUMN, Table},
};

/// One deduplicated taxon observation within a survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonObservation {
    pub survey: String,
    pub taxon: String,
    pub stratum: Stratum,
    pub abundance: Option<String>,
    pub survey_type: SurveyType,
}

/// Extracts deduplicated taxon observations from the raw table.
///
/// Rows without a taxon name are dropped; exact duplicates on
/// (survey, taxon, abundance, stratum, survey-type) collapse to one
/// observation. A missing stratum column or cell maps to the unstratified
/// category. Returns nothing when the taxon columns are absent altogether.
pub fn taxon_observations(table: &Table) -> Vec<TaxonObservation> {
    if !table.has_column(TAXON_COLUMN) || !table.has_column(ABUNDANCE_COLUMN) {
        debug!("Taxon columns absent from the source table; matrix will hold metadata only");
        return Vec::new();
    }
    let mut seen = HashSet::new();
    let mut observations = Vec::new();
    for row in 0..table.row_count() {
        let Some(survey) = table.value(row, SURVEY_ID_COLUMN) else {
            continue;
        };
        let Some(taxon) = table.value(row, TAXON_COLUMN) else {
            continue;
        };
        let stratum = Stratum::parse(table.value(row, STRATUM_COLUMN));
        let abundance = table.value(row, ABUNDANCE_COLUMN).map(str::to_string);
        let survey_type = SurveyType::parse(table.value(row, abundance::SURVEY_TYPE_COLUMN));
        let key = (
            survey.to_string(),
            taxon.to_string(),
            stratum.clone(),
            abundance.clone(),
            survey_type,
        );
        if seen.insert(key) {
            observations.push(TaxonObservation {
                survey: survey.to_string(),
                taxon: taxon.to_string(),
                stratum,
                abundance,
                survey_type,
            });
        }
    }
    observations
}

/// Pivots observations into one row per (stratum, taxon) pair, sorted by
/// stratum rank then taxon name, with one normalized abundance cell per
/// survey. Surveys without an observation of the pair get an empty cell.
pub fn taxon_rows(observations: &[TaxonObservation], surveys: &[String]) -> Vec<Vec<String>> {
    let mut cells: HashMap<(&Stratum, &str, &str), &TaxonObservation> = HashMap::new();
    for obs in observations {
        // First observation wins when duplicates differ only in abundance.
        cells
            .entry((&obs.stratum, obs.taxon.as_str(), obs.survey.as_str()))
            .or_insert(obs);
    }

    let pairs: Vec<(&Stratum, &str)> = observations
        .iter()
        .map(|obs| (&obs.stratum, obs.taxon.as_str()))
        .unique()
        .sorted_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)))
        .collect();

    pairs
        .into_iter()
        .map(|(stratum, taxon)| {
            let mut row = Vec::with_capacity(2 + surveys.len());
            row.push(stratum.label().to_string());
            row.push(taxon.to_string());
            for survey in surveys {
                let cell = cells
                    .get(&(stratum, taxon, survey.as_str()))
                    .map(|obs| abundance::normalize(obs.abundance.as_deref(), obs.survey_type))
                    .unwrap_or_default();
                row.push(cell);
            }
            row
        })
        .collect()
}

/// Concatenates metadata rows, the single-cell separator row, and taxon rows
/// into the final output grid.
pub fn assemble(metadata: Vec<Vec<String>>, taxa: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut matrix = metadata;
    matrix.push(vec![String::new()]);
    matrix.extend(taxa);
    matrix
}

/// Runs the full transform: raw table in, pivoted cell matrix out.
/// Fails before producing any rows when the identifier column is missing.
pub fn build_matrix(table: &Table) -> Result<Vec<Vec<String>>> {
    let surveys = table.survey_ids()?;
    debug!("Pivoting {} survey column(s)", surveys.len());
    let metadata = pivot::metadata_rows(table, &surveys);
    let observations = taxon_observations(table);
    let taxa = taxon_rows(&observations, &surveys);
    Ok(assemble(metadata, taxa))
}
