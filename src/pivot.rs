use itertools::Itertools;

use crate::table::{SURVEY_ID_COLUMN, Table};

/// Canonical metadata field order for the top block of the output matrix.
/// Fields absent from the source table are skipped, never emitted blank.
pub const METADATA_FIELDS: &[&str] = &[
    "numero_releve",
    "observateurs",
    "date_min",
    "date_max",
    "altitude_min",
    "altitude_max",
    "pente",
    "exposition",
    "roche_mere",
    "topographie",
    "type_humus",
    "surface",
    "recouvrement_litiere",
    "recouvrement_solnu",
    "strate_arboree_hauteur",
    "strate_arboree_recouvrement",
    "strate_arbustive_hauteur",
    "strate_arbustive_recouvrement",
    "strate_herbacee_hauteurmoyenne",
    "strate_herbacee_recouvrement",
    "strate_muscinale_recouvrementtotal",
    "strate_muscinale_recouvrementsphaigne",
    "type_releve",
];

/// Pivots long-format metadata into one row per field: `["", field, v1, v2, …]`
/// with one value column per survey. A survey's value is the `;`-joined set of
/// distinct non-null raw values in first-appearance order.
pub fn metadata_rows(table: &Table, surveys: &[String]) -> Vec<Vec<String>> {
    METADATA_FIELDS
        .iter()
        .filter(|field| table.has_column(field))
        .map(|field| {
            let mut row = Vec::with_capacity(2 + surveys.len());
            row.push(String::new());
            row.push((*field).to_string());
            for survey in surveys {
                row.push(field_value(table, survey, field));
            }
            row
        })
        .collect()
}

fn field_value(table: &Table, survey: &str, field: &str) -> String {
    table
        .column_values(SURVEY_ID_COLUMN)
        .zip(table.column_values(field))
        .filter(|(id, _)| *id == Some(survey))
        .filter_map(|(_, value)| value)
        .unique()
        .join(";")
}
