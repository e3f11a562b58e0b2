//! Abundance-dominance normalization and the stratum/survey-type vocabulary.
//!
//! Abundance codes are stored as `"<symbol> : <French label>"` (for example
//! `"+ : Individus peu abondants, recouvrement inférieur à 5%"`). Only the
//! symbol before the separator drives normalization, so the policy survives
//! label rewording.

/// Column names carrying the taxon observation fields.
pub const TAXON_COLUMN: &str = "lb_nom";
pub const STRATUM_COLUMN: &str = "strate_vegetation";
pub const ABUNDANCE_COLUMN: &str = "indice_abondance_dominance";
pub const SURVEY_TYPE_COLUMN: &str = "type_releve";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyType {
    Phytosociological,
    Phytocenotic,
    Other,
}

impl SurveyType {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("Relevé phytosociologique") => SurveyType::Phytosociological,
            Some("Relevé phytocénotique") => SurveyType::Phytocenotic,
            _ => SurveyType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stratum {
    Tree,
    Shrub,
    Herb,
    Unstratified,
    Other(String),
}

impl Stratum {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Stratum::Unstratified,
            Some("Strate arborée") => Stratum::Tree,
            Some("Strate arbustive") => Stratum::Shrub,
            Some("Strate herbacée") => Stratum::Herb,
            Some(other) => Stratum::Other(other.to_string()),
        }
    }

    /// Fixed ordering of vegetation layers in the output matrix.
    pub fn rank(&self) -> u8 {
        match self {
            Stratum::Tree => 1,
            Stratum::Shrub => 2,
            Stratum::Herb => 3,
            Stratum::Unstratified => 4,
            Stratum::Other(_) => 5,
        }
    }

    /// Label written into the first matrix column; empty when unstratified.
    pub fn label(&self) -> &str {
        match self {
            Stratum::Tree => "Strate arborée",
            Stratum::Shrub => "Strate arbustive",
            Stratum::Herb => "Strate herbacée",
            Stratum::Unstratified => "",
            Stratum::Other(label) => label,
        }
    }
}

impl Ord for Stratum {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.label().cmp(other.label()))
    }
}

impl PartialOrd for Stratum {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Symbol-to-scale lookup for phytosociological codes. The remaining codes of
/// the Braun-Blanquet scale ("1".."5", "2a", ...) already start with their
/// numeric value and fall through to the leading-character rule.
const PHYTOSOCIOLOGICAL_SCALE: &[(&str, &str)] = &[("+", "0.5"), ("i", "0.1"), ("r", "0.2")];

/// Maps a stored abundance code to the canonical numeric string for one
/// observation. Callers emit an empty cell (not "0") when no observation
/// exists at all for a (survey, taxon, stratum) triple.
pub fn normalize(code: Option<&str>, survey_type: SurveyType) -> String {
    match survey_type {
        // Phytocenotic surveys record presence only.
        SurveyType::Phytocenotic => "1".to_string(),
        SurveyType::Phytosociological => {
            let Some(code) = non_empty(code) else {
                return "0".to_string();
            };
            let symbol = code.split(" :").next().unwrap_or(code).trim();
            for (known, scale) in PHYTOSOCIOLOGICAL_SCALE {
                if symbol == *known {
                    return (*scale).to_string();
                }
            }
            // Leading-character heuristic: "2a" collapses to "2". Extend the
            // lookup table instead once the full coded scale is confirmed.
            code.chars().next().map(String::from).unwrap_or_default()
        }
        SurveyType::Other => non_empty(code)
            .map(str::to_string)
            .unwrap_or_else(|| "1".to_string()),
    }
}

fn non_empty(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}
