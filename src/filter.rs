//! Filter-condition construction for the relevé query.
//!
//! User-supplied filter values never appear in the predicate text: the
//! predicate only references `$n` placeholders and the values travel as
//! ordered bound parameters. The same [`FilterSpec`] drives in-memory
//! matching when reading an offline CSV dump.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;

pub const OBSERVERS_COLUMN: &str = "observateurs";
pub const DATE_MIN_COLUMN: &str = "date_min";

pub fn parse_survey_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow!("Failed to parse '{value}' as date"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub releves: Vec<String>,
    pub observers: Vec<String>,
    pub dates: Vec<String>,
}

impl FilterSpec {
    /// Parses the three optional comma-separated filter strings. Entries are
    /// trimmed and empties dropped; dates must be four-digit-year ISO dates.
    pub fn parse(
        releves: Option<&str>,
        observers: Option<&str>,
        dates: Option<&str>,
    ) -> Result<Self> {
        let dates = split_values(dates);
        for date in &dates {
            parse_survey_date(date)
                .map_err(|_| anyhow!("Invalid date filter '{date}': expected YYYY-MM-DD"))?;
        }
        Ok(FilterSpec {
            releves: split_values(releves),
            observers: split_values(observers),
            dates,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.releves.is_empty() && self.observers.is_empty() && self.dates.is_empty()
    }

    /// Builds the SQL predicate and its ordered bound parameters.
    ///
    /// Each non-empty group becomes an OR of per-value conditions; groups are
    /// joined with AND. With no values at all the predicate is `TRUE` so that
    /// every record matches.
    pub fn predicate(&self) -> (String, Vec<String>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        push_group(
            &mut clauses,
            &mut params,
            &self.releves,
            crate::table::SURVEY_ID_COLUMN,
            Match::Substring,
        );
        push_group(
            &mut clauses,
            &mut params,
            &self.observers,
            OBSERVERS_COLUMN,
            Match::Substring,
        );
        push_group(
            &mut clauses,
            &mut params,
            &self.dates,
            DATE_MIN_COLUMN,
            Match::Exact,
        );

        if clauses.is_empty() {
            return ("TRUE".to_string(), Vec::new());
        }
        (clauses.join(" AND "), params)
    }

    /// In-memory equivalent of [`FilterSpec::predicate`], used by the CSV
    /// source. NULL never matches a non-empty group, mirroring SQL semantics.
    pub fn matches(
        &self,
        releve: Option<&str>,
        observers: Option<&str>,
        date_min: Option<&str>,
    ) -> bool {
        group_matches(&self.releves, releve, Match::Substring)
            && group_matches(&self.observers, observers, Match::Substring)
            && group_matches(&self.dates, date_min, Match::Exact)
    }
}

#[derive(Debug, Clone, Copy)]
enum Match {
    /// Case-insensitive substring, the SQL side uses ILIKE '%value%'.
    Substring,
    Exact,
}

fn split_values(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn push_group(
    clauses: &mut Vec<String>,
    params: &mut Vec<String>,
    values: &[String],
    column: &str,
    mode: Match,
) {
    if values.is_empty() {
        return;
    }
    let mut conditions = Vec::with_capacity(values.len());
    for value in values {
        let placeholder = params.len() + 1;
        match mode {
            Match::Substring => {
                conditions.push(format!("{column}::text ILIKE ${placeholder}"));
                params.push(format!("%{value}%"));
            }
            Match::Exact => {
                conditions.push(format!("{column}::text = ${placeholder}"));
                params.push(value.clone());
            }
        }
    }
    clauses.push(format!("({})", conditions.join(" OR ")));
}

fn group_matches(values: &[String], cell: Option<&str>, mode: Match) -> bool {
    if values.is_empty() {
        return true;
    }
    let Some(cell) = cell else {
        return false;
    };
    match mode {
        Match::Substring => {
            let lowered = cell.to_lowercase();
            values.iter().any(|v| lowered.contains(&v.to_lowercase()))
        }
        Match::Exact => values.iter().any(|v| v == cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_matches_everything() {
        let spec = FilterSpec::parse(None, None, None).unwrap();
        assert!(spec.is_empty());
        let (predicate, params) = spec.predicate();
        assert_eq!(predicate, "TRUE");
        assert!(params.is_empty());
        assert!(spec.matches(None, None, None));
        assert!(spec.matches(Some("R1"), Some("Martin"), Some("2024-06-18")));
    }

    #[test]
    fn releve_values_become_ordered_substring_params() {
        let spec = FilterSpec::parse(Some(" 20240618CB01, T6-C5/1 , "), None, None).unwrap();
        let (predicate, params) = spec.predicate();
        assert_eq!(
            predicate,
            "(numero_releve::text ILIKE $1 OR numero_releve::text ILIKE $2)"
        );
        assert_eq!(
            params,
            vec!["%20240618CB01%".to_string(), "%T6-C5/1%".to_string()]
        );
    }

    #[test]
    fn groups_combine_with_and_and_share_placeholder_numbering() {
        let spec =
            FilterSpec::parse(Some("R1"), Some("Martin,Dubois"), Some("2024-06-18")).unwrap();
        let (predicate, params) = spec.predicate();
        assert_eq!(
            predicate,
            "(numero_releve::text ILIKE $1) AND \
             (observateurs::text ILIKE $2 OR observateurs::text ILIKE $3) AND \
             (date_min::text = $4)"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[3], "2024-06-18");
    }

    #[test]
    fn invalid_date_filter_is_rejected() {
        assert!(FilterSpec::parse(None, None, Some("18/06/2024")).is_err());
        assert!(FilterSpec::parse(None, None, Some("2024-06-18")).is_ok());
    }

    #[test]
    fn in_memory_matching_mirrors_sql_semantics() {
        let spec = FilterSpec::parse(Some("cb01"), None, Some("2024-06-18")).unwrap();
        assert!(spec.matches(Some("20240618CB01"), None, Some("2024-06-18")));
        // NULL relevé never matches a non-empty group.
        assert!(!spec.matches(None, None, Some("2024-06-18")));
        assert!(!spec.matches(Some("20240618CB01"), None, Some("2024-06-19")));
    }
}
