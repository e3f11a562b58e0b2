use thiserror::Error;

/// Column holding the unique relevé identifier. Every source table must carry it.
pub const SURVEY_ID_COLUMN: &str = "numero_releve";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Required identifier column '{0}' not found in the source data")]
    MissingIdentifier(String),
}

/// Rectangular table of named columns, as returned by the data source.
/// Cells are `None` where the source held NULL or an empty CSV field.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Table {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating it to the header width so the
    /// table stays rectangular regardless of what the source produced.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell value at (row, column-name); `None` for NULL cells and absent columns.
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Iterates a column's cells in row order; empty if the column is absent.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = Option<&'a str>> {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.map(|i| row.get(i).and_then(|c| c.as_deref())))
    }

    /// Distinct non-null survey identifiers in first-appearance order.
    /// These become the output matrix columns, so the order must be stable.
    pub fn survey_ids(&self) -> Result<Vec<String>, TableError> {
        if !self.has_column(SURVEY_ID_COLUMN) {
            return Err(TableError::MissingIdentifier(SURVEY_ID_COLUMN.to_string()));
        }
        let mut seen: Vec<String> = Vec::new();
        for value in self.column_values(SURVEY_ID_COLUMN).flatten() {
            if !seen.iter().any(|s| s == value) {
                seen.push(value.to_string());
            }
        }
        Ok(seen)
    }
}
