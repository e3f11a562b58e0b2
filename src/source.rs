use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, info, warn};
use postgres::{
    Client, NoTls, Row,
    types::{ToSql, Type},
};
use rust_decimal::Decimal;

use crate::{
    config::DbConfig,
    filter::{DATE_MIN_COLUMN, FilterSpec, OBSERVERS_COLUMN},
    table::{SURVEY_ID_COLUMN, Table},
};

/// A relational source of relevé records. Implementations own connectivity;
/// the transform engine only ever sees the rectangular [`Table`].
pub trait DataSource {
    fn fetch(&self, filter: &FilterSpec) -> Result<Table>;
}

/// Live GeoNature database, queried over a single blocking connection.
pub struct PostgresSource {
    config: DbConfig,
}

impl PostgresSource {
    pub fn new(config: DbConfig) -> Self {
        PostgresSource { config }
    }

    /// Runs one parameterized query against the configured view. The
    /// predicate text references only `$n` placeholders; user-supplied values
    /// arrive exclusively through `params`.
    pub fn query(&self, predicate: &str, params: &[String]) -> Result<Table> {
        let mut client = Client::connect(&self.config.connection_string(), NoTls)
            .with_context(|| format!("Connecting to database on {}", self.config.host))?;
        let sql = format!("SELECT * FROM {} WHERE {}", self.config.view, predicate);
        debug!("Query: {sql} ({} bound parameter(s))", params.len());

        let statement = client
            .prepare(&sql)
            .with_context(|| format!("Preparing query against {}", self.config.view))?;
        let headers: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = client
            .query(&statement, &param_refs)
            .with_context(|| format!("Querying {}", self.config.view))?;

        let mut table = Table::new(headers);
        for row in &rows {
            let cells = (0..row.len()).map(|idx| cell_to_string(row, idx)).collect();
            table.push_row(cells);
        }
        info!(
            "Fetched {} row(s) across {} column(s) from {}",
            table.row_count(),
            table.column_count(),
            self.config.view
        );
        Ok(table)
    }
}

impl DataSource for PostgresSource {
    fn fetch(&self, filter: &FilterSpec) -> Result<Table> {
        let (predicate, params) = filter.predicate();
        self.query(&predicate, &params)
    }
}

/// Renders one cell to its string form regardless of the column's SQL type.
/// Unmapped types degrade to NULL rather than failing the extraction.
fn cell_to_string(row: &Row, idx: usize) -> Option<String> {
    let column = &row.columns()[idx];
    let ty = column.type_();
    let rendered = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx).map(|v| v.map(|b| b.to_string()))
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx).map(|v| v.map(|n| n.to_string()))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx).map(|v| v.map(|n| n.to_string()))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx).map(|v| v.map(|n| n.to_string()))
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx).map(|v| v.map(|n| n.to_string()))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx).map(|v| v.map(|n| n.to_string()))
    } else if *ty == Type::NUMERIC {
        row.try_get::<_, Option<Decimal>>(idx).map(|v| v.map(|n| n.to_string()))
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(idx)
            .map(|v| v.map(|d| d.format("%Y-%m-%d").to_string()))
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)
            .map(|v| v.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)
            .map(|v| v.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()))
    } else {
        row.try_get::<_, Option<String>>(idx)
    };
    match rendered {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "Could not read column '{}' ({}): {err}; treating as NULL",
                column.name(),
                ty
            );
            None
        }
    }
}

/// Offline source: a CSV dump of the relevé view, with the filter applied in
/// memory using the same matching semantics as the SQL predicate.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: PathBuf) -> Self {
        CsvSource { path }
    }
}

impl DataSource for CsvSource {
    fn fetch(&self, filter: &FilterSpec) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Opening CSV dump {:?}", self.path))?;
        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Reading headers from {:?}", self.path))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let releve_idx = headers.iter().position(|h| h == SURVEY_ID_COLUMN);
        let observers_idx = headers.iter().position(|h| h == OBSERVERS_COLUMN);
        let date_idx = headers.iter().position(|h| h == DATE_MIN_COLUMN);

        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record.with_context(|| format!("Reading {:?}", self.path))?;
            let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).filter(|v| !v.is_empty());
            if !filter.matches(cell(releve_idx), cell(observers_idx), cell(date_idx)) {
                continue;
            }
            let row = record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    }
                })
                .collect();
            table.push_row(row);
        }
        info!(
            "Loaded {} matching row(s) from {:?}",
            table.row_count(),
            self.path
        );
        Ok(table)
    }
}
