//! CSV Data Loader Module
//! Loads the AI adoption CSV with Polars and enforces the column schema.

use super::columns;
use super::processor::DataProcessor;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {}", path.display())]
    DataNotFound { path: PathBuf },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Column '{column}' has malformed values: {reason}")]
    Malformed { column: String, reason: String },
}

/// Target type of every required column.
fn schema() -> [(&'static str, DataType); 9] {
    [
        (columns::YEAR, DataType::Int64),
        (columns::COMPANY, DataType::String),
        (columns::SECTOR, DataType::String),
        (columns::COUNTRY, DataType::String),
        (columns::INVESTMENT, DataType::Float64),
        (columns::PROFIT_GROWTH, DataType::Float64),
        (columns::INNOVATION, DataType::Float64),
        (columns::AI_USE, DataType::String),
        (columns::IMPACT, DataType::String),
    ]
}

/// Immutable, typed view of the loaded CSV.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    source: PathBuf,
}

impl Dataset {
    /// Validate the required columns and cast them to their schema types.
    pub fn from_frame(df: DataFrame, source: impl Into<PathBuf>) -> Result<Self, LoaderError> {
        let present: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = columns::REQUIRED
            .iter()
            .filter(|name| !present.contains(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns(missing));
        }

        let mut df = df;
        for (name, dtype) in schema() {
            // The CSV reader yields multi-chunk columns; cast errors need a single chunk.
            let series = df.column(name)?.as_materialized_series().rechunk();
            let malformed = |reason: String| LoaderError::Malformed {
                column: name.to_string(),
                reason,
            };

            if dtype.is_integer() && series.dtype().is_float() {
                let floats = series.cast(&DataType::Float64)?;
                if let Some(value) = floats.f64()?.into_iter().flatten().find(|v| v.fract() != 0.0) {
                    return Err(malformed(format!("{} is not a whole number", value)));
                };
            }

            let typed = series
                .strict_cast(&dtype)
                .map_err(|e| malformed(e.to_string()))?;
            df.with_column(typed)?;
        }

        Ok(Self {
            df,
            source: source.into(),
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Get list of column names, in file order.
    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get list of numeric column names.
    pub fn numeric_columns(&self) -> Vec<String> {
        DataProcessor::numeric_columns(&self.df)
    }

    /// Unique non-null values of a column in order of first appearance.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        DataProcessor::unique_values(&self.df, column).unwrap_or_default()
    }

    /// Smallest and largest year, or `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        let years = self.df.column(columns::YEAR).ok()?.as_materialized_series();
        let years = years.i64().ok()?;
        Some((years.min()?, years.max()?))
    }
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load the dataset CSV. A missing file is reported before Polars is involved.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Dataset, LoaderError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::DataNotFound {
                path: path.to_path_buf(),
            });
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let dataset = Dataset::from_frame(df, path)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.columns().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}
