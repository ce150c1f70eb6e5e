//! Data Processor Module
//! Filters and aggregates the dataset. Every operation is a pure function of
//! (table, parameters) and returns a new table.

use super::columns;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid year range: {from} is after {to}")]
    InvalidYearRange { from: i64, to: i64 },
}

/// User-selected filter dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterParams {
    pub countries: Vec<String>,
    pub sectors: Vec<String>,
    /// Inclusive year range.
    pub years: (i64, i64),
}

/// One observation, serialized with the CSV column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptionRecord {
    #[serde(rename = "ano")]
    pub year: Option<i64>,
    #[serde(rename = "empresa")]
    pub company: Option<String>,
    #[serde(rename = "setor")]
    pub sector: Option<String>,
    #[serde(rename = "pais_sede")]
    pub country: Option<String>,
    #[serde(rename = "investimento_ia_usd_milhoes")]
    pub investment: Option<f64>,
    #[serde(rename = "crescimento_lucro_%")]
    pub profit_growth: Option<f64>,
    #[serde(rename = "nota_inovacao")]
    pub innovation: Option<f64>,
    #[serde(rename = "principais_usos_ia")]
    pub ai_use: Option<String>,
    #[serde(rename = "impacto_operacional")]
    pub impact: Option<String>,
}

/// Handles filtering and aggregation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// `column ∈ values`. An empty selection matches nothing.
    fn membership(column: &str, values: &[String]) -> Expr {
        values
            .iter()
            .map(|value| col(column).eq(lit(value.as_str())))
            .reduce(|acc, expr| acc.or(expr))
            .unwrap_or_else(|| lit(false))
    }

    /// Keep rows whose country and sector are selected and whose year lies in the range.
    pub fn filter(df: &DataFrame, params: &FilterParams) -> Result<DataFrame, ProcessorError> {
        let (from, to) = params.years;
        if from > to {
            return Err(ProcessorError::InvalidYearRange { from, to });
        }

        let predicate = Self::membership(columns::COUNTRY, &params.countries)
            .and(Self::membership(columns::SECTOR, &params.sectors))
            .and(col(columns::YEAR).gt_eq(lit(from)))
            .and(col(columns::YEAR).lt_eq(lit(to)));

        let filtered = df.clone().lazy().filter(predicate).collect()?;
        Ok(filtered)
    }

    /// Rows where a string column equals `value`.
    pub fn filter_eq(df: &DataFrame, column: &str, value: &str) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col(column).eq(lit(value)))
            .collect()?;
        Ok(filtered)
    }

    /// Group by `keys` and sum `value`. Output is sorted by the keys ascending.
    pub fn sum_by(df: &DataFrame, keys: &[&str], value: &str) -> Result<DataFrame, ProcessorError> {
        let key_exprs: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();
        let summed = df
            .clone()
            .lazy()
            .group_by(key_exprs)
            .agg([col(value).sum()])
            .sort(keys.to_vec(), SortMultipleOptions::default())
            .collect()?;
        Ok(summed)
    }

    /// The `n` groups with the largest summed `value`, largest first. Ties are broken by key.
    pub fn top_n_by_sum(
        df: &DataFrame,
        key: &str,
        value: &str,
        n: usize,
    ) -> Result<DataFrame, ProcessorError> {
        let top = df
            .clone()
            .lazy()
            .group_by([col(key)])
            .agg([col(value).sum()])
            .sort(
                [value, key],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .limit(n as IdxSize)
            .collect()?;
        Ok(top)
    }

    /// Occurrences of each value of `column`, most frequent first. Ties are broken by value.
    pub fn value_counts(df: &DataFrame, column: &str) -> Result<DataFrame, ProcessorError> {
        let counts = df
            .clone()
            .lazy()
            .filter(col(column).is_not_null())
            .group_by([col(column)])
            .agg([len().alias(columns::COUNT)])
            .sort(
                [columns::COUNT, column],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;
        Ok(counts)
    }

    /// Unique non-null values of a column in order of first appearance.
    pub fn unique_values(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        let unique = df
            .column(column)?
            .as_materialized_series()
            .unique_stable()?
            .cast(&DataType::String)?;

        Ok(unique
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect())
    }

    /// Get list of numeric column names.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| {
                matches!(
                    col.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Column values as floats, row-aligned (nulls kept as `None`).
    pub fn f64_column(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let values = df
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    /// Non-null column values as floats.
    pub fn f64_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, ProcessorError> {
        Ok(Self::f64_column(df, column)?.into_iter().flatten().collect())
    }

    /// Column values as integers, row-aligned.
    pub fn i64_column(df: &DataFrame, column: &str) -> Result<Vec<Option<i64>>, ProcessorError> {
        let values = df
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::Int64)?;
        Ok(values.i64()?.into_iter().collect())
    }

    /// Column values as strings, row-aligned.
    pub fn str_column(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, ProcessorError> {
        let values = df
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        Ok(values
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Materialize the table as typed records.
    pub fn records(df: &DataFrame) -> Result<Vec<AdoptionRecord>, ProcessorError> {
        let years = Self::i64_column(df, columns::YEAR)?;
        let companies = Self::str_column(df, columns::COMPANY)?;
        let sectors = Self::str_column(df, columns::SECTOR)?;
        let countries = Self::str_column(df, columns::COUNTRY)?;
        let investments = Self::f64_column(df, columns::INVESTMENT)?;
        let growths = Self::f64_column(df, columns::PROFIT_GROWTH)?;
        let innovations = Self::f64_column(df, columns::INNOVATION)?;
        let uses = Self::str_column(df, columns::AI_USE)?;
        let impacts = Self::str_column(df, columns::IMPACT)?;

        let records = (0..df.height())
            .map(|i| AdoptionRecord {
                year: years[i],
                company: companies[i].clone(),
                sector: sectors[i].clone(),
                country: countries[i].clone(),
                investment: investments[i],
                profit_growth: growths[i],
                innovation: innovations[i],
                ai_use: uses[i].clone(),
                impact: impacts[i].clone(),
            })
            .collect();
        Ok(records)
    }
}
