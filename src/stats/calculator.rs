//! Statistics Calculator Module
//! Summary metrics for the dashboard pages and the Pearson correlation matrix.

use crate::data::{columns, DataProcessor, ProcessorError};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Headline numbers of the overview page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub total_investment: f64,
    pub company_count: usize,
    pub mean_profit_growth: f64,
}

/// Headline numbers of the company page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompanyMetrics {
    pub mean_annual_investment: f64,
    pub mean_profit_growth: f64,
}

/// Headline numbers of the sector page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorMetrics {
    pub total_investment: f64,
    pub company_count: usize,
    pub mean_innovation: f64,
}

/// Square correlation matrix over the numeric columns.
/// `None` marks pairs without a defined coefficient (constant column or < 2 points).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        self.values[i][j]
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Arithmetic mean; NaN for an empty slice.
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        Statistics::mean(values.iter())
    }

    /// Pearson correlation coefficient of two equally long samples.
    pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }

        let sx = x.iter().std_dev();
        let sy = y.iter().std_dev();
        if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
            return None;
        }

        let r = x.iter().covariance(y.iter()) / (sx * sy);
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    }

    /// Correlation over the rows where both values are present.
    fn pairwise(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
        let (x, y): (Vec<f64>, Vec<f64>) = a
            .iter()
            .zip(b)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .unzip();
        Self::pearson(&x, &y)
    }

    /// Correlation matrix over every numeric column, one row per column in parallel.
    pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix, ProcessorError> {
        let columns = DataProcessor::numeric_columns(df);
        let data: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|name| DataProcessor::f64_column(df, name))
            .collect::<Result<_, _>>()?;

        let values: Vec<Vec<Option<f64>>> = (0..columns.len())
            .into_par_iter()
            .map(|i| {
                (0..columns.len())
                    .map(|j| {
                        let r = Self::pairwise(&data[i], &data[j]);
                        if i == j {
                            r.map(|_| 1.0)
                        } else {
                            r
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(CorrelationMatrix { columns, values })
    }

    pub fn overview_metrics(df: &DataFrame) -> Result<OverviewMetrics, ProcessorError> {
        let investments = DataProcessor::f64_values(df, columns::INVESTMENT)?;
        let growth = DataProcessor::f64_values(df, columns::PROFIT_GROWTH)?;

        Ok(OverviewMetrics {
            total_investment: investments.iter().sum(),
            company_count: DataProcessor::unique_values(df, columns::COMPANY)?.len(),
            mean_profit_growth: Self::mean(&growth),
        })
    }

    pub fn company_metrics(df: &DataFrame) -> Result<CompanyMetrics, ProcessorError> {
        let investments = DataProcessor::f64_values(df, columns::INVESTMENT)?;
        let growth = DataProcessor::f64_values(df, columns::PROFIT_GROWTH)?;

        Ok(CompanyMetrics {
            mean_annual_investment: Self::mean(&investments),
            mean_profit_growth: Self::mean(&growth),
        })
    }

    pub fn sector_metrics(df: &DataFrame) -> Result<SectorMetrics, ProcessorError> {
        let investments = DataProcessor::f64_values(df, columns::INVESTMENT)?;
        let innovation = DataProcessor::f64_values(df, columns::INNOVATION)?;

        Ok(SectorMetrics {
            total_investment: investments.iter().sum(),
            company_count: DataProcessor::unique_values(df, columns::COMPANY)?.len(),
            mean_innovation: Self::mean(&innovation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pearson_detects_linear_relationships() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];

        assert!(approx(StatsCalculator::pearson(&x, &up).unwrap(), 1.0));
        assert!(approx(StatsCalculator::pearson(&x, &down).unwrap(), -1.0));
    }

    #[test]
    fn pearson_undefined_for_constant_or_short_input() {
        assert_eq!(StatsCalculator::pearson(&[1.0, 2.0], &[3.0, 3.0]), None);
        assert_eq!(StatsCalculator::pearson(&[1.0], &[1.0]), None);
        assert_eq!(StatsCalculator::pearson(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn mean_of_empty_is_nan() {
        assert!(StatsCalculator::mean(&[]).is_nan());
        assert!(approx(StatsCalculator::mean(&[1.0, 2.0, 6.0]), 3.0));
    }

    #[test]
    fn correlation_matrix_covers_numeric_columns() {
        let df = df!(
            "ano" => [2015i64, 2016, 2017],
            "empresa" => ["A", "B", "C"],
            "investimento_ia_usd_milhoes" => [10.0, 20.0, 30.0],
            "nota_inovacao" => [9.0, 6.0, 3.0],
            "constante" => [1.0, 1.0, 1.0]
        )
        .unwrap();

        let matrix = StatsCalculator::correlation_matrix(&df).unwrap();
        assert_eq!(
            matrix.columns,
            vec!["ano", "investimento_ia_usd_milhoes", "nota_inovacao", "constante"]
        );
        assert_eq!(matrix.get("ano", "ano"), Some(1.0));
        assert!(approx(
            matrix.get("investimento_ia_usd_milhoes", "nota_inovacao").unwrap(),
            -1.0
        ));
        assert_eq!(matrix.get("constante", "ano"), None);
        assert_eq!(matrix.get("constante", "constante"), None);
    }

    #[test]
    fn overview_metrics_summarize_filtered_rows() {
        let df = df!(
            columns::COMPANY => ["Nubank", "Nubank", "SAP"],
            columns::INVESTMENT => [10.0, 20.0, 30.5],
            columns::PROFIT_GROWTH => [1.0, 2.0, 6.0]
        )
        .unwrap();

        let metrics = StatsCalculator::overview_metrics(&df).unwrap();
        assert!(approx(metrics.total_investment, 60.5));
        assert_eq!(metrics.company_count, 2);
        assert!(approx(metrics.mean_profit_growth, 3.0));
    }
}
