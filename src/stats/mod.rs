//! Stats module - summary metrics and correlations

mod calculator;

pub use calculator::{
    CompanyMetrics, CorrelationMatrix, OverviewMetrics, SectorMetrics, StatsCalculator,
};
