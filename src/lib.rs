//! Avanço da IA nas Empresas - interactive dashboard over a CSV dataset
//!
//! Loads the dataset once, then filters, aggregates and charts it on every
//! browser request.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod stats;
pub mod web;

pub use error::{DashboardError, Result};
