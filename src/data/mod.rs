//! Data module - CSV loading and filtering

mod loader;
mod processor;

pub use loader::{DataLoader, Dataset, LoaderError};
pub use processor::{AdoptionRecord, DataProcessor, FilterParams, ProcessorError};

/// Column names of the AI adoption dataset, exactly as they appear in the CSV header.
pub mod columns {
    pub const YEAR: &str = "ano";
    pub const COMPANY: &str = "empresa";
    pub const SECTOR: &str = "setor";
    pub const COUNTRY: &str = "pais_sede";
    pub const INVESTMENT: &str = "investimento_ia_usd_milhoes";
    pub const PROFIT_GROWTH: &str = "crescimento_lucro_%";
    pub const INNOVATION: &str = "nota_inovacao";
    pub const AI_USE: &str = "principais_usos_ia";
    pub const IMPACT: &str = "impacto_operacional";

    /// Output column of count aggregations.
    pub const COUNT: &str = "count";

    /// Every column the dashboard reads. Loading fails if any is absent.
    pub const REQUIRED: [&str; 9] = [
        YEAR,
        COMPANY,
        SECTOR,
        COUNTRY,
        INVESTMENT,
        PROFIT_GROWTH,
        INNOVATION,
        AI_USE,
        IMPACT,
    ];
}
