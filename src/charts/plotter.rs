//! Chart Plotter Module
//! Turns derived tables into chart specifications that serialize to Plotly figures.

use crate::data::{columns, DataProcessor, ProcessorError};
use crate::stats::{CorrelationMatrix, StatsCalculator};
use polars::prelude::DataFrame;
use serde::Serialize;
use serde_json::{json, Value};

/// Color of single-series charts
pub const PRIMARY_COLOR: (u8, u8, u8) = (52, 152, 219); // Blue

pub const PALETTE: [(u8, u8, u8); 10] = [
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (255, 87, 34),   // Deep Orange
    (121, 85, 72),   // Brown
    (96, 125, 139),  // Blue Grey
];

/// Fixed colors of the operational impact levels.
pub const IMPACT_COLORS: [(&str, &str); 3] = [("Alto", "green"), ("Médio", "orange"), ("Baixo", "red")];

const INVESTMENT_LABEL: &str = "Investimento (USD milhões)";
const GROWTH_LABEL: &str = "Crescimento de Lucro (%)";

/// Get the palette color of the n-th series as a CSS hex string.
pub fn series_color(index: usize) -> String {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Values over years, one line of a line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub name: String,
    pub x: Vec<i64>,
    pub y: Vec<f64>,
}

/// A labelled value: a bar or a pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Points of one bubble group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleSeries {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub size: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    Lines {
        x_label: String,
        y_label: String,
        series: Vec<TimeSeries>,
        line_width: f64,
    },
    HorizontalBars {
        x_label: String,
        y_label: String,
        bars: Vec<Bar>,
        color_scale: String,
    },
    Donut {
        slices: Vec<Bar>,
        hole: f64,
        /// Label to color overrides; empty uses the Plotly defaults.
        colors: Vec<(String, String)>,
    },
    Bubbles {
        x_label: String,
        y_label: String,
        size_label: String,
        series: Vec<BubbleSeries>,
        size_max: f64,
    },
    /// Line on the primary axis, bars on a secondary axis.
    LineBarCombo {
        x_label: String,
        line: TimeSeries,
        bars: TimeSeries,
    },
    Heatmap {
        matrix: CorrelationMatrix,
        axis_label: String,
        color_label: String,
    },
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Lines { .. } => "lines",
            ChartKind::HorizontalBars { .. } => "horizontal_bars",
            ChartKind::Donut { .. } => "donut",
            ChartKind::Bubbles { .. } => "bubbles",
            ChartKind::LineBarCombo { .. } => "line_bar_combo",
            ChartKind::Heatmap { .. } => "heatmap",
        }
    }
}

/// A chart ready to be drawn, in the browser or as a static image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Stable identifier, used as DOM id and export name.
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: ChartKind,
}

fn axis(title: &str) -> Value {
    json!({ "title": { "text": title } })
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Lines { series, .. } => series.iter().all(|s| s.x.is_empty()),
            ChartKind::HorizontalBars { bars, .. } => bars.is_empty(),
            ChartKind::Donut { slices, .. } => slices.is_empty(),
            ChartKind::Bubbles { series, .. } => series.is_empty(),
            ChartKind::LineBarCombo { line, .. } => line.x.is_empty(),
            ChartKind::Heatmap { matrix, .. } => matrix.columns.is_empty(),
        }
    }

    /// Plotly figure: `{ "data": [...traces], "layout": {...} }`.
    pub fn to_plotly(&self) -> Value {
        match &self.kind {
            ChartKind::Lines {
                x_label,
                y_label,
                series,
                line_width,
            } => {
                let single = series.len() == 1;
                let traces: Vec<Value> = series
                    .iter()
                    .enumerate()
                    .map(|(i, s)| {
                        let color = if single {
                            let (r, g, b) = PRIMARY_COLOR;
                            format!("#{:02x}{:02x}{:02x}", r, g, b)
                        } else {
                            series_color(i)
                        };
                        json!({
                            "type": "scatter",
                            "mode": "lines+markers",
                            "name": s.name,
                            "x": s.x,
                            "y": s.y,
                            "line": { "width": line_width, "color": color },
                        })
                    })
                    .collect();
                json!({
                    "data": traces,
                    "layout": {
                        "xaxis": axis(x_label),
                        "yaxis": axis(y_label),
                        "hovermode": "x unified",
                        "showlegend": !single,
                    },
                })
            }
            ChartKind::HorizontalBars {
                x_label,
                y_label,
                bars,
                color_scale,
            } => {
                let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
                let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
                json!({
                    "data": [{
                        "type": "bar",
                        "orientation": "h",
                        "x": values,
                        "y": labels,
                        "marker": {
                            "color": values,
                            "colorscale": color_scale,
                            "showscale": true,
                        },
                    }],
                    "layout": {
                        "xaxis": axis(x_label),
                        "yaxis": { "title": { "text": y_label }, "autorange": "reversed" },
                    },
                })
            }
            ChartKind::Donut {
                slices,
                hole,
                colors,
            } => {
                let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
                let values: Vec<f64> = slices.iter().map(|s| s.value).collect();
                let mut trace = json!({
                    "type": "pie",
                    "labels": labels,
                    "values": values,
                    "hole": hole,
                });
                if !colors.is_empty() {
                    let slice_colors: Vec<Value> = slices
                        .iter()
                        .map(|s| {
                            colors
                                .iter()
                                .find(|(label, _)| *label == s.label)
                                .map(|(_, color)| Value::from(color.as_str()))
                                .unwrap_or(Value::Null)
                        })
                        .collect();
                    trace["marker"] = json!({ "colors": slice_colors });
                }
                json!({ "data": [trace], "layout": {} })
            }
            ChartKind::Bubbles {
                x_label,
                y_label,
                size_label,
                series,
                size_max,
            } => {
                let largest = series
                    .iter()
                    .flat_map(|s| s.size.iter().copied())
                    .fold(0.0_f64, f64::max);
                // Same scaling Plotly Express applies for `size_max`.
                let sizeref = if largest > 0.0 {
                    2.0 * largest / (size_max * size_max)
                } else {
                    1.0
                };
                let traces: Vec<Value> = series
                    .iter()
                    .enumerate()
                    .map(|(i, s)| {
                        json!({
                            "type": "scatter",
                            "mode": "markers",
                            "name": s.name,
                            "x": s.x,
                            "y": s.y,
                            "text": vec![s.name.as_str(); s.x.len()],
                            "customdata": s.size,
                            "hovertemplate": format!(
                                "<b>%{{text}}</b><br>{}: %{{x}}<br>{}: %{{y}}<br>{}: %{{customdata}}<extra></extra>",
                                x_label, y_label, size_label
                            ),
                            "marker": {
                                "size": s.size,
                                "sizemode": "area",
                                "sizeref": sizeref,
                                "sizemin": 4,
                                "color": series_color(i),
                            },
                        })
                    })
                    .collect();
                json!({
                    "data": traces,
                    "layout": { "xaxis": axis(x_label), "yaxis": axis(y_label) },
                })
            }
            ChartKind::LineBarCombo {
                x_label,
                line,
                bars,
            } => json!({
                "data": [
                    {
                        "type": "scatter",
                        "mode": "lines",
                        "name": line.name,
                        "x": line.x,
                        "y": line.y,
                        "line": { "color": "blue" },
                        "yaxis": "y",
                    },
                    {
                        "type": "bar",
                        "name": bars.name,
                        "x": bars.x,
                        "y": bars.y,
                        "marker": { "color": "green" },
                        "opacity": 0.5,
                        "yaxis": "y2",
                    },
                ],
                "layout": {
                    "xaxis": axis(x_label),
                    "yaxis": axis(&line.name),
                    "yaxis2": {
                        "title": { "text": bars.name },
                        "overlaying": "y",
                        "side": "right",
                    },
                    "hovermode": "x unified",
                },
            }),
            ChartKind::Heatmap {
                matrix,
                axis_label,
                color_label,
            } => json!({
                "data": [{
                    "type": "heatmap",
                    "z": matrix.values,
                    "x": matrix.columns,
                    "y": matrix.columns,
                    "colorscale": "RdBu",
                    "zmin": -1,
                    "zmax": 1,
                    "texttemplate": "%{z:.2f}",
                    "colorbar": { "title": { "text": color_label } },
                }],
                "layout": {
                    "xaxis": axis(axis_label),
                    "yaxis": { "title": { "text": axis_label }, "autorange": "reversed" },
                },
            }),
        }
    }
}

/// Build a label/value list from a two-column aggregate.
fn bars_from(df: &DataFrame, label: &str, value: &str) -> Result<Vec<Bar>, ProcessorError> {
    let labels = DataProcessor::str_column(df, label)?;
    let values = DataProcessor::f64_column(df, value)?;
    Ok(labels
        .into_iter()
        .zip(values)
        .filter_map(|(label, value)| {
            Some(Bar {
                label: label?,
                value: value.unwrap_or(0.0),
            })
        })
        .collect())
}

/// Creates the dashboard chart specifications.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Total investment per year.
    pub fn investment_by_year(df: &DataFrame) -> Result<ChartSpec, ProcessorError> {
        let summed = DataProcessor::sum_by(df, &[columns::YEAR], columns::INVESTMENT)?;
        let x: Vec<i64> = DataProcessor::i64_column(&summed, columns::YEAR)?
            .into_iter()
            .flatten()
            .collect();
        let y = DataProcessor::f64_values(&summed, columns::INVESTMENT)?;

        Ok(ChartSpec {
            id: "investment-by-year".to_string(),
            title: "Investimento Total por Ano".to_string(),
            kind: ChartKind::Lines {
                x_label: "Ano".to_string(),
                y_label: INVESTMENT_LABEL.to_string(),
                series: vec![TimeSeries {
                    name: INVESTMENT_LABEL.to_string(),
                    x,
                    y,
                }],
                line_width: 4.0,
            },
        })
    }

    /// The `n` companies with the largest total investment.
    pub fn top_companies(df: &DataFrame, n: usize) -> Result<ChartSpec, ProcessorError> {
        let top = DataProcessor::top_n_by_sum(df, columns::COMPANY, columns::INVESTMENT, n)?;

        Ok(ChartSpec {
            id: "top-companies".to_string(),
            title: format!("Top {} Empresas por Investimento Total", n),
            kind: ChartKind::HorizontalBars {
                x_label: "Investimento Total (USD milhões)".to_string(),
                y_label: "Empresa".to_string(),
                bars: bars_from(&top, columns::COMPANY, columns::INVESTMENT)?,
                color_scale: "Blues".to_string(),
            },
        })
    }

    /// Share of investment per sector.
    pub fn sector_distribution(df: &DataFrame) -> Result<ChartSpec, ProcessorError> {
        let summed = DataProcessor::sum_by(df, &[columns::SECTOR], columns::INVESTMENT)?;

        Ok(ChartSpec {
            id: "sector-distribution".to_string(),
            title: "Distribuição de Investimentos por Setor".to_string(),
            kind: ChartKind::Donut {
                slices: bars_from(&summed, columns::SECTOR, columns::INVESTMENT)?,
                hole: 0.4,
                colors: Vec::new(),
            },
        })
    }

    /// Investment (line) and profit growth (bars) of one company over the years.
    pub fn company_timeline(company_df: &DataFrame, company: &str) -> Result<ChartSpec, ProcessorError> {
        let years = DataProcessor::i64_column(company_df, columns::YEAR)?;
        let investments = DataProcessor::f64_column(company_df, columns::INVESTMENT)?;
        let growth = DataProcessor::f64_column(company_df, columns::PROFIT_GROWTH)?;

        let mut rows: Vec<(i64, Option<f64>, Option<f64>)> = years
            .into_iter()
            .zip(investments)
            .zip(growth)
            .filter_map(|((year, inv), g)| Some((year?, inv, g)))
            .collect();
        rows.sort_by_key(|row| row.0);

        let line = TimeSeries {
            name: INVESTMENT_LABEL.to_string(),
            x: rows.iter().filter(|r| r.1.is_some()).map(|r| r.0).collect(),
            y: rows.iter().filter_map(|r| r.1).collect(),
        };
        let bars = TimeSeries {
            name: GROWTH_LABEL.to_string(),
            x: rows.iter().filter(|r| r.2.is_some()).map(|r| r.0).collect(),
            y: rows.iter().filter_map(|r| r.2).collect(),
        };

        Ok(ChartSpec {
            id: "company-timeline".to_string(),
            title: format!("Evolução do Investimento e Crescimento de Lucro - {}", company),
            kind: ChartKind::LineBarCombo {
                x_label: "Ano".to_string(),
                line,
                bars,
            },
        })
    }

    /// How often each AI use appears for one company.
    pub fn ai_use_counts(company_df: &DataFrame, company: &str) -> Result<ChartSpec, ProcessorError> {
        let counts = DataProcessor::value_counts(company_df, columns::AI_USE)?;

        Ok(ChartSpec {
            id: "ai-use-counts".to_string(),
            title: format!("Principais Usos de IA - {}", company),
            kind: ChartKind::HorizontalBars {
                x_label: "Ocorrências".to_string(),
                y_label: "Uso de IA".to_string(),
                bars: bars_from(&counts, columns::AI_USE, columns::COUNT)?,
                color_scale: "Viridis".to_string(),
            },
        })
    }

    /// Investment against profit growth, bubble size by innovation score, one group per company.
    pub fn sector_bubbles(sector_df: &DataFrame, sector: &str) -> Result<ChartSpec, ProcessorError> {
        let companies = DataProcessor::str_column(sector_df, columns::COMPANY)?;
        let investments = DataProcessor::f64_column(sector_df, columns::INVESTMENT)?;
        let growth = DataProcessor::f64_column(sector_df, columns::PROFIT_GROWTH)?;
        let innovation = DataProcessor::f64_column(sector_df, columns::INNOVATION)?;

        let mut series: Vec<BubbleSeries> = Vec::new();
        for i in 0..sector_df.height() {
            let (Some(company), Some(x), Some(y), Some(size)) =
                (&companies[i], investments[i], growth[i], innovation[i])
            else {
                continue;
            };

            let position = match series.iter().position(|s| &s.name == company) {
                Some(position) => position,
                None => {
                    series.push(BubbleSeries {
                        name: company.clone(),
                        x: Vec::new(),
                        y: Vec::new(),
                        size: Vec::new(),
                    });
                    series.len() - 1
                }
            };
            let group = &mut series[position];
            group.x.push(x);
            group.y.push(y);
            group.size.push(size);
        }

        Ok(ChartSpec {
            id: "sector-bubbles".to_string(),
            title: format!("Comparação entre Empresas do Setor {}", sector),
            kind: ChartKind::Bubbles {
                x_label: "Investimento em IA (USD milhões)".to_string(),
                y_label: GROWTH_LABEL.to_string(),
                size_label: "Nota de Inovação".to_string(),
                series,
                size_max: 30.0,
            },
        })
    }

    /// Count of each operational impact level within one sector.
    pub fn impact_distribution(sector_df: &DataFrame, sector: &str) -> Result<ChartSpec, ProcessorError> {
        let counts = DataProcessor::value_counts(sector_df, columns::IMPACT)?;

        Ok(ChartSpec {
            id: "impact-distribution".to_string(),
            title: format!("Distribuição do Impacto Operacional no Setor {}", sector),
            kind: ChartKind::Donut {
                slices: bars_from(&counts, columns::IMPACT, columns::COUNT)?,
                hole: 0.3,
                colors: IMPACT_COLORS
                    .iter()
                    .map(|(label, color)| (label.to_string(), color.to_string()))
                    .collect(),
            },
        })
    }

    /// Yearly investment, one line per sector.
    pub fn sector_trends(df: &DataFrame) -> Result<ChartSpec, ProcessorError> {
        let summed = DataProcessor::sum_by(df, &[columns::SECTOR, columns::YEAR], columns::INVESTMENT)?;
        let sectors = DataProcessor::str_column(&summed, columns::SECTOR)?;
        let years = DataProcessor::i64_column(&summed, columns::YEAR)?;
        let values = DataProcessor::f64_column(&summed, columns::INVESTMENT)?;

        let mut series: Vec<TimeSeries> = Vec::new();
        for ((sector, year), value) in sectors.into_iter().zip(years).zip(values) {
            let (Some(sector), Some(year)) = (sector, year) else {
                continue;
            };
            // Rows arrive sorted by sector, so a new name always starts a new line.
            if series.last().map(|s| &s.name) != Some(&sector) {
                series.push(TimeSeries {
                    name: sector,
                    x: Vec::new(),
                    y: Vec::new(),
                });
            }
            if let Some(current) = series.last_mut() {
                current.x.push(year);
                current.y.push(value.unwrap_or(0.0));
            }
        }

        Ok(ChartSpec {
            id: "sector-trends".to_string(),
            title: "Evolução dos Investimentos por Setor".to_string(),
            kind: ChartKind::Lines {
                x_label: "Ano".to_string(),
                y_label: INVESTMENT_LABEL.to_string(),
                series,
                line_width: 2.0,
            },
        })
    }

    /// Correlation heatmap over the numeric columns.
    pub fn correlation_heatmap(df: &DataFrame) -> Result<ChartSpec, ProcessorError> {
        Ok(ChartSpec {
            id: "correlation-heatmap".to_string(),
            title: "Correlação entre Métricas".to_string(),
            kind: ChartKind::Heatmap {
                matrix: StatsCalculator::correlation_matrix(df)?,
                axis_label: "Variável".to_string(),
                color_label: "Correlação".to_string(),
            },
        })
    }
}
