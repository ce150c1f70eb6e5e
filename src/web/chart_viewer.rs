//! Chart Viewer
//! Main area of the dashboard: metrics, charts and tables of the selected page,
//! all computed from the filtered table.

use crate::charts::{ChartPlotter, ChartSpec};
use crate::data::{columns, AdoptionRecord, DataProcessor};
use crate::error::Result;
use crate::stats::StatsCalculator;
use crate::web::control_panel::{selected, Controls, Page};
use crate::web::html;
use polars::prelude::DataFrame;

pub const TOP_COMPANIES: usize = 10;

/// Charts offered as static SVG downloads.
pub const EXPORTABLE: [&str; 3] = ["investment-by-year", "top-companies", "sector-trends"];

const NO_DATA: &str = "Nenhum dado corresponde aos filtros selecionados.";
const NO_COMPANY_DATA: &str =
    "Nenhum dado disponível para a empresa selecionada com os filtros atuais.";
const NO_SECTOR_DATA: &str = "Nenhum dado disponível para o setor selecionado com os filtros atuais.";

pub struct ChartViewer;

impl ChartViewer {
    /// Build the main area for the current controls.
    pub fn render(df: &DataFrame, controls: &Controls) -> Result<String> {
        let filtered = DataProcessor::filter(df, &controls.filters)?;
        tracing::debug!(
            page = controls.page.slug(),
            rows = filtered.height(),
            "rendering page"
        );

        let mut html = format!("<h2>{}</h2>", html::escape(controls.page.label()));
        let body = match controls.page {
            Page::Overview => Self::overview(&filtered)?,
            Page::Company => Self::company(&filtered, controls.company.as_deref())?,
            Page::Sector => Self::sector(&filtered, controls.focus_sector.as_deref())?,
            Page::Trends => Self::trends(&filtered)?,
        };
        html.push_str(&body);
        Ok(html)
    }

    fn overview(filtered: &DataFrame) -> Result<String> {
        if filtered.height() == 0 {
            return Ok(html::warning(NO_DATA));
        }

        let metrics = StatsCalculator::overview_metrics(filtered)?;
        let mut html = Self::metrics(&[
            (
                "Total Investido (USD milhões)",
                html::currency(metrics.total_investment),
            ),
            ("Número de Empresas", metrics.company_count.to_string()),
            (
                "Crescimento Médio de Lucro",
                html::percent(metrics.mean_profit_growth),
            ),
        ]);

        html.push_str(&Self::chart(&ChartPlotter::investment_by_year(filtered)?));
        html.push_str(&Self::chart(&ChartPlotter::top_companies(
            filtered,
            TOP_COMPANIES,
        )?));
        html.push_str(&Self::chart(&ChartPlotter::sector_distribution(filtered)?));
        html.push_str(&Self::data_table(&DataProcessor::records(filtered)?));
        Ok(html)
    }

    fn company(filtered: &DataFrame, requested: Option<&str>) -> Result<String> {
        let companies = DataProcessor::unique_values(filtered, columns::COMPANY)?;
        let Some(company) = Self::pick(&companies, requested) else {
            return Ok(html::warning(NO_COMPANY_DATA));
        };

        let mut html = Self::selector("Selecione uma empresa:", "company", &companies, &company);
        let company_df = DataProcessor::filter_eq(filtered, columns::COMPANY, &company)?;
        if company_df.height() == 0 {
            html.push_str(&html::warning(NO_COMPANY_DATA));
            return Ok(html);
        }

        let metrics = StatsCalculator::company_metrics(&company_df)?;
        html.push_str(&Self::metrics(&[
            (
                "Investimento Médio Anual (USD milhões)",
                html::currency(metrics.mean_annual_investment),
            ),
            (
                "Crescimento Médio de Lucro",
                html::percent(metrics.mean_profit_growth),
            ),
        ]));
        html.push_str(&Self::chart(&ChartPlotter::company_timeline(
            &company_df,
            &company,
        )?));
        html.push_str(&Self::chart(&ChartPlotter::ai_use_counts(
            &company_df,
            &company,
        )?));
        Ok(html)
    }

    fn sector(filtered: &DataFrame, requested: Option<&str>) -> Result<String> {
        let sectors = DataProcessor::unique_values(filtered, columns::SECTOR)?;
        let Some(sector) = Self::pick(&sectors, requested) else {
            return Ok(html::warning(NO_SECTOR_DATA));
        };

        let mut html = Self::selector("Selecione um setor:", "focus_sector", &sectors, &sector);
        let sector_df = DataProcessor::filter_eq(filtered, columns::SECTOR, &sector)?;
        if sector_df.height() == 0 {
            html.push_str(&html::warning(NO_SECTOR_DATA));
            return Ok(html);
        }

        let metrics = StatsCalculator::sector_metrics(&sector_df)?;
        html.push_str(&Self::metrics(&[
            (
                "Total Investido (USD milhões)",
                html::currency(metrics.total_investment),
            ),
            ("Empresas no Setor", metrics.company_count.to_string()),
            ("Nota Média de Inovação", html::score(metrics.mean_innovation)),
        ]));
        html.push_str(&Self::chart(&ChartPlotter::sector_bubbles(&sector_df, &sector)?));
        html.push_str(&Self::chart(&ChartPlotter::impact_distribution(
            &sector_df, &sector,
        )?));
        Ok(html)
    }

    fn trends(filtered: &DataFrame) -> Result<String> {
        if filtered.height() == 0 {
            return Ok(html::warning(NO_DATA));
        }

        let mut html = Self::chart(&ChartPlotter::sector_trends(filtered)?);
        html.push_str(&Self::chart(&ChartPlotter::correlation_heatmap(filtered)?));
        Ok(html)
    }

    /// The requested option when it is still available, otherwise the first one.
    fn pick(options: &[String], requested: Option<&str>) -> Option<String> {
        requested
            .and_then(|wanted| options.iter().find(|option| option.as_str() == wanted))
            .or_else(|| options.first())
            .cloned()
    }

    fn selector(label: &str, name: &str, options: &[String], current: &str) -> String {
        let mut html = format!(
            r#"<label>{} <select name="{}" form="controls" onchange="this.form.submit()">"#,
            html::escape(label),
            name,
        );
        for option in options {
            html.push_str(&format!(
                r#"<option value="{}"{}>{}</option>"#,
                html::escape(option),
                selected(option == current),
                html::escape(option),
            ));
        }
        html.push_str("</select></label>");
        html
    }

    fn metrics(cards: &[(&str, String)]) -> String {
        let mut html = String::from(r#"<div class="metrics">"#);
        for (label, value) in cards {
            html.push_str(&format!(
                r#"<div class="metric"><div class="label">{}</div><div class="value">{}</div></div>"#,
                html::escape(label),
                html::escape(value),
            ));
        }
        html.push_str("</div>");
        html
    }

    /// A Plotly container plus the figure JSON that fills it.
    fn chart(spec: &ChartSpec) -> String {
        let mut html = format!(r#"<section class="chart"><h3>{}</h3>"#, html::escape(&spec.title));
        if spec.is_empty() {
            html.push_str(&html::warning(NO_DATA));
            html.push_str("</section>");
            return html;
        }

        html.push_str(&format!(
            r#"<div id="{id}"></div><script>Plotly.newPlot("{id}", ...(f => [f.data, f.layout, {{responsive: true}}])({json}));</script>"#,
            id = spec.id,
            json = html::script_json(&spec.to_plotly().to_string()),
        ));
        if EXPORTABLE.contains(&spec.id.as_str()) {
            html.push_str(&format!(
                r#"<p><a class="export" href="/export/{}">Exportar SVG</a></p>"#,
                spec.id
            ));
        }
        html.push_str("</section>");
        html
    }

    fn data_table(records: &[AdoptionRecord]) -> String {
        let headers = [
            "Ano",
            "Empresa",
            "Setor",
            "País",
            "Investimento (USD milhões)",
            "Crescimento de Lucro",
            "Nota de Inovação",
            "Principal Uso de IA",
            "Impacto Operacional",
        ];

        let mut html = String::from("<h3>Dados Filtrados</h3><table><thead><tr>");
        for header in headers {
            html.push_str(&format!("<th>{}</th>", html::escape(header)));
        }
        html.push_str("</tr></thead><tbody>");

        let text = |value: &Option<String>| html::escape(value.as_deref().unwrap_or("-"));
        for record in records {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                record.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
                text(&record.company),
                text(&record.sector),
                text(&record.country),
                html::currency(record.investment.unwrap_or(f64::NAN)),
                html::percent(record.profit_growth.unwrap_or(f64::NAN)),
                html::score(record.innovation.unwrap_or(f64::NAN)),
                text(&record.ai_use),
                text(&record.impact),
            ));
        }
        html.push_str("</tbody></table>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FilterParams;
    use polars::prelude::*;

    fn sample() -> DataFrame {
        df!(
            columns::YEAR => [2015i64, 2016, 2015, 2016],
            columns::COMPANY => ["Nubank", "Nubank", "Siemens", "Siemens"],
            columns::SECTOR => ["Finanças", "Finanças", "Indústria", "Indústria"],
            columns::COUNTRY => ["Brasil", "Brasil", "Alemanha", "Alemanha"],
            columns::INVESTMENT => [10.0, 20.0, 1500.0, 1700.0],
            columns::PROFIT_GROWTH => [5.0, 7.0, 2.0, 4.0],
            columns::INNOVATION => [7.0, 8.0, 6.0, 7.0],
            columns::AI_USE => ["Análise de crédito", "Chatbots", "Manutenção preditiva", "Manutenção preditiva"],
            columns::IMPACT => ["Médio", "Alto", "Alto", "Médio"]
        )
        .unwrap()
    }

    fn controls(page: Page) -> Controls {
        Controls {
            filters: FilterParams {
                countries: vec!["Brasil".to_string(), "Alemanha".to_string()],
                sectors: vec!["Finanças".to_string(), "Indústria".to_string()],
                years: (2015, 2016),
            },
            page,
            company: None,
            focus_sector: None,
        }
    }

    #[test]
    fn overview_shows_metrics_charts_and_rows() {
        let html = ChartViewer::render(&sample(), &controls(Page::Overview)).unwrap();

        assert!(html.contains("Visão Geral"));
        assert!(html.contains("Total Investido (USD milhões)"));
        assert!(html.contains("$3,230.00"));
        assert!(html.contains("4.50%"));
        assert!(html.contains(r#"<div id="investment-by-year">"#));
        assert!(html.contains(r#"<div id="top-companies">"#));
        assert!(html.contains(r#"<div id="sector-distribution">"#));
        assert!(html.contains(r#"href="/export/top-companies""#));
        assert_eq!(html.matches("<tr><td>").count(), 4);
    }

    #[test]
    fn company_page_defaults_to_first_company() {
        let html = ChartViewer::render(&sample(), &controls(Page::Company)).unwrap();

        assert!(html.contains(r#"<option value="Nubank" selected>"#));
        assert!(html.contains("$15.00"));
        assert!(html.contains(r#"<div id="company-timeline">"#));
        assert!(html.contains(r#"<div id="ai-use-counts">"#));
    }

    #[test]
    fn stale_company_selection_falls_back() {
        let mut controls = controls(Page::Company);
        controls.company = Some("Google".to_string());
        controls.filters.countries = vec!["Alemanha".to_string()];

        let html = ChartViewer::render(&sample(), &controls).unwrap();

        assert!(html.contains(r#"<option value="Siemens" selected>"#));
        assert!(!html.contains("Nubank"));
    }

    #[test]
    fn sector_page_uses_chosen_sector() {
        let mut controls = controls(Page::Sector);
        controls.focus_sector = Some("Indústria".to_string());

        let html = ChartViewer::render(&sample(), &controls).unwrap();

        assert!(html.contains(r#"<option value="Indústria" selected>"#));
        assert!(html.contains("$3,200.00"));
        assert!(html.contains("Empresas no Setor"));
        assert!(html.contains("6.5"));
        assert!(html.contains(r#"<div id="sector-bubbles">"#));
        assert!(html.contains(r#"<div id="impact-distribution">"#));
    }

    #[test]
    fn empty_selection_warns_instead_of_drawing() {
        let mut company = controls(Page::Company);
        company.filters.countries.clear();
        let html = ChartViewer::render(&sample(), &company).unwrap();
        assert!(html.contains(NO_COMPANY_DATA));
        assert!(!html.contains("Plotly.newPlot"));

        let mut sector = controls(Page::Sector);
        sector.filters.sectors.clear();
        let html = ChartViewer::render(&sample(), &sector).unwrap();
        assert!(html.contains(NO_SECTOR_DATA));

        let mut overview = controls(Page::Overview);
        overview.filters.years = (2020, 2021);
        let html = ChartViewer::render(&sample(), &overview).unwrap();
        assert!(html.contains(NO_DATA));
    }

    #[test]
    fn trends_page_draws_lines_and_heatmap() {
        let html = ChartViewer::render(&sample(), &controls(Page::Trends)).unwrap();

        assert!(html.contains(r#"<div id="sector-trends">"#));
        assert!(html.contains(r#"<div id="correlation-heatmap">"#));
    }

    #[test]
    fn inverted_year_range_is_an_error() {
        let mut controls = controls(Page::Overview);
        controls.filters.years = (2016, 2015);

        assert!(ChartViewer::render(&sample(), &controls).is_err());
    }
}
