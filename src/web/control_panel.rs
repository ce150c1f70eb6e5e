//! Control Panel
//! Sidebar with the filter controls and the page selector. Controls live in the
//! query string; every change resubmits the form and the page is rebuilt.

use crate::data::{columns, Dataset, FilterParams};
use crate::web::html::escape;

/// Query key present once the form has been submitted at least once.
pub const APPLIED_KEY: &str = "applied";

/// Dashboard pages, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Company,
    Sector,
    Trends,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Company, Page::Sector, Page::Trends];

    pub fn slug(self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Company => "company",
            Page::Sector => "sector",
            Page::Trends => "trends",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Visão Geral",
            Page::Company => "Análise por Empresa",
            Page::Sector => "Análise por Setor",
            Page::Trends => "Tendências Temporais",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }
}

/// Current state of every control.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub filters: FilterParams,
    pub page: Page,
    /// Company chosen on the company page.
    pub company: Option<String>,
    /// Sector chosen on the sector page.
    pub focus_sector: Option<String>,
}

/// Options offered by the sidebar, taken from the full dataset.
pub struct ControlPanel {
    pub countries: Vec<String>,
    pub sectors: Vec<String>,
    pub year_bounds: (i64, i64),
}

impl ControlPanel {
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            countries: dataset.unique_values(columns::COUNTRY),
            sectors: dataset.unique_values(columns::SECTOR),
            year_bounds: dataset.year_bounds().unwrap_or((0, 0)),
        }
    }

    /// Read the controls from query pairs.
    ///
    /// On the first visit (no `applied` marker) every country and sector is
    /// selected and the year range spans the dataset. After a submission an
    /// absent country or sector means it was unchecked. Unknown values are
    /// ignored and years are clamped into the dataset bounds.
    pub fn parse(&self, pairs: &[(String, String)]) -> Controls {
        let applied = pairs.iter().any(|(key, _)| key == APPLIED_KEY);
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, v)| k == key && !v.trim().is_empty())
                .map(|(_, v)| v.trim())
        };
        let select = |key: &str, options: &[String]| -> Vec<String> {
            if !applied {
                return options.to_vec();
            }
            options
                .iter()
                .filter(|option| pairs.iter().any(|(k, v)| k == key && v == *option))
                .cloned()
                .collect()
        };

        let (min_year, max_year) = self.year_bounds;
        let year = |key: &str, default: i64| {
            first(key)
                .and_then(|value| value.parse::<i64>().ok())
                .map(|year| year.clamp(min_year, max_year))
                .unwrap_or(default)
        };

        Controls {
            filters: FilterParams {
                countries: select("country", &self.countries),
                sectors: select("sector", &self.sectors),
                years: (year("year_from", min_year), year("year_to", max_year)),
            },
            page: first("page").and_then(Page::from_slug).unwrap_or_default(),
            company: first("company").map(str::to_string),
            focus_sector: first("focus_sector").map(str::to_string),
        }
    }

    /// Sidebar form. Company and sector selectors on the pages join it through
    /// the `form="controls"` attribute.
    pub fn render(&self, controls: &Controls) -> String {
        let mut html = String::new();
        html.push_str(r#"<form id="controls" method="get" action="/">"#);
        html.push_str(&format!(r#"<input type="hidden" name="{}" value="1">"#, APPLIED_KEY));
        html.push_str("<h2>Filtros</h2>");

        html.push_str(&Self::checkboxes(
            "Selecione os países:",
            "country",
            &self.countries,
            &controls.filters.countries,
        ));
        html.push_str(&Self::checkboxes(
            "Selecione os setores:",
            "sector",
            &self.sectors,
            &controls.filters.sectors,
        ));

        let (min_year, max_year) = self.year_bounds;
        let (from, to) = controls.filters.years;
        html.push_str(&format!(
            r#"<fieldset><legend>Selecione o intervalo de anos:</legend>
<label>De <input type="number" name="year_from" min="{min}" max="{max}" value="{from}" onchange="this.form.submit()"></label>
<label>Até <input type="number" name="year_to" min="{min}" max="{max}" value="{to}" onchange="this.form.submit()"></label>
</fieldset>"#,
            min = min_year,
            max = max_year,
            from = from,
            to = to,
        ));

        html.push_str("<h2>Navegação</h2>");
        html.push_str(r#"<select name="page" onchange="this.form.submit()">"#);
        for page in Page::ALL {
            html.push_str(&format!(
                r#"<option value="{}"{}>{}</option>"#,
                page.slug(),
                selected(page == controls.page),
                escape(page.label()),
            ));
        }
        html.push_str("</select>");
        html.push_str("<noscript><button type=\"submit\">Aplicar</button></noscript>");
        html.push_str("</form>");

        html.push_str(HELP);
        html
    }

    fn checkboxes(legend: &str, name: &str, options: &[String], chosen: &[String]) -> String {
        let mut html = format!(
            r#"<fieldset class="options"><legend>{}</legend>"#,
            escape(legend)
        );
        for option in options {
            let checked = if chosen.contains(option) { " checked" } else { "" };
            html.push_str(&format!(
                r#"<label><input type="checkbox" name="{}" value="{}"{} onchange="this.form.submit()"> {}</label>"#,
                name,
                escape(option),
                checked,
                escape(option),
            ));
        }
        html.push_str("</fieldset>");
        html
    }
}

pub(crate) fn selected(is_selected: bool) -> &'static str {
    if is_selected {
        " selected"
    } else {
        ""
    }
}

const HELP: &str = r#"<h2>Ajuda</h2>
<details><summary>Sobre o Dashboard</summary>
<p>Este dashboard apresenta a evolução do uso de Inteligência Artificial em empresas entre 2015 e 2024:
investimentos em IA, crescimento de lucro, nota de inovação, principais usos e impacto operacional.</p>
</details>
<details><summary>Como funcionam os filtros</summary>
<p>Escolha países, setores e o intervalo de anos na barra lateral. Cada alteração recalcula todas as
tabelas, métricas e gráficos da página selecionada.</p>
</details>"#;
