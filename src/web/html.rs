//! HTML helpers: escaping, number formatting and the page shell.

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub const PAGE_TITLE: &str = "Avanço da IA nas Empresas";
pub const HEADING: &str = "Avanço da Inteligência Artificial nas Empresas (2015–2024)";
pub const AUTHORS: &str = "Autores: Flamarion Fagundes, Lucas Fetter e Vitor Edson";

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// JSON embedded in a `<script>` block must not close the tag early.
pub fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// `1234567.891` with 2 decimals → `1,234,567.89`. Non-finite values render as `-`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + decimals + 2);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn currency(value: f64) -> String {
    let formatted = format_thousands(value, 2);
    match formatted.strip_prefix('-') {
        _ if !value.is_finite() => formatted,
        Some(positive) => format!("-${}", positive),
        None => format!("${}", formatted),
    }
}

pub fn percent(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    format!("{:.2}%", value)
}

pub fn score(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    format!("{:.1}", value)
}

pub fn warning(message: &str) -> String {
    format!(r#"<div class="warning">{}</div>"#, escape(message))
}

pub fn error_block(message: &str) -> String {
    format!(r#"<div class="error"><strong>Erro:</strong> {}</div>"#, escape(message))
}

/// Full HTML document: sidebar controls on the left, page content on the right.
pub fn document(sidebar: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>📊 {title}</title>
<script src="{plotly}" charset="utf-8"></script>
<style>
body {{ margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }}
aside {{ width: 300px; padding: 1rem; background: #f0f2f6; box-sizing: border-box; }}
main {{ flex: 1; padding: 1rem 2rem; min-width: 0; }}
.metrics {{ display: flex; gap: 2rem; }}
.metric .value {{ font-size: 1.8rem; }}
.warning {{ background: #fffbe6; border: 1px solid #f0c36d; padding: .75rem; }}
.error {{ background: #fdecea; border: 1px solid #f5a3a3; padding: .75rem; }}
.options label {{ display: block; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ddd; padding: .25rem .5rem; }}
</style>
</head>
<body>
<aside>{sidebar}</aside>
<main>
<h1>{heading}</h1>
<p>{authors}</p>
{main}
</main>
<script>
for (const link of document.querySelectorAll("a.export")) {{
  link.href += window.location.search;
}}
</script>
</body>
</html>
"#,
        title = escape(PAGE_TITLE),
        plotly = PLOTLY_CDN,
        sidebar = sidebar,
        heading = escape(HEADING),
        authors = escape(AUTHORS),
        main = main,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"P&D" 'IA'</b>"#),
            "&lt;b&gt;&quot;P&amp;D&quot; &#39;IA&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(999.5, 0), "1,000");
        assert_eq!(format_thousands(12.0, 2), "12.00");
        assert_eq!(format_thousands(-4321.0, 1), "-4,321.0");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
        assert_eq!(format_thousands(f64::NAN, 2), "-");
    }

    #[test]
    fn formats_metrics() {
        assert_eq!(currency(157304.2), "$157,304.20");
        assert_eq!(currency(-12.5), "-$12.50");
        assert_eq!(currency(f64::NAN), "-");
        assert_eq!(percent(9.876), "9.88%");
        assert_eq!(score(7.25), "7.2");
    }

    #[test]
    fn script_json_cannot_close_the_tag() {
        assert_eq!(script_json(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }
}
