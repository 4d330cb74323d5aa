//! HTML rendering of the session view

use std::fmt::Write;

use crate::models::ClimateRecord;
use crate::session::SessionView;

const TITLE: &str = "NASA POWER - Download de Dados Climáticos";

const STYLE: &str = "body{font-family:sans-serif;max-width:72rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin:.5rem 0}\
.error{color:#b00020}.notice{color:#8a5300}\
table{border-collapse:collapse;font-size:.85rem}\
th,td{border:1px solid #ccc;padding:.2rem .4rem;text-align:right}\
.table{max-height:32rem;overflow:auto;margin-top:1rem}\
header img{max-width:100%}aside img{max-width:12rem;float:right;margin:0 0 1rem 1rem}";

const LAMMA_LOGO_URL: &str =
    "https://lamma.com.br/wp-content/uploads/2024/08/lammapy-removebg-preview.png";
const POWER_LOGO_URL: &str = "https://www.earthdata.nasa.gov/s3fs-public/styles/small_third_320px_/public/2022-11/power_logo_event.png?VersionId=pZIOrAAZH6vCGOJMjhhwP91WJkg0sCus&itok=DrjfYom6";

/// Keeps the end picker's minimum on the chosen start while the user edits the form
const DATE_BOUNDS_SCRIPT: &str = "<script>\n\
(function(){var f=document.getElementById('climate-form');\
f.start.addEventListener('change',function(){\
f.end.min=f.start.value;\
if(f.end.value<f.start.value){f.end.value=f.start.value;}});})();\n\
</script>\n";

/// Escape text for use in HTML content and attribute values
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<header><img src=\"{lamma}\" alt=\"LAMMA\"></header>\n\
<aside><img src=\"{power}\" alt=\"NASA POWER\"></aside>\n\
<h1>{TITLE}</h1>\n{body}</body>\n</html>\n",
        lamma = escape(LAMMA_LOGO_URL),
        power = escape(POWER_LOGO_URL),
    )
}

/// Full page for one session
#[must_use]
pub fn page(view: &SessionView<'_>) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "<form id=\"climate-form\" method=\"post\" action=\"/fetch\">\n\
<button type=\"submit\" formaction=\"/location\" formnovalidate>Usar localização atual</button>\n\
<label>Latitude <input type=\"number\" name=\"latitude\" step=\"0.000001\" min=\"-90\" max=\"90\" value=\"{lat}\" required></label>\n\
<label>Longitude <input type=\"number\" name=\"longitude\" step=\"0.000001\" min=\"-180\" max=\"180\" value=\"{lon}\" required></label>\n\
<label>Data de início <input type=\"date\" name=\"start\" value=\"{start}\" min=\"{start_min}\" max=\"{start_max}\" required></label>\n\
<label>Data de fim <input type=\"date\" name=\"end\" value=\"{end}\" min=\"{end_min}\" max=\"{end_max}\" required></label>\n\
<button type=\"submit\">Buscar dados</button>\n\
</form>\n",
        lat = escape(&view.latitude),
        lon = escape(&view.longitude),
        start = view.start,
        start_min = view.start_min,
        start_max = view.start_max,
        end = view.end,
        end_min = view.end_min,
        end_max = view.end_max,
    );
    body.push_str(DATE_BOUNDS_SCRIPT);

    if let Some(notice) = view.notice {
        let _ = writeln!(body, "<p class=\"notice\">{}</p>", escape(notice));
    }
    if let Some(error) = view.error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }

    if view.downloadable {
        let _ = writeln!(
            body,
            "<p><a href=\"/download\" download>Baixar em Excel</a></p>"
        );
        body.push_str(&table(view.records));
    }

    document(&body)
}

/// Data table, one row per record
#[must_use]
pub fn table(records: &[ClimateRecord]) -> String {
    let mut html = String::from("<div class=\"table\"><table>\n<thead><tr>");
    for column in ClimateRecord::header() {
        let _ = write!(html, "<th>{column}</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for record in records {
        let _ = write!(html, "<tr><td>{}</td>", record.date_key());
        for value in record.values() {
            let _ = write!(html, "<td>{value}</td>");
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody></table></div>\n");
    html
}

/// Minimal page carrying a single message and a way back
#[must_use]
pub fn message_page(message: &str) -> String {
    document(&format!(
        "<p class=\"error\">{}</p>\n<p><a href=\"/\">Voltar</a></p>\n",
        escape(message)
    ))
}
