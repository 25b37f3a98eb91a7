pub mod report;
pub mod terminal;

use serde::Serialize;

use crate::refresher::{ListKindName, RefreshOutcome};
use crate::view::{PageState, TableBody, STATUS_SELECTOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct TableReport {
    pub table: &'static str,
    pub selector: &'static str,
    pub rows: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PageReport {
    pub page_url: String,
    pub kind: &'static str,
    pub rows: usize,
    pub error: Option<String>,
    /// Status area markup as the page shows it.
    pub status: String,
    pub tables: Vec<TableReport>,
    pub action_helpers: Vec<String>,
    pub updated: Vec<&'static str>,
}

pub fn build_report(
    page_url: &str,
    kind: ListKindName,
    outcome: &RefreshOutcome,
    state: &PageState,
) -> PageReport {
    PageReport {
        page_url: page_url.to_string(),
        kind: kind.as_str(),
        rows: outcome.rows(),
        error: outcome.error().map(str::to_string),
        status: state.status.as_str().to_string(),
        tables: state
            .tables
            .iter()
            .map(|(table, rows)| TableReport {
                table: table.table_id(),
                selector: table.selector(),
                rows: rows.iter().map(|r| r.as_str().to_string()).collect(),
            })
            .collect(),
        action_helpers: state.helpers.iter().map(|h| h.script.clone()).collect(),
        updated: state
            .notifications
            .iter()
            .map(|t: &TableBody| t.table_id())
            .collect(),
    }
}

/// Strip tags and decode the entities [`crate::markup::escape_html`] emits.
pub fn markup_to_plain(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn render_text(report: &PageReport) -> Vec<u8> {
    let mut out = String::new();
    for table in &report.tables {
        out.push_str(&format!("# {}\n", table.selector));
        for row in &table.rows {
            out.push_str(row);
            out.push('\n');
        }
    }
    if !report.status.is_empty() {
        out.push_str(&format!(
            "# {STATUS_SELECTOR}\n{}\n",
            markup_to_plain(&report.status)
        ));
    }
    out.into_bytes()
}

pub fn render_json(report: &PageReport) -> Vec<u8> {
    serde_json::to_vec_pretty(report).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(report: &PageReport) -> Vec<u8> {
    report::render_html(report)
}

pub fn render(report: &PageReport, format: OutputFormat) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => render_json(report),
        OutputFormat::Html => render_html(report),
    }
}
