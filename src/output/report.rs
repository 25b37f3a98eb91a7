use super::PageReport;
use crate::markup::escape_html;

fn table_open(table: &str) -> String {
    // The archive summary table is addressed by class on the portal pages.
    if table == "frozenarchivedetails" {
        format!(r#"<table class="{table}">"#)
    } else {
        format!(r#"<table id="{table}" class="columnsort">"#)
    }
}

pub fn render_html(report: &PageReport) -> Vec<u8> {
    let mut tables = String::new();
    for table in &report.tables {
        tables.push_str(&format!(
            "    <h2>{}</h2>\n    {}\n      <tbody>\n",
            escape_html(table.selector),
            table_open(table.table)
        ));
        for row in &table.rows {
            tables.push_str("        ");
            tables.push_str(row);
            tables.push('\n');
        }
        tables.push_str("      </tbody>\n    </table>\n");
    }

    let mut helpers = String::new();
    for script in &report.action_helpers {
        helpers.push_str("  ");
        helpers.push_str(script);
        helpers.push('\n');
    }

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{kind} - {page}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2em; }}
    table {{ border-collapse: collapse; margin-bottom: 2em; }}
    td {{ padding: 0.2em 0.6em; border-bottom: 1px solid #ddd; }}
    .centertext {{ text-align: center; }}
    .title {{ font-weight: bold; }}
    .border {{ border: 1px solid #aaa; }}
    .errortext {{ color: #c00; font-weight: bold; }}
    .sandboxres {{ font-style: italic; }}
  </style>
</head>
<body>
  <div id="ajax_status">{status}</div>
{tables}
{helpers}</body>
</html>
"####,
        kind = escape_html(report.kind),
        page = escape_html(&report.page_url),
        status = report.status,
        tables = tables,
        helpers = helpers,
    );
    html.into_bytes()
}
