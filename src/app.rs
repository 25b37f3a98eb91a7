use std::sync::Arc;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation::{self, parse_csv};
use crate::config::{self, ConfigFile};
use crate::output::terminal::TerminalPage;
use crate::output::{self, markup_to_plain, OutputFormat};
use crate::refresher::{ListKind, ListKindName, RefreshOutcome, Refresher, DEFAULT_VGRID_LABEL};
use crate::transport::{ClientOptions, HttpListSource};

fn print_banner() {
    println!(
        ":: portal-lists v{} - grid portal list refresher",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Cell texts of a rendered `<tr>`, for terminal display.
fn row_cells(row: &str) -> Vec<String> {
    row.split("</td>")
        .map(markup_to_plain)
        .map(|cell| cell.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|cell| !cell.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
struct RunConfig {
    kind: ListKind,
    client: ClientOptions,
    output: Option<String>,
    output_format: Option<String>,
    no_color: bool,
    quiet: bool,
    verbose: u8,
    log_json: bool,
}

fn csv_or_list(raw: Option<String>, cfg: Option<Vec<String>>) -> Option<Vec<String>> {
    match raw {
        Some(raw) => Some(parse_csv(&raw)),
        None => cfg.map(|values| {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        }),
    }
}

fn build_kind(args: &CliArgs, cfg: &ConfigFile) -> Result<ListKind, String> {
    let raw = args
        .kind
        .clone()
        .or_else(|| cfg.kind.clone())
        .ok_or_else(|| "no table kind given (use --kind or 'kind' in config)".to_string())?;
    let name =
        ListKindName::parse(&raw).ok_or_else(|| format!("unknown table kind '{raw}'"))?;

    let kind = match name {
        ListKindName::RuntimeEnvs => ListKind::RuntimeEnvs,
        ListKindName::Archives => ListKind::Archives {
            permanent_freeze: args.permanent_freeze || cfg.permanent_freeze.unwrap_or(false),
        },
        ListKindName::ArchiveDetail => {
            let freeze_id = args
                .freeze_id
                .clone()
                .or_else(|| cfg.freeze_id.clone())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| "kind 'archive' needs --freeze-id".to_string())?;
            let checksum = args
                .checksum
                .clone()
                .or_else(|| cfg.checksum.clone())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| "kind 'archive' needs --checksum".to_string())?;
            ListKind::ArchiveDetail {
                freeze_id,
                checksum,
            }
        }
        ListKindName::Vgrids => ListKind::Vgrids {
            label: args
                .vgrid_label
                .clone()
                .or_else(|| cfg.vgrid_label.clone())
                .unwrap_or_else(|| DEFAULT_VGRID_LABEL.to_string()),
            links: csv_or_list(args.vgrid_links.clone(), cfg.vgrid_links.clone())
                .unwrap_or_default(),
        },
        ListKindName::Resources => ListKind::Resources,
        ListKindName::People => ListKind::People {
            protocols: csv_or_list(args.protocols.clone(), cfg.protocols.clone())
                .unwrap_or_else(|| vec!["email".to_string()]),
        },
    };
    Ok(kind)
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let kind = build_kind(&args, &cfg)?;

    let page_url = args
        .url
        .or(cfg.url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| "no portal page given (use --url or 'url' in config)".to_string())?;
    if reqwest::Url::parse(&page_url).is_err() {
        return Err(format!("invalid URL: {page_url}"));
    }

    let timeout_seconds = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout_seconds == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }

    let client = ClientOptions {
        page_url,
        proxy: args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty()),
        header: args.header.or(cfg.header).filter(|h| !h.trim().is_empty()),
        timeout_seconds,
        insecure: args.insecure || cfg.insecure.unwrap_or(false),
    };

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = args.output_format.or(cfg.output_format);
    if let Some(raw) = output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid output format '{raw}'"));
        }
    }

    Ok(RunConfig {
        kind,
        client,
        output,
        output_format,
        no_color,
        quiet: args.quiet,
        verbose: args.verbose,
        log_json: args.log_json || cfg.log_json.unwrap_or(false),
    })
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let source = HttpListSource::new(&run.client).map_err(|e| e.to_string())?;
    let page_url = source.page_url().to_string();

    format_kv_line("Page", &page_url);
    format_kv_line("Table", run.kind.name().as_str());
    if let ListKind::ArchiveDetail { freeze_id, .. } = &run.kind {
        format_kv_line("Archive", freeze_id);
    }
    if let Some(proxy) = run.client.proxy.as_deref() {
        format_kv_line("Proxy", proxy);
    }
    format_kv_line("Timeout", &format!("{}s", run.client.timeout_seconds));
    format_kv_line("Insecure", format_bool(run.client.insecure));
    if let Some(path) = run.output.as_deref() {
        format_kv_line("Output", path);
    }
    println!();

    let now = Instant::now();
    let page = Arc::new(TerminalPage::new(run.quiet || run.log_json));
    let refresher = Refresher::new(Arc::new(source), Arc::clone(&page));
    let outcome = refresher.refresh(&run.kind).await;
    let state = page.snapshot();

    for (table, rows) in state.tables.iter() {
        println!(":: {} ({} rows)", table.table_id().bold(), rows.len());
        for row in rows {
            println!("{}", row_cells(row.as_str()).join(" | "));
        }
        println!();
    }
    if let Some(err) = outcome.error() {
        println!("{} {}", ":: Error".yellow().bold(), err.yellow());
    }

    if let Some(outfile_path) = run.output.as_ref() {
        let output_format = run
            .output_format
            .as_deref()
            .and_then(OutputFormat::parse)
            .or_else(|| output::infer_format_from_path(outfile_path))
            .unwrap_or(OutputFormat::Text);
        let report = output::build_report(&page_url, run.kind.name(), &outcome, &state);
        let rendered = output::render(&report, output_format);

        let mut outfile = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(outfile_path)
            .await
            .map_err(|e| format!("failed to open output file: {e}"))?;
        outfile
            .write_all(&rendered)
            .await
            .map_err(|_| "failed to write output file".to_string())?;
    }

    match outcome {
        RefreshOutcome::Rendered { rows, .. } => {
            println!(
                ":: Completed :: {} rows in {}ms ::",
                rows,
                now.elapsed().as_millis()
            );
            Ok(())
        }
        RefreshOutcome::Failed { reason } => Err(format!("refresh failed: {reason}")),
    }
}

fn init_config(path: Option<&str>) -> Result<(), String> {
    let path = match path {
        Some(p) => config::expand_tilde(p),
        None => config::default_config_path()
            .ok_or_else(|| "could not determine home directory".to_string())?,
    };
    config::ensure_default_config_file(&path)?;
    println!(":: Config    : {}", path.display());
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        return init_config(args.config.as_deref());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    crate::logging::init_logging(run.verbose, run.log_json);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
