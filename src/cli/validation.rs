use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::refresher::ListKindName;

pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.kind.as_deref() {
        if ListKindName::parse(raw).is_none() {
            return Err(format!(
                "invalid --kind '{raw}', expected runtimeenvs, archives, archive, vgrids, resources or people"
            ));
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or html"
            ));
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.header.as_deref() {
        if !raw.contains(':') {
            return Err(format!("invalid --header '{raw}', expected 'Key: Value'"));
        }
    }
    if let Some(raw) = args.protocols.as_deref() {
        for proto in parse_csv(raw) {
            if !proto.chars().all(|c| c.is_ascii_lowercase()) {
                return Err(format!(
                    "invalid protocol '{proto}', expected lowercase letters only"
                ));
            }
        }
    }
    Ok(())
}
