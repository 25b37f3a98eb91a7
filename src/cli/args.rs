use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "portal-lists",
    version,
    about = "refresh grid portal list tables",
    long_about = "portal-lists fetches the JSON listing behind a grid portal page and renders the page's table rows.\n\nExamples:\n  portal-lists -u https://portal.example/cgi-bin/redb.py -k runtimeenvs\n  portal-lists -u https://portal.example/cgi-bin/vgridman.py -k vgrids --links files,web,monitor\n  portal-lists -u https://portal.example/cgi-bin/showfreeze.py -k archive --freeze-id archive-x1 --checksum md5 -o files.html\n\nTip: Use --config to keep the portal URL and site settings out of the command line."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "no-color",
        visible_alias = "nc",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'q',
        long = "quiet",
        help_heading = "Output",
        help = "Hide the loading spinner."
    )]
    pub quiet: bool,

    #[arg(
        long = "log-json",
        help_heading = "Output",
        help = "Emit logs as JSON lines on stderr."
    )]
    pub log_json: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered page to a file."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output file format: text, json, html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Portal page whose listing is refreshed."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'k',
        long = "kind",
        value_name = "KIND",
        help_heading = "Input",
        help = "Table kind: runtimeenvs, archives, archive, vgrids, resources, people."
    )]
    pub kind: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.portal-lists/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "freeze-id",
        value_name = "ID",
        help_heading = "Archives",
        help = "Archive to list (kind 'archive')."
    )]
    pub freeze_id: Option<String>,

    #[arg(
        long = "checksum",
        value_name = "ALGO",
        help_heading = "Archives",
        help = "Checksum shown for archive files (kind 'archive')."
    )]
    pub checksum: Option<String>,

    #[arg(
        long = "permanent",
        visible_alias = "permanent-freeze",
        help_heading = "Archives",
        help = "Archives are permanent: omit the delete column."
    )]
    pub permanent_freeze: bool,

    #[arg(
        long = "label",
        visible_alias = "vgrid-label",
        value_name = "LABEL",
        help_heading = "Workgroups",
        help = "Site label for vgrids, used in the loading message."
    )]
    pub vgrid_label: Option<String>,

    #[arg(
        long = "links",
        visible_alias = "vgrid-links",
        value_name = "KEYS",
        help_heading = "Workgroups",
        help = "Component columns in order (comma-separated: files,web,scm,tracker,forum,workflows,monitor)."
    )]
    pub vgrid_links: Option<String>,

    #[arg(
        long = "protocols",
        value_name = "LIST",
        help_heading = "People",
        help = "Contact protocols with a send column each (comma-separated)."
    )]
    pub protocols: Option<String>,

    #[arg(
        short = 'p',
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Proxy for the request."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "header",
        value_name = "HEADER",
        help_heading = "HTTP",
        help = "Extra request header 'Key: Value' (e.g. a session cookie)."
    )]
    pub header: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "insecure",
        help_heading = "HTTP",
        help = "Accept invalid TLS certificates."
    )]
    pub insecure: bool,
}
