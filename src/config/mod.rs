use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub kind: Option<String>,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub timeout: Option<u64>,
    pub insecure: Option<bool>,
    #[serde(alias = "site_vgrid_label")]
    pub vgrid_label: Option<String>,
    pub vgrid_links: Option<Vec<String>>,
    #[serde(alias = "notify_protocols")]
    pub protocols: Option<Vec<String>>,
    pub freeze_id: Option<String>,
    pub checksum: Option<String>,
    pub permanent_freeze: Option<bool>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub log_json: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".portal-lists").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, String> {
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn default_config_yaml() -> String {
    r#"# portal-lists config
#
# Location (default):
#   ~/.portal-lists/config.yml

# Portal page whose table should be refreshed
# url: https://portal.example.org/cgi-bin/redb.py
# kind: runtimeenvs   # runtimeenvs, archives, archive, vgrids, resources, people

# HTTP (optional)
# proxy: http://127.0.0.1:8080
# header: "Cookie: session=..."
timeout: 10
insecure: false

# Workgroups
vgrid_label: VGrid
# vgrid_links: [files, web, tracker, workflows, monitor]

# People
protocols: [email]

# Archive contents
# freeze_id: archive-abc123
# checksum: md5
permanent_freeze: false

# Output (optional)
# output: ./table.html
# output_format: html
no_color: false
log_json: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}
