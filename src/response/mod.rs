//! Decoding of the backend's JSON list responses.

mod records;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use records::{
    ArchiveDetail, ArchiveRecord, FrozenFile, ResourceRecord, RuntimeEnvRecord, UserRecord,
    VgridRecord,
};

/// Clickable action attached to a record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub destination: String,
}

/// A primitive record value as the backend sent it.
///
/// Renders like the portal pages expect: strings verbatim, arrays
/// comma-joined, null and missing fields as nothing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Field(serde_json::Value);

impl Field {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn is_truthy(&self) -> bool {
        use serde_json::Value;
        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Element count for list values, zero otherwise.
    pub fn len(&self) -> usize {
        match &self.0 {
            serde_json::Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self(serde_json::Value::String(value.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use serde_json::Value;
        match &self.0 {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", Field(item.clone()))?;
                }
                Ok(())
            }
            Value::Number(n) => match n.as_f64() {
                // Integral floats print without a fraction, as the pages do.
                Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => {
                    write!(f, "{}", v as i64)
                }
                _ => write!(f, "{n}"),
            },
            other => write!(f, "{other}"),
        }
    }
}

/// One entry of a list response, discriminated by `object_type`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
pub enum ResponseItem {
    ErrorText {
        #[serde(default)]
        text: String,
    },
    /// Free-form markup. Only action-helper scripts are of interest.
    HtmlForm {
        #[serde(default)]
        text: String,
    },
    /// Structured action helper: `name` is the handler function name.
    ActionHelper { name: String, script: String },
    #[serde(rename = "runtimeenvironments")]
    RuntimeEnvironments {
        #[serde(default, deserialize_with = "lenient_list")]
        runtimeenvironments: Vec<RuntimeEnvRecord>,
    },
    #[serde(rename = "frozenarchives")]
    FrozenArchives {
        #[serde(default, deserialize_with = "lenient_list")]
        frozenarchives: Vec<ArchiveRecord>,
    },
    #[serde(rename = "frozenarchive")]
    FrozenArchive(ArchiveDetail),
    VgridList {
        #[serde(default, deserialize_with = "lenient_list")]
        vgrids: Vec<VgridRecord>,
        /// Link columns the site enabled, in display order.
        #[serde(default)]
        components: Vec<String>,
    },
    ResourceList {
        #[serde(default, deserialize_with = "lenient_list")]
        resources: Vec<ResourceRecord>,
    },
    UserList {
        #[serde(default, deserialize_with = "lenient_list")]
        users: Vec<UserRecord>,
    },
    #[serde(other)]
    Other,
}

impl ResponseItem {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ErrorText { .. } => "error_text",
            Self::HtmlForm { .. } => "html_form",
            Self::ActionHelper { .. } => "action_helper",
            Self::RuntimeEnvironments { .. } => "runtimeenvironments",
            Self::FrozenArchives { .. } => "frozenarchives",
            Self::FrozenArchive(_) => "frozenarchive",
            Self::VgridList { .. } => "vgrid_list",
            Self::ResourceList { .. } => "resource_list",
            Self::UserList { .. } => "user_list",
            Self::Other => "other",
        }
    }
}

/// Decode a list response.
///
/// Only a body that is not a JSON array is an error. Items that do not
/// decode are logged and skipped so the rest of the response still renders.
pub fn parse_list_response(body: &[u8]) -> Result<Vec<ResponseItem>, serde_json::Error> {
    let raw: Vec<serde_json::Value> = serde_json::from_slice(body)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| {
            serde_json::from_value::<ResponseItem>(value)
                .map_err(|e| {
                    tracing::warn!(event = "lists.response.item_skipped", error = %e);
                })
                .ok()
        })
        .collect())
}

/// Record list where undecodable entries are dropped with a warning.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(event = "lists.response.record_skipped", error = %e);
                None
            }
        })
        .collect())
}

/// Optional link that reads as absent when malformed, leaving its cell empty.
pub(crate) fn lenient_link<'de, D>(deserializer: D) -> Result<Option<LinkDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(decode_link))
}

pub(crate) fn decode_link(value: serde_json::Value) -> Option<LinkDescriptor> {
    if value.is_null() {
        return None;
    }
    match LinkDescriptor::deserialize(value) {
        Ok(link) => Some(link),
        Err(e) => {
            tracing::warn!(event = "lists.response.link_malformed", error = %e);
            None
        }
    }
}
