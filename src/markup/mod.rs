//! Table cell and anchor builders.
//!
//! Every value taken from a backend record goes through [`Markup::text`],
//! which escapes it. Only fragments built by the helpers in this module are
//! marked trusted.

use std::fmt;

use serde::Serialize;

use crate::response::{Field, LinkDescriptor};

pub const CENTER_CLASS: &str = "class='centertext'";
pub const TITLE_CLASS: &str = "class='title'";
pub const BORDER_CLASS: &str = "class='border'";
pub const ERROR_CLASS: &str = "errortext";

/// Placeholder for a per-row action that the backend did not offer.
pub const MISSING_ACTION: &str = "---";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Escaped text.
    pub fn text(value: impl AsRef<str>) -> Self {
        Self(escape_html(value.as_ref()))
    }

    /// Markup that is embedded as-is. Callers vouch for its safety.
    pub fn trusted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, other: &Markup) {
        self.0.push_str(&other.0);
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escaped text form of a record field.
pub fn field(value: &Field) -> Markup {
    Markup::text(value.to_string())
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn base_td(content: &Markup) -> Markup {
    Markup(format!("<td>{content}</td>"))
}

/// Cell with an attribute string. `attrs` must come from [`hint`] or one of
/// the class constants.
pub fn attr_td(content: &Markup, attrs: &str) -> Markup {
    Markup(format!("<td {attrs}>{content}</td>"))
}

pub fn center_td(content: &Markup) -> Markup {
    attr_td(content, CENTER_CLASS)
}

pub fn title_td(content: &Markup) -> Markup {
    attr_td(content, TITLE_CLASS)
}

pub fn border_td(content: &Markup) -> Markup {
    attr_td(content, BORDER_CLASS)
}

/// Attribute string of the form `<class_attr> title=<q><title><q>`.
pub fn hint(class_attr: &str, title: &str, quote: char) -> String {
    format!("{class_attr} title={quote}{}{quote}", escape_html(title))
}

pub fn row(cells: &[Markup]) -> Markup {
    let mut out = String::from("<tr>");
    for cell in cells {
        out.push_str(cell.as_str());
    }
    out.push_str("</tr>");
    Markup(out)
}

pub fn format_url(url: &str) -> Markup {
    let url = escape_html(url);
    Markup(format!(r#"<a class="link" href="{url}">{url}</a>"#))
}

pub fn format_link(link: &LinkDescriptor) -> Markup {
    let mut out = String::from("<a ");
    let attrs = [
        ("id", link.id.as_deref()),
        ("class", link.class.as_deref()),
        ("title", link.title.as_deref()),
        ("target", link.target.as_deref()),
    ];
    for (name, value) in attrs {
        if let Some(value) = value {
            out.push_str(&format!(r#"{name}="{}" "#, escape_html(value)));
        }
    }
    out.push_str(&format!(r#"href="{}">"#, escape_html(&link.destination)));
    if let Some(text) = link.text.as_deref() {
        out.push_str(&escape_html(text));
    }
    out.push_str("</a>");
    Markup(out)
}

/// Anchor for an optional link, empty when the link is absent.
pub fn optional_link(link: Option<&LinkDescriptor>) -> Markup {
    link.map(format_link).unwrap_or_default()
}

pub fn error_span(message: &str) -> Markup {
    Markup(format!(
        "<span class='{ERROR_CLASS}'>Error: {}</span>",
        escape_html(message)
    ))
}
