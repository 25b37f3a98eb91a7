//! The page the refreshers write to.
//!
//! Refreshers never reach for a global document. They get a [`PageView`]
//! handle and address containers through [`TableBody`].

mod memory;

use serde::Serialize;

use crate::markup::Markup;

pub use memory::{MemoryPage, PageState};

pub const STATUS_SELECTOR: &str = "#ajax_status";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableBody {
    RuntimeEnvs,
    Archives,
    ArchiveFiles,
    ArchiveDetails,
    Vgrids,
    Resources,
    Users,
}

impl TableBody {
    pub fn selector(self) -> &'static str {
        match self {
            Self::RuntimeEnvs => "#runtimeenvtable tbody",
            Self::Archives => "#frozenarchivetable tbody",
            Self::ArchiveFiles => "#frozenfilestable tbody",
            Self::ArchiveDetails => ".frozenarchivedetails tbody",
            Self::Vgrids => "#vgridtable tbody",
            Self::Resources => "#resourcetable tbody",
            Self::Users => "#usertable tbody",
        }
    }

    /// Table element that receives the "updated" notification.
    pub fn table_id(self) -> &'static str {
        match self {
            Self::RuntimeEnvs => "runtimeenvtable",
            Self::Archives => "frozenarchivetable",
            Self::ArchiveFiles => "frozenfilestable",
            Self::ArchiveDetails => "frozenarchivedetails",
            Self::Vgrids => "vgridtable",
            Self::Resources => "resourcetable",
            Self::Users => "usertable",
        }
    }
}

/// Page-level handler script that row actions call into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionHelper {
    /// Handler name when the backend sent it structured.
    pub name: Option<String>,
    pub script: String,
}

/// Mutable handle on the rendered page.
///
/// Methods take `&self` so one page can be shared by concurrently running
/// refreshers; implementations provide their own interior mutability.
pub trait PageView: Send + Sync {
    fn clear_rows(&self, table: TableBody);

    fn append_row(&self, table: TableBody, row: Markup);

    fn set_busy(&self, busy: bool);

    /// Replace the status area content.
    fn set_status(&self, content: Markup);

    fn append_status(&self, content: Markup);

    fn clear_status(&self);

    fn inject_action_helper(&self, helper: ActionHelper);

    /// Tell dependent widgets (sorters, pagers) that `table` changed.
    fn notify_updated(&self, table: TableBody);
}
