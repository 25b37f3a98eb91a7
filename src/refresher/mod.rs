//! The list refresh cycle shared by every portal table.
//!
//! A refresh clears the table, shows a loading status, performs one read
//! through a [`ListSource`] and renders the response into a [`PageView`].
//! Server-reported errors and transport failures both end up in the page's
//! status area; nothing is returned as an `Err`.

mod archive;
mod people;
mod resource;
mod runtimeenv;
mod vgrid;

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tokio::task::JoinHandle;

use crate::markup::{self, Markup};
use crate::response::ResponseItem;
use crate::transport::{ListQuery, ListSource};
use crate::view::{ActionHelper, PageView, TableBody};

pub use vgrid::VgridColumn;

pub const DEFAULT_VGRID_LABEL: &str = "VGrid";

/// Which portal table to refresh, with its per-page parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListKind {
    RuntimeEnvs,
    Archives {
        permanent_freeze: bool,
    },
    ArchiveDetail {
        freeze_id: String,
        checksum: String,
    },
    Vgrids {
        label: String,
        /// Component column keys in display order. Empty means "use the
        /// components the backend lists".
        links: Vec<String>,
    },
    Resources,
    People {
        protocols: Vec<String>,
    },
}

/// Bare kind names, as given on the command line or in config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKindName {
    RuntimeEnvs,
    Archives,
    ArchiveDetail,
    Vgrids,
    Resources,
    People,
}

impl ListKindName {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "runtimeenvs" | "runtime-envs" | "redb" | "rte" => Some(Self::RuntimeEnvs),
            "archives" | "freezedb" => Some(Self::Archives),
            "archive" | "showfreeze" => Some(Self::ArchiveDetail),
            "vgrids" | "vgridman" | "workgroups" => Some(Self::Vgrids),
            "resources" | "resman" => Some(Self::Resources),
            "people" | "users" => Some(Self::People),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RuntimeEnvs => "runtimeenvs",
            Self::Archives => "archives",
            Self::ArchiveDetail => "archive",
            Self::Vgrids => "vgrids",
            Self::Resources => "resources",
            Self::People => "people",
        }
    }
}

fn pattern(cell: &'static OnceLock<Regex>, re: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(re).expect("action helper pattern is valid"))
}

impl ListKind {
    pub fn name(&self) -> ListKindName {
        match self {
            Self::RuntimeEnvs => ListKindName::RuntimeEnvs,
            Self::Archives { .. } => ListKindName::Archives,
            Self::ArchiveDetail { .. } => ListKindName::ArchiveDetail,
            Self::Vgrids { .. } => ListKindName::Vgrids,
            Self::Resources => ListKindName::Resources,
            Self::People { .. } => ListKindName::People,
        }
    }

    /// Table whose rows the refresh rebuilds and announces.
    pub fn table(&self) -> TableBody {
        match self {
            Self::RuntimeEnvs => TableBody::RuntimeEnvs,
            Self::Archives { .. } => TableBody::Archives,
            Self::ArchiveDetail { .. } => TableBody::ArchiveFiles,
            Self::Vgrids { .. } => TableBody::Vgrids,
            Self::Resources => TableBody::Resources,
            Self::People { .. } => TableBody::Users,
        }
    }

    pub fn secondary_tables(&self) -> &'static [TableBody] {
        match self {
            Self::ArchiveDetail { .. } => &[TableBody::ArchiveDetails],
            _ => &[],
        }
    }

    pub fn loading_message(&self) -> String {
        let what = match self {
            Self::RuntimeEnvs => "runtime envs".to_string(),
            Self::Archives { .. } => "archives".to_string(),
            Self::ArchiveDetail { freeze_id, .. } => format!("archive {freeze_id}"),
            Self::Vgrids { label, .. } => format!("{label}s"),
            Self::Resources => "resources".to_string(),
            Self::People { .. } => "users".to_string(),
        };
        format!("Loading {what} ...")
    }

    pub fn query(&self) -> ListQuery {
        match self {
            Self::ArchiveDetail {
                freeze_id,
                checksum,
            } => ListQuery::archive(freeze_id.clone(), checksum.clone()),
            _ => ListQuery::list(),
        }
    }

    /// Matches the action-helper scripts this page's rows call into.
    pub fn helper_pattern(&self) -> &'static Regex {
        static DELETE: OnceLock<Regex> = OnceLock::new();
        static VGRID: OnceLock<Regex> = OnceLock::new();
        static RESOURCE: OnceLock<Regex> = OnceLock::new();
        static SEND: OnceLock<Regex> = OnceLock::new();
        match self {
            Self::RuntimeEnvs | Self::Archives { .. } | Self::ArchiveDetail { .. } => {
                pattern(&DELETE, r"function delete[0-9]+")
            }
            Self::Vgrids { .. } => pattern(&VGRID, r"function (rm|req)vgrid(owner|member)[0-9]+"),
            Self::Resources => pattern(&RESOURCE, r"function (rm|req)resowner[0-9]+"),
            Self::People { .. } => pattern(&SEND, r"function send[a-z]+[0-9]+"),
        }
    }

    /// Joiner placed before each server error text.
    pub fn error_separator(&self) -> &'static str {
        match self {
            Self::ArchiveDetail { .. } => " ",
            _ => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was rendered. `server_error` holds the error text the
    /// backend reported alongside any rows.
    Rendered {
        rows: usize,
        server_error: Option<String>,
    },
    /// Nothing was rendered; the page shows `reason`.
    Failed { reason: String },
}

impl RefreshOutcome {
    pub fn rows(&self) -> usize {
        match self {
            Self::Rendered { rows, .. } => *rows,
            Self::Failed { .. } => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Rendered { server_error, .. } => server_error.as_deref(),
            Self::Failed { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Default)]
struct RenderState {
    rows: usize,
    error: String,
    reported_links: HashSet<String>,
    // Last entry came from us, not the server.
    after_diagnostic: bool,
}

impl RenderState {
    fn push_error(&mut self, separator: &str, text: &str) {
        if self.after_diagnostic {
            self.error.push(' ');
            self.after_diagnostic = false;
        } else {
            self.error.push_str(separator);
        }
        self.error.push_str(text);
    }

    /// Local diagnostics are always set apart from neighbouring server text.
    fn push_diagnostic(&mut self, text: &str) {
        if !self.error.is_empty() {
            self.error.push(' ');
        }
        self.error.push_str(text);
        self.after_diagnostic = true;
    }
}

fn append<V: PageView + ?Sized>(view: &V, state: &mut RenderState, table: TableBody, row: Markup) {
    view.append_row(table, row);
    state.rows += 1;
}

fn vgrid_columns(
    configured: &[String],
    components: &[String],
    state: &mut RenderState,
) -> Vec<Option<VgridColumn>> {
    let keys = if configured.is_empty() {
        components
    } else {
        configured
    };
    keys.iter()
        .map(|key| {
            let column = VgridColumn::parse(key);
            if column.is_none() && state.reported_links.insert(key.clone()) {
                tracing::error!(
                    event = "lists.vgrids.unknown_link",
                    link = %key,
                    message = "unknown vgrid link or missing vgrid item link"
                );
                state.push_diagnostic(&format!("unknown vgrid link: {key}"));
            }
            column
        })
        .collect()
}

fn apply_item<V: PageView + ?Sized>(
    kind: &ListKind,
    item: &ResponseItem,
    view: &V,
    state: &mut RenderState,
) {
    let table = kind.table();
    match (kind, item) {
        (_, ResponseItem::ErrorText { text }) => {
            tracing::error!(event = "lists.refresh.server_error", kind = kind.name().as_str(), text = %text);
            state.push_error(kind.error_separator(), text);
        }
        (_, ResponseItem::HtmlForm { text }) => {
            if kind.helper_pattern().is_match(text) {
                view.inject_action_helper(ActionHelper {
                    name: None,
                    script: text.clone(),
                });
            } else {
                tracing::debug!(event = "lists.refresh.form_skipped", kind = kind.name().as_str());
            }
        }
        (_, ResponseItem::ActionHelper { name, script }) => {
            if kind.helper_pattern().is_match(&format!("function {name}")) {
                view.inject_action_helper(ActionHelper {
                    name: Some(name.clone()),
                    script: script.clone(),
                });
            } else {
                tracing::debug!(
                    event = "lists.refresh.helper_skipped",
                    kind = kind.name().as_str(),
                    helper = %name
                );
            }
        }
        (ListKind::RuntimeEnvs, ResponseItem::RuntimeEnvironments { runtimeenvironments }) => {
            for rte in runtimeenvironments {
                append(view, state, table, runtimeenv::render_row(rte));
            }
        }
        (ListKind::Archives { permanent_freeze }, ResponseItem::FrozenArchives { frozenarchives }) => {
            for arch in frozenarchives {
                append(view, state, table, archive::render_row(arch, *permanent_freeze));
            }
        }
        (ListKind::ArchiveDetail { .. }, ResponseItem::FrozenArchive(detail)) => {
            for row in archive::render_details(detail) {
                view.append_row(TableBody::ArchiveDetails, row);
            }
            for file in &detail.frozenfiles {
                append(view, state, table, archive::render_file(file));
            }
        }
        (ListKind::Vgrids { links, .. }, ResponseItem::VgridList { vgrids, components }) => {
            let columns = vgrid_columns(links, components, state);
            for vgrid in vgrids {
                append(view, state, table, vgrid::render_row(vgrid, &columns));
            }
        }
        (ListKind::Resources, ResponseItem::ResourceList { resources }) => {
            for res in resources {
                append(view, state, table, resource::render_row(res));
            }
        }
        (ListKind::People { protocols }, ResponseItem::UserList { users }) => {
            for user in users {
                append(view, state, table, people::render_row(user, protocols));
            }
        }
        (_, other) => {
            tracing::trace!(
                event = "lists.refresh.item_ignored",
                kind = kind.name().as_str(),
                tag = other.tag()
            );
        }
    }
}

/// Run one refresh of `kind` and render it into `view`.
///
/// Concurrent refreshes of the same table are not coordinated: whichever
/// response lands last wins.
pub async fn refresh<S, V>(source: &S, view: &V, kind: &ListKind) -> RefreshOutcome
where
    S: ListSource + ?Sized,
    V: PageView + ?Sized,
{
    let table = kind.table();
    tracing::debug!(event = "lists.refresh.started", kind = kind.name().as_str());

    view.clear_rows(table);
    for extra in kind.secondary_tables() {
        view.clear_rows(*extra);
    }
    view.set_busy(true);
    view.set_status(Markup::text(kind.loading_message()));

    let items = match source.fetch(&kind.query()).await {
        Ok(items) => items,
        Err(e) => {
            let reason = e.to_string();
            tracing::error!(
                event = "lists.refresh.failed",
                kind = kind.name().as_str(),
                error = %reason
            );
            view.set_busy(false);
            view.clear_status();
            view.append_status(markup::error_span(&reason));
            return RefreshOutcome::Failed { reason };
        }
    };
    tracing::debug!(
        event = "lists.refresh.response",
        kind = kind.name().as_str(),
        items = items.len()
    );

    let mut state = RenderState::default();
    for item in &items {
        apply_item(kind, item, view, &mut state);
    }

    view.set_busy(false);
    view.clear_status();
    let server_error = if state.error.is_empty() {
        None
    } else {
        view.append_status(markup::error_span(&state.error));
        Some(state.error)
    };
    view.notify_updated(table);

    tracing::debug!(
        event = "lists.refresh.completed",
        kind = kind.name().as_str(),
        rows = state.rows
    );
    RefreshOutcome::Rendered {
        rows: state.rows,
        server_error,
    }
}

/// A source and a page bound together.
#[derive(Debug)]
pub struct Refresher<S, V> {
    source: Arc<S>,
    view: Arc<V>,
}

impl<S, V> Clone for Refresher<S, V> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            view: Arc::clone(&self.view),
        }
    }
}

impl<S, V> Refresher<S, V>
where
    S: ListSource + 'static,
    V: PageView + 'static,
{
    pub fn new(source: Arc<S>, view: Arc<V>) -> Self {
        Self { source, view }
    }

    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    pub async fn refresh(&self, kind: &ListKind) -> RefreshOutcome {
        refresh(self.source.as_ref(), self.view.as_ref(), kind).await
    }

    /// Dispatch a refresh and return at once.
    pub fn spawn(&self, kind: ListKind) -> JoinHandle<RefreshOutcome> {
        let source = Arc::clone(&self.source);
        let view = Arc::clone(&self.view);
        tokio::spawn(async move { refresh(source.as_ref(), view.as_ref(), &kind).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_accept_page_aliases() {
        assert_eq!(ListKindName::parse("redb"), Some(ListKindName::RuntimeEnvs));
        assert_eq!(ListKindName::parse(" Users "), Some(ListKindName::People));
        assert_eq!(
            ListKindName::parse("showfreeze"),
            Some(ListKindName::ArchiveDetail)
        );
        assert_eq!(ListKindName::parse("jobs"), None);
    }

    #[test]
    fn loading_messages() {
        assert_eq!(
            ListKind::RuntimeEnvs.loading_message(),
            "Loading runtime envs ..."
        );
        assert_eq!(
            ListKind::ArchiveDetail {
                freeze_id: "archive-1".to_string(),
                checksum: "md5".to_string()
            }
            .loading_message(),
            "Loading archive archive-1 ..."
        );
        assert_eq!(
            ListKind::Vgrids {
                label: "Workgroup".to_string(),
                links: vec![]
            }
            .loading_message(),
            "Loading Workgroups ..."
        );
    }

    #[test]
    fn helper_patterns_are_per_kind() {
        let people = ListKind::People { protocols: vec![] };
        assert!(people
            .helper_pattern()
            .is_match("<script>function sendemail616c696365() {}</script>"));
        assert!(!people.helper_pattern().is_match("function delete3()"));
        assert!(ListKind::Resources
            .helper_pattern()
            .is_match("function reqresowner12()"));
        let vgrids = ListKind::Vgrids {
            label: DEFAULT_VGRID_LABEL.to_string(),
            links: vec![],
        };
        assert!(vgrids.helper_pattern().is_match("function rmvgridmember0()"));
        assert!(!vgrids.helper_pattern().is_match("function rmvgridadmin0()"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unmatched_form_is_logged_at_debug() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let page = crate::view::MemoryPage::new();
        let mut state = RenderState::default();
        tracing::subscriber::with_default(subscriber, || {
            apply_item(
                &ListKind::Resources,
                &ResponseItem::HtmlForm {
                    text: "<form>nothing to see</form>".to_string(),
                },
                &page,
                &mut state,
            );
        });
        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("lists.refresh.form_skipped"));
        assert!(page.snapshot().helpers.is_empty());
    }

    #[test]
    fn diagnostics_are_set_apart_from_server_text() {
        let mut state = RenderState::default();
        state.push_error("", "Partial listing.");
        state.push_diagnostic("unknown vgrid link: wiki");
        state.push_error("", "Retry later.");
        assert_eq!(
            state.error,
            "Partial listing. unknown vgrid link: wiki Retry later."
        );

        let mut fresh = RenderState::default();
        fresh.push_diagnostic("unknown vgrid link: wiki");
        assert_eq!(fresh.error, "unknown vgrid link: wiki");
    }

    #[test]
    fn archive_detail_uses_its_own_query_and_tables() {
        let kind = ListKind::ArchiveDetail {
            freeze_id: "archive-1".to_string(),
            checksum: "sha1".to_string(),
        };
        assert_eq!(kind.query(), ListQuery::archive("archive-1", "sha1"));
        assert_eq!(kind.table(), TableBody::ArchiveFiles);
        assert_eq!(kind.secondary_tables(), &[TableBody::ArchiveDetails]);
        assert_eq!(kind.error_separator(), " ");
    }
}
