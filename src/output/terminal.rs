use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::markup_to_plain;
use crate::markup::Markup;
use crate::view::{ActionHelper, MemoryPage, PageState, PageView, TableBody};

/// Page for the command line: keeps the rendered state in memory and shows
/// the busy indicator as a spinner on stderr.
pub struct TerminalPage {
    page: MemoryPage,
    spinner: ProgressBar,
}

impl TerminalPage {
    pub fn new(quiet: bool) -> Self {
        let spinner = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_draw_target(ProgressDrawTarget::stderr());
            pb
        };
        spinner.set_style(
            ProgressStyle::with_template(":: {spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self {
            page: MemoryPage::new(),
            spinner,
        }
    }

    pub fn snapshot(&self) -> PageState {
        self.page.snapshot()
    }
}

impl PageView for TerminalPage {
    fn clear_rows(&self, table: TableBody) {
        self.page.clear_rows(table);
    }

    fn append_row(&self, table: TableBody, row: Markup) {
        self.page.append_row(table, row);
    }

    fn set_busy(&self, busy: bool) {
        self.page.set_busy(busy);
        if busy {
            self.spinner.enable_steady_tick(Duration::from_millis(120));
        } else {
            self.spinner.finish_and_clear();
        }
    }

    fn set_status(&self, content: Markup) {
        self.spinner.set_message(markup_to_plain(content.as_str()));
        self.page.set_status(content);
    }

    fn append_status(&self, content: Markup) {
        self.page.append_status(content);
    }

    fn clear_status(&self) {
        self.spinner.set_message("");
        self.page.clear_status();
    }

    fn inject_action_helper(&self, helper: ActionHelper) {
        self.page.inject_action_helper(helper);
    }

    fn notify_updated(&self, table: TableBody) {
        tracing::debug!(event = "lists.page.table_updated", table = table.table_id());
        self.page.notify_updated(table);
    }
}
