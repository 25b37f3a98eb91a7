use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use super::{ActionHelper, PageView, TableBody};
use crate::markup::Markup;

#[derive(Clone, Debug, Default, Serialize)]
pub struct PageState {
    pub tables: BTreeMap<TableBody, Vec<Markup>>,
    pub busy: bool,
    pub status: Markup,
    pub helpers: Vec<ActionHelper>,
    pub notifications: Vec<TableBody>,
}

impl PageState {
    pub fn rows(&self, table: TableBody) -> &[Markup] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// In-memory page, used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryPage {
    state: Mutex<PageState>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> PageState {
        self.lock().clone()
    }

    pub fn rows(&self, table: TableBody) -> Vec<Markup> {
        self.lock().rows(table).to_vec()
    }

    pub fn status(&self) -> String {
        self.lock().status.as_str().to_string()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }
}

impl PageView for MemoryPage {
    fn clear_rows(&self, table: TableBody) {
        self.lock().tables.insert(table, Vec::new());
    }

    fn append_row(&self, table: TableBody, row: Markup) {
        self.lock().tables.entry(table).or_default().push(row);
    }

    fn set_busy(&self, busy: bool) {
        self.lock().busy = busy;
    }

    fn set_status(&self, content: Markup) {
        self.lock().status = content;
    }

    fn append_status(&self, content: Markup) {
        self.lock().status.push(&content);
    }

    fn clear_status(&self) {
        self.lock().status = Markup::default();
    }

    fn inject_action_helper(&self, helper: ActionHelper) {
        self.lock().helpers.push(helper);
    }

    fn notify_updated(&self, table: TableBody) {
        self.lock().notifications.push(table);
    }
}
