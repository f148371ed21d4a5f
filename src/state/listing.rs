/// File list view state
///
/// Combines the committed filter set, the debounced search box and the
/// listing cache. Methods that may require a fetch return a `FetchTicket`;
/// the caller runs the request and hands the ticket back with the result.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use super::cache::{FetchTicket, QueryCache, QueryState};
use super::filter::{FilterFields, FilterState};
use super::notify::Notification;
use super::search::{DebounceTicket, Debouncer, SEARCH_DEBOUNCE};
use crate::api::{ApiError, FileRecord};

pub type ListTicket = FetchTicket<FilterState>;

pub const NO_FILES_TITLE: &str = "No files found";
pub const NO_MATCHES_HINT: &str = "Try adjusting your search/filters";
pub const GET_STARTED_HINT: &str = "Get started by uploading a file";

/// What the list area should show
#[derive(Debug, PartialEq)]
pub enum ListStatus {
    Loading,
    Failed(String),
    Empty { hint: &'static str },
    Rows(Arc<Vec<FileRecord>>),
}

#[derive(Debug)]
pub struct FileListView {
    filters: FilterState,
    search_input: String,
    show_filters: bool,
    debouncer: Debouncer<String>,
    cache: QueryCache<FilterState, Vec<FileRecord>>,
    deleting: HashSet<String>,
    downloading: Option<String>,
}

impl Default for FileListView {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            search_input: String::new(),
            show_filters: false,
            debouncer: Debouncer::new(SEARCH_DEBOUNCE),
            cache: QueryCache::new(),
            deleting: HashSet::new(),
            downloading: None,
        }
    }
}

impl FileListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fetch key
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Text in the search box, applied or not
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn show_filters(&self) -> bool {
        self.show_filters
    }

    pub fn toggle_filters(&mut self) {
        self.show_filters = !self.show_filters;
    }

    pub fn debounce_delay(&self) -> std::time::Duration {
        self.debouncer.delay()
    }

    /// Fetch the current key if the cache has nothing fresh for it
    pub fn ensure_fetch(&mut self) -> Option<ListTicket> {
        self.cache.begin_fetch(&self.filters)
    }

    /// Merge a filter panel report
    pub fn apply_filters(&mut self, fields: &FilterFields) -> Option<ListTicket> {
        self.filters = self.filters.with_fields(fields);
        self.ensure_fetch()
    }

    /// Record a keystroke in the search box; the returned ticket must be
    /// handed back to `settle_search` after the debounce delay.
    pub fn edit_search(&mut self, text: String) -> DebounceTicket {
        self.search_input = text.clone();
        self.debouncer.schedule(text)
    }

    /// Apply the search text if `ticket` belongs to the last keystroke
    pub fn settle_search(&mut self, ticket: DebounceTicket) -> Option<ListTicket> {
        let search = self.debouncer.fire(ticket)?;
        if search == self.filters.search {
            return None;
        }
        self.filters = self.filters.with_search(search);
        self.ensure_fetch()
    }

    /// Store a listing result under the key it was fetched for. Returns a
    /// follow-up fetch when the current key still needs one.
    pub fn files_loaded(
        &mut self,
        ticket: ListTicket,
        result: Result<Vec<FileRecord>, ApiError>,
    ) -> Option<ListTicket> {
        if ticket.key != self.filters {
            tracing::debug!(?ticket.key, "stored listing for a superseded filter set");
        }
        self.cache.complete(ticket, result);
        self.ensure_fetch()
    }

    /// Mark the whole listing stale and re-fetch the current key
    pub fn invalidate(&mut self) -> Option<ListTicket> {
        self.cache.invalidate_all();
        self.ensure_fetch()
    }

    pub fn is_fetching(&self) -> bool {
        self.cache.is_fetching(&self.filters)
    }

    pub fn rows(&self) -> Arc<Vec<FileRecord>> {
        match self.cache.state(&self.filters) {
            QueryState::Ready(records) => records,
            _ => Arc::default(),
        }
    }

    pub fn record(&self, id: &str) -> Option<FileRecord> {
        self.rows().iter().find(|r| r.id == id).cloned()
    }

    /// Whether the user narrowed the listing in any way
    pub fn has_active_query(&self) -> bool {
        !self.search_input.is_empty() || self.filters.is_active()
    }

    pub fn status(&self) -> ListStatus {
        match self.cache.state(&self.filters) {
            QueryState::Idle | QueryState::Loading => ListStatus::Loading,
            QueryState::Failed(err) => {
                let message = err.to_string();
                let message = if message.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    message
                };
                ListStatus::Failed(format!("Error loading files: {}", message))
            }
            QueryState::Ready(records) if records.is_empty() => ListStatus::Empty {
                hint: if self.has_active_query() {
                    NO_MATCHES_HINT
                } else {
                    GET_STARTED_HINT
                },
            },
            QueryState::Ready(records) => ListStatus::Rows(records),
        }
    }

    /// Mark a delete as running; false if one is already running for `id`
    pub fn begin_delete(&mut self, id: &str) -> bool {
        self.deleting.insert(id.to_string())
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    /// Settle a delete. Rows are never removed locally; on success the
    /// listing is invalidated and re-fetched.
    pub fn delete_finished(
        &mut self,
        id: &str,
        result: Result<(), ApiError>,
    ) -> (Notification, Option<ListTicket>) {
        self.deleting.remove(id);
        match result {
            Ok(()) => (
                Notification::success("File deleted successfully"),
                self.invalidate(),
            ),
            Err(err) => {
                tracing::warn!(id, error = %err, "delete failed");
                (Notification::error("Failed to delete file"), None)
            }
        }
    }

    /// Start downloading a row; yields its URL and filename
    pub fn begin_download(&mut self, id: &str) -> Option<(String, String)> {
        if self.downloading.is_some() {
            return None;
        }
        let record = self.record(id)?;
        self.downloading = Some(id.to_string());
        Some((record.file, record.original_filename))
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading.is_some()
    }

    pub fn download_finished(&mut self, result: Result<PathBuf, ApiError>) -> Notification {
        self.downloading = None;
        match result {
            Ok(path) => Notification::success(format!("Saved to {}", path.display())),
            Err(err) => {
                tracing::warn!(error = %err, "download failed");
                Notification::error("Failed to download file")
            }
        }
    }
}
