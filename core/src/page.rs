//! Task-collection state for the main view.
//!
//! # Design
//! `PageController` owns what the main view renders around the task panel:
//! the ordered collection, the selected-task pointer, the loading flag and
//! the dismissible error banner. Loads follow the begin/finish split:
//! `begin_load` hands the host a request and flips `loading` while the
//! previous collection stays visible, `finish_load` consumes the outcome.
//! Each issued load carries a [`LoadTicket`] and only the most recent ticket
//! is honored, so a slow response from a superseded load (rapid filter
//! switching) is dropped instead of clobbering fresher data.
//!
//! Mutation events are local: create prepends, update replaces by id, delete
//! removes by id. No re-fetch follows a mutation, and create does not
//! deduplicate — a server echoing an already-present id leaves both entries
//! until the next load.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::Task;

/// Banner text when a load fails without a usable server message.
pub const LOAD_TASKS_FALLBACK: &str = "Erreur lors du chargement des tâches";

/// Identifies one issued load. `finish_load` ignores outcomes whose ticket is
/// no longer the latest issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// State machine over the local task collection.
pub struct PageController {
    client: ApiClient,
    filter: Option<String>,
    tasks: Vec<Task>,
    selected: Option<Task>,
    loading: bool,
    error: Option<String>,
    load_seq: u64,
}

impl PageController {
    /// Creates a controller scoped to `filter` (`None` shows every task the
    /// credential can see). No request is issued until [`Self::begin_load`].
    pub fn new(client: ApiClient, filter: Option<String>) -> Self {
        Self {
            client,
            filter,
            tasks: Vec::new(),
            selected: None,
            loading: false,
            error: None,
            load_seq: 0,
        }
    }

    /// Starts a (re)load of the collection: marks the view loading, clears
    /// the error banner, keeps the current collection visible, and returns
    /// the request for the host to execute. Also serves as the retry action.
    pub fn begin_load(&mut self) -> (LoadTicket, HttpRequest) {
        self.load_seq += 1;
        self.loading = true;
        self.error = None;
        let request = self.client.build_list_tasks(self.filter.as_deref());
        (LoadTicket(self.load_seq), request)
    }

    /// Switches the list filter and starts a load under it.
    pub fn set_filter(&mut self, filter: Option<String>) -> (LoadTicket, HttpRequest) {
        self.filter = filter;
        self.begin_load()
    }

    /// Consumes a load outcome. Outcomes for superseded tickets are dropped.
    /// Success replaces the whole collection and clears any banner; failure
    /// keeps the previous collection and shows the extracted message.
    pub fn finish_load(&mut self, ticket: LoadTicket, outcome: Result<HttpResponse, ApiError>) {
        if ticket.0 != self.load_seq {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.load_seq,
                "dropping stale load outcome"
            );
            return;
        }
        self.loading = false;
        match outcome.and_then(|response| self.client.parse_list_tasks(response)) {
            Ok(tasks) => {
                self.tasks = tasks;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "task load failed");
                self.error = Some(err.user_message(LOAD_TASKS_FALLBACK));
            }
        }
    }

    /// Handles the creation form's success event: prepends the created task.
    /// Pure local insertion; the server is trusted, nothing is re-fetched,
    /// and no deduplication happens.
    pub fn task_created(&mut self, task: Task) {
        self.error = None;
        self.tasks.insert(0, task);
    }

    /// Handles an update event from any editing surface: replaces the entry
    /// with the same id in place and refreshes the selected-task pointer when
    /// it matches. An id not in the collection changes nothing.
    pub fn task_updated(&mut self, task: Task) {
        self.error = None;
        for slot in self.tasks.iter_mut().filter(|t| t.id == task.id) {
            *slot = task.clone();
        }
        if self.selected.as_ref().is_some_and(|s| s.id == task.id) {
            self.selected = Some(task);
        }
    }

    /// Handles a delete event: removes the entry by id (no-op when absent)
    /// and clears the selection when it pointed at the removed task.
    pub fn task_deleted(&mut self, id: Uuid) {
        self.error = None;
        self.tasks.retain(|t| t.id != id);
        if self.selected.as_ref().is_some_and(|s| s.id == id) {
            self.selected = None;
        }
    }

    pub fn select(&mut self, task: Option<Task>) {
        self.selected = task;
    }

    pub fn selected(&self) -> Option<&Task> {
        self.selected.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sink for error messages reported by child surfaces (details panel,
    /// creation form) that display in this view's banner.
    pub fn show_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// The banner's close action.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
