//! Creation-form state for the floating "new task" modal.
//!
//! # Design
//! `TaskForm` owns the transient field values plus two asynchronous sub-flows
//! that share one error slot, exactly the surface the modal renders. Both
//! sub-flows use the begin/finish split so the host executes the I/O:
//!
//! - **Task sub-flow**: `submit` validates the trimmed title locally (an
//!   empty title never produces a request), builds the draft under the
//!   omission rules, and hands back the create request; `finish_submit`
//!   either resets the form, closes the modal and yields the created task
//!   for the page controller, or surfaces the failure with fields intact so
//!   the user can correct and resubmit.
//! - **List sub-flow**: a three-step chain. `submit_new_list` trims the
//!   candidate name and yields the create request; `finish_create_list`
//!   clears the input and yields an unconditional collection re-fetch (the
//!   server may have normalized or deduplicated the name);
//!   `finish_refresh_lists` installs the fresh collection, moves the active
//!   selector to the server-confirmed name and broadcasts
//!   [`AppEvent::ListsChanged`] so other mounted views re-fetch too. The
//!   cleared input is never rolled back on a late failure.
//!
//! The lists fetched on open are the one place failures degrade silently:
//! the options collapse to just "General" rather than showing a banner.

use std::rc::Rc;

use chrono::NaiveDate;

use crate::bus::{AppEvent, Bus};
use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{List, Priority, Task, TaskDraft, GENERAL_LIST};

/// Inline validation text for a missing title.
pub const TITLE_REQUIRED: &str = "Le titre est requis";
/// Banner fallback when creating the task fails without a usable message.
pub const CREATE_TASK_FALLBACK: &str = "Erreur lors de la création de la tâche";
/// Banner fallback when the list sub-flow fails without a usable message.
pub const CREATE_LIST_FALLBACK: &str = "Erreur lors de la création de la liste";

/// Identifies one issued lists fetch (initial load or post-create refresh).
/// Outcomes for superseded tickets are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListsTicket(u64);

/// State machine behind the task-creation modal.
pub struct TaskForm {
    client: ApiClient,
    bus: Rc<Bus<AppEvent>>,
    open: bool,
    title: String,
    description: String,
    due_date: Option<NaiveDate>,
    due_time: String,
    list: String,
    priority: Priority,
    new_list_name: String,
    lists: Vec<List>,
    lists_loading: bool,
    submitting: bool,
    adding_list: bool,
    error: Option<String>,
    lists_seq: u64,
    /// Name the selector moves to once the refresh lands: the trimmed
    /// candidate at first, replaced by the server-confirmed spelling.
    pending_list: Option<String>,
}

impl TaskForm {
    pub fn new(client: ApiClient, bus: Rc<Bus<AppEvent>>) -> Self {
        Self {
            client,
            bus,
            open: false,
            title: String::new(),
            description: String::new(),
            due_date: None,
            due_time: String::new(),
            list: GENERAL_LIST.to_string(),
            priority: Priority::Medium,
            new_list_name: String::new(),
            lists: Vec::new(),
            lists_loading: false,
            submitting: false,
            adding_list: false,
            error: None,
            lists_seq: 0,
            pending_list: None,
        }
    }

    /// Opens the modal and starts the lists fetch that feeds the selector.
    /// Returns `None` when the modal is already open.
    pub fn open(&mut self) -> Option<(ListsTicket, HttpRequest)> {
        if self.open {
            return None;
        }
        self.open = true;
        self.lists_loading = true;
        self.lists_seq += 1;
        Some((ListsTicket(self.lists_seq), self.client.build_list_lists()))
    }

    /// Consumes the outcome of the open-time lists fetch. Failures degrade to
    /// an empty collection; the selector then offers only "General".
    pub fn finish_load_lists(
        &mut self,
        ticket: ListsTicket,
        outcome: Result<HttpResponse, ApiError>,
    ) {
        if ticket.0 != self.lists_seq {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.lists_seq,
                "dropping stale lists outcome"
            );
            return;
        }
        self.lists_loading = false;
        match outcome.and_then(|response| self.client.parse_list_lists(response)) {
            Ok(lists) => self.lists = lists,
            Err(err) => {
                tracing::debug!(error = %err, "lists fetch failed, degrading to empty");
                self.lists = Vec::new();
            }
        }
    }

    /// Starts the list sub-flow for the candidate name. No-ops (returns
    /// `None`) while either sub-flow is in flight or when the trimmed name is
    /// empty.
    pub fn submit_new_list(&mut self) -> Option<HttpRequest> {
        if self.submitting || self.adding_list {
            return None;
        }
        let name = self.new_list_name.trim().to_string();
        if name.is_empty() {
            return None;
        }
        match self.client.build_create_list(&name) {
            Ok(request) => {
                self.adding_list = true;
                self.error = None;
                self.pending_list = Some(name);
                Some(request)
            }
            Err(err) => {
                self.error = Some(err.user_message(CREATE_LIST_FALLBACK));
                None
            }
        }
    }

    /// Consumes the create-list outcome. On success the input field is
    /// cleared and the collection re-fetch request is returned — the flow
    /// stays in `adding_list` until the refresh settles. On failure the
    /// extracted message lands in the shared error slot and is also returned
    /// for the external error callback.
    pub fn finish_create_list(
        &mut self,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Option<Result<(ListsTicket, HttpRequest), String>> {
        if !self.adding_list {
            return None;
        }
        match outcome.and_then(|response| self.client.parse_create_list(response)) {
            Ok(created) => {
                self.new_list_name.clear();
                if !created.name.is_empty() {
                    self.pending_list = Some(created.name);
                }
                self.lists_seq += 1;
                Some(Ok((
                    ListsTicket(self.lists_seq),
                    self.client.build_list_lists(),
                )))
            }
            Err(err) => {
                let message = err.user_message(CREATE_LIST_FALLBACK);
                tracing::warn!(error = %err, "list creation failed");
                self.error = Some(message.clone());
                self.adding_list = false;
                self.pending_list = None;
                Some(Err(message))
            }
        }
    }

    /// Consumes the post-create refresh outcome, ending the list sub-flow.
    /// Success installs the collection, moves the selector to the confirmed
    /// name and broadcasts [`AppEvent::ListsChanged`]; the cleared input is
    /// not rolled back on failure.
    pub fn finish_refresh_lists(
        &mut self,
        ticket: ListsTicket,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Option<Result<(), String>> {
        if ticket.0 != self.lists_seq {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.lists_seq,
                "dropping stale refresh outcome"
            );
            return None;
        }
        if !self.adding_list {
            return None;
        }
        self.adding_list = false;
        match outcome.and_then(|response| self.client.parse_list_lists(response)) {
            Ok(lists) => {
                self.lists = lists;
                if let Some(name) = self.pending_list.take() {
                    self.list = name;
                }
                self.bus.emit(&AppEvent::ListsChanged);
                Some(Ok(()))
            }
            Err(err) => {
                let message = err.user_message(CREATE_LIST_FALLBACK);
                tracing::warn!(error = %err, "lists refresh after create failed");
                self.error = Some(message.clone());
                self.pending_list = None;
                Some(Err(message))
            }
        }
    }

    /// Validates and starts the task sub-flow. An empty trimmed title sets
    /// the inline validation message and produces no request. No-ops while a
    /// submission is already in flight.
    pub fn submit(&mut self) -> Option<HttpRequest> {
        if self.submitting {
            return None;
        }
        self.error = None;

        let title = self.title.trim();
        if title.is_empty() {
            self.error = Some(TITLE_REQUIRED.to_string());
            return None;
        }

        // Defaults are omitted, not sent: absent keys mean "server default".
        let description = self.description.trim();
        let draft = TaskDraft {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            due_date: self.due_date,
            due_time: (!self.due_time.is_empty()).then(|| self.due_time.clone()),
            list: (!self.list.is_empty() && self.list != GENERAL_LIST)
                .then(|| self.list.clone()),
            priority: (self.priority != Priority::Medium).then_some(self.priority),
        };
        match self.client.build_create_task(&draft) {
            Ok(request) => {
                self.submitting = true;
                Some(request)
            }
            Err(err) => {
                self.error = Some(err.user_message(CREATE_TASK_FALLBACK));
                None
            }
        }
    }

    /// Consumes the create-task outcome. Success returns the created task
    /// (the event the host forwards to the page controller), resets every
    /// field and closes the modal; failure surfaces the message and leaves
    /// the form untouched for correction.
    pub fn finish_submit(
        &mut self,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Option<Result<Task, String>> {
        if !self.submitting {
            return None;
        }
        self.submitting = false;
        match outcome.and_then(|response| self.client.parse_create_task(response)) {
            Ok(task) => {
                self.reset();
                self.open = false;
                Some(Ok(task))
            }
            Err(err) => {
                let message = err.user_message(CREATE_TASK_FALLBACK);
                tracing::warn!(error = %err, "task creation failed");
                self.error = Some(message.clone());
                Some(Err(message))
            }
        }
    }

    /// Closes the modal and resets to initial values, abandoning any
    /// in-flight list sub-flow. No-ops while a task submission is in flight
    /// (the close controls are disabled then).
    pub fn close(&mut self) {
        if self.submitting {
            return;
        }
        self.reset();
        self.open = false;
    }

    /// Back to initial values. Bumping the sequence invalidates tickets of
    /// abandoned list fetches; the cached collection survives until the next
    /// open replaces it.
    fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.due_date = None;
        self.due_time.clear();
        self.list = GENERAL_LIST.to_string();
        self.priority = Priority::Medium;
        self.new_list_name.clear();
        self.error = None;
        self.adding_list = false;
        self.lists_loading = false;
        self.pending_list = None;
        self.lists_seq += 1;
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) {
        self.due_date = due_date;
    }

    /// The time input's value; an empty string means unset.
    pub fn set_due_time(&mut self, due_time: String) {
        self.due_time = due_time;
    }

    /// Selects an option from the list dropdown.
    pub fn set_list(&mut self, list: String) {
        self.list = list;
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn set_new_list_name(&mut self, name: String) {
        self.new_list_name = name;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn due_time(&self) -> &str {
        &self.due_time
    }

    /// The active list selector value.
    pub fn list(&self) -> &str {
        &self.list
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn new_list_name(&self) -> &str {
        &self.new_list_name
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    /// Selector options: "General" first, then fetched names, deduplicated.
    pub fn list_options(&self) -> Vec<String> {
        let mut options = vec![GENERAL_LIST.to_string()];
        for list in &self.lists {
            if !options.contains(&list.name) {
                options.push(list.name.clone());
            }
        }
        options
    }

    pub fn lists_loading(&self) -> bool {
        self.lists_loading
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    pub fn adding_list(&self) -> bool {
        self.adding_list
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
