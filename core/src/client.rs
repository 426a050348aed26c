//! Credential-attaching request builder and response parser for the task API.
//!
//! # Design
//! `ApiClient` is the single chokepoint for traffic to the backend. Each
//! operation is split into a `build_*` method that produces an [`HttpRequest`]
//! and a `parse_*` method that consumes an [`HttpResponse`]; the host executes
//! the round-trip in between. Interception happens on both sides of that gap:
//! every `build_*` re-reads the persisted credential and attaches the bearer
//! header, and every `parse_*` funnels the response through one status check
//! that reacts to 401 by clearing the session and navigating to the auth view
//! before returning the error, so callers still observe the failure.

use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{
    encode_query_component, HttpMethod, HttpRequest, HttpResponse, AUTHORIZATION, CONTENT_TYPE,
};
use crate::session::Session;
use crate::types::{Credentials, DeleteReceipt, List, LoginResponse, Task, TaskDraft, TaskPatch};

/// Route of the authentication view. 401 interception and [`ApiClient::logout`]
/// navigate here.
pub const AUTH_PATH: &str = "/auth";

/// Host navigation seam. `current_path` reports the route currently shown;
/// `assign` performs a full navigation (a browser host wraps
/// `window.location`).
pub trait Navigator {
    fn current_path(&self) -> String;
    fn assign(&self, path: &str);
}

/// In-memory [`Navigator`] for hosts that track routing themselves, and for
/// tests. Records every assignment in order.
#[derive(Default)]
pub struct MemoryNavigator {
    path: RefCell<String>,
    visited: RefCell<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial: &str) -> Self {
        Self {
            path: RefCell::new(initial.to_string()),
            visited: RefCell::new(Vec::new()),
        }
    }

    /// Paths assigned so far, oldest first.
    pub fn visits(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }

    fn assign(&self, path: &str) {
        *self.path.borrow_mut() = path.to_string();
        self.visited.borrow_mut().push(path.to_string());
    }
}

/// Façade over the task API. Cheap to clone; clones share the session and
/// navigator.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: Rc<Session>,
    navigator: Rc<dyn Navigator>,
}

impl ApiClient {
    /// Creates a client rooted at `base_url`. A trailing slash on the base URL
    /// is trimmed so joined paths never contain `//`.
    pub fn new(base_url: &str, session: Rc<Session>, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        }
    }

    /// Headers carried by every authenticated request. The credential is
    /// re-read from the session on each call, so a login or logout that
    /// happened after this client was created is still picked up.
    fn base_headers(&self) -> Vec<(String, String)> {
        match self.session.token() {
            Some(token) => vec![(AUTHORIZATION.to_string(), format!("Bearer {token}"))],
            None => Vec::new(),
        }
    }

    fn json_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.base_headers();
        headers.push((CONTENT_TYPE.to_string(), "application/json".to_string()));
        headers
    }

    /// Builds `GET /todos`, optionally filtered to one list via the `list`
    /// query parameter.
    pub fn build_list_tasks(&self, list: Option<&str>) -> HttpRequest {
        let url = match list {
            Some(name) => format!(
                "{}/todos?list={}",
                self.base_url,
                encode_query_component(name)
            ),
            None => format!("{}/todos", self.base_url),
        };
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.base_headers(),
            body: None,
        }
    }

    /// Builds `POST /todos` creating a task from `draft`.
    pub fn build_create_task(&self, draft: &TaskDraft) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(draft).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/todos", self.base_url),
            headers: self.json_headers(),
            body: Some(body),
        })
    }

    /// Builds `PUT /todos/{id}` applying `patch` to one task.
    pub fn build_update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(patch).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: format!("{}/todos/{id}", self.base_url),
            headers: self.json_headers(),
            body: Some(body),
        })
    }

    /// Builds `DELETE /todos/{id}`.
    pub fn build_delete_task(&self, id: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}/todos/{id}", self.base_url),
            headers: self.base_headers(),
            body: None,
        }
    }

    /// Builds `GET /lists`.
    pub fn build_list_lists(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/lists", self.base_url),
            headers: self.base_headers(),
            body: None,
        }
    }

    /// Builds `POST /lists` creating a list named `name`.
    pub fn build_create_list(&self, name: &str) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&List {
            name: name.to_string(),
        })
        .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/lists", self.base_url),
            headers: self.json_headers(),
            body: Some(body),
        })
    }

    /// Builds `POST /auth/login`. No bearer header is attached, even when a
    /// stale credential is still stored.
    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(credentials)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/auth/login", self.base_url),
            headers: vec![(CONTENT_TYPE.to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// Verifies `response` carries `expected`. A 401 clears the session and
    /// navigates to [`AUTH_PATH`] (unless that view is already showing) before
    /// the error is returned; any other unexpected status maps to
    /// [`ApiError::Http`] with the body preserved for message extraction.
    fn intercept(&self, response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
        if response.status == expected {
            return Ok(());
        }
        if response.status == 401 {
            tracing::warn!("credential rejected, clearing session");
            self.session.clear();
            if self.navigator.current_path() != AUTH_PATH {
                self.navigator.assign(AUTH_PATH);
            }
            return Err(ApiError::Unauthorized {
                body: response.body.clone(),
            });
        }
        Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        })
    }

    /// Parses the response to [`Self::build_list_tasks`]: 200 with a task
    /// array.
    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        self.intercept(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parses the response to [`Self::build_create_task`]: 201 with the stored
    /// task, id and defaults filled in by the server.
    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        self.intercept(&response, 201)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parses the response to [`Self::build_update_task`]: 200 with the
    /// updated task.
    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        self.intercept(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parses the response to [`Self::build_delete_task`]: 200 with a receipt.
    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<DeleteReceipt, ApiError> {
        self.intercept(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parses the response to [`Self::build_list_lists`]: 200 with a list
    /// array.
    pub fn parse_list_lists(&self, response: HttpResponse) -> Result<Vec<List>, ApiError> {
        self.intercept(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parses the response to [`Self::build_create_list`]: 201 with the stored
    /// list. The server answers 201 with the existing list when the name was
    /// already taken, so callers may treat creation as idempotent.
    pub fn parse_create_list(&self, response: HttpResponse) -> Result<List, ApiError> {
        self.intercept(&response, 201)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Parses the response to [`Self::build_login`]: 200 with a token. On
    /// success the token (and the user object, when present) is persisted to
    /// the session so later `build_*` calls attach it. A blank token in an
    /// otherwise successful response is not persisted.
    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        self.intercept(&response, 200)?;
        let login: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        if !login.token.is_empty() {
            let user = login.user.as_ref().map(|u| u.to_string());
            self.session.sign_in(&login.token, user.as_deref());
        }
        Ok(login)
    }

    /// Drops the stored credential and navigates to the auth view.
    pub fn logout(&self) {
        self.session.clear();
        self.navigator.assign(AUTH_PATH);
    }
}
