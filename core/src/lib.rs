//! Client-side core of the RememberMe task application.
//!
//! # Overview
//! Everything the view layer needs short of rendering: the session/credential
//! lifecycle, the API façade with bearer attachment and 401 interception, and
//! the two stateful controllers behind the main view and the task-creation
//! modal. Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern); the host executes the actual
//! round-trips.
//!
//! # Design
//! - `ApiClient` is the single chokepoint for outgoing calls. Each operation
//!   is a `build_*` / `parse_*` pair, so the I/O boundary is explicit and the
//!   interception side effects (credential re-read, 401 handling) are
//!   deterministic.
//! - Controllers (`PageController`, `TaskForm`) are begin/finish state
//!   machines: in-flight UI states are ordinary values, and superseded
//!   responses are dropped by ticket comparison instead of racing.
//! - Single-threaded by design, like the host it serves: shared pieces use
//!   `Rc`, subscriptions use the in-crate `Bus`, nothing is `Send`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod bus;
pub mod client;
pub mod error;
pub mod form;
pub mod http;
pub mod page;
pub mod session;
pub mod types;

pub use bus::{AppEvent, Bus, ListenerId};
pub use client::{ApiClient, MemoryNavigator, Navigator, AUTH_PATH};
pub use error::ApiError;
pub use form::{ListsTicket, TaskForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use page::{LoadTicket, PageController};
pub use session::{CredentialStore, MemoryStore, Session, SessionEvent};
pub use types::{
    Credentials, DeleteReceipt, List, LoginResponse, Priority, Task, TaskDraft, TaskPatch,
    GENERAL_LIST,
};
