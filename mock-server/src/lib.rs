//! In-memory implementation of the task service's REST API.
//!
//! # Design
//! Stands in for the real backend during integration tests and manual poking.
//! State lives behind an `Arc<RwLock<Store>>`; tasks are kept newest-first the
//! way the backend returns them. DTOs are declared here independently of the
//! core crate so integration tests catch schema drift between the two.
//!
//! Authentication mirrors the backend: `POST /auth/login` checks the fixed
//! demo account and issues a fresh token; every `/todos*` and `/lists*` route
//! rejects requests whose bearer token was never issued with a 401 and a
//! `{message}` body, which is exactly the shape the client's interception
//! layer reacts to.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Account accepted by the login endpoint.
pub const DEMO_EMAIL: &str = "demo@rememberme.test";
pub const DEMO_PASSWORD: &str = "demo-password";

/// Tasks without a list belong to this one.
pub const GENERAL_LIST: &str = "General";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "dueTime", skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "dueTime")]
    pub due_time: Option<String>,
    #[serde(default)]
    pub list: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "dueDate")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "dueTime")]
    pub due_time: Option<String>,
    pub list: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct List {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateList {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ListFilter {
    pub list: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub todos: Vec<Todo>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Default)]
pub struct Store {
    todos: Vec<Todo>,
    lists: Vec<List>,
    tokens: HashSet<String>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiFailure = (StatusCode, Json<ErrorBody>);

pub fn app() -> Router {
    router(Arc::new(RwLock::new(Store::default())))
}

/// App with `token` already accepted, for tests that skip the login flow.
pub fn app_with_token(token: &str) -> Router {
    let mut store = Store::default();
    store.tokens.insert(token.to_string());
    router(Arc::new(RwLock::new(store)))
}

fn router(db: Db) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .route("/lists", get(list_lists).post(create_list))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn failure(status: StatusCode, message: &str) -> ApiFailure {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

/// Rejects requests whose bearer token was never issued by `login`.
async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), ApiFailure> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");
    if !token.is_empty() && db.read().await.tokens.contains(token) {
        return Ok(());
    }
    Err(failure(StatusCode::UNAUTHORIZED, "Invalid or missing token"))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiFailure> {
    if input.email != DEMO_EMAIL || input.password != DEMO_PASSWORD {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }
    let token = Uuid::new_v4().to_string();
    db.write().await.tokens.insert(token.clone());
    tracing::debug!(email = %input.email, "issued token");
    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            email: input.email,
            name: "Demo".to_string(),
        },
    }))
}

async fn list_todos(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Todo>>, ApiFailure> {
    authorize(&db, &headers).await?;
    let store = db.read().await;
    let todos = match &filter.list {
        Some(name) => store
            .todos
            .iter()
            .filter(|t| t.list.as_deref().unwrap_or(GENERAL_LIST) == name)
            .cloned()
            .collect(),
        None => store.todos.clone(),
    };
    Ok(Json(todos))
}

async fn create_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiFailure> {
    authorize(&db, &headers).await?;
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Title is required"));
    }
    let todo = Todo {
        id: Uuid::new_v4(),
        title,
        description: input.description,
        due_date: input.due_date,
        due_time: input.due_time,
        list: input.list,
        priority: input.priority,
        completed: input.completed,
    };
    tracing::debug!(id = %todo.id, "created todo");
    // Newest first, the order the backend hands out.
    db.write().await.todos.insert(0, todo.clone());
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, ApiFailure> {
    authorize(&db, &headers).await?;
    let mut store = db.write().await;
    let todo = store
        .todos
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Todo not found"))?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = Some(description);
    }
    if let Some(due_date) = input.due_date {
        todo.due_date = Some(due_date);
    }
    if let Some(due_time) = input.due_time {
        todo.due_time = Some(due_time);
    }
    if let Some(list) = input.list {
        todo.list = Some(list);
    }
    if let Some(priority) = input.priority {
        todo.priority = priority;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiFailure> {
    authorize(&db, &headers).await?;
    let mut store = db.write().await;
    let before = store.todos.len();
    store.todos.retain(|t| t.id != id);
    if store.todos.len() == before {
        return Err(failure(StatusCode::NOT_FOUND, "Todo not found"));
    }
    Ok(Json(DeleteResponse {
        message: "Todo deleted successfully".to_string(),
        todos: store.todos.clone(),
    }))
}

async fn list_lists(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<List>>, ApiFailure> {
    authorize(&db, &headers).await?;
    Ok(Json(db.read().await.lists.clone()))
}

async fn create_list(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateList>,
) -> Result<(StatusCode, Json<List>), ApiFailure> {
    authorize(&db, &headers).await?;
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "List name is required"));
    }
    let mut store = db.write().await;
    // Creation is idempotent: a taken name answers 201 with the stored list.
    if let Some(existing) = store.lists.iter().find(|l| l.name == name) {
        return Ok((StatusCode::CREATED, Json(existing.clone())));
    }
    let list = List { name };
    store.lists.push(list.clone());
    Ok((StatusCode::CREATED, Json(list)))
}
