use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_token, List, Todo, DEMO_EMAIL, DEMO_PASSWORD};
use serde_json::Value;
use tower::ServiceExt;

const TEST_TOKEN: &str = "test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn auth_json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
        .body(body.to_string())
        .unwrap()
}

fn auth_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn login_issues_token() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            &format!(r#"{{"email":"{DEMO_EMAIL}","password":"{DEMO_PASSWORD}"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], DEMO_EMAIL);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            &format!(r#"{{"email":"{DEMO_EMAIL}","password":"wrong"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn missing_token_rejected() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/todos").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Invalid or missing token");
}

#[tokio::test]
async fn unknown_token_rejected() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/lists")
                .header(http::header::AUTHORIZATION, "Bearer never-issued")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- todos ---

#[tokio::test]
async fn list_todos_empty() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app.oneshot(auth_request("GET", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn create_todo_returns_201() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_json_request("POST", "/todos", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_trims_title() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_json_request(
            "POST",
            "/todos",
            r#"{"title":"  padded  "}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "padded");
}

#[tokio::test]
async fn create_todo_blank_title_returns_400() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_json_request("POST", "/todos", r#"{"title":"   "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Title is required");
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_json_request("POST", "/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_todo_not_found() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_json_request(
            "PUT",
            "/todos/00000000-0000-0000-0000-000000000000",
            r#"{"title":"Nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_todo_bad_uuid_returns_400() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_json_request("PUT", "/todos/not-a-uuid", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_request(
            "DELETE",
            "/todos/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- list filtering ---

#[tokio::test]
async fn filter_todos_by_list() {
    use tower::Service;

    let mut app = app_with_token(TEST_TOKEN).into_service();

    for body in [
        r#"{"title":"Revise chapter","list":"Cours"}"#,
        r#"{"title":"No list here"}"#,
        r#"{"title":"Buy leeks","list":"Liste de courses"}"#,
    ] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(auth_json_request("POST", "/todos", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Percent-encoded query values decode before matching.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(auth_request("GET", "/todos?list=Liste%20de%20courses"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Buy leeks");

    // Todos without a list fall under the default one.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(auth_request("GET", "/todos?list=General"))
        .await
        .unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "No list here");
}

// --- lists ---

#[tokio::test]
async fn create_list_blank_name_returns_400() {
    let app = app_with_token(TEST_TOKEN);
    let resp = app
        .oneshot(auth_json_request("POST", "/lists", r#"{"name":"  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "List name is required");
}

#[tokio::test]
async fn create_list_is_idempotent() {
    use tower::Service;

    let mut app = app_with_token(TEST_TOKEN).into_service();

    for _ in 0..2 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(auth_json_request("POST", "/lists", r#"{"name":"Cours"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let list: List = body_json(resp).await;
        assert_eq!(list.name, "Cours");
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(auth_request("GET", "/lists"))
        .await
        .unwrap();
    let lists: Vec<List> = body_json(resp).await;
    assert_eq!(lists.len(), 1);
}

// --- full lifecycle ---

#[tokio::test]
async fn login_then_crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // login for a real token
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/auth/login",
            &format!(r#"{{"email":"{DEMO_EMAIL}","password":"{DEMO_PASSWORD}"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = body_json(resp).await;
    let token = login["token"].as_str().unwrap().to_string();
    let bearer = format!("Bearer {token}");

    let with_auth = |method: &str, uri: &str, body: &str| {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .header(http::header::AUTHORIZATION, &bearer)
            .body(body.to_string())
            .unwrap()
    };

    // create two — listing returns newest first
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(with_auth("POST", "/todos", r#"{"title":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let first: Todo = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(with_auth(
            "POST",
            "/todos",
            r#"{"title":"Water plants","priority":"high"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let second: Todo = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(with_auth("GET", "/todos", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].id, second.id);
    assert_eq!(todos[1].id, first.id);

    // update — partial: only completed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(with_auth(
            "PUT",
            &format!("/todos/{}", first.id),
            r#"{"completed":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.completed);

    // delete — receipt carries the remaining todos
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(with_auth("DELETE", &format!("/todos/{}", second.id), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: Value = body_json(resp).await;
    assert_eq!(receipt["message"], "Todo deleted successfully");
    assert_eq!(receipt["todos"].as_array().unwrap().len(), 1);
    assert_eq!(receipt["todos"][0]["_id"], first.id.to_string());
}
