use crate::todo::{NewTodo, Timestamp, Todo, TodoStore};
use crate::web::api::v1::{ApiError, ErrorResponse, MessageResponse, parse_json_body};
use axum::{
    Router,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::Json,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state for the todo handlers. The store is built once at startup.
#[derive(Clone)]
pub struct TodoState {
    pub store: Arc<dyn TodoStore>,
}

impl TodoState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

/// JSON representation of a Todo for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoJson {
    /// Unique identifier assigned by the store
    pub id: i32,
    /// Free-form task content
    pub text: String,
    /// Usually `todo`, `inProgress` or `completed`
    pub status: String,
    /// Creation time, `YYYY-MM-DDTHH:MM`
    pub create_time: String,
    /// Completion time, present only while the status is `completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<String>,
}

impl From<Todo> for TodoJson {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id(),
            text: todo.text().to_string(),
            status: todo.status().to_string(),
            create_time: todo.create_time().to_string(),
            completed_time: todo.completed_time().map(|t| t.to_string()),
        }
    }
}

/// Request body for creating a todo.
///
/// The whole todo shape is bound so that mistyped fields are rejected, but only `text`
/// is used. ID, status and timestamps are always assigned by the server. Absent or
/// `null` fields count as empty.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<u32>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    status: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    create_time: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    completed_time: Option<String>,
}

/// Request body for changing the status of a todo. Absent or `null` status counts as empty.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    status: Option<String>,
}

/// Handler for GET /api/v1/todos - Returns all todos.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/v1/todos",
    responses(
        (status = 200, description = "All todos, oldest first", body = Vec<TodoJson>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn list_todos_handler(
    State(state): State<Arc<TodoState>>,
) -> Result<Json<Vec<TodoJson>>, ApiError> {
    let todos = state
        .store
        .find_all()
        .await
        .map_err(|e| ApiError::from_store("Failed to retrieve todos", e))?;

    Ok(Json(todos.into_iter().map(TodoJson::from).collect()))
}

/// Handler for POST /api/v1/todos - Creates a todo with status `todo`.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    post,
    path = "/api/v1/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoJson),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<Arc<TodoState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<TodoJson>), ApiError> {
    let payload: CreateTodoRequest = parse_json_body(&body)?;

    let new_todo = NewTodo::new(payload.text.unwrap_or_default(), Timestamp::now());
    let created = state
        .store
        .create(new_todo)
        .await
        .map_err(|e| ApiError::from_store("Failed to create todo", e))?;

    Ok((StatusCode::CREATED, Json(TodoJson::from(created))))
}

/// Handler for PUT /api/v1/todos/{id} - Replaces the status of a todo.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    put,
    path = "/api/v1/todos/{id}",
    params(
        ("id" = i32, Path, description = "ID of the todo to update")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoJson),
        (status = 400, description = "Malformed request body or ID", body = ErrorResponse),
        (status = 404, description = "No todo with that ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<Arc<TodoState>>,
    id: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> Result<Json<TodoJson>, ApiError> {
    let Path(id) = id?;
    let payload: UpdateTodoRequest = parse_json_body(&body)?;

    let mut todo = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to load todo", e))?;

    todo.set_status(payload.status.unwrap_or_default(), Timestamp::now());

    let saved = state
        .store
        .save(todo)
        .await
        .map_err(|e| ApiError::from_store("Failed to update todo", e))?;

    Ok(Json(TodoJson::from(saved)))
}

/// Handler for DELETE /api/v1/todos/{id} - Permanently removes a todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/v1/todos/{id}",
    params(
        ("id" = i32, Path, description = "ID of the todo to delete")
    ),
    responses(
        (status = 200, description = "Todo deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "No todo with that ID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<Arc<TodoState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;

    let rows_affected = state
        .store
        .delete_by_id(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to delete todo", e))?;

    if rows_affected == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::new("Todo deleted")))
}

/// Creates and returns the todos API router.
pub fn create_api_router(state: Arc<TodoState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos_handler).post(create_todo_handler))
        .route(
            "/todos/{id}",
            put(update_todo_handler).delete(delete_todo_handler),
        )
        .with_state(state)
}
